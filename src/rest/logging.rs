// Staff API
// Copyright 2025 The Staff API Authors
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Request logging middleware.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use log::info;
use std::time::Instant;

/// Emits one log line per request with the final status code and the time it
/// took to produce the response.  The response flows through unmodified; the
/// log formatter supplies the timestamp.
pub(crate) async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    info!(
        "{} {} - Status: {} - {}ms",
        method,
        uri,
        response.status().as_u16(),
        start.elapsed().as_millis()
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::testutils::*;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{middleware, http, Json, Router};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Deserialize, PartialEq, Serialize)]
    struct Payload {
        text: String,
    }

    /// The middleware must be transparent: whatever the handler produces is
    /// what the client sees.
    #[tokio::test]
    async fn test_response_passes_through_unmodified() {
        async fn handler() -> (StatusCode, Json<Payload>) {
            (StatusCode::CREATED, Json(Payload { text: "hello".to_owned() }))
        }

        let app = Router::new()
            .route("/probe", get(handler))
            .layer(middleware::from_fn(log_requests));

        let response = OneShotBuilder::new(app, (http::Method::GET, "/probe"))
            .send_empty()
            .await
            .expect_status(StatusCode::CREATED)
            .expect_json::<Payload>()
            .await;
        assert_eq!(Payload { text: "hello".to_owned() }, response);
    }
}
