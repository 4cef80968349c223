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

//! API to create a department.

use crate::driver::Driver;
use crate::model::Department;
use crate::rest::{ItemResponse, RestResult};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

/// Message sent to the server to create a department.
#[derive(Deserialize, Serialize)]
pub(crate) struct CreateDepartmentRequest {
    /// Name for the new department.
    pub(crate) name: Option<String>,
}

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Json(request): Json<CreateDepartmentRequest>,
) -> RestResult<(StatusCode, Json<ItemResponse<Department>>)> {
    let department = driver.create_department(request.name).await?;
    Ok((
        StatusCode::CREATED,
        Json(ItemResponse::with_message("Department created successfully", department)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::testutils::*;
    use axum::http;

    fn route() -> (http::Method, String) {
        (http::Method::POST, "/api/departments".to_owned())
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;

        let request = CreateDepartmentRequest { name: Some("Engineering".to_owned()) };
        let response = OneShotBuilder::new(context.app(), route())
            .send_json(request)
            .await
            .expect_status(http::StatusCode::CREATED)
            .expect_json::<ItemResponse<Department>>()
            .await;
        assert_eq!(Some("Department created successfully".to_owned()), response.message);
        assert_eq!("Engineering", response.data.name().as_str());

        assert!(context.department_exists(*response.data.id()).await);
    }

    #[tokio::test]
    async fn test_name_is_trimmed() {
        let context = TestContext::setup().await;

        let request = CreateDepartmentRequest { name: Some("  Engineering  ".to_owned()) };
        let response = OneShotBuilder::new(context.into_app(), route())
            .send_json(request)
            .await
            .expect_status(http::StatusCode::CREATED)
            .expect_json::<ItemResponse<Department>>()
            .await;
        assert_eq!("Engineering", response.data.name().as_str());
    }

    #[tokio::test]
    async fn test_blank_name() {
        let context = TestContext::setup().await;

        for name in [None, Some("".to_owned()), Some("   ".to_owned())] {
            let request = CreateDepartmentRequest { name };
            OneShotBuilder::new(context.app(), route())
                .send_json(request)
                .await
                .expect_status(http::StatusCode::BAD_REQUEST)
                .expect_error("Department name is required")
                .await;
        }
    }

    #[tokio::test]
    async fn test_missing_name_field() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.into_app(), route())
            .send_json(serde_json::json!({}))
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Department name is required")
            .await;
    }

    #[tokio::test]
    async fn test_duplicate_name() {
        let context = TestContext::setup().await;

        context.insert_department("Engineering").await;

        let request = CreateDepartmentRequest { name: Some("Engineering".to_owned()) };
        let response = OneShotBuilder::new(context.into_app(), route())
            .send_json(request)
            .await
            .expect_status(http::StatusCode::CONFLICT)
            .expect_error("Duplicate Entry")
            .await;
        assert_eq!(Some("Department name already exists".to_owned()), response.message);
    }
}
