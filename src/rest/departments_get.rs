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

//! API to list all departments.

use crate::driver::Driver;
use crate::model::Department;
use crate::rest::{ListResponse, RestResult};
use axum::extract::State;
use axum::Json;

/// GET handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
) -> RestResult<Json<ListResponse<Department>>> {
    let departments = driver.get_departments().await?;
    Ok(Json(ListResponse::new(departments)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::testutils::*;
    use axum::http;

    fn route() -> (http::Method, String) {
        (http::Method::GET, "/api/departments".to_owned())
    }

    #[tokio::test]
    async fn test_empty() {
        let context = TestContext::setup().await;

        let response = OneShotBuilder::new(context.into_app(), route())
            .send_empty()
            .await
            .expect_json::<ListResponse<Department>>()
            .await;
        assert!(response.success);
        assert_eq!(0, response.count);
        assert!(response.data.is_empty());
    }

    #[tokio::test]
    async fn test_ascending_ids_and_count() {
        let context = TestContext::setup().await;

        let id1 = context.insert_department("Engineering").await;
        let id2 = context.insert_department("Sales").await;
        let id3 = context.insert_department("Marketing").await;

        let response = OneShotBuilder::new(context.into_app(), route())
            .send_empty()
            .await
            .expect_json::<ListResponse<Department>>()
            .await;
        assert_eq!(3, response.count);
        assert_eq!(
            vec![id1, id2, id3],
            response.data.iter().map(|d| *d.id()).collect::<Vec<i32>>()
        );
        assert_eq!("Engineering", response.data[0].name().as_str());
    }
}
