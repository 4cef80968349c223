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

//! API to create an employee.

use crate::driver::Driver;
use crate::model::{EmployeeDetails, NewEmployee};
use crate::rest::{ItemResponse, RestError, RestResult};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

/// Message sent to the server to create an employee.
///
/// All fields are optional at the serde level so that missing ones surface
/// as the API's own validation error instead of a deserialization rejection.
#[derive(Deserialize, Serialize)]
pub(crate) struct CreateEmployeeRequest {
    pub(crate) first_name: Option<String>,
    pub(crate) last_name: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) department_id: Option<i32>,
    pub(crate) manager_id: Option<i32>,
}

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Json(request): Json<CreateEmployeeRequest>,
) -> RestResult<(StatusCode, Json<ItemResponse<EmployeeDetails>>)> {
    let employee = match (request.first_name, request.last_name, request.email, request.department_id)
    {
        (Some(first_name), Some(last_name), Some(email), Some(department_id))
            if !first_name.is_empty() && !last_name.is_empty() && !email.is_empty() =>
        {
            NewEmployee::new(first_name, last_name, email, department_id, request.manager_id)
        }
        (_, _, _, _) => {
            return Err(RestError::invalid_request(
                "Missing required fields",
                "first_name, last_name, email, and department_id are required",
            ));
        }
    };

    let employee = driver.create_employee(employee).await?;
    Ok((
        StatusCode::CREATED,
        Json(ItemResponse::with_message("Employee created successfully", employee)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::testutils::*;
    use axum::http;

    fn route() -> (http::Method, String) {
        (http::Method::POST, "/api/employees".to_owned())
    }

    /// Builds a fully-populated creation request for `department_id`.
    fn valid_request(department_id: i32) -> CreateEmployeeRequest {
        CreateEmployeeRequest {
            first_name: Some("Ada".to_owned()),
            last_name: Some("Lovelace".to_owned()),
            email: Some("ada@example.com".to_owned()),
            department_id: Some(department_id),
            manager_id: None,
        }
    }

    #[tokio::test]
    async fn test_ok_without_manager() {
        let context = TestContext::setup().await;

        let department_id = context.insert_department("Engineering").await;

        let response = OneShotBuilder::new(context.app(), route())
            .send_json(valid_request(department_id))
            .await
            .expect_status(http::StatusCode::CREATED)
            .expect_json::<ItemResponse<EmployeeDetails>>()
            .await;
        assert_eq!(Some("Employee created successfully".to_owned()), response.message);
        assert_eq!("ada@example.com", response.data.email());
        assert_eq!("Engineering", response.data.department().name().as_str());
        assert_eq!(None, *response.data.manager());

        assert!(context.employee_exists(*response.data.id()).await);
    }

    #[tokio::test]
    async fn test_ok_with_manager() {
        let context = TestContext::setup().await;

        let department_id = context.insert_department("Engineering").await;
        let manager_id = context
            .insert_employee("Grace", "Hopper", "grace@example.com", department_id, None)
            .await;

        let mut request = valid_request(department_id);
        request.manager_id = Some(manager_id);
        let response = OneShotBuilder::new(context.into_app(), route())
            .send_json(request)
            .await
            .expect_status(http::StatusCode::CREATED)
            .expect_json::<ItemResponse<EmployeeDetails>>()
            .await;
        let manager = response.data.manager().as_ref().unwrap();
        assert_eq!(manager_id, *manager.id());
        assert_eq!("Grace", manager.first_name());
        assert_eq!("grace@example.com", manager.email());
    }

    #[tokio::test]
    async fn test_missing_required_fields() {
        let context = TestContext::setup().await;

        let department_id = context.insert_department("Engineering").await;

        let mut requests = vec![];
        for field in ["first_name", "last_name", "email", "department_id"] {
            let mut request = valid_request(department_id);
            match field {
                "first_name" => request.first_name = None,
                "last_name" => request.last_name = None,
                "email" => request.email = Some("".to_owned()),
                "department_id" => request.department_id = None,
                _ => unreachable!(),
            }
            requests.push(request);
        }

        for request in requests {
            let response = OneShotBuilder::new(context.app(), route())
                .send_json(request)
                .await
                .expect_status(http::StatusCode::BAD_REQUEST)
                .expect_error("Missing required fields")
                .await;
            assert_eq!(
                Some("first_name, last_name, email, and department_id are required".to_owned()),
                response.message
            );
        }
    }

    #[tokio::test]
    async fn test_unknown_department() {
        let context = TestContext::setup().await;

        let response = OneShotBuilder::new(context.into_app(), route())
            .send_json(valid_request(123))
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Invalid department_id")
            .await;
        assert_eq!(Some("Department does not exist".to_owned()), response.message);
    }

    #[tokio::test]
    async fn test_unknown_manager() {
        let context = TestContext::setup().await;

        let department_id = context.insert_department("Engineering").await;

        let mut request = valid_request(department_id);
        request.manager_id = Some(123);
        let response = OneShotBuilder::new(context.into_app(), route())
            .send_json(request)
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Invalid manager_id")
            .await;
        assert_eq!(Some("Manager does not exist".to_owned()), response.message);
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let context = TestContext::setup().await;

        let department_id = context.insert_department("Engineering").await;
        context.insert_employee("Grace", "Hopper", "ada@example.com", department_id, None).await;

        let response = OneShotBuilder::new(context.into_app(), route())
            .send_json(valid_request(department_id))
            .await
            .expect_status(http::StatusCode::CONFLICT)
            .expect_error("Duplicate Entry")
            .await;
        assert_eq!(Some("Email already exists".to_owned()), response.message);
    }
}
