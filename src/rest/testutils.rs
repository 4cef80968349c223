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

//! Test utilities for the REST API.

use crate::db::{self, sqlite, Db, Executor};
use crate::driver::Driver;
use crate::model::{DepartmentName, NewEmployee};
use crate::rest::{app, ErrorResponse};
use axum::body::Body;
use axum::http::{self, Request};
use axum::response::Response;
use axum::Router;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tower::util::ServiceExt;

/// Maximum body size for testing purposes.
const MAX_BODY_SIZE: usize = 16 * 1024;

pub(crate) struct TestContext {
    db: Arc<dyn Db + Send + Sync>,
    app: Router,
}

impl TestContext {
    pub(crate) async fn setup() -> Self {
        let db: Arc<dyn Db + Send + Sync> = Arc::new(sqlite::testutils::setup().await);
        let driver = Driver::new(db.clone());
        let app = app(driver);
        Self { db, app }
    }

    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    pub(crate) fn into_app(self) -> Router {
        self.app
    }

    /// Returns an executor for direct access to the underlying database.
    async fn ex(&self) -> Executor {
        self.db.ex().await.unwrap()
    }

    /// Inserts a department directly into the database and returns its id.
    pub(crate) async fn insert_department(&self, name: &str) -> i32 {
        let department =
            db::create_department(&mut self.ex().await, &DepartmentName::new(name).unwrap())
                .await
                .unwrap();
        *department.id()
    }

    /// Inserts an employee directly into the database and returns its id.
    pub(crate) async fn insert_employee(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        department_id: i32,
        manager_id: Option<i32>,
    ) -> i32 {
        let employee = NewEmployee::new(
            first_name.to_owned(),
            last_name.to_owned(),
            email.to_owned(),
            department_id,
            manager_id,
        );
        db::create_employee(&mut self.ex().await, &employee).await.unwrap()
    }

    pub(crate) async fn department_exists(&self, id: i32) -> bool {
        db::get_department(&mut self.ex().await, id).await.unwrap().is_some()
    }

    pub(crate) async fn employee_exists(&self, id: i32) -> bool {
        db::get_employee(&mut self.ex().await, id).await.unwrap().is_some()
    }

    /// Returns the stored `manager_id` of the employee `id`.
    pub(crate) async fn manager_of(&self, id: i32) -> Option<i32> {
        *db::get_employee(&mut self.ex().await, id).await.unwrap().unwrap().manager_id()
    }
}

/// Builder for a single request to the API server.
#[must_use]
pub(crate) struct OneShotBuilder {
    /// The router for the app being tested.
    app: Router,

    /// Builder for the request that will be sent to the app.
    builder: http::request::Builder,
}

impl OneShotBuilder {
    /// Creates a new request against a given `method`/`uri` pair served by an
    /// `app` router.
    pub(crate) fn new<U: AsRef<str>>(app: Router, (method, uri): (http::Method, U)) -> Self {
        let builder = Request::builder().method(method).uri(uri.as_ref());
        Self { app, builder }
    }

    /// Finishes building the request and sends it with an empty payload.
    pub(crate) async fn send_empty(self) -> ResponseChecker {
        let request = self.builder.body(Body::empty()).unwrap();
        ResponseChecker::from(self.app.oneshot(request).await.unwrap())
    }

    /// Finishes building the request and sends it with a JSON payload.
    pub(crate) async fn send_json<T: Serialize>(self, request: T) -> ResponseChecker {
        let request = self
            .builder
            .header(http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .body(Body::from(serde_json::to_vec(&request).unwrap()))
            .unwrap();
        ResponseChecker::from(self.app.oneshot(request).await.unwrap())
    }
}

/// Validator for the outcome of a request sent by a `OneShotBuilder`.
#[must_use]
pub(crate) struct ResponseChecker {
    /// Actual response that we received from the app.
    response: Response,

    /// Expected HTTP status code in the response above.
    exp_status: http::StatusCode,
}

impl From<Response> for ResponseChecker {
    fn from(response: Response) -> Self {
        Self { response, exp_status: http::StatusCode::OK }
    }
}

impl ResponseChecker {
    /// Sets the expected exit HTTP status to `status`.
    pub(crate) fn expect_status(mut self, status: http::StatusCode) -> Self {
        self.exp_status = status;
        self
    }

    /// Performs common validation operations on the response.
    fn verify(&self) {
        assert_eq!(self.exp_status, self.response.status());
    }

    /// Finishes checking the response and expects it to contain a valid JSON
    /// object of type `T`.
    pub(crate) async fn expect_json<T: DeserializeOwned>(self) -> T {
        self.verify();

        let body = axum::body::to_bytes(self.response.into_body(), MAX_BODY_SIZE).await.unwrap();
        match serde_json::from_slice::<T>(&body) {
            Ok(response) => response,
            Err(e) => {
                let body = String::from_utf8(body.to_vec()).unwrap();
                panic!("Invalid response due to {}; content was {}", e, body);
            }
        }
    }

    /// Finishes checking the response and expects its body to be an error
    /// envelope whose label matches `exp_re`.  Returns the envelope so that
    /// callers can inspect the detail message.
    pub(crate) async fn expect_error(self, exp_re: &str) -> ErrorResponse {
        let response: ErrorResponse = self.expect_json().await;
        assert!(!response.success);
        let re = regex::Regex::new(exp_re).unwrap();
        assert!(
            re.is_match(&response.error),
            "Error label '{}' does not match re '{}'",
            response.error,
            exp_re
        );
        response
    }
}
