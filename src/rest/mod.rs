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

//! Entry point to the REST server.
//!
//! Every API is put in its own `.rs` file, using a name like
//! `<entity>_<method>.rs`.  This may seem overkill, but putting every API in
//! its own file makes it easy to ensure all the integration tests for the
//! given API truly belong to that API.
//!
//! All responses, successful or not, carry the uniform JSON envelope: a
//! `success` flag plus `data`, `count`, `message` and `error` fields as
//! appropriate for the operation.

use crate::driver::{Driver, DriverError};
use crate::env::Environment;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get};
use axum::{middleware, Json, Router};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::OnceLock;

mod department_delete;
mod department_post;
mod departments_get;
mod employee_delete;
mod employee_get;
mod employee_post;
mod employee_put;
mod employees_get;
mod health_get;
mod logging;
#[cfg(test)]
mod testutils;

/// The environment mode the REST layer runs in, set once at startup.
static ENVIRONMENT: OnceLock<Environment> = OnceLock::new();

/// Configures the environment mode used when rendering unexpected errors.
pub(crate) fn set_environment(environment: Environment) {
    let _ignored = ENVIRONMENT.set(environment);
}

/// Returns the configured environment mode, defaulting to development.
fn environment() -> Environment {
    ENVIRONMENT.get().copied().unwrap_or_default()
}

/// Frontend errors.  These are the errors that are visible to the user on
/// failed requests, rendered as the uniform error envelope.
#[derive(Debug, PartialEq, thiserror::Error)]
pub(crate) enum RestError {
    /// Indicates a storage-layer failure other than a constraint violation
    /// we know about.
    #[error("{0}")]
    DatabaseError(String),

    /// Indicates a unique-constraint violation.
    #[error("{0}")]
    DuplicateEntry(String),

    /// Indicates a foreign-key violation reported by the storage layer.
    #[error("Referenced record does not exist")]
    ForeignKeyViolation,

    /// Catch-all error type for all unexpected errors.
    #[error("{0}")]
    InternalError(String),

    /// Indicates an error in the contents of the request.
    #[error("{error}")]
    InvalidRequest {
        /// Short label identifying the problem.
        error: String,

        /// Longer human-readable explanation, if there is one.
        message: Option<String>,
    },

    /// Indicates that a requested entity does not exist.
    #[error("{0}")]
    NotFound(String),
}

impl RestError {
    /// Creates an `InvalidRequest` error from a label and a detail message.
    pub(crate) fn invalid_request<E: Into<String>, M: Into<String>>(error: E, message: M) -> Self {
        RestError::InvalidRequest { error: error.into(), message: Some(message.into()) }
    }

    /// Computes the status code and error envelope for this error under the
    /// given environment mode.
    fn error_body(self, environment: Environment) -> (StatusCode, ErrorResponse) {
        let (status, error, message) = match self {
            RestError::DatabaseError(message) => {
                (StatusCode::BAD_REQUEST, "Database Error".to_owned(), Some(message))
            }
            RestError::DuplicateEntry(message) => {
                (StatusCode::CONFLICT, "Duplicate Entry".to_owned(), Some(message))
            }
            RestError::ForeignKeyViolation => (
                StatusCode::BAD_REQUEST,
                "Foreign Key Constraint Violation".to_owned(),
                Some("Referenced record does not exist".to_owned()),
            ),
            RestError::InternalError(message) => {
                let message = match environment {
                    Environment::Development => message,
                    Environment::Production => "An unexpected error occurred".to_owned(),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_owned(), Some(message))
            }
            RestError::InvalidRequest { error, message } => {
                (StatusCode::BAD_REQUEST, error, message)
            }
            RestError::NotFound(error) => (StatusCode::NOT_FOUND, error, None),
        };
        (status, ErrorResponse { success: false, error, message })
    }
}

impl From<DriverError> for RestError {
    fn from(e: DriverError) -> Self {
        match e {
            DriverError::AlreadyExists(message) => RestError::DuplicateEntry(message),
            DriverError::BackendError(message) => RestError::DatabaseError(message),
            DriverError::ForeignKeyViolation => RestError::ForeignKeyViolation,
            DriverError::InternalError(message) => RestError::InternalError(message),
            DriverError::InvalidInput { error, message } => {
                RestError::InvalidRequest { error, message }
            }
            DriverError::NotFound(error) => RestError::NotFound(error),
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = self.error_body(environment());
        (status, Json(body)).into_response()
    }
}

/// Result type for this module.
pub(crate) type RestResult<T> = Result<T, RestError>;

/// Representation of the error envelope returned on failed requests.
#[derive(Serialize)]
#[cfg_attr(test, derive(Debug, Deserialize))]
pub(crate) struct ErrorResponse {
    /// Always false.
    pub(crate) success: bool,

    /// Short label identifying the failure.
    pub(crate) error: String,

    /// Longer human-readable explanation, if there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) message: Option<String>,
}

/// Envelope for successful responses that carry a single entity.
#[derive(Serialize)]
#[cfg_attr(test, derive(Debug, Deserialize))]
pub(crate) struct ItemResponse<T> {
    /// Always true.
    pub(crate) success: bool,

    /// Informational message describing the operation that took place.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) message: Option<String>,

    /// The entity itself.
    pub(crate) data: T,
}

impl<T> ItemResponse<T> {
    /// Wraps `data` in a success envelope with no message.
    pub(crate) fn new(data: T) -> Self {
        Self { success: true, message: None, data }
    }

    /// Wraps `data` in a success envelope with an informational `message`.
    pub(crate) fn with_message<M: Into<String>>(message: M, data: T) -> Self {
        Self { success: true, message: Some(message.into()), data }
    }
}

/// Envelope for successful responses that carry a collection of entities.
#[derive(Serialize)]
#[cfg_attr(test, derive(Debug, Deserialize))]
pub(crate) struct ListResponse<T> {
    /// Always true.
    pub(crate) success: bool,

    /// Number of entries in `data`.
    pub(crate) count: usize,

    /// The entities themselves.
    pub(crate) data: Vec<T>,
}

impl<T> ListResponse<T> {
    /// Wraps `data` in a success envelope, computing its count.
    pub(crate) fn new(data: Vec<T>) -> Self {
        Self { success: true, count: data.len(), data }
    }
}

/// Envelope for successful responses that carry no entity.
#[derive(Serialize)]
#[cfg_attr(test, derive(Debug, Deserialize))]
pub(crate) struct MessageResponse {
    /// Always true.
    pub(crate) success: bool,

    /// Informational message describing the operation that took place.
    pub(crate) message: String,
}

impl MessageResponse {
    /// Creates a success envelope carrying only `message`.
    pub(crate) fn new<M: Into<String>>(message: M) -> Self {
        Self { success: true, message: message.into() }
    }
}

/// Deserializes a field that distinguishes "absent" from "set to null": the
/// outer `Option` records presence and the inner one nullability.
pub(crate) fn deserialize_optional_field<'de, D, T>(
    deserializer: D,
) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Handler for any request that does not match the route table.
async fn fallback() -> RestError {
    RestError::NotFound("Route not found".to_owned())
}

/// Creates the router for the application.
pub(crate) fn app(driver: Driver) -> Router {
    Router::new()
        .route("/", get(health_get::handler).fallback(fallback))
        .route(
            "/api/departments",
            get(departments_get::handler).post(department_post::handler).fallback(fallback),
        )
        .route("/api/departments/:id", delete(department_delete::handler).fallback(fallback))
        .route(
            "/api/employees",
            get(employees_get::handler).post(employee_post::handler).fallback(fallback),
        )
        .route(
            "/api/employees/:id",
            get(employee_get::handler)
                .put(employee_put::handler)
                .delete(employee_delete::handler)
                .fallback(fallback),
        )
        .fallback(fallback)
        .layer(middleware::from_fn(logging::log_requests))
        .with_state(driver)
}
