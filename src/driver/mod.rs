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

//! Business logic for the service.

use crate::db::{Db, DbError};
use crate::model::ModelError;
use std::sync::Arc;

mod department;
mod employee;
#[cfg(test)]
mod testutils;

/// Business logic errors.  These errors encompass backend and logical errors.
#[derive(Debug, PartialEq, thiserror::Error)]
pub(crate) enum DriverError {
    /// Indicates that a request to create an entry failed because it already
    /// exists.
    #[error("{0}")]
    AlreadyExists(String),

    /// Catch-all error type for unexpected database errors.
    #[error("{0}")]
    BackendError(String),

    /// Indicates that a write was rejected by a foreign key constraint.
    #[error("Referenced record does not exist")]
    ForeignKeyViolation,

    /// Indicates an unanticipated internal failure.
    #[error("{0}")]
    InternalError(String),

    /// Indicates an error in the input data, carrying the short error label
    /// and an optional longer explanation.
    #[error("{error}")]
    InvalidInput {
        /// Short label identifying the problem.
        error: String,

        /// Longer human-readable explanation, if there is one.
        message: Option<String>,
    },

    /// Indicates that a requested entry does not exist.
    #[error("{0}")]
    NotFound(String),
}

impl DriverError {
    /// Creates an `InvalidInput` error from a label and a detail message.
    pub(crate) fn invalid_input<E: Into<String>, M: Into<String>>(error: E, message: M) -> Self {
        DriverError::InvalidInput { error: error.into(), message: Some(message.into()) }
    }
}

impl From<DbError> for DriverError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::AlreadyExists => DriverError::AlreadyExists(e.to_string()),
            DbError::BackendError(_) => DriverError::BackendError(e.to_string()),
            DbError::DataIntegrityError(_) => DriverError::InternalError(e.to_string()),
            DbError::ForeignKeyViolation => DriverError::ForeignKeyViolation,
            DbError::NotFound => DriverError::NotFound("Resource Not Found".to_owned()),
            DbError::Unavailable => DriverError::BackendError(e.to_string()),
        }
    }
}

impl From<ModelError> for DriverError {
    fn from(e: ModelError) -> Self {
        DriverError::InvalidInput { error: e.to_string(), message: None }
    }
}

/// Result type for this module.
pub(crate) type DriverResult<T> = Result<T, DriverError>;

/// Business logic.
///
/// The public operations exposed by the driver are all "one shot": each one
/// validates its inputs and issues its own database calls.  For this reason,
/// the operations consume the driver in an attempt to minimize the
/// possibility of chaining two operations where the second relies on state
/// observed by the first.
#[derive(Clone)]
pub(crate) struct Driver {
    /// The database that the driver uses for persistence.
    db: Arc<dyn Db + Send + Sync>,
}

impl Driver {
    /// Creates a new driver backed by the given injected components.
    pub(crate) fn new(db: Arc<dyn Db + Send + Sync>) -> Self {
        Self { db }
    }
}
