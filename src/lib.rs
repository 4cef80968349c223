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

//! REST service to manage departments and employees.
//!
//! The code is structured as a stack of layers, and each module in this crate
//! corresponds to one of them:
//!
//! 1.  `model`: High-level data types that represent concepts in the domain
//!     of the application.  There is no logic in here.
//!
//! 1.  `db`: The persistence layer.  Provides access to PostgreSQL (for
//!     production) and SQLite (for tests) behind a common `Db` trait plus
//!     free functions with the domain-specific queries.
//!
//! 1.  `driver`: The business logic layer.  The `Driver` type validates
//!     inputs and coordinates access to the database.
//!
//! 1.  `rest`: The HTTP layer.  Defines the `axum::Router`, backs every API
//!     with the `Driver`, and renders all results as the uniform JSON
//!     envelope.
//!
//! 1.  `main`: The app launcher.  Gathers configuration data from
//!     environment variables and calls `serve`.
//!
//! There are result and error types in every layer, such as `DbResult` and
//! `DbError`, and errors float to the top of the app using the `?` operator,
//! being translated to HTTP status codes once returned from the REST layer.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use crate::db::Db;
use crate::driver::Driver;
use crate::env::Environment;
use log::info;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

pub mod db;
mod driver;
pub mod env;
pub(crate) mod model;
mod rest;

/// Waits for the process to receive an interrupt or termination signal.
async fn wait_for_shutdown() {
    let interrupt = async {
        tokio::signal::ctrl_c().await.expect("Failed to install interrupt signal handler")
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install termination signal handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => (),
        _ = terminate => (),
    }
}

/// Instantiates all resources to serve the application on `bind_addr` until
/// an interrupt or termination signal arrives, and then tears down the
/// database connection.
///
/// While it'd be nice to push this responsibility to `main`, doing so would
/// force us to expose many crate-internal types to the public, which in turn
/// would make dead code detection harder.
pub async fn serve(
    bind_addr: impl Into<SocketAddr>,
    db: Arc<dyn Db + Send + Sync>,
    environment: Environment,
) -> Result<(), Box<dyn Error>> {
    rest::set_environment(environment);

    let driver = Driver::new(db.clone());
    let app = rest::app(driver);

    let listener = tokio::net::TcpListener::bind(bind_addr.into()).await?;
    info!("Server running on http://{}", listener.local_addr()?);
    axum::serve(listener, app).with_graceful_shutdown(wait_for_shutdown()).await?;

    info!("Shutting down gracefully");
    db.close().await;
    Ok(())
}
