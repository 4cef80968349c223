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

//! Entry point to the service.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use log::{error, info};
use staff_api::db::postgres::{PostgresDb, PostgresOptions};
use staff_api::db::{init_schema, Db};
use staff_api::env::{get_optional_var, Environment};
use std::net::Ipv4Addr;
use std::process;
use std::sync::Arc;

/// Connects to the production database and initializes its schema.
async fn connect_db() -> Result<Arc<dyn Db + Send + Sync>, String> {
    let opts = PostgresOptions::from_env("PGSQL")?;
    let db = PostgresDb::connect(opts).await.map_err(|e| e.to_string())?;

    let mut ex = db.ex().await.map_err(|e| e.to_string())?;
    init_schema(&mut ex).await.map_err(|e| e.to_string())?;

    let db: Arc<dyn Db + Send + Sync> = Arc::new(db);
    Ok(db)
}

#[tokio::main]
async fn main() {
    let environment = match get_optional_var::<Environment>("STAFF_API", "ENV") {
        Ok(environment) => environment.unwrap_or_default(),
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            process::exit(1);
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(environment.default_log_filter()),
    )
    .init();

    let port = match get_optional_var::<u16>("STAFF_API", "PORT") {
        Ok(port) => port.unwrap_or(3000),
        Err(e) => {
            error!("Invalid configuration: {}", e);
            process::exit(1);
        }
    };
    let addr = (Ipv4Addr::LOCALHOST, port);

    let db = match connect_db().await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to start server: {}", e);
            process::exit(1);
        }
    };
    info!("Database connected successfully");
    info!("Environment: {:?}", environment);

    if let Err(e) = staff_api::serve(addr, db, environment).await {
        error!("Failed to start server: {}", e);
        process::exit(1);
    }
}
