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

//! Common utilities to interact with a PostgreSQL database.

use crate::db::{Db, DbError, DbResult, Executor};
use crate::env::{get_optional_var, get_required_var};
use async_trait::async_trait;
use log::warn;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnectOptions, PgDatabaseError, PgPool, PgPoolOptions, Postgres};

/// Takes a raw SQLx error `e` and converts it to our generic error type.
pub fn map_sqlx_error(e: sqlx::Error) -> DbError {
    match e {
        sqlx::Error::ColumnDecode { source, .. } => DbError::DataIntegrityError(source.to_string()),
        sqlx::Error::Database(e) => match e.downcast_ref::<PgDatabaseError>().code() {
            "23503" /* foreign_key_violation */ => DbError::ForeignKeyViolation,
            "23505" /* unique_violation */ => DbError::AlreadyExists,
            "53300" /* too_many_connections */ => DbError::Unavailable,
            number => DbError::BackendError(format!("pgsql error {}: {}", number, e)),
        },
        sqlx::Error::PoolTimedOut => DbError::Unavailable,
        sqlx::Error::RowNotFound => DbError::NotFound,
        e => DbError::BackendError(e.to_string()),
    }
}

/// Options to establish a connection to a PostgreSQL database.
#[derive(Default)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub struct PostgresOptions {
    /// Host to connect to.
    pub host: String,

    /// Port to connect to (typically 5432).
    pub port: u16,

    /// Database name to connect to.
    pub database: String,

    /// Username to establish the connection with.
    pub username: String,

    /// Password to establish the connection with.
    pub password: String,

    /// Minimum number of connections to keep open against the database.
    pub min_connections: Option<u32>,

    /// Maximum number of connections to allow against the database.
    pub max_connections: Option<u32>,
}

impl PostgresOptions {
    /// Initializes a set of options from environment variables whose name is
    /// prefixed with the given `prefix`.
    ///
    /// This will use variables such as `<prefix>_HOST`, `<prefix>_PORT`,
    /// `<prefix>_DATABASE`, `<prefix>_USERNAME`, `<prefix>_PASSWORD`,
    /// `<prefix>_MIN_CONNECTIONS` and `<prefix>_MAX_CONNECTIONS`.
    pub fn from_env(prefix: &str) -> Result<PostgresOptions, String> {
        Ok(PostgresOptions {
            host: get_required_var::<String>(prefix, "HOST")?,
            port: get_required_var::<u16>(prefix, "PORT")?,
            database: get_required_var::<String>(prefix, "DATABASE")?,
            username: get_required_var::<String>(prefix, "USERNAME")?,
            password: get_required_var::<String>(prefix, "PASSWORD")?,
            min_connections: get_optional_var::<u32>(prefix, "MIN_CONNECTIONS")?,
            max_connections: get_optional_var::<u32>(prefix, "MAX_CONNECTIONS")?,
        })
    }
}

/// A database instance backed by a PostgreSQL database.
pub struct PostgresDb {
    /// Shared PostgreSQL connection pool.
    pool: PgPool,
}

impl PostgresDb {
    /// Establishes the connection pool described by `opts`.
    pub async fn connect(opts: PostgresOptions) -> DbResult<PostgresDb> {
        let mut pool_opts = PgPoolOptions::new();
        if let Some(min_connections) = opts.min_connections {
            pool_opts = pool_opts.min_connections(min_connections);
        }
        if let Some(max_connections) = opts.max_connections {
            pool_opts = pool_opts.max_connections(max_connections);
        }

        let conn_opts = PgConnectOptions::new()
            .host(&opts.host)
            .port(opts.port)
            .database(&opts.database)
            .username(&opts.username)
            .password(&opts.password);

        let pool = pool_opts.connect_with(conn_opts).await.map_err(map_sqlx_error)?;
        Ok(PostgresDb { pool })
    }
}

impl Drop for PostgresDb {
    fn drop(&mut self) {
        if !self.pool.is_closed() {
            warn!("Dropping connection without having called close() first");
        }
    }
}

#[async_trait]
impl Db for PostgresDb {
    async fn ex(&self) -> DbResult<Executor> {
        let conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        Ok(Executor::Postgres(conn))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Helper function to initialize the database with a schema.
///
/// The schema is executed one statement at a time, so statements cannot
/// contain embedded semicolons.
pub async fn run_schema(ex: &mut PoolConnection<Postgres>, schema: &str) -> DbResult<()> {
    for statement in schema.split(';') {
        let statement = statement.trim();
        if statement.is_empty() {
            continue;
        }
        sqlx::query(statement).execute(&mut **ex).await.map_err(map_sqlx_error)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use crate::db::tests::generate_db_tests;

    /// Connects to the test database given by the `PGSQL_TEST_*` environment
    /// variables and resets its contents.
    async fn setup() -> Box<dyn Db> {
        let _can_fail = env_logger::builder().is_test(true).try_init();

        let opts = PostgresOptions::from_env("PGSQL_TEST").unwrap();
        let db = PostgresDb::connect(opts).await.unwrap();

        let mut ex = db.ex().await.unwrap();
        init_schema(&mut ex).await.unwrap();
        for query_str in ["DELETE FROM employees", "DELETE FROM departments"] {
            match &mut ex {
                Executor::Postgres(ex) => {
                    sqlx::query(query_str).execute(&mut **ex).await.unwrap();
                }
                _ => unreachable!(),
            }
        }

        Box::new(db)
    }

    generate_db_tests!(
        setup().await,
        #[ignore = "Requires a configured PostgreSQL test database"]
    );

    #[test]
    fn test_options_from_env_all_present() {
        temp_env::with_vars(
            [
                ("PG_HOST", Some("some-host")),
                ("PG_PORT", Some("1234")),
                ("PG_DATABASE", Some("some-database")),
                ("PG_USERNAME", Some("some-username")),
                ("PG_PASSWORD", Some("some-password")),
                ("PG_MIN_CONNECTIONS", Some("2")),
                ("PG_MAX_CONNECTIONS", Some("8")),
            ],
            || {
                let opts = PostgresOptions::from_env("PG").unwrap();
                assert_eq!(
                    PostgresOptions {
                        host: "some-host".to_owned(),
                        port: 1234,
                        database: "some-database".to_owned(),
                        username: "some-username".to_owned(),
                        password: "some-password".to_owned(),
                        min_connections: Some(2),
                        max_connections: Some(8),
                    },
                    opts
                );
            },
        );
    }

    #[test]
    fn test_options_from_env_missing() {
        temp_env::with_vars(
            [
                ("PG_HOST", Some("some-host")),
                ("PG_PORT", None),
                ("PG_DATABASE", Some("some-database")),
                ("PG_USERNAME", Some("some-username")),
                ("PG_PASSWORD", Some("some-password")),
            ],
            || {
                let err = PostgresOptions::from_env("PG").unwrap_err();
                assert_eq!("Required environment variable PG_PORT not present", err);
            },
        );
    }
}
