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

//! Database abstraction in terms of the operations needed by the server.
//!
//! The PostgreSQL backend is for production use and the SQLite backend is
//! primarily intended to support unit tests.  Every operation acquires its
//! own connection and issues independent statements: consistency between a
//! "does it exist" read and the subsequent write is backstopped by the
//! schema's constraints, not by multi-statement transactions.

use crate::model::*;
use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::pool::PoolConnection;
use sqlx::postgres::PgRow;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

pub mod postgres;
pub mod sqlite;

/// Database errors.  Any unexpected errors that come from the database are
/// classified as `BackendError`, but errors we know about have more specific
/// types.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum DbError {
    /// Indicates that a request to create an entry failed because it already
    /// exists.
    #[error("Already exists")]
    AlreadyExists,

    /// Catch-all error type for unexpected database errors.
    #[error("Database error: {0}")]
    BackendError(String),

    /// Indicates a failure processing the data that already exists in the
    /// database.
    #[error("Data integrity error: {0}")]
    DataIntegrityError(String),

    /// Indicates that a write violated a foreign key constraint.
    #[error("Foreign key constraint violation")]
    ForeignKeyViolation,

    /// Indicates that a requested entry does not exist.
    #[error("Entity not found")]
    NotFound,

    /// Indicates that the database is not available (maybe because of too
    /// many active concurrent connections).
    #[error("Unavailable")]
    Unavailable,
}

impl From<ModelError> for DbError {
    fn from(e: ModelError) -> Self {
        DbError::DataIntegrityError(e.to_string())
    }
}

/// Result type for this module.
pub type DbResult<T> = Result<T, DbError>;

/// A database executor that can talk to multiple database implementations.
///
/// Users of this type are forced to destructure it and issue different calls
/// for each database, which is what gives sqlx its type safety guarantees
/// during query preparation.
pub enum Executor {
    /// A connection to a PostgreSQL database.
    Postgres(PoolConnection<sqlx::Postgres>),

    /// A connection to a SQLite database.
    Sqlite(PoolConnection<sqlx::Sqlite>),
}

/// Abstraction over the database connection.
#[async_trait]
pub trait Db {
    /// Obtains an executor backed by one connection of the pool.
    ///
    /// This would be better called `executor` but this method is used so
    /// frequently that it makes call sites too verbose.
    async fn ex(&self) -> DbResult<Executor>;

    /// Closes the connection pool.
    async fn close(&self);
}

/// Initializes the database schema.
pub async fn init_schema(ex: &mut Executor) -> DbResult<()> {
    match ex {
        Executor::Postgres(ex) => postgres::run_schema(ex, include_str!("postgres.sql")).await,
        Executor::Sqlite(ex) => sqlite::run_schema(ex, include_str!("sqlite.sql")).await,
    }
}

/// Converts an `i64` as handed back by SQLite into the `i32` used for ids.
fn i32_from_i64(value: i64, what: &str) -> DbResult<i32> {
    i32::try_from(value)
        .map_err(|e| DbError::DataIntegrityError(format!("{} cannot be represented: {}", what, e)))
}

impl TryFrom<PgRow> for Department {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let id: i32 = row.try_get("id").map_err(postgres::map_sqlx_error)?;
        let name: String = row.try_get("name").map_err(postgres::map_sqlx_error)?;

        Ok(Department::new(id, DepartmentName::new(name)?))
    }
}

impl TryFrom<SqliteRow> for Department {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
        let name: String = row.try_get("name").map_err(sqlite::map_sqlx_error)?;

        Ok(Department::new(i32_from_i64(id, "Department id")?, DepartmentName::new(name)?))
    }
}

impl TryFrom<PgRow> for Employee {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let id: i32 = row.try_get("id").map_err(postgres::map_sqlx_error)?;
        let first_name: String = row.try_get("first_name").map_err(postgres::map_sqlx_error)?;
        let last_name: String = row.try_get("last_name").map_err(postgres::map_sqlx_error)?;
        let email: String = row.try_get("email").map_err(postgres::map_sqlx_error)?;
        let department_id: i32 =
            row.try_get("department_id").map_err(postgres::map_sqlx_error)?;
        let manager_id: Option<i32> =
            row.try_get("manager_id").map_err(postgres::map_sqlx_error)?;

        Ok(Employee::new(id, first_name, last_name, email, department_id, manager_id))
    }
}

impl TryFrom<SqliteRow> for Employee {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
        let first_name: String = row.try_get("first_name").map_err(sqlite::map_sqlx_error)?;
        let last_name: String = row.try_get("last_name").map_err(sqlite::map_sqlx_error)?;
        let email: String = row.try_get("email").map_err(sqlite::map_sqlx_error)?;
        let department_id: i64 =
            row.try_get("department_id").map_err(sqlite::map_sqlx_error)?;
        let manager_id: Option<i64> =
            row.try_get("manager_id").map_err(sqlite::map_sqlx_error)?;

        let manager_id = match manager_id {
            Some(id) => Some(i32_from_i64(id, "Manager id")?),
            None => None,
        };
        Ok(Employee::new(
            i32_from_i64(id, "Employee id")?,
            first_name,
            last_name,
            email,
            i32_from_i64(department_id, "Department id")?,
            manager_id,
        ))
    }
}

/// Assembles the joined manager columns of an employee row, making sure they
/// are consistent with each other.
fn build_manager(
    manager_id: Option<i32>,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
) -> DbResult<Option<ManagerRef>> {
    match (manager_id, first_name, last_name, email) {
        (Some(id), Some(first_name), Some(last_name), Some(email)) => {
            Ok(Some(ManagerRef::new(id, first_name, last_name, email)))
        }
        (None, None, None, None) => Ok(None),
        (_, _, _, _) => Err(DbError::DataIntegrityError(
            "Inconsistent manager columns for employee".to_owned(),
        )),
    }
}

impl TryFrom<PgRow> for EmployeeDetails {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let id: i32 = row.try_get("id").map_err(postgres::map_sqlx_error)?;
        let first_name: String = row.try_get("first_name").map_err(postgres::map_sqlx_error)?;
        let last_name: String = row.try_get("last_name").map_err(postgres::map_sqlx_error)?;
        let email: String = row.try_get("email").map_err(postgres::map_sqlx_error)?;
        let department_id: i32 =
            row.try_get("department_id").map_err(postgres::map_sqlx_error)?;
        let manager_id: Option<i32> =
            row.try_get("manager_id").map_err(postgres::map_sqlx_error)?;
        let department_name: String =
            row.try_get("department_name").map_err(postgres::map_sqlx_error)?;
        let manager_first_name: Option<String> =
            row.try_get("manager_first_name").map_err(postgres::map_sqlx_error)?;
        let manager_last_name: Option<String> =
            row.try_get("manager_last_name").map_err(postgres::map_sqlx_error)?;
        let manager_email: Option<String> =
            row.try_get("manager_email").map_err(postgres::map_sqlx_error)?;

        let department = Department::new(department_id, DepartmentName::new(department_name)?);
        let manager =
            build_manager(manager_id, manager_first_name, manager_last_name, manager_email)?;
        Ok(EmployeeDetails::new(
            id,
            first_name,
            last_name,
            email,
            department_id,
            manager_id,
            department,
            manager,
        ))
    }
}

impl TryFrom<SqliteRow> for EmployeeDetails {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
        let first_name: String = row.try_get("first_name").map_err(sqlite::map_sqlx_error)?;
        let last_name: String = row.try_get("last_name").map_err(sqlite::map_sqlx_error)?;
        let email: String = row.try_get("email").map_err(sqlite::map_sqlx_error)?;
        let department_id: i64 =
            row.try_get("department_id").map_err(sqlite::map_sqlx_error)?;
        let manager_id: Option<i64> =
            row.try_get("manager_id").map_err(sqlite::map_sqlx_error)?;
        let department_name: String =
            row.try_get("department_name").map_err(sqlite::map_sqlx_error)?;
        let manager_first_name: Option<String> =
            row.try_get("manager_first_name").map_err(sqlite::map_sqlx_error)?;
        let manager_last_name: Option<String> =
            row.try_get("manager_last_name").map_err(sqlite::map_sqlx_error)?;
        let manager_email: Option<String> =
            row.try_get("manager_email").map_err(sqlite::map_sqlx_error)?;

        let id = i32_from_i64(id, "Employee id")?;
        let department_id = i32_from_i64(department_id, "Department id")?;
        let manager_id = match manager_id {
            Some(id) => Some(i32_from_i64(id, "Manager id")?),
            None => None,
        };

        let department = Department::new(department_id, DepartmentName::new(department_name)?);
        let manager =
            build_manager(manager_id, manager_first_name, manager_last_name, manager_email)?;
        Ok(EmployeeDetails::new(
            id,
            first_name,
            last_name,
            email,
            department_id,
            manager_id,
            department,
            manager,
        ))
    }
}

/// Columns and joins shared by all joined employee read queries.
const EMPLOYEE_DETAILS_SELECT: &str = "
    SELECT
        e.id, e.first_name, e.last_name, e.email, e.department_id, e.manager_id,
        d.name AS department_name,
        m.first_name AS manager_first_name,
        m.last_name AS manager_last_name,
        m.email AS manager_email
    FROM employees AS e
    JOIN departments AS d ON d.id = e.department_id
    LEFT JOIN employees AS m ON m.id = e.manager_id";

/// Creates a new department called `name` and returns it with its generated
/// id.
pub(crate) async fn create_department(
    ex: &mut Executor,
    name: &DepartmentName,
) -> DbResult<Department> {
    let id = match ex {
        Executor::Postgres(ex) => {
            let query_str = "INSERT INTO departments (name) VALUES ($1) RETURNING id";
            let row = sqlx::query(query_str)
                .bind(name.as_str())
                .fetch_one(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("id").map_err(postgres::map_sqlx_error)?
        }

        Executor::Sqlite(ex) => {
            let query_str = "INSERT INTO departments (name) VALUES (?)";
            let done = sqlx::query(query_str)
                .bind(name.as_str())
                .execute(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            i32_from_i64(done.last_insert_rowid(), "Department id")?
        }
    };

    Ok(Department::new(id, name.clone()))
}

/// Gets the department with the given `id`, or `None` if it does not exist.
pub(crate) async fn get_department(ex: &mut Executor, id: i32) -> DbResult<Option<Department>> {
    match ex {
        Executor::Postgres(ex) => {
            let query_str = "SELECT id, name FROM departments WHERE id = $1";
            let maybe_row = sqlx::query(query_str)
                .bind(id)
                .fetch_optional(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            maybe_row.map(Department::try_from).transpose()
        }

        Executor::Sqlite(ex) => {
            let query_str = "SELECT id, name FROM departments WHERE id = ?";
            let maybe_row = sqlx::query(query_str)
                .bind(id)
                .fetch_optional(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            maybe_row.map(Department::try_from).transpose()
        }
    }
}

/// Gets all departments in ascending id order.
pub(crate) async fn list_departments(ex: &mut Executor) -> DbResult<Vec<Department>> {
    let query_str = "SELECT id, name FROM departments ORDER BY id ASC";
    let mut departments = vec![];
    match ex {
        Executor::Postgres(ex) => {
            let mut rows = sqlx::query(query_str).fetch(&mut **ex);
            while let Some(row) = rows.try_next().await.map_err(postgres::map_sqlx_error)? {
                departments.push(Department::try_from(row)?);
            }
        }

        Executor::Sqlite(ex) => {
            let mut rows = sqlx::query(query_str).fetch(&mut **ex);
            while let Some(row) = rows.try_next().await.map_err(sqlite::map_sqlx_error)? {
                departments.push(Department::try_from(row)?);
            }
        }
    }
    Ok(departments)
}

/// Counts the employees that belong to the department with id
/// `department_id`.
pub(crate) async fn count_employees_in_department(
    ex: &mut Executor,
    department_id: i32,
) -> DbResult<i64> {
    match ex {
        Executor::Postgres(ex) => {
            let query_str = "SELECT COUNT(*) AS count FROM employees WHERE department_id = $1";
            let row = sqlx::query(query_str)
                .bind(department_id)
                .fetch_one(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("count").map_err(postgres::map_sqlx_error)
        }

        Executor::Sqlite(ex) => {
            let query_str = "SELECT COUNT(*) AS count FROM employees WHERE department_id = ?";
            let row = sqlx::query(query_str)
                .bind(department_id)
                .fetch_one(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            row.try_get("count").map_err(sqlite::map_sqlx_error)
        }
    }
}

/// Deletes the department with the given `id`.
pub(crate) async fn delete_department(ex: &mut Executor, id: i32) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str = "DELETE FROM departments WHERE id = $1";
            let done = sqlx::query(query_str)
                .bind(id)
                .execute(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let query_str = "DELETE FROM departments WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(id)
                .execute(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }
    };

    match rows_affected {
        0 => Err(DbError::NotFound),
        1 => Ok(()),
        _ => Err(DbError::BackendError("Deletion affected more than one row".to_owned())),
    }
}

/// Creates a new employee and returns its generated id.
pub(crate) async fn create_employee(ex: &mut Executor, employee: &NewEmployee) -> DbResult<i32> {
    match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO employees (first_name, last_name, email, department_id, manager_id)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id";
            let row = sqlx::query(query_str)
                .bind(employee.first_name())
                .bind(employee.last_name())
                .bind(employee.email())
                .bind(employee.department_id())
                .bind(employee.manager_id())
                .fetch_one(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("id").map_err(postgres::map_sqlx_error)
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                INSERT INTO employees (first_name, last_name, email, department_id, manager_id)
                VALUES (?, ?, ?, ?, ?)";
            let done = sqlx::query(query_str)
                .bind(employee.first_name())
                .bind(employee.last_name())
                .bind(employee.email())
                .bind(employee.department_id())
                .bind(employee.manager_id())
                .execute(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            i32_from_i64(done.last_insert_rowid(), "Employee id")
        }
    }
}

/// Gets the raw employee row with the given `id`, or `None` if it does not
/// exist.
pub(crate) async fn get_employee(ex: &mut Executor, id: i32) -> DbResult<Option<Employee>> {
    match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                SELECT id, first_name, last_name, email, department_id, manager_id
                FROM employees
                WHERE id = $1";
            let maybe_row = sqlx::query(query_str)
                .bind(id)
                .fetch_optional(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            maybe_row.map(Employee::try_from).transpose()
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT id, first_name, last_name, email, department_id, manager_id
                FROM employees
                WHERE id = ?";
            let maybe_row = sqlx::query(query_str)
                .bind(id)
                .fetch_optional(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            maybe_row.map(Employee::try_from).transpose()
        }
    }
}

/// Gets the employee with the given `id` joined with its department and
/// manager, or `None` if it does not exist.
pub(crate) async fn get_employee_details(
    ex: &mut Executor,
    id: i32,
) -> DbResult<Option<EmployeeDetails>> {
    match ex {
        Executor::Postgres(ex) => {
            let query_str = format!("{} WHERE e.id = $1", EMPLOYEE_DETAILS_SELECT);
            let maybe_row = sqlx::query(&query_str)
                .bind(id)
                .fetch_optional(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            maybe_row.map(EmployeeDetails::try_from).transpose()
        }

        Executor::Sqlite(ex) => {
            let query_str = format!("{} WHERE e.id = ?", EMPLOYEE_DETAILS_SELECT);
            let maybe_row = sqlx::query(&query_str)
                .bind(id)
                .fetch_optional(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            maybe_row.map(EmployeeDetails::try_from).transpose()
        }
    }
}

/// Gets all employees in ascending id order, each joined with its department
/// and manager.
pub(crate) async fn list_employees(ex: &mut Executor) -> DbResult<Vec<EmployeeDetails>> {
    let query_str = format!("{} ORDER BY e.id ASC", EMPLOYEE_DETAILS_SELECT);
    let mut employees = vec![];
    match ex {
        Executor::Postgres(ex) => {
            let mut rows = sqlx::query(&query_str).fetch(&mut **ex);
            while let Some(row) = rows.try_next().await.map_err(postgres::map_sqlx_error)? {
                employees.push(EmployeeDetails::try_from(row)?);
            }
        }

        Executor::Sqlite(ex) => {
            let mut rows = sqlx::query(&query_str).fetch(&mut **ex);
            while let Some(row) = rows.try_next().await.map_err(sqlite::map_sqlx_error)? {
                employees.push(EmployeeDetails::try_from(row)?);
            }
        }
    }
    Ok(employees)
}

/// Overwrites all mutable columns of the employee row identified by
/// `employee.id()`.
pub(crate) async fn update_employee(ex: &mut Executor, employee: &Employee) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE employees
                SET first_name = $1, last_name = $2, email = $3, department_id = $4,
                    manager_id = $5
                WHERE id = $6";
            let done = sqlx::query(query_str)
                .bind(employee.first_name())
                .bind(employee.last_name())
                .bind(employee.email())
                .bind(employee.department_id())
                .bind(employee.manager_id())
                .bind(employee.id())
                .execute(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let query_str = "
                UPDATE employees
                SET first_name = ?, last_name = ?, email = ?, department_id = ?, manager_id = ?
                WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(employee.first_name())
                .bind(employee.last_name())
                .bind(employee.email())
                .bind(employee.department_id())
                .bind(employee.manager_id())
                .bind(employee.id())
                .execute(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }
    };

    match rows_affected {
        0 => Err(DbError::NotFound),
        1 => Ok(()),
        _ => Err(DbError::BackendError("Update affected more than one row".to_owned())),
    }
}

/// Deletes the employee with the given `id`.  Employees managed by it get
/// their `manager_id` cleared by the schema's `ON DELETE SET NULL` rule.
pub(crate) async fn delete_employee(ex: &mut Executor, id: i32) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str = "DELETE FROM employees WHERE id = $1";
            let done = sqlx::query(query_str)
                .bind(id)
                .execute(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        Executor::Sqlite(ex) => {
            let query_str = "DELETE FROM employees WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(id)
                .execute(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }
    };

    match rows_affected {
        0 => Err(DbError::NotFound),
        1 => Ok(()),
        _ => Err(DbError::BackendError("Deletion affected more than one row".to_owned())),
    }
}
