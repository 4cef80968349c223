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

//! High-level data types.

use derive_getters::Getters;
use derive_more::{AsRef, Constructor};
use serde::{Deserialize, Serialize};

/// Errors caused by invalid values for the types defined in this module.
#[derive(Debug, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct ModelError(pub String);

/// Result type for this module.
pub type ModelResult<T> = Result<T, ModelError>;

/// Newtype pattern for department names.
///
/// Names are stored trimmed and can never be blank.
#[derive(AsRef, Clone, Deserialize, Serialize)]
#[cfg_attr(test, derive(Debug, PartialEq))]
#[serde(transparent)]
pub struct DepartmentName(String);

impl DepartmentName {
    /// Creates a new department name from an untrusted string `s`, trimming
    /// surrounding whitespace and making sure something remains.
    pub fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
        let s = s.into();
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ModelError("Department name is required".to_owned()));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns a string view of the name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A department as stored, including its generated id.
#[derive(Constructor, Getters, Serialize)]
#[cfg_attr(test, derive(Clone, Debug, Deserialize, PartialEq))]
pub struct Department {
    /// Surrogate primary key generated by the database.
    id: i32,

    /// Unique, trimmed department name.
    name: DepartmentName,
}

/// An employee row as stored, with raw foreign keys and no joined data.
#[derive(Constructor, Getters)]
#[cfg_attr(test, derive(Clone, Debug, PartialEq))]
pub struct Employee {
    /// Surrogate primary key generated by the database.
    id: i32,

    first_name: String,

    last_name: String,

    /// Unique email address.
    email: String,

    /// Department this employee belongs to.
    department_id: i32,

    /// Manager of this employee, if any.  Never the employee's own id.
    manager_id: Option<i32>,
}

/// The subset of a manager's fields that is exposed on joined records.
#[derive(Constructor, Getters, Serialize)]
#[cfg_attr(test, derive(Clone, Debug, Deserialize, PartialEq))]
pub struct ManagerRef {
    id: i32,
    first_name: String,
    last_name: String,
    email: String,
}

/// An employee joined with its department and manager, as returned by the
/// read operations.
#[derive(Constructor, Getters, Serialize)]
#[cfg_attr(test, derive(Clone, Debug, Deserialize, PartialEq))]
pub struct EmployeeDetails {
    id: i32,
    first_name: String,
    last_name: String,
    email: String,
    department_id: i32,
    manager_id: Option<i32>,

    /// The department referenced by `department_id`.
    department: Department,

    /// The manager referenced by `manager_id`, or `None` when the employee
    /// has no manager.
    manager: Option<ManagerRef>,
}

/// The validated fields needed to create an employee.
#[derive(Constructor, Getters)]
#[cfg_attr(test, derive(Clone, Debug))]
pub struct NewEmployee {
    first_name: String,
    last_name: String,
    email: String,
    department_id: i32,
    manager_id: Option<i32>,
}

/// A partial update to an employee.  Fields left as `None` keep their
/// current value.
#[derive(Default)]
#[cfg_attr(test, derive(Clone, Debug))]
pub struct EmployeeUpdate {
    pub(crate) first_name: Option<String>,
    pub(crate) last_name: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) department_id: Option<i32>,

    /// `None` leaves the manager untouched; `Some(None)` clears it.
    pub(crate) manager_id: Option<Option<i32>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_department_name_trims() {
        assert_eq!("Engineering", DepartmentName::new("  Engineering  ").unwrap().as_str());
        assert_eq!("Sales", DepartmentName::new("Sales").unwrap().as_str());
    }

    #[test]
    fn test_department_name_blank() {
        for input in ["", "   ", "\t\n"] {
            assert_eq!(
                ModelError("Department name is required".to_owned()),
                DepartmentName::new(input).unwrap_err()
            );
        }
    }
}
