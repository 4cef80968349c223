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

//! Operations on employees.

use crate::db::{self, DbError};
use crate::driver::{Driver, DriverError, DriverResult};
use crate::model::{Employee, EmployeeDetails, EmployeeUpdate, NewEmployee};

impl Driver {
    /// Creates a new employee after checking that its references resolve.
    pub(crate) async fn create_employee(
        self,
        employee: NewEmployee,
    ) -> DriverResult<EmployeeDetails> {
        let mut ex = self.db.ex().await?;

        if db::get_department(&mut ex, *employee.department_id()).await?.is_none() {
            return Err(DriverError::invalid_input(
                "Invalid department_id",
                "Department does not exist",
            ));
        }

        if let Some(manager_id) = employee.manager_id() {
            if db::get_employee(&mut ex, *manager_id).await?.is_none() {
                return Err(DriverError::invalid_input(
                    "Invalid manager_id",
                    "Manager does not exist",
                ));
            }
        }

        let id = match db::create_employee(&mut ex, &employee).await {
            Ok(id) => id,
            Err(DbError::AlreadyExists) => {
                return Err(DriverError::AlreadyExists("Email already exists".to_owned()));
            }
            Err(e) => return Err(e.into()),
        };

        let details = db::get_employee_details(&mut ex, id).await?;
        details.ok_or_else(|| {
            DriverError::BackendError("Employee vanished after creation".to_owned())
        })
    }

    /// Gets all employees in ascending id order, joined with their department
    /// and manager.
    pub(crate) async fn get_employees(self) -> DriverResult<Vec<EmployeeDetails>> {
        let employees = db::list_employees(&mut self.db.ex().await?).await?;
        Ok(employees)
    }

    /// Gets the employee `id` joined with its department and manager.
    pub(crate) async fn get_employee(self, id: i32) -> DriverResult<EmployeeDetails> {
        match db::get_employee_details(&mut self.db.ex().await?, id).await? {
            Some(details) => Ok(details),
            None => Err(DriverError::NotFound("Employee not found".to_owned())),
        }
    }

    /// Applies `update` on top of the current state of the employee `id`.
    pub(crate) async fn update_employee(
        self,
        id: i32,
        update: EmployeeUpdate,
    ) -> DriverResult<EmployeeDetails> {
        let mut ex = self.db.ex().await?;

        let current = match db::get_employee(&mut ex, id).await? {
            Some(employee) => employee,
            None => return Err(DriverError::NotFound("Employee not found".to_owned())),
        };

        let department_id = match update.department_id {
            Some(department_id) if department_id != *current.department_id() => {
                if db::get_department(&mut ex, department_id).await?.is_none() {
                    return Err(DriverError::invalid_input(
                        "Invalid department_id",
                        "Department does not exist",
                    ));
                }
                department_id
            }
            Some(department_id) => department_id,
            None => *current.department_id(),
        };

        let manager_id = match update.manager_id {
            Some(Some(manager_id)) => {
                if manager_id == id {
                    return Err(DriverError::invalid_input(
                        "Invalid manager_id",
                        "Employee cannot be their own manager",
                    ));
                }
                if db::get_employee(&mut ex, manager_id).await?.is_none() {
                    return Err(DriverError::invalid_input(
                        "Invalid manager_id",
                        "Manager does not exist",
                    ));
                }
                Some(manager_id)
            }
            Some(None) => None,
            None => *current.manager_id(),
        };

        // Fields supplied as empty strings are treated as absent.
        let first_name = update
            .first_name
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| current.first_name().clone());
        let last_name = update
            .last_name
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| current.last_name().clone());
        let email =
            update.email.filter(|s| !s.is_empty()).unwrap_or_else(|| current.email().clone());

        let updated = Employee::new(id, first_name, last_name, email, department_id, manager_id);
        match db::update_employee(&mut ex, &updated).await {
            Ok(()) => (),
            Err(DbError::AlreadyExists) => {
                return Err(DriverError::AlreadyExists("Email already exists".to_owned()));
            }
            Err(e) => return Err(e.into()),
        }

        let details = db::get_employee_details(&mut ex, id).await?;
        details
            .ok_or_else(|| DriverError::BackendError("Employee vanished during update".to_owned()))
    }

    /// Deletes the employee `id`.  The database clears the `manager_id` of
    /// any subordinates as part of the deletion.
    pub(crate) async fn delete_employee(self, id: i32) -> DriverResult<()> {
        let mut ex = self.db.ex().await?;

        if db::get_employee(&mut ex, id).await?.is_none() {
            return Err(DriverError::NotFound("Employee not found".to_owned()));
        }

        db::delete_employee(&mut ex, id).await?;
        Ok(())
    }
}
