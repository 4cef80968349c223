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

//! Operations on departments.

use crate::db::{self, DbError};
use crate::driver::{Driver, DriverError, DriverResult};
use crate::model::{Department, DepartmentName};

impl Driver {
    /// Creates a new department called `name`.
    pub(crate) async fn create_department(self, name: Option<String>) -> DriverResult<Department> {
        let name = DepartmentName::new(name.unwrap_or_default())?;
        match db::create_department(&mut self.db.ex().await?, &name).await {
            Ok(department) => Ok(department),
            Err(DbError::AlreadyExists) => {
                Err(DriverError::AlreadyExists("Department name already exists".to_owned()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Gets all departments in ascending id order.
    pub(crate) async fn get_departments(self) -> DriverResult<Vec<Department>> {
        let departments = db::list_departments(&mut self.db.ex().await?).await?;
        Ok(departments)
    }

    /// Deletes the department `id`, refusing to do so while employees still
    /// reference it.
    pub(crate) async fn delete_department(self, id: i32) -> DriverResult<()> {
        let mut ex = self.db.ex().await?;

        if db::get_department(&mut ex, id).await?.is_none() {
            return Err(DriverError::NotFound("Department not found".to_owned()));
        }

        let count = db::count_employees_in_department(&mut ex, id).await?;
        if count > 0 {
            return Err(DriverError::invalid_input(
                "Cannot delete department",
                format!(
                    "Department has {} employee(s). Please reassign or remove employees first.",
                    count
                ),
            ));
        }

        db::delete_department(&mut ex, id).await?;
        Ok(())
    }
}
