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

//! Test utilities for the business layer.

use crate::db::{self, sqlite, Db, Executor};
use crate::driver::Driver;
use crate::model::{DepartmentName, NewEmployee};
use std::sync::Arc;

pub(crate) struct TestContext {
    db: Arc<dyn Db + Send + Sync>,
    driver: Driver,
}

impl TestContext {
    pub(crate) async fn setup() -> Self {
        let db: Arc<dyn Db + Send + Sync> = Arc::new(sqlite::testutils::setup().await);
        let driver = Driver::new(db.clone());
        Self { db, driver }
    }

    /// Returns an executor for direct access to the underlying database.
    pub(crate) async fn ex(&self) -> Executor {
        self.db.ex().await.unwrap()
    }

    pub(crate) fn driver(&self) -> Driver {
        self.driver.clone()
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
}
