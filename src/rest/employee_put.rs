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

//! API to update an employee with a partial set of fields.

use crate::driver::Driver;
use crate::model::{EmployeeDetails, EmployeeUpdate};
use crate::rest::{deserialize_optional_field, ItemResponse, RestResult};
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

/// Message sent to the server to update an employee.  Absent fields keep
/// their current values.
#[derive(Default, Deserialize, Serialize)]
pub(crate) struct UpdateEmployeeRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) first_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) last_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) department_id: Option<i32>,

    /// An explicit `null` clears the manager, while leaving the field out
    /// keeps the current one.
    #[serde(
        default,
        deserialize_with = "deserialize_optional_field",
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) manager_id: Option<Option<i32>>,
}

/// PUT handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateEmployeeRequest>,
) -> RestResult<Json<ItemResponse<EmployeeDetails>>> {
    let update = EmployeeUpdate {
        first_name: request.first_name,
        last_name: request.last_name,
        email: request.email,
        department_id: request.department_id,
        manager_id: request.manager_id,
    };
    let employee = driver.update_employee(id, update).await?;
    Ok(Json(ItemResponse::with_message("Employee updated successfully", employee)))
}
