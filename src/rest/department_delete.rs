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

//! API to delete a department.

use crate::driver::Driver;
use crate::rest::{MessageResponse, RestResult};
use axum::extract::{Path, State};
use axum::Json;

/// DELETE handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Path(id): Path<i32>,
) -> RestResult<Json<MessageResponse>> {
    driver.delete_department(id).await?;
    Ok(Json(MessageResponse::new("Department deleted successfully")))
}
