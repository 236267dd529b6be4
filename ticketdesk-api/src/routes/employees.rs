/// Employee endpoints
///
/// ```text
/// GET /api/v1/employees
/// GET /api/v1/employees/:id
/// ```

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{rejection::PathRejection, Path, State},
    Json,
};
use ticketdesk_shared::dto::EmployeeDto;

/// Lists every employee with assigned ticket IDs
pub async fn get_all_employees(State(state): State<AppState>) -> ApiResult<Json<Vec<EmployeeDto>>> {
    let token = state.request_token();
    let employees = state.employees.get_all_employees(&token).await?;
    Ok(Json(employees))
}

/// Fetches one employee
pub async fn get_employee_by_id(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Json<EmployeeDto>> {
    let Path(id) = id?;
    let token = state.request_token();

    state
        .employees
        .get_employee_by_id(id, &token)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(Some(format!("Employee with ID '{id}' not found."))))
}
