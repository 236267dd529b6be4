/// User endpoints
///
/// ```text
/// GET /api/v1/users/:id
/// GET /api/v1/users/by-username/:username
/// GET /api/v1/users/:id/tickets?status=Open&isActive=true
/// ```

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::Deserialize;
use ticketdesk_shared::{
    dto::{TicketDto, UserDto},
    models::ticket::TicketStatus,
};

fn user_not_found(id: i32) -> ApiError {
    ApiError::NotFound(Some(format!("User with ID '{id}' not found.")))
}

/// Fetches one user with owned ticket IDs
pub async fn get_user_by_id(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Json<UserDto>> {
    let Path(id) = id?;
    let token = state.request_token();

    state
        .users
        .get_user_by_id(id, &token)
        .await?
        .map(Json)
        .ok_or_else(|| user_not_found(id))
}

/// Fetches one user by exact user name
pub async fn get_user_by_name(
    State(state): State<AppState>,
    username: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<UserDto>> {
    let Path(username) = username?;
    let token = state.request_token();

    state
        .users
        .get_user_by_name(&username, &token)
        .await?
        .map(Json)
        .ok_or_else(|| {
            ApiError::NotFound(Some(format!("User with username '{username}' not found.")))
        })
}

/// Filters for a user's tickets
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTicketParams {
    pub status: Option<TicketStatus>,
    pub is_active: Option<bool>,
}

/// Lists a user's tickets
///
/// 404 when the user does not exist; an empty list when it exists but no
/// ticket matches.
pub async fn get_tickets_for_user(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    params: Result<Query<UserTicketParams>, QueryRejection>,
) -> ApiResult<Json<Vec<TicketDto>>> {
    let Path(id) = id?;
    let Query(params) = params?;
    let token = state.request_token();

    if state.users.get_user_by_id(id, &token).await?.is_none() {
        return Err(user_not_found(id));
    }

    let tickets = state
        .users
        .get_tickets_for_user(id, params.status, params.is_active, &token)
        .await?;

    Ok(Json(tickets))
}
