/// Ticket endpoints
///
/// ```text
/// GET  /api/v1/tickets/:id
/// GET  /api/v1/tickets?userId=1&createdBefore=...&createdAfter=...&assignedToEmployeeId=1&resultCount=20
/// POST /api/v1/tickets?userId=1&subject=...&description=...
/// ```
///
/// Timestamps are RFC 3339. Listing returns at most 20 tickets unless
/// `resultCount` says otherwise; `resultCount=0` (or negative) returns all.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use std::{fmt, str::FromStr};
use ticketdesk_shared::{
    dto::TicketDto,
    services::{NewTicket, TicketListFilter, DEFAULT_RESULT_COUNT},
};
use tracing::warn;
use validator::{Validate, ValidationError};

/// Message returned for any invalid create request
pub const CREATE_VALIDATION_MESSAGE: &str = "UserId, Subject, and Description are required.";

fn default_result_count() -> Option<i32> {
    Some(DEFAULT_RESULT_COUNT)
}

/// Reads an optional query value, treating `?key=` like an absent key
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

fn empty_as_default_count<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(empty_as_none(deserializer)?.or_else(default_result_count))
}

/// Query parameters for ticket listing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketListParams {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub user_id: Option<i32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub created_before: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub created_after: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub assigned_to_employee_id: Option<i32>,
    #[serde(
        default = "default_result_count",
        deserialize_with = "empty_as_default_count"
    )]
    pub result_count: Option<i32>,
}

impl From<TicketListParams> for TicketListFilter {
    fn from(params: TicketListParams) -> Self {
        Self {
            user_id: params.user_id,
            created_before: params.created_before,
            created_after: params.created_after,
            assigned_to_employee_id: params.assigned_to_employee_id,
            result_count: params.result_count,
        }
    }
}

fn not_zero(user_id: i32) -> Result<(), ValidationError> {
    if user_id == 0 {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

/// Query parameters for ticket creation
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketParams {
    #[serde(default)]
    #[validate(custom(function = "not_zero"))]
    pub user_id: i32,

    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub subject: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub description: String,
}

/// Fetches one ticket
pub async fn get_ticket_by_id(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Json<TicketDto>> {
    let Path(id) = id?;
    let token = state.request_token();

    state
        .tickets
        .get_ticket_by_id(id, &token)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(Some(format!("Ticket with ID '{id}' not found."))))
}

/// Lists tickets matching the supplied filters
pub async fn get_tickets(
    State(state): State<AppState>,
    params: Result<Query<TicketListParams>, QueryRejection>,
) -> ApiResult<Json<Vec<TicketDto>>> {
    let Query(params) = params?;
    let token = state.request_token();

    let tickets = state.tickets.get_tickets(params.into(), &token).await?;
    Ok(Json(tickets))
}

/// Creates a ticket for an existing user
///
/// Responds `201 Created` with the new ID as the body and a `Location`
/// header pointing at the ticket.
pub async fn create_ticket(
    State(state): State<AppState>,
    params: Result<Query<CreateTicketParams>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(params) = params?;

    if let Err(errors) = params.validate() {
        warn!(errors = %errors, "Invalid create ticket request");
        return Err(ApiError::BadRequest(Some(CREATE_VALIDATION_MESSAGE.to_string())));
    }

    let user_id = params.user_id;
    let token = state.request_token();

    let ticket_id = state
        .tickets
        .create_ticket(NewTicket::new(user_id, params.subject, params.description), &token)
        .await?
        .ok_or_else(|| {
            ApiError::BadRequest(Some(format!(
                "User with ID '{user_id}' not found. Ticket not created."
            )))
        })?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/v1/tickets/{ticket_id}"))],
        Json(ticket_id),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(user_id: i32, subject: &str, description: &str) -> CreateTicketParams {
        CreateTicketParams {
            user_id,
            subject: subject.to_string(),
            description: description.to_string(),
        }
    }

    #[test]
    fn test_not_zero_takes_user_id_by_value() {
        assert!(not_zero(0).is_err());
        assert!(not_zero(7).is_ok());
    }

    #[test]
    fn test_create_params_validation() {
        assert!(create(1, "Login Issue", "Cannot login").validate().is_ok());
        assert!(create(-4, "Login Issue", "Cannot login").validate().is_ok());
        assert!(create(0, "Login Issue", "Cannot login").validate().is_err());
        assert!(create(1, "   ", "Cannot login").validate().is_err());
        assert!(create(1, "Login Issue", "").validate().is_err());
    }

    #[test]
    fn test_list_params_into_filter() {
        let params = TicketListParams {
            user_id: Some(1),
            created_before: None,
            created_after: None,
            assigned_to_employee_id: Some(2),
            result_count: Some(0),
        };

        let filter = TicketListFilter::from(params);
        assert_eq!(filter.user_id, Some(1));
        assert_eq!(filter.assigned_to_employee_id, Some(2));
        assert_eq!(filter.to_query().limit(), None);
    }

    fn list(query: &str) -> Result<TicketListParams, QueryRejection> {
        let uri: axum::http::Uri = format!("/api/v1/tickets?{query}").parse().unwrap();
        Query::try_from_uri(&uri).map(|Query(params)| params)
    }

    #[test]
    fn test_list_params_empty_values_are_absent() {
        let params = list("userId=&assignedToEmployeeId=&createdAfter=&resultCount=").unwrap();
        assert_eq!(params.user_id, None);
        assert_eq!(params.assigned_to_employee_id, None);
        assert_eq!(params.created_after, None);
        assert_eq!(params.result_count, Some(DEFAULT_RESULT_COUNT));
    }

    #[test]
    fn test_list_params_defaults_and_values() {
        let params = list("").unwrap();
        assert_eq!(params.user_id, None);
        assert_eq!(params.result_count, Some(DEFAULT_RESULT_COUNT));

        let params = list("userId=3&resultCount=0&createdBefore=2024-01-01T00:00:00Z").unwrap();
        assert_eq!(params.user_id, Some(3));
        assert_eq!(params.result_count, Some(0));
        assert!(params.created_before.is_some());

        assert!(list("userId=abc").is_err());
        assert!(list("resultCount=many").is_err());
    }
}
