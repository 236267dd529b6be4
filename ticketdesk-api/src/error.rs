/// Error handling for the API server
///
/// Every failure leaves the server as a problem body:
///
/// ```json
/// { "status": 404, "title": "Not Found", "detail": "Ticket with ID '9' not found." }
/// ```
///
/// served as `application/problem+json`. An error created without a detail
/// gets the default detail for its status (see [`status_details`]).
///
/// # Example
///
/// ```
/// use ticketdesk_api::error::{ApiError, ApiResult};
///
/// fn find(id: i32) -> ApiResult<&'static str> {
///     Err(ApiError::NotFound(Some(format!("Ticket with ID '{id}' not found."))))
/// }
///
/// assert!(find(9).is_err());
/// ```

use axum::{
    extract::rejection::{PathRejection, QueryRejection},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use ticketdesk_shared::services::ServiceError;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Non-standard status for requests abandoned by the client
pub const CLIENT_CLOSED_REQUEST: u16 = 499;

/// Unified API error type
///
/// Each variant carries an optional detail message. `None` selects the
/// default detail for the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(Option<String>),

    /// Unauthorized (401)
    Unauthorized(Option<String>),

    /// Payment required (402)
    PaymentRequired(Option<String>),

    /// Forbidden (403)
    Forbidden(Option<String>),

    /// Not found (404)
    NotFound(Option<String>),

    /// Request timeout (408)
    RequestTimeout(Option<String>),

    /// Conflict (409)
    Conflict(Option<String>),

    /// Precondition failed (412)
    PreconditionFailed(Option<String>),

    /// Unsupported media type (415)
    UnsupportedMediaType(Option<String>),

    /// Unprocessable entity (422)
    UnprocessableEntity(Option<String>),

    /// Failed dependency (424)
    FailedDependency(Option<String>),

    /// Client closed request (499)
    ClientClosedRequest(Option<String>),

    /// Internal server error (500); the detail is logged, never returned
    InternalError(Option<String>),

    /// Service unavailable (503)
    ServiceUnavailable(Option<String>),
}

impl ApiError {
    /// Numeric status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::PaymentRequired(_) => 402,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::RequestTimeout(_) => 408,
            ApiError::Conflict(_) => 409,
            ApiError::PreconditionFailed(_) => 412,
            ApiError::UnsupportedMediaType(_) => 415,
            ApiError::UnprocessableEntity(_) => 422,
            ApiError::FailedDependency(_) => 424,
            ApiError::ClientClosedRequest(_) => CLIENT_CLOSED_REQUEST,
            ApiError::InternalError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    fn detail(&self) -> Option<&str> {
        match self {
            ApiError::BadRequest(d)
            | ApiError::Unauthorized(d)
            | ApiError::PaymentRequired(d)
            | ApiError::Forbidden(d)
            | ApiError::NotFound(d)
            | ApiError::RequestTimeout(d)
            | ApiError::Conflict(d)
            | ApiError::PreconditionFailed(d)
            | ApiError::UnsupportedMediaType(d)
            | ApiError::UnprocessableEntity(d)
            | ApiError::FailedDependency(d)
            | ApiError::ClientClosedRequest(d)
            | ApiError::InternalError(d)
            | ApiError::ServiceUnavailable(d) => d.as_deref(),
        }
    }

    /// The body sent to the client
    pub fn to_problem(&self) -> ProblemDetails {
        let detail = match self {
            ApiError::InternalError(_) => None,
            other => other.detail().map(str::to_string),
        };
        ProblemDetails::new(self.status_code(), detail)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (title, default_detail) = status_details(self.status_code());
        write!(f, "{}: {}", title, self.detail().unwrap_or(default_detail))
    }
}

impl std::error::Error for ApiError {}

/// Structured error body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemDetails {
    pub status: u16,
    pub title: String,
    pub detail: String,
}

impl ProblemDetails {
    /// Builds a body for `status`, defaulting the detail when absent
    pub fn new(status: u16, detail: Option<String>) -> Self {
        let (title, default_detail) = status_details(status);
        Self {
            status,
            title: title.to_string(),
            detail: detail.unwrap_or_else(|| default_detail.to_string()),
        }
    }
}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = (status, Json(self)).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        response
    }
}

/// Title and default detail for a status code
pub fn status_details(status: u16) -> (&'static str, &'static str) {
    match status {
        400 => ("Bad Request", "Request could not be processed."),
        401 => (
            "Unauthorized",
            "Authentication is required and has failed or has not yet been provided.",
        ),
        402 => ("Payment Required", "Payment Required"),
        403 => ("Forbidden", "No permission to access this resource."),
        404 => ("Not Found", "The requested resource was not found."),
        408 => ("Request Timeout", "The server timed out waiting for the request."),
        409 => (
            "Conflict",
            "The request could not be completed due to a conflict with the current state of the resource.",
        ),
        412 => ("Precondition failed.", "Precondition failed."),
        415 => ("Unsupported Media Type", "Unsupported media type."),
        422 => ("Unprocessable entity", "Unprocessable entity."),
        424 => ("Failed Dependency", "Failed Dependency"),
        CLIENT_CLOSED_REQUEST => ("Client closed request.", "Client closed request."),
        500 => (
            "Internal Server Error",
            "An unexpected error occurred while processing your request.",
        ),
        503 => (
            "Service Unavailable",
            "The server is currently unable to handle the request due to temporary overloading or maintenance of the server.",
        ),
        _ => ("Error", "Unknown status code"),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::InternalError(Some(msg)) = &self {
            // Log internal errors but don't expose details to clients
            tracing::error!("Internal error: {}", msg);
        }

        self.to_problem().into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Cancelled => ApiError::ClientClosedRequest(None),
            ServiceError::Store(e) => ApiError::InternalError(Some(e.to_string())),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(Some(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(Some(rejection.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticketdesk_shared::store::StoreError;

    #[test]
    fn test_problem_uses_default_detail() {
        let problem = ApiError::NotFound(None).to_problem();
        assert_eq!(problem.status, 404);
        assert_eq!(problem.title, "Not Found");
        assert_eq!(problem.detail, "The requested resource was not found.");
    }

    #[test]
    fn test_problem_keeps_supplied_detail() {
        let problem = ApiError::Unauthorized(Some("Missing API key".to_string())).to_problem();
        assert_eq!(problem.title, "Unauthorized");
        assert_eq!(problem.detail, "Missing API key");
    }

    #[test]
    fn test_internal_detail_not_exposed() {
        let problem = ApiError::InternalError(Some("connection refused".to_string())).to_problem();
        assert_eq!(problem.status, 500);
        assert_eq!(
            problem.detail,
            "An unexpected error occurred while processing your request."
        );
    }

    #[test]
    fn test_status_details_table() {
        assert_eq!(status_details(409).0, "Conflict");
        assert_eq!(status_details(412), ("Precondition failed.", "Precondition failed."));
        assert_eq!(status_details(499).0, "Client closed request.");
        assert_eq!(status_details(418), ("Error", "Unknown status code"));
    }

    #[test]
    fn test_every_variant_has_a_table_entry() {
        let errors = [
            ApiError::BadRequest(None),
            ApiError::Unauthorized(None),
            ApiError::PaymentRequired(None),
            ApiError::Forbidden(None),
            ApiError::NotFound(None),
            ApiError::RequestTimeout(None),
            ApiError::Conflict(None),
            ApiError::PreconditionFailed(None),
            ApiError::UnsupportedMediaType(None),
            ApiError::UnprocessableEntity(None),
            ApiError::FailedDependency(None),
            ApiError::ClientClosedRequest(None),
            ApiError::InternalError(None),
            ApiError::ServiceUnavailable(None),
        ];

        for err in errors {
            assert_ne!(err.to_problem().title, "Error", "{:?}", err);
        }
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest(Some("Invalid input".to_string()));
        assert_eq!(err.to_string(), "Bad Request: Invalid input");

        let err = ApiError::NotFound(None);
        assert_eq!(err.to_string(), "Not Found: The requested resource was not found.");
    }

    #[test]
    fn test_service_error_mapping() {
        assert_eq!(
            ApiError::from(ServiceError::Cancelled).status_code(),
            CLIENT_CLOSED_REQUEST
        );

        let store_err = ServiceError::Store(StoreError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(ApiError::from(store_err).status_code(), 500);
    }

    #[test]
    fn test_response_content_type() {
        let response = ApiError::Conflict(None).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/problem+json"
        );
    }

    #[test]
    fn test_client_closed_request_status() {
        let response = ApiError::ClientClosedRequest(None).into_response();
        assert_eq!(response.status().as_u16(), 499);
    }
}
