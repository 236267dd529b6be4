/// API key gate
///
/// Requests without the `X-API-Key` header, or with a value other than the
/// configured secret, are rejected with 401 before reaching a handler. Both
/// cases return the same problem shape and are logged separately.

use crate::{app::AppState, error::ApiError};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use ticketdesk_shared::auth::api_key::{ApiKeyCheck, API_KEY_HEADER};
use tracing::warn;

/// Rejects requests that do not carry the configured API key
pub async fn require_api_key(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let check = match req.headers().get(API_KEY_HEADER) {
        None => ApiKeyCheck::Missing,
        Some(value) => match value.to_str() {
            Ok(key) => state.api_key.check(Some(key)),
            Err(_) => ApiKeyCheck::Invalid,
        },
    };

    if check.is_valid() {
        return Ok(next.run(req).await);
    }

    let detail = match check {
        ApiKeyCheck::Missing => {
            warn!(path = %req.uri().path(), "Request rejected: API key missing");
            "Missing API key"
        }
        _ => {
            warn!(path = %req.uri().path(), "Request rejected: invalid API key");
            "Invalid API key"
        }
    };

    Err(ApiError::Unauthorized(Some(detail.to_string())))
}
