/// API route handlers
///
/// - `health`: public liveness and database check
/// - `employees`, `tickets`, `users`: resources under `/api/v1`

pub mod employees;
pub mod health;
pub mod tickets;
pub mod users;

use crate::error::ApiError;

/// Fallback for unmatched routes
pub async fn not_found() -> ApiError {
    ApiError::NotFound(None)
}
