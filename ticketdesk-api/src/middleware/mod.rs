/// Middleware modules for the API server
///
/// - `api_key`: shared-secret gate in front of every `/api/v1` route

pub mod api_key;
