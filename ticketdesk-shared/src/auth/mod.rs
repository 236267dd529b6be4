/// Access control for the TicketDesk API
///
/// # Modules
///
/// - [`api_key`]: Shared-secret API key checking
///
/// Every request under the versioned API prefix presents the configured key
/// in the `X-API-Key` header. There are no per-caller identities or scopes.

pub mod api_key;
