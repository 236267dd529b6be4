/// Database models for TicketDesk
///
/// This module contains the persisted entities and their single-table queries.
///
/// # Models
///
/// - `user`: Customers who open tickets
/// - `employee`: Support staff tickets can be assigned to
/// - `ticket`: Support tickets, owned by a user and optionally assigned
///
/// Enumerations (`Pronouns`, `TicketStatus`) are stored as text columns
/// holding the variant name, so the schema stays readable from `psql`.
///
/// # Example
///
/// ```no_run
/// use ticketdesk_shared::models::user::User;
/// use ticketdesk_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// let mut conn = pool.acquire().await?;
///
/// let user = User::find_by_id(&mut conn, 1).await?;
/// # Ok(())
/// # }
/// ```

pub mod employee;
pub mod ticket;
pub mod user;

/// Error returned when a text column holds an unknown enum variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct ParseEnumError {
    /// Enum being parsed (e.g. "ticket status")
    pub kind: &'static str,

    /// The rejected text
    pub value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}
