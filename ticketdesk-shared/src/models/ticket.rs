/// Ticket model and database operations
///
/// A ticket is always owned by exactly one user and is optionally assigned
/// to one employee.
///
/// # Status
///
/// ```text
/// Open → InProgress → Resolved → Closed
/// ```
///
/// The progression is conventional only; no transition is rejected.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tickets (
///     ticket_id SERIAL PRIMARY KEY,
///     subject TEXT NOT NULL,
///     description TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL,
///     resolved_at TIMESTAMPTZ,
///     is_active BOOLEAN NOT NULL,
///     user_id INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
///     status TEXT NOT NULL,
///     assigned_to_employee_id INTEGER REFERENCES employees(employee_id) ON DELETE SET NULL
/// );
/// ```

use super::ParseEnumError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use std::{fmt, str::FromStr};

/// Ticket lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TicketStatus {
    #[serde(alias = "open")]
    Open,

    #[serde(alias = "inprogress", alias = "in_progress")]
    InProgress,

    #[serde(alias = "resolved")]
    Resolved,

    #[serde(alias = "closed")]
    Closed,
}

impl TicketStatus {
    /// Returns the stored text form
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "Open",
            TicketStatus::InProgress => "InProgress",
            TicketStatus::Resolved => "Resolved",
            TicketStatus::Closed => "Closed",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Open" => Ok(TicketStatus::Open),
            "InProgress" => Ok(TicketStatus::InProgress),
            "Resolved" => Ok(TicketStatus::Resolved),
            "Closed" => Ok(TicketStatus::Closed),
            other => Err(ParseEnumError::new("ticket status", other)),
        }
    }
}

impl TryFrom<String> for TicketStatus {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Ticket model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ticket {
    /// Database-assigned identifier
    pub ticket_id: i32,

    pub subject: String,

    pub description: String,

    /// Set once at creation
    pub created_at: DateTime<Utc>,

    /// Not validated against `created_at`
    pub resolved_at: Option<DateTime<Utc>>,

    pub is_active: bool,

    #[sqlx(try_from = "String")]
    pub status: TicketStatus,

    /// Owning user
    pub user_id: i32,

    /// Assigned employee, if any
    pub assigned_to_employee_id: Option<i32>,
}

/// Input for inserting a ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTicket {
    pub user_id: i32,
    pub subject: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub status: TicketStatus,
    pub assigned_to_employee_id: Option<i32>,
}

impl CreateTicket {
    /// A fresh, active, unassigned ticket in `Open` status
    pub fn open(
        user_id: i32,
        subject: impl Into<String>,
        description: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            subject: subject.into(),
            description: description.into(),
            created_at,
            resolved_at: None,
            is_active: true,
            status: TicketStatus::Open,
            assigned_to_employee_id: None,
        }
    }

    /// Assigns the ticket to an employee
    pub fn assigned_to(mut self, employee_id: i32) -> Self {
        self.assigned_to_employee_id = Some(employee_id);
        self
    }

    /// Overrides the status
    pub fn with_status(mut self, status: TicketStatus) -> Self {
        self.status = status;
        self
    }

    /// Converts into a ticket once an identifier has been assigned
    pub fn into_ticket(self, ticket_id: i32) -> Ticket {
        Ticket {
            ticket_id,
            subject: self.subject,
            description: self.description,
            created_at: self.created_at,
            resolved_at: self.resolved_at,
            is_active: self.is_active,
            status: self.status,
            user_id: self.user_id,
            assigned_to_employee_id: self.assigned_to_employee_id,
        }
    }
}

impl Ticket {
    /// Inserts a ticket and returns it with its new identifier
    ///
    /// # Errors
    ///
    /// Returns an error if the owner or assignee does not exist
    /// (foreign key violation) or the database operation fails
    pub async fn create(conn: &mut PgConnection, data: CreateTicket) -> Result<Self, sqlx::Error> {
        let ticket = sqlx::query_as::<_, Ticket>(
            r#"
            INSERT INTO tickets (subject, description, created_at, resolved_at, is_active,
                                 user_id, status, assigned_to_employee_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING ticket_id, subject, description, created_at, resolved_at, is_active,
                      status, user_id, assigned_to_employee_id
            "#,
        )
        .bind(data.subject)
        .bind(data.description)
        .bind(data.created_at)
        .bind(data.resolved_at)
        .bind(data.is_active)
        .bind(data.user_id)
        .bind(data.status.as_str())
        .bind(data.assigned_to_employee_id)
        .fetch_one(conn)
        .await?;

        Ok(ticket)
    }

    /// Lists tickets owned by a user, ordered by ID
    pub async fn list_by_user(conn: &mut PgConnection, user_id: i32) -> Result<Vec<Self>, sqlx::Error> {
        let tickets = sqlx::query_as::<_, Ticket>(
            r#"
            SELECT ticket_id, subject, description, created_at, resolved_at, is_active,
                   status, user_id, assigned_to_employee_id
            FROM tickets
            WHERE user_id = $1
            ORDER BY ticket_id
            "#,
        )
        .bind(user_id)
        .fetch_all(conn)
        .await?;

        Ok(tickets)
    }

    /// Lists tickets assigned to an employee, ordered by ID
    pub async fn list_by_assignee(
        conn: &mut PgConnection,
        employee_id: i32,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tickets = sqlx::query_as::<_, Ticket>(
            r#"
            SELECT ticket_id, subject, description, created_at, resolved_at, is_active,
                   status, user_id, assigned_to_employee_id
            FROM tickets
            WHERE assigned_to_employee_id = $1
            ORDER BY ticket_id
            "#,
        )
        .bind(employee_id)
        .fetch_all(conn)
        .await?;

        Ok(tickets)
    }

    /// Lists every ticket that has an assignee, ordered by ID
    pub async fn list_assigned(conn: &mut PgConnection) -> Result<Vec<Self>, sqlx::Error> {
        let tickets = sqlx::query_as::<_, Ticket>(
            r#"
            SELECT ticket_id, subject, description, created_at, resolved_at, is_active,
                   status, user_id, assigned_to_employee_id
            FROM tickets
            WHERE assigned_to_employee_id IS NOT NULL
            ORDER BY ticket_id
            "#,
        )
        .fetch_all(conn)
        .await?;

        Ok(tickets)
    }

    /// Counts all tickets
    pub async fn count(conn: &mut PgConnection) -> Result<i64, sqlx::Error> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tickets")
            .fetch_one(conn)
            .await?;

        Ok(count.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_ordering_follows_progression() {
        assert!(TicketStatus::Open < TicketStatus::InProgress);
        assert!(TicketStatus::InProgress < TicketStatus::Resolved);
        assert!(TicketStatus::Resolved < TicketStatus::Closed);
    }

    #[test]
    fn test_status_text_roundtrip() {
        for s in [
            TicketStatus::Open,
            TicketStatus::InProgress,
            TicketStatus::Resolved,
            TicketStatus::Closed,
        ] {
            assert_eq!(TicketStatus::try_from(s.to_string()).unwrap(), s);
        }
        assert!("Pending".parse::<TicketStatus>().is_err());
    }

    #[test]
    fn test_status_deserializes_lowercase_alias() {
        let status: TicketStatus = serde_json::from_str("\"inprogress\"").unwrap();
        assert_eq!(status, TicketStatus::InProgress);

        let status: TicketStatus = serde_json::from_str("\"Closed\"").unwrap();
        assert_eq!(status, TicketStatus::Closed);
    }

    #[test]
    fn test_create_ticket_open_defaults() {
        let now = Utc::now();
        let data = CreateTicket::open(7, "Login Issue", "Cannot login", now);

        assert_eq!(data.status, TicketStatus::Open);
        assert!(data.is_active);
        assert_eq!(data.created_at, now);
        assert!(data.resolved_at.is_none());
        assert!(data.assigned_to_employee_id.is_none());

        let ticket = data.assigned_to(3).into_ticket(42);
        assert_eq!(ticket.ticket_id, 42);
        assert_eq!(ticket.user_id, 7);
        assert_eq!(ticket.assigned_to_employee_id, Some(3));
    }
}
