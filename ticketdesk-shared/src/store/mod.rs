/// Entity store abstraction
///
/// The services never talk to a database directly. They go through the
/// [`EntityStore`] trait, which spells out which related rows are loaded
/// with each entity:
///
/// - a [`TicketRecord`] carries the ticket, its owner and its assignee
/// - a [`UserRecord`] carries the user and the tickets it owns
/// - an [`EmployeeRecord`] carries the employee and the tickets assigned to it
///
/// # Implementations
///
/// - [`postgres::PgStore`]: PostgreSQL through a sqlx pool
/// - [`memory::MemoryStore`]: in-process store for tests and local demos
///
/// Every call is a self-contained unit of work: the implementation acquires
/// what it needs (a pooled connection, a transaction, a lock guard) and
/// releases it before returning or when the returned future is dropped.

pub mod memory;
pub mod postgres;
pub mod query;

use crate::models::{
    employee::Employee,
    ticket::{CreateTicket, Ticket},
    user::User,
};
use async_trait::async_trait;
use query::TicketQuery;

/// Store error type
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// A ticket with its owner and assignee loaded
#[derive(Debug, Clone, PartialEq)]
pub struct TicketRecord {
    pub ticket: Ticket,
    pub owner: User,
    pub assigned_to: Option<Employee>,
}

/// A user with the tickets it owns
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub user: User,
    pub tickets: Vec<Ticket>,
}

/// An employee with the tickets assigned to it
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeRecord {
    pub employee: Employee,
    pub tickets: Vec<Ticket>,
}

/// Read and write access to users, employees and tickets
///
/// Lookups return `Ok(None)` for unknown identifiers; callers decide whether
/// that is an error.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Finds a user by ID with its tickets
    async fn find_user(&self, user_id: i32) -> StoreResult<Option<UserRecord>>;

    /// Finds a user by exact user name with its tickets
    async fn find_user_by_name(&self, user_name: &str) -> StoreResult<Option<UserRecord>>;

    /// Finds an employee by ID with its assigned tickets
    async fn find_employee(&self, employee_id: i32) -> StoreResult<Option<EmployeeRecord>>;

    /// Lists every employee (ordered by ID) with assigned tickets
    async fn list_employees(&self) -> StoreResult<Vec<EmployeeRecord>>;

    /// Finds a ticket by ID with owner and assignee
    async fn find_ticket(&self, ticket_id: i32) -> StoreResult<Option<TicketRecord>>;

    /// Runs a filtered ticket query, ordered by ticket ID
    async fn query_tickets(&self, query: &TicketQuery) -> StoreResult<Vec<TicketRecord>>;

    /// Inserts a ticket if its owner exists
    ///
    /// The owner check and the insert form one unit of work. Returns
    /// `Ok(None)` when `data.user_id` does not resolve to a user.
    async fn create_ticket_for_user(&self, data: CreateTicket) -> StoreResult<Option<Ticket>>;
}
