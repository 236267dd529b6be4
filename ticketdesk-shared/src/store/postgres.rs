/// PostgreSQL entity store
///
/// Each operation checks a connection out of the pool and returns it when
/// the operation finishes, fails or is dropped. Ticket creation runs inside
/// a transaction that rolls back unless it reaches `commit`.
///
/// # Example
///
/// ```no_run
/// use ticketdesk_shared::db::pool::{create_pool, DatabaseConfig};
/// use ticketdesk_shared::store::{postgres::PgStore, EntityStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// })
/// .await?;
///
/// let store = PgStore::new(pool);
/// let ticket = store.find_ticket(1).await?;
/// # Ok(())
/// # }
/// ```

use super::{
    query::TicketQuery, EmployeeRecord, EntityStore, StoreResult, TicketRecord, UserRecord,
};
use crate::models::{
    employee::Employee,
    ticket::{CreateTicket, Ticket},
    user::{Pronouns, User},
};
use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;
use tracing::debug;

/// Columns selected for a ticket joined with its owner and assignee
const TICKET_RECORD_SELECT: &str = r#"
    SELECT t.ticket_id, t.subject, t.description, t.created_at, t.resolved_at, t.is_active,
           t.status, t.user_id, t.assigned_to_employee_id,
           u.user_name, u.age, u.pronouns, u.country, u.email AS user_email,
           u.is_active AS user_is_active, u.social_links,
           e.name AS employee_name, e.email AS employee_email
    FROM tickets t
    JOIN users u ON u.user_id = t.user_id
    LEFT JOIN employees e ON e.employee_id = t.assigned_to_employee_id"#;

/// Flat row produced by [`TICKET_RECORD_SELECT`]
#[derive(Debug, sqlx::FromRow)]
struct TicketRecordRow {
    #[sqlx(flatten)]
    ticket: Ticket,
    user_name: String,
    age: i32,
    #[sqlx(try_from = "String")]
    pronouns: Pronouns,
    country: String,
    user_email: String,
    user_is_active: bool,
    social_links: Option<String>,
    employee_name: Option<String>,
    employee_email: Option<String>,
}

impl From<TicketRecordRow> for TicketRecord {
    fn from(row: TicketRecordRow) -> Self {
        let owner = User {
            user_id: row.ticket.user_id,
            user_name: row.user_name,
            age: row.age,
            pronouns: row.pronouns,
            country: row.country,
            email: row.user_email,
            is_active: row.user_is_active,
            social_links: row.social_links,
        };

        let assigned_to = match (
            row.ticket.assigned_to_employee_id,
            row.employee_name,
            row.employee_email,
        ) {
            (Some(employee_id), Some(name), Some(email)) => Some(Employee {
                employee_id,
                name,
                email,
            }),
            _ => None,
        };

        TicketRecord {
            ticket: row.ticket,
            owner,
            assigned_to,
        }
    }
}

/// Entity store backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool (for health checks and migrations)
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn user_record(conn: &mut PgConnection, user: Option<User>) -> StoreResult<Option<UserRecord>> {
        let Some(user) = user else {
            return Ok(None);
        };

        let tickets = Ticket::list_by_user(conn, user.user_id).await?;
        Ok(Some(UserRecord { user, tickets }))
    }
}

#[async_trait]
impl EntityStore for PgStore {
    async fn find_user(&self, user_id: i32) -> StoreResult<Option<UserRecord>> {
        let mut conn = self.pool.acquire().await?;
        let user = User::find_by_id(&mut conn, user_id).await?;
        Self::user_record(&mut conn, user).await
    }

    async fn find_user_by_name(&self, user_name: &str) -> StoreResult<Option<UserRecord>> {
        let mut conn = self.pool.acquire().await?;
        let user = User::find_by_user_name(&mut conn, user_name).await?;
        Self::user_record(&mut conn, user).await
    }

    async fn find_employee(&self, employee_id: i32) -> StoreResult<Option<EmployeeRecord>> {
        let mut conn = self.pool.acquire().await?;
        let Some(employee) = Employee::find_by_id(&mut conn, employee_id).await? else {
            return Ok(None);
        };

        let tickets = Ticket::list_by_assignee(&mut conn, employee_id).await?;
        Ok(Some(EmployeeRecord { employee, tickets }))
    }

    async fn list_employees(&self) -> StoreResult<Vec<EmployeeRecord>> {
        let mut conn = self.pool.acquire().await?;
        let employees = Employee::list(&mut conn).await?;

        let mut by_assignee: HashMap<i32, Vec<Ticket>> = HashMap::new();
        for ticket in Ticket::list_assigned(&mut conn).await? {
            if let Some(employee_id) = ticket.assigned_to_employee_id {
                by_assignee.entry(employee_id).or_default().push(ticket);
            }
        }

        Ok(employees
            .into_iter()
            .map(|employee| {
                let tickets = by_assignee.remove(&employee.employee_id).unwrap_or_default();
                EmployeeRecord { employee, tickets }
            })
            .collect())
    }

    async fn find_ticket(&self, ticket_id: i32) -> StoreResult<Option<TicketRecord>> {
        let mut conn = self.pool.acquire().await?;

        let mut builder = QueryBuilder::<Postgres>::new(TICKET_RECORD_SELECT);
        builder.push(" WHERE t.ticket_id = ").push_bind(ticket_id);

        let row = builder
            .build_query_as::<TicketRecordRow>()
            .fetch_optional(&mut *conn)
            .await?;

        Ok(row.map(TicketRecord::from))
    }

    async fn query_tickets(&self, query: &TicketQuery) -> StoreResult<Vec<TicketRecord>> {
        let mut conn = self.pool.acquire().await?;

        let mut builder = QueryBuilder::<Postgres>::new(TICKET_RECORD_SELECT);
        query.push_where(&mut builder);
        builder.push(" ORDER BY t.ticket_id");
        query.push_limit(&mut builder);

        debug!(sql = builder.sql(), "Running ticket query");

        let rows = builder
            .build_query_as::<TicketRecordRow>()
            .fetch_all(&mut *conn)
            .await?;

        Ok(rows.into_iter().map(TicketRecord::from).collect())
    }

    async fn create_ticket_for_user(&self, data: CreateTicket) -> StoreResult<Option<Ticket>> {
        let mut tx = self.pool.begin().await?;

        if User::find_for_update(&mut tx, data.user_id).await?.is_none() {
            debug!(user_id = data.user_id, "Owner not found, rolling back");
            return Ok(None);
        }

        let ticket = Ticket::create(&mut tx, data).await?;
        tx.commit().await?;

        debug!(ticket_id = ticket.ticket_id, "Ticket inserted");
        Ok(Some(ticket))
    }
}
