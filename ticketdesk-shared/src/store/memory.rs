/// In-memory entity store for tests and demos
///
/// Keeps users, employees and tickets in vectors behind a
/// `tokio::sync::RwLock`. Identifiers are assigned sequentially starting at
/// 1, like a fresh `SERIAL` column, and results come back in ID order.
///
/// # Example
///
/// ```
/// use ticketdesk_shared::store::{memory::MemoryStore, EntityStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::seeded().await;
///
/// let user = store.find_user_by_name("johndoe").await?;
/// assert!(user.is_some());
/// # Ok(())
/// # }
/// ```

use super::{
    query::TicketQuery, EmployeeRecord, EntityStore, StoreResult, TicketRecord, UserRecord,
};
use crate::{
    db::seed::SeedData,
    models::{
        employee::{CreateEmployee, Employee},
        ticket::{CreateTicket, Ticket},
        user::{CreateUser, User},
    },
};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    employees: Vec<Employee>,
    tickets: Vec<Ticket>,
    next_user_id: i32,
    next_employee_id: i32,
    next_ticket_id: i32,
}

impl Tables {
    fn user(&self, user_id: i32) -> Option<&User> {
        self.users.iter().find(|u| u.user_id == user_id)
    }

    fn employee(&self, employee_id: i32) -> Option<&Employee> {
        self.employees.iter().find(|e| e.employee_id == employee_id)
    }

    fn user_record(&self, user: &User) -> UserRecord {
        UserRecord {
            user: user.clone(),
            tickets: self
                .tickets
                .iter()
                .filter(|t| t.user_id == user.user_id)
                .cloned()
                .collect(),
        }
    }

    fn employee_record(&self, employee: &Employee) -> EmployeeRecord {
        EmployeeRecord {
            employee: employee.clone(),
            tickets: self
                .tickets
                .iter()
                .filter(|t| t.assigned_to_employee_id == Some(employee.employee_id))
                .cloned()
                .collect(),
        }
    }

    /// Owner is guaranteed by `insert_ticket`, so a missing owner is skipped
    fn ticket_record(&self, ticket: &Ticket) -> Option<TicketRecord> {
        let owner = self.user(ticket.user_id)?.clone();
        let assigned_to = ticket
            .assigned_to_employee_id
            .and_then(|id| self.employee(id))
            .cloned();

        Some(TicketRecord {
            ticket: ticket.clone(),
            owner,
            assigned_to,
        })
    }

    fn insert_ticket(&mut self, data: CreateTicket) -> Option<Ticket> {
        self.user(data.user_id)?;
        if let Some(employee_id) = data.assigned_to_employee_id {
            self.employee(employee_id)?;
        }

        self.next_ticket_id += 1;
        let ticket = data.into_ticket(self.next_ticket_id);
        self.tickets.push(ticket.clone());
        Some(ticket)
    }
}

/// Entity store held entirely in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// An empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// A store loaded with the default seed data
    pub async fn seeded() -> Self {
        let store = Self::new();
        store.load(SeedData::default()).await;
        store
    }

    /// Loads seed data into any table that is still empty
    ///
    /// Seed tickets are owned by the first user and assigned to the first
    /// employee, as in [`crate::db::seed::seed_if_empty`].
    pub async fn load(&self, seed: SeedData) {
        let (no_employees, no_users, no_tickets) = {
            let tables = self.tables.read().await;
            (
                tables.employees.is_empty(),
                tables.users.is_empty(),
                tables.tickets.is_empty(),
            )
        };

        if no_employees {
            for employee in seed.employees {
                self.insert_employee(employee).await;
            }
        }
        if no_users {
            for user in seed.users {
                self.insert_user(user).await;
            }
        }
        if no_tickets {
            let mut tables = self.tables.write().await;
            let Some(owner_id) = tables.users.first().map(|u| u.user_id) else {
                return;
            };
            let assignee_id = tables.employees.first().map(|e| e.employee_id);

            let now = Utc::now();
            for ticket in seed.tickets {
                tables.insert_ticket(ticket.into_create(owner_id, assignee_id, now));
            }
        }
    }

    /// Inserts a user and returns it with its assigned ID
    pub async fn insert_user(&self, data: CreateUser) -> User {
        let mut tables = self.tables.write().await;
        tables.next_user_id += 1;

        let user = User {
            user_id: tables.next_user_id,
            user_name: data.user_name,
            age: data.age,
            pronouns: data.pronouns,
            country: data.country,
            email: data.email,
            is_active: data.is_active,
            social_links: data.social_links,
        };
        tables.users.push(user.clone());
        user
    }

    /// Inserts an employee and returns it with its assigned ID
    pub async fn insert_employee(&self, data: CreateEmployee) -> Employee {
        let mut tables = self.tables.write().await;
        tables.next_employee_id += 1;

        let employee = Employee {
            employee_id: tables.next_employee_id,
            name: data.name,
            email: data.email,
        };
        tables.employees.push(employee.clone());
        employee
    }

    /// Inserts a ticket
    ///
    /// Returns `None` (and inserts nothing) when the owner or the assignee
    /// does not exist, mirroring the foreign keys of the SQL schema.
    pub async fn insert_ticket(&self, data: CreateTicket) -> Option<Ticket> {
        self.tables.write().await.insert_ticket(data)
    }

    /// Number of stored tickets
    pub async fn ticket_count(&self) -> usize {
        self.tables.read().await.tickets.len()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn find_user(&self, user_id: i32) -> StoreResult<Option<UserRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.user(user_id).map(|u| tables.user_record(u)))
    }

    async fn find_user_by_name(&self, user_name: &str) -> StoreResult<Option<UserRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.user_name == user_name)
            .map(|u| tables.user_record(u)))
    }

    async fn find_employee(&self, employee_id: i32) -> StoreResult<Option<EmployeeRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.employee(employee_id).map(|e| tables.employee_record(e)))
    }

    async fn list_employees(&self) -> StoreResult<Vec<EmployeeRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .employees
            .iter()
            .map(|e| tables.employee_record(e))
            .collect())
    }

    async fn find_ticket(&self, ticket_id: i32) -> StoreResult<Option<TicketRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tickets
            .iter()
            .find(|t| t.ticket_id == ticket_id)
            .and_then(|t| tables.ticket_record(t)))
    }

    async fn query_tickets(&self, query: &TicketQuery) -> StoreResult<Vec<TicketRecord>> {
        let tables = self.tables.read().await;

        let matching = tables
            .tickets
            .iter()
            .filter_map(|t| tables.ticket_record(t))
            .filter(|r| query.matches(&r.ticket, &r.owner));

        let records = match query.limit() {
            Some(limit) => matching.take(usize::try_from(limit).unwrap_or(0)).collect(),
            None => matching.collect(),
        };

        Ok(records)
    }

    async fn create_ticket_for_user(&self, data: CreateTicket) -> StoreResult<Option<Ticket>> {
        Ok(self.tables.write().await.insert_ticket(data))
    }
}
