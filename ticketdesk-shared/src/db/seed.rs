/// Sample data for fresh databases
///
/// On startup the server can fill empty tables with a minimal data set so
/// the API returns something useful right away. Each table is checked on
/// its own: a table that already holds rows is left untouched.
///
/// # Default data
///
/// - Employee "Alice Smith"
/// - User "johndoe" (30, He, USA, active)
/// - One `Open` ticket owned by johndoe and assigned to Alice
///
/// # Example
///
/// ```no_run
/// use ticketdesk_shared::db::seed::{seed_if_empty, SeedData};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let report = seed_if_empty(&pool, SeedData::default()).await?;
/// println!("Seeded {} tickets", report.tickets);
/// # Ok(())
/// # }
/// ```

use crate::models::{
    employee::{CreateEmployee, Employee},
    ticket::{CreateTicket, Ticket, TicketStatus},
    user::{CreateUser, Pronouns, User},
};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, info};

/// Ticket to seed; owner and assignee are resolved at load time
#[derive(Debug, Clone)]
pub struct SeedTicket {
    pub subject: String,
    pub description: String,
    pub status: TicketStatus,
}

impl SeedTicket {
    /// Builds the insert for the given owner and optional assignee
    pub fn into_create(
        self,
        user_id: i32,
        assigned_to_employee_id: Option<i32>,
        created_at: DateTime<Utc>,
    ) -> CreateTicket {
        let mut data = CreateTicket::open(user_id, self.subject, self.description, created_at)
            .with_status(self.status);
        data.assigned_to_employee_id = assigned_to_employee_id;
        data
    }
}

/// Rows inserted into empty tables
///
/// Tickets are owned by the first user and assigned to the first employee.
#[derive(Debug, Clone)]
pub struct SeedData {
    pub employees: Vec<CreateEmployee>,
    pub users: Vec<CreateUser>,
    pub tickets: Vec<SeedTicket>,
}

impl Default for SeedData {
    fn default() -> Self {
        Self {
            employees: vec![CreateEmployee {
                name: "Alice Smith".to_string(),
                email: "alice.smith@example.com".to_string(),
            }],
            users: vec![CreateUser {
                user_name: "johndoe".to_string(),
                age: 30,
                pronouns: Pronouns::He,
                country: "USA".to_string(),
                email: "john.doe@example.com".to_string(),
                is_active: true,
                social_links: Some("https://github.com/johndoe".to_string()),
            }],
            tickets: vec![SeedTicket {
                subject: "Sample Ticket".to_string(),
                description: "This is a sample ticket.".to_string(),
                status: TicketStatus::Open,
            }],
        }
    }
}

/// Number of rows inserted per table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub employees: usize,
    pub users: usize,
    pub tickets: usize,
}

/// Inserts seed data into every empty table, in one transaction
///
/// # Errors
///
/// Returns an error if any query fails; nothing is inserted in that case.
pub async fn seed_if_empty(pool: &PgPool, seed: SeedData) -> Result<SeedReport, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut report = SeedReport::default();

    if Employee::count(&mut tx).await? == 0 {
        for employee in seed.employees {
            Employee::create(&mut tx, employee).await?;
            report.employees += 1;
        }
    } else {
        debug!("Employees table not empty, skipping");
    }

    if User::count(&mut tx).await? == 0 {
        for user in seed.users {
            User::create(&mut tx, user).await?;
            report.users += 1;
        }
    } else {
        debug!("Users table not empty, skipping");
    }

    if Ticket::count(&mut tx).await? == 0 {
        let owner = User::first(&mut tx).await?;
        let assignee = Employee::list(&mut tx).await?.into_iter().next();

        if let Some(owner) = owner {
            let now = Utc::now();
            for ticket in seed.tickets {
                let data = ticket.into_create(
                    owner.user_id,
                    assignee.as_ref().map(|e| e.employee_id),
                    now,
                );
                Ticket::create(&mut tx, data).await?;
                report.tickets += 1;
            }
        }
    } else {
        debug!("Tickets table not empty, skipping");
    }

    tx.commit().await?;

    info!(
        employees = report.employees,
        users = report.users,
        tickets = report.tickets,
        "Seed data applied"
    );
    Ok(report)
}
