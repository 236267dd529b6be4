/// API representations of users, employees and tickets
///
/// DTOs are flat: a ticket names its assignee by ID, and users and
/// employees list their tickets as IDs. JSON field names are camelCase.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use ticketdesk_shared::dto::TicketDto;
/// use ticketdesk_shared::models::ticket::CreateTicket;
///
/// let ticket = CreateTicket::open(1, "Login Issue", "Cannot login", Utc::now())
///     .assigned_to(2)
///     .into_ticket(7);
///
/// let dto = TicketDto::from(ticket);
/// let json = serde_json::to_value(&dto).unwrap();
/// assert_eq!(json["ticketId"], 7);
/// assert_eq!(json["assignedToEmployeeId"], 2);
/// assert_eq!(json["status"], "Open");
/// ```

use crate::{
    models::{employee::Employee, ticket::{Ticket, TicketStatus}, user::{Pronouns, User}},
    store::{EmployeeRecord, TicketRecord, UserRecord},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketDto {
    pub ticket_id: i32,
    pub subject: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub status: TicketStatus,
    pub assigned_to_employee_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub user_id: i32,
    pub user_name: String,
    pub age: i32,
    pub pronouns: Pronouns,
    pub country: String,
    pub email: String,
    pub is_active: bool,
    pub social_links: Option<String>,

    /// Tickets owned by the user
    pub ticket_ids: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDto {
    pub employee_id: i32,
    pub name: String,
    pub email: String,

    /// Tickets assigned to the employee
    pub ticket_ids: Vec<i32>,
}

fn ticket_ids(tickets: &[Ticket]) -> Vec<i32> {
    tickets.iter().map(|t| t.ticket_id).collect()
}

impl From<Ticket> for TicketDto {
    fn from(ticket: Ticket) -> Self {
        Self {
            ticket_id: ticket.ticket_id,
            subject: ticket.subject,
            description: ticket.description,
            created_at: ticket.created_at,
            resolved_at: ticket.resolved_at,
            is_active: ticket.is_active,
            status: ticket.status,
            assigned_to_employee_id: ticket.assigned_to_employee_id,
        }
    }
}

impl From<TicketRecord> for TicketDto {
    fn from(record: TicketRecord) -> Self {
        record.ticket.into()
    }
}

impl UserDto {
    fn new(user: User, ticket_ids: Vec<i32>) -> Self {
        Self {
            user_id: user.user_id,
            user_name: user.user_name,
            age: user.age,
            pronouns: user.pronouns,
            country: user.country,
            email: user.email,
            is_active: user.is_active,
            social_links: user.social_links,
            ticket_ids,
        }
    }
}

impl From<UserRecord> for UserDto {
    fn from(record: UserRecord) -> Self {
        let ids = ticket_ids(&record.tickets);
        UserDto::new(record.user, ids)
    }
}

impl EmployeeDto {
    fn new(employee: Employee, ticket_ids: Vec<i32>) -> Self {
        Self {
            employee_id: employee.employee_id,
            name: employee.name,
            email: employee.email,
            ticket_ids,
        }
    }
}

impl From<EmployeeRecord> for EmployeeDto {
    fn from(record: EmployeeRecord) -> Self {
        let ids = ticket_ids(&record.tickets);
        EmployeeDto::new(record.employee, ids)
    }
}
