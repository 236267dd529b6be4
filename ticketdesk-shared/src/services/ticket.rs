/// Ticket listing, lookup and creation
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tokio_util::sync::CancellationToken;
/// use ticketdesk_shared::services::{NewTicket, TicketListFilter, TicketService};
/// use ticketdesk_shared::store::memory::MemoryStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let service = TicketService::new(Arc::new(MemoryStore::seeded().await));
/// let token = CancellationToken::new();
///
/// let id = service
///     .create_ticket(NewTicket::new(1, "Printer jam", "Tray 2 is stuck"), &token)
///     .await?;
/// assert!(id.is_some());
///
/// let tickets = service
///     .get_tickets(TicketListFilter { user_id: Some(1), ..Default::default() }, &token)
///     .await?;
/// assert_eq!(tickets.len(), 2);
/// # Ok(())
/// # }
/// ```

use super::{cancellable, ServiceResult};
use crate::{
    dto::TicketDto,
    models::ticket::CreateTicket,
    store::{
        query::{TicketPredicate, TicketQuery},
        EntityStore,
    },
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Cap applied to ticket listings when the caller does not pick one
pub const DEFAULT_RESULT_COUNT: i32 = 20;

/// Optional filters for [`TicketService::get_tickets`]
///
/// `Default` leaves every filter unset and caps the result at
/// [`DEFAULT_RESULT_COUNT`]. A `result_count` of `None`, zero or less means
/// no cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketListFilter {
    pub user_id: Option<i32>,
    pub created_before: Option<DateTime<Utc>>,
    pub created_after: Option<DateTime<Utc>>,
    pub assigned_to_employee_id: Option<i32>,
    pub result_count: Option<i32>,
}

impl Default for TicketListFilter {
    fn default() -> Self {
        Self {
            user_id: None,
            created_before: None,
            created_after: None,
            assigned_to_employee_id: None,
            result_count: Some(DEFAULT_RESULT_COUNT),
        }
    }
}

impl TicketListFilter {
    pub fn to_query(&self) -> TicketQuery {
        TicketQuery::new()
            .where_some(self.user_id, TicketPredicate::OwnedBy)
            .where_some(self.created_before, TicketPredicate::CreatedBefore)
            .where_some(self.created_after, TicketPredicate::CreatedAfter)
            .where_some(self.assigned_to_employee_id, TicketPredicate::AssignedTo)
            .take_if_positive(self.result_count)
    }
}

/// Input for [`TicketService::create_ticket`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    pub user_id: i32,
    pub subject: String,
    pub description: String,
}

impl NewTicket {
    pub fn new(user_id: i32, subject: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            user_id,
            subject: subject.into(),
            description: description.into(),
        }
    }
}

/// Ticket operations over an [`EntityStore`]
#[derive(Clone)]
pub struct TicketService {
    store: Arc<dyn EntityStore>,
}

impl TicketService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Fetches one ticket, or `None` when the ID is unknown
    pub async fn get_ticket_by_id(
        &self,
        ticket_id: i32,
        token: &CancellationToken,
    ) -> ServiceResult<Option<TicketDto>> {
        info!(ticket_id, "Getting ticket by id");

        let record = cancellable(token, self.store.find_ticket(ticket_id)).await?;
        if record.is_none() {
            warn!(ticket_id, "Ticket not found");
        }

        Ok(record.map(TicketDto::from))
    }

    /// Lists tickets matching every filter that is set
    pub async fn get_tickets(
        &self,
        filter: TicketListFilter,
        token: &CancellationToken,
    ) -> ServiceResult<Vec<TicketDto>> {
        info!(
            user_id = ?filter.user_id,
            created_before = ?filter.created_before,
            created_after = ?filter.created_after,
            assigned_to_employee_id = ?filter.assigned_to_employee_id,
            result_count = ?filter.result_count,
            "Getting tickets"
        );

        let query = filter.to_query();
        let records = cancellable(token, self.store.query_tickets(&query)).await?;

        Ok(records.into_iter().map(TicketDto::from).collect())
    }

    /// Opens a ticket for an existing user
    ///
    /// The ticket starts `Open`, active, unassigned and stamped with the
    /// current time. Returns the new ID, or `None` when the user does not
    /// exist. Identical requests create distinct tickets.
    pub async fn create_ticket(
        &self,
        new_ticket: NewTicket,
        token: &CancellationToken,
    ) -> ServiceResult<Option<i32>> {
        let user_id = new_ticket.user_id;
        info!(user_id, subject = %new_ticket.subject, "Creating ticket");

        let data = CreateTicket::open(
            user_id,
            new_ticket.subject,
            new_ticket.description,
            Utc::now(),
        );

        match cancellable(token, self.store.create_ticket_for_user(data)).await? {
            Some(ticket) => {
                info!(user_id, ticket_id = ticket.ticket_id, "Ticket created");
                Ok(Some(ticket.ticket_id))
            }
            None => {
                warn!(user_id, "User not found, ticket not created");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{
            employee::CreateEmployee,
            ticket::TicketStatus,
            user::{CreateUser, Pronouns},
        },
        services::ServiceError,
        store::memory::MemoryStore,
    };
    use chrono::Duration;

    fn user(name: &str, active: bool) -> CreateUser {
        CreateUser {
            user_name: name.to_string(),
            age: 30,
            pronouns: Pronouns::They,
            country: "USA".to_string(),
            email: format!("{name}@example.com"),
            is_active: active,
            social_links: None,
        }
    }

    async fn store_with_tickets(count: usize) -> Arc<MemoryStore> {
        let store = MemoryStore::new();
        let owner = store.insert_user(user("alice", true)).await;
        let now = Utc::now();
        for i in 0..count {
            store
                .insert_ticket(CreateTicket::open(owner.user_id, format!("t{i}"), "d", now))
                .await
                .unwrap();
        }
        Arc::new(store)
    }

    fn no_cap(result_count: i32) -> TicketListFilter {
        TicketListFilter {
            result_count: Some(result_count),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_default_filter_caps_at_twenty() {
        let service = TicketService::new(store_with_tickets(25).await);
        let token = CancellationToken::new();

        let tickets = service.get_tickets(TicketListFilter::default(), &token).await.unwrap();
        assert_eq!(tickets.len(), DEFAULT_RESULT_COUNT as usize);
    }

    #[tokio::test]
    async fn test_zero_or_negative_count_means_no_cap() {
        let service = TicketService::new(store_with_tickets(25).await);
        let token = CancellationToken::new();

        for count in [0, -1, -100] {
            let tickets = service.get_tickets(no_cap(count), &token).await.unwrap();
            assert_eq!(tickets.len(), 25, "result_count {count}");
        }

        let uncapped = TicketListFilter { result_count: None, ..Default::default() };
        assert_eq!(service.get_tickets(uncapped, &token).await.unwrap().len(), 25);
    }

    #[tokio::test]
    async fn test_positive_count_truncates() {
        let service = TicketService::new(store_with_tickets(5).await);
        let tickets = service
            .get_tickets(no_cap(3), &CancellationToken::new())
            .await
            .unwrap();

        let ids: Vec<i32> = tickets.iter().map(|t| t.ticket_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_filters_are_conjunctive() {
        let store = MemoryStore::new();
        let alice = store.insert_user(user("alice", true)).await;
        let bob = store.insert_user(user("bob", true)).await;
        let employee = store
            .insert_employee(CreateEmployee {
                name: "Alice Smith".to_string(),
                email: "alice.smith@example.com".to_string(),
            })
            .await;

        let base = Utc::now();
        let old = base - Duration::days(10);
        let recent = base - Duration::days(1);

        let t1 = store
            .insert_ticket(CreateTicket::open(alice.user_id, "old", "d", old).assigned_to(employee.employee_id))
            .await
            .unwrap();
        let t2 = store
            .insert_ticket(CreateTicket::open(alice.user_id, "recent", "d", recent).assigned_to(employee.employee_id))
            .await
            .unwrap();
        store
            .insert_ticket(CreateTicket::open(alice.user_id, "unassigned", "d", recent))
            .await
            .unwrap();
        store
            .insert_ticket(CreateTicket::open(bob.user_id, "bob", "d", recent).assigned_to(employee.employee_id))
            .await
            .unwrap();

        let service = TicketService::new(Arc::new(store));
        let token = CancellationToken::new();

        let assigned_to_alice = service
            .get_tickets(
                TicketListFilter {
                    user_id: Some(alice.user_id),
                    assigned_to_employee_id: Some(employee.employee_id),
                    ..no_cap(0)
                },
                &token,
            )
            .await
            .unwrap();
        let ids: Vec<i32> = assigned_to_alice.iter().map(|t| t.ticket_id).collect();
        assert_eq!(ids, vec![t1.ticket_id, t2.ticket_id]);

        let recent_only = service
            .get_tickets(
                TicketListFilter {
                    user_id: Some(alice.user_id),
                    assigned_to_employee_id: Some(employee.employee_id),
                    created_after: Some(base - Duration::days(5)),
                    ..no_cap(0)
                },
                &token,
            )
            .await
            .unwrap();
        assert_eq!(recent_only.len(), 1);
        assert_eq!(recent_only[0].ticket_id, t2.ticket_id);

        let before_old = service
            .get_tickets(TicketListFilter { created_before: Some(old), ..no_cap(0) }, &token)
            .await
            .unwrap();
        assert!(before_old.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_assignee_matches_nothing() {
        let service = TicketService::new(store_with_tickets(3).await);
        let tickets = service
            .get_tickets(
                TicketListFilter { assigned_to_employee_id: Some(1), ..Default::default() },
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert!(tickets.is_empty());
    }

    #[tokio::test]
    async fn test_create_ticket_for_existing_user() {
        let store = store_with_tickets(0).await;
        let service = TicketService::new(store.clone());
        let token = CancellationToken::new();

        let id = service
            .create_ticket(NewTicket::new(1, "Login Issue", "Cannot login"), &token)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(store.ticket_count().await, 1);

        let ticket = service.get_ticket_by_id(id, &token).await.unwrap().unwrap();
        assert_eq!(ticket.subject, "Login Issue");
        assert_eq!(ticket.description, "Cannot login");
        assert_eq!(ticket.status, TicketStatus::Open);
        assert!(ticket.is_active);
        assert_eq!(ticket.assigned_to_employee_id, None);
        assert_eq!(ticket.resolved_at, None);
    }

    #[tokio::test]
    async fn test_create_ticket_for_unknown_user() {
        let store = store_with_tickets(2).await;
        let service = TicketService::new(store.clone());

        let id = service
            .create_ticket(NewTicket::new(42, "s", "d"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(id, None);
        assert_eq!(store.ticket_count().await, 2);
    }

    #[tokio::test]
    async fn test_identical_creates_are_not_deduplicated() {
        let store = store_with_tickets(0).await;
        let service = TicketService::new(store.clone());
        let token = CancellationToken::new();

        let (a, b) = tokio::join!(
            service.create_ticket(NewTicket::new(1, "Same", "Same"), &token),
            service.create_ticket(NewTicket::new(1, "Same", "Same"), &token),
        );

        assert_ne!(a.unwrap(), b.unwrap());
        assert_eq!(store.ticket_count().await, 2);
    }

    #[tokio::test]
    async fn test_cancelled_create_writes_nothing() {
        let store = store_with_tickets(0).await;
        let service = TicketService::new(store.clone());
        let token = CancellationToken::new();
        token.cancel();

        let result = service.create_ticket(NewTicket::new(1, "s", "d"), &token).await;

        assert!(matches!(result, Err(ServiceError::Cancelled)));
        assert_eq!(store.ticket_count().await, 0);
    }

    #[tokio::test]
    async fn test_get_ticket_by_unknown_id() {
        let service = TicketService::new(store_with_tickets(1).await);
        let ticket = service.get_ticket_by_id(99, &CancellationToken::new()).await.unwrap();
        assert!(ticket.is_none());
    }
}
