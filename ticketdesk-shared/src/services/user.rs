/// User lookups and per-user ticket listing

use super::{cancellable, ServiceResult};
use crate::{
    dto::{TicketDto, UserDto},
    models::ticket::TicketStatus,
    store::{
        query::{TicketPredicate, TicketQuery},
        EntityStore,
    },
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// User operations over an [`EntityStore`]
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn EntityStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Fetches a user with the IDs of the tickets it owns
    pub async fn get_user_by_id(
        &self,
        user_id: i32,
        token: &CancellationToken,
    ) -> ServiceResult<Option<UserDto>> {
        info!(user_id, "Getting user by id");

        let record = cancellable(token, self.store.find_user(user_id)).await?;
        if record.is_none() {
            warn!(user_id, "User not found");
        }

        Ok(record.map(UserDto::from))
    }

    /// Fetches a user by exact user name
    pub async fn get_user_by_name(
        &self,
        user_name: &str,
        token: &CancellationToken,
    ) -> ServiceResult<Option<UserDto>> {
        info!(user_name, "Getting user by name");

        let record = cancellable(token, self.store.find_user_by_name(user_name)).await?;
        if record.is_none() {
            warn!(user_name, "User not found");
        }

        Ok(record.map(UserDto::from))
    }

    /// Lists the tickets a user owns
    ///
    /// `status` restricts to one status; `is_active` restricts on the
    /// owner's active flag. An unknown user yields an empty list; callers
    /// that need a 404 check the user first.
    pub async fn get_tickets_for_user(
        &self,
        user_id: i32,
        status: Option<TicketStatus>,
        is_active: Option<bool>,
        token: &CancellationToken,
    ) -> ServiceResult<Vec<TicketDto>> {
        info!(user_id, status = ?status, is_active = ?is_active, "Getting tickets for user");

        let query = TicketQuery::new()
            .filter(TicketPredicate::OwnedBy(user_id))
            .where_some(status, TicketPredicate::HasStatus)
            .where_some(is_active, TicketPredicate::OwnerActive);

        let records = cancellable(token, self.store.query_tickets(&query)).await?;
        Ok(records.into_iter().map(TicketDto::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{
            ticket::CreateTicket,
            user::{CreateUser, Pronouns},
        },
        services::ServiceError,
        store::memory::MemoryStore,
    };
    use chrono::Utc;

    async fn store() -> Arc<MemoryStore> {
        let store = MemoryStore::new();
        let user = store
            .insert_user(CreateUser {
                user_name: "alice".to_string(),
                age: 30,
                pronouns: Pronouns::She,
                country: "Wonderland".to_string(),
                email: "alice@wonderland.com".to_string(),
                is_active: true,
                social_links: None,
            })
            .await;
        for status in [TicketStatus::Open, TicketStatus::InProgress] {
            store
                .insert_ticket(
                    CreateTicket::open(user.user_id, "s", "d", Utc::now()).with_status(status),
                )
                .await
                .unwrap();
        }
        Arc::new(store)
    }

    #[tokio::test]
    async fn test_get_user_by_id_and_name() {
        let service = UserService::new(store().await);
        let token = CancellationToken::new();

        let by_id = service.get_user_by_id(1, &token).await.unwrap().unwrap();
        assert_eq!(by_id.user_name, "alice");
        assert_eq!(by_id.ticket_ids, vec![1, 2]);

        let by_name = service.get_user_by_name("alice", &token).await.unwrap().unwrap();
        assert_eq!(by_name, by_id);

        assert!(service.get_user_by_id(2, &token).await.unwrap().is_none());
        assert!(service.get_user_by_name("Alice", &token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_status_filter() {
        let service = UserService::new(store().await);
        let tickets = service
            .get_tickets_for_user(1, Some(TicketStatus::Open), None, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].ticket_id, 1);
        assert_eq!(tickets[0].status, TicketStatus::Open);
    }

    #[tokio::test]
    async fn test_active_filter_checks_owner() {
        let service = UserService::new(store().await);
        let token = CancellationToken::new();

        let active = service.get_tickets_for_user(1, None, Some(true), &token).await.unwrap();
        assert_eq!(active.len(), 2);

        let inactive = service.get_tickets_for_user(1, None, Some(false), &token).await.unwrap();
        assert!(inactive.is_empty());

        let combined = service
            .get_tickets_for_user(1, Some(TicketStatus::InProgress), Some(true), &token)
            .await
            .unwrap();
        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0].ticket_id, 2);
    }

    #[tokio::test]
    async fn test_no_matches_is_empty_not_error() {
        let service = UserService::new(store().await);
        let tickets = service
            .get_tickets_for_user(1, Some(TicketStatus::Closed), None, &CancellationToken::new())
            .await
            .unwrap();

        assert!(tickets.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_lookup() {
        let service = UserService::new(store().await);
        let token = CancellationToken::new();
        token.cancel();

        let result = service.get_user_by_id(1, &token).await;
        assert!(matches!(result, Err(ServiceError::Cancelled)));
    }
}
