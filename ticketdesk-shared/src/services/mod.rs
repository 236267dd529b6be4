/// Application services
///
/// Services sit between the HTTP handlers and the [`EntityStore`]. They
/// build queries, call the store and map records to DTOs.
///
/// # Cancellation
///
/// Every operation takes a [`CancellationToken`]. The store call is raced
/// against the token; when the token fires first the store future is
/// dropped, which returns its pooled connection (or rolls back its
/// transaction), and the operation yields [`ServiceError::Cancelled`].
///
/// [`EntityStore`]: crate::store::EntityStore

pub mod employee;
pub mod ticket;
pub mod user;

use crate::store::{StoreError, StoreResult};
use std::future::Future;
use tokio_util::sync::CancellationToken;

pub use employee::EmployeeService;
pub use ticket::{NewTicket, TicketListFilter, TicketService, DEFAULT_RESULT_COUNT};
pub use user::UserService;

/// Service error type
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The caller's token fired before the store answered
    #[error("Operation cancelled")]
    Cancelled,
}

/// Service result type alias
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Runs a store call unless `token` is cancelled first
///
/// An already-cancelled token wins without polling `fut`.
pub(crate) async fn cancellable<T, F>(token: &CancellationToken, fut: F) -> ServiceResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => {
            tracing::debug!("Store call cancelled");
            Err(ServiceError::Cancelled)
        }
        result = fut => Ok(result?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_cancellable_passes_result_through() {
        let token = CancellationToken::new();
        let value = cancellable(&token, async { Ok::<_, StoreError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_cancelled_token_skips_future() {
        let token = CancellationToken::new();
        token.cancel();

        let mut polled = false;
        let result = cancellable(&token, async {
            polled = true;
            Ok::<_, StoreError>(())
        })
        .await;

        assert!(matches!(result, Err(ServiceError::Cancelled)));
        assert!(!polled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_while_pending() {
        let token = CancellationToken::new();
        let trigger = token.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let result = cancellable(&token, async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, StoreError>(())
        })
        .await;

        assert!(matches!(result, Err(ServiceError::Cancelled)));
    }
}
