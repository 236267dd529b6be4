/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - An in-memory store the router runs against
/// - Request helpers that attach (or omit) the API key
/// - Response decoding

use axum::{
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use ticketdesk_api::{
    app::{build_router, AppState},
    config::{ApiConfig, AuthConfig, Config, DatabaseConfig, Environment, StartupConfig},
};
use ticketdesk_shared::{
    auth::api_key::API_KEY_HEADER,
    models::{
        ticket::{CreateTicket, Ticket, TicketStatus},
        user::{CreateUser, Pronouns, User},
    },
    store::memory::MemoryStore,
};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

pub const TEST_API_KEY: &str = "test-api-key";

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub app: Router,
    pub shutdown: CancellationToken,
}

/// Decoded response
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: Environment::Development,
            cors_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            url: "postgresql://unused".to_string(),
            max_connections: 1,
        },
        auth: AuthConfig {
            api_key: TEST_API_KEY.to_string(),
        },
        startup: StartupConfig {
            run_migrations: false,
            seed_data: false,
        },
    }
}

impl TestContext {
    /// Router over an empty store
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }

    /// Router over the default seed data
    pub async fn seeded() -> Self {
        Self::with_store(MemoryStore::seeded().await)
    }

    pub fn with_store(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        let shutdown = CancellationToken::new();
        let state = AppState::new(store.clone(), test_config())
            .expect("valid api key")
            .with_shutdown(shutdown.clone());

        Self {
            store,
            app: build_router(state),
            shutdown,
        }
    }

    /// Sends a request with the valid API key
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, Some(TEST_API_KEY)).await
    }

    pub async fn post(&self, uri: &str) -> TestResponse {
        self.send(Method::POST, uri, Some(TEST_API_KEY)).await
    }

    /// Sends a request with an explicit (or no) API key
    pub async fn send(&self, method: Method, uri: &str, api_key: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(key) = api_key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        let request = builder.body(Body::empty()).unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                panic!("non-JSON body ({e}): {}", String::from_utf8_lossy(&bytes))
            })
        };

        TestResponse { status, headers, body }
    }

    pub async fn add_user(&self, user_name: &str, is_active: bool) -> User {
        self.store
            .insert_user(CreateUser {
                user_name: user_name.to_string(),
                age: 28,
                pronouns: Pronouns::She,
                country: "Ireland".to_string(),
                email: format!("{user_name}@example.com"),
                is_active,
                social_links: None,
            })
            .await
    }

    pub async fn add_ticket(
        &self,
        user_id: i32,
        status: TicketStatus,
        created_at: DateTime<Utc>,
        assignee: Option<i32>,
    ) -> Ticket {
        let mut data = CreateTicket::open(user_id, "Subject", "Description", created_at)
            .with_status(status);
        data.assigned_to_employee_id = assignee;
        self.store.insert_ticket(data).await.expect("owner exists")
    }
}

/// Asserts a problem body with the given status and detail
pub fn assert_problem(response: &TestResponse, status: u16, detail: &str) {
    assert_eq!(response.status.as_u16(), status, "body: {}", response.body);
    assert_eq!(
        response.headers.get("content-type").unwrap(),
        "application/problem+json"
    );
    assert_eq!(response.body["status"], status);
    assert!(response.body["title"].is_string());
    assert_eq!(response.body["detail"], detail);
}
