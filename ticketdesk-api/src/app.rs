/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use ticketdesk_api::{app::{build_router, AppState}, config::Config};
/// use ticketdesk_shared::store::memory::MemoryStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryStore::seeded().await), config)?;
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::api_key::require_api_key, routes};
use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use sqlx::PgPool;
use std::{any::Any, sync::Arc};
use ticketdesk_shared::{
    auth::api_key::{ApiKeyError, ApiKeyValidator},
    services::{EmployeeService, TicketService, UserService},
    store::EntityStore,
};
use tokio_util::sync::CancellationToken;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub tickets: TicketService,
    pub users: UserService,
    pub employees: EmployeeService,

    /// Validator for the shared-secret header
    pub api_key: Arc<ApiKeyValidator>,

    /// Application configuration
    pub config: Arc<Config>,

    /// Database pool, when the store is PostgreSQL (used by `/health`)
    pub db: Option<PgPool>,

    /// Cancelled on graceful shutdown; parent of every request token
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Creates application state over a store
    ///
    /// # Errors
    ///
    /// Returns an error if the configured API key is empty
    pub fn new(store: Arc<dyn EntityStore>, config: Config) -> Result<Self, ApiKeyError> {
        let api_key = ApiKeyValidator::new(&config.auth.api_key)?;

        Ok(Self {
            tickets: TicketService::new(store.clone()),
            users: UserService::new(store.clone()),
            employees: EmployeeService::new(store),
            api_key: Arc::new(api_key),
            config: Arc::new(config),
            db: None,
            shutdown: CancellationToken::new(),
        })
    }

    /// Attaches the database pool for health reporting
    pub fn with_pool(mut self, db: PgPool) -> Self {
        self.db = Some(db);
        self
    }

    /// Uses an externally owned shutdown token
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Token for one request's store calls; fires on server shutdown
    pub fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                               # Health check (public)
/// └── /api/v1/                              # API key required
///     ├── GET  /employees
///     ├── GET  /employees/:id
///     ├── GET  /tickets
///     ├── POST /tickets
///     ├── GET  /tickets/:id
///     ├── GET  /users/:id
///     ├── GET  /users/:id/tickets
///     └── GET  /users/by-username/:username
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Panic recovery (500 problem body)
/// 2. CORS (tower-http CorsLayer)
/// 3. Logging (tower-http TraceLayer)
/// 4. API key gate (`/api/v1` routes only)
pub fn build_router(state: AppState) -> Router {
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let v1_routes = Router::new()
        .route("/employees", get(routes::employees::get_all_employees))
        .route("/employees/:id", get(routes::employees::get_employee_by_id))
        .route(
            "/tickets",
            get(routes::tickets::get_tickets).post(routes::tickets::create_ticket),
        )
        .route("/tickets/:id", get(routes::tickets::get_ticket_by_id))
        .route("/users/:id", get(routes::users::get_user_by_id))
        .route("/users/:id/tickets", get(routes::users::get_tickets_for_user))
        .route(
            "/users/by-username/:username",
            get(routes::users::get_user_by_name),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    let cors = cors_layer(&state.config.api.cors_origins);

    Router::new()
        .merge(health_routes)
        .nest("/api/v1", v1_routes)
        .fallback(routes::not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

/// Configures CORS; `*` means any origin
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-api-key")])
        .expose_headers([header::LOCATION])
        .max_age(std::time::Duration::from_secs(3600))
}

/// Turns a handler panic into a 500 problem body
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");

    tracing::error!(panic = message, "Handler panicked");
    ApiError::InternalError(None).into_response()
}
