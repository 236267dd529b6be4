/// Database migration runner
///
/// Migrations are embedded from `ticketdesk-shared/migrations/` at compile
/// time, so the binary carries its own schema.
///
/// # Example
///
/// ```no_run
/// use ticketdesk_shared::db::pool::{create_pool, DatabaseConfig};
/// use ticketdesk_shared::db::migrations::{run_migrations, MigrationOutcome};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = create_pool(DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     })
///     .await?;
///
///     match run_migrations(&pool).await? {
///         MigrationOutcome::Created { .. } => println!("Database created"),
///         MigrationOutcome::Updated { .. } => println!("Database updated"),
///         MigrationOutcome::UpToDate => {}
///     }
///     Ok(())
/// }
/// ```

use sqlx::{migrate::MigrateDatabase, migrate::Migrator, postgres::PgPool, Postgres};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Embedded schema migrations
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Migration status information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Number of successfully applied migrations
    pub applied_migrations: usize,

    /// Latest applied migration version
    pub latest_version: Option<i64>,

    /// Embedded migrations not yet applied
    pub pending_migrations: usize,
}

impl MigrationStatus {
    pub fn is_up_to_date(&self) -> bool {
        self.pending_migrations == 0
    }
}

/// What `run_migrations` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Nothing was pending
    UpToDate,

    /// Schema built from scratch
    Created { applied: usize },

    /// Pending migrations applied on top of an existing schema
    Updated { applied: usize },
}

impl MigrationOutcome {
    fn from_counts(already_applied: usize, pending: usize) -> Self {
        match (already_applied, pending) {
            (_, 0) => MigrationOutcome::UpToDate,
            (0, applied) => MigrationOutcome::Created { applied },
            (_, applied) => MigrationOutcome::Updated { applied },
        }
    }
}

/// Applies every pending migration
///
/// # Errors
///
/// Returns an error if the status query or any migration fails. A failed
/// migration is rolled back.
pub async fn run_migrations(pool: &PgPool) -> Result<MigrationOutcome, sqlx::migrate::MigrateError> {
    let before = get_migration_status(pool).await?;
    let outcome = MigrationOutcome::from_counts(before.applied_migrations, before.pending_migrations);

    if outcome == MigrationOutcome::UpToDate {
        debug!("Database schema is up to date");
        return Ok(outcome);
    }

    info!(pending = before.pending_migrations, "Applying database migrations");

    if let Err(e) = MIGRATOR.run(pool).await {
        warn!(error = %e, "Migration failed");
        return Err(e);
    }

    match outcome {
        MigrationOutcome::Created { .. } => info!("The database has been created successfully"),
        _ => info!("The database has been updated successfully"),
    }

    Ok(outcome)
}

/// Reads applied migrations and compares them with the embedded set
///
/// # Errors
///
/// Returns an error if the migrations table cannot be queried
pub async fn get_migration_status(pool: &PgPool) -> Result<MigrationStatus, sqlx::Error> {
    let table_exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (
            SELECT FROM information_schema.tables
            WHERE table_schema = current_schema()
            AND table_name = '_sqlx_migrations'
        )",
    )
    .fetch_one(pool)
    .await?;

    let applied: Vec<i64> = if table_exists {
        sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success = true")
            .fetch_all(pool)
            .await?
    } else {
        Vec::new()
    };

    let applied_set: HashSet<i64> = applied.iter().copied().collect();
    let pending = MIGRATOR
        .iter()
        .filter(|m| !m.migration_type.is_down_migration())
        .filter(|m| !applied_set.contains(&m.version))
        .count();

    let status = MigrationStatus {
        applied_migrations: applied.len(),
        latest_version: applied.iter().copied().max(),
        pending_migrations: pending,
    };

    debug!(
        applied_migrations = status.applied_migrations,
        pending_migrations = status.pending_migrations,
        latest_version = ?status.latest_version,
        "Migration status retrieved"
    );

    Ok(status)
}

/// Creates the database named in `database_url` if it is missing
///
/// # Errors
///
/// Returns an error if the server is unreachable or creation is not
/// permitted
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if !Postgres::database_exists(database_url).await? {
        info!("Database does not exist, creating it");
        Postgres::create_database(database_url).await?;
    } else {
        debug!("Database already exists");
    }

    Ok(())
}
