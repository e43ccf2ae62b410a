//! Embedded schema migrations applied at service startup.
//!
//! Each service owns one table and embeds only its own migration set. The
//! harness needs a blocking connection, so migrations run on the blocking
//! thread pool.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

const NEWS_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/news");
const USERS_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/users");

/// Migration set to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationSet {
    /// Creates the `news` table.
    News,
    /// Creates the `users` table.
    Users,
}

impl MigrationSet {
    const fn migrations(self) -> EmbeddedMigrations {
        match self {
            Self::News => NEWS_MIGRATIONS,
            Self::Users => USERS_MIGRATIONS,
        }
    }
}

/// Failures while applying migrations.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// The database could not be reached.
    #[error("failed to connect for migrations: {0}")]
    Connect(#[from] diesel::ConnectionError),
    /// A migration failed to apply.
    #[error("failed to apply migrations: {0}")]
    Apply(String),
    /// The blocking task panicked or was cancelled.
    #[error("migration task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Apply every pending migration in `set` against `database_url`.
///
/// # Errors
/// Returns [`MigrationError`] when connecting or applying fails.
pub async fn run_migrations(database_url: &str, set: MigrationSet) -> Result<(), MigrationError> {
    let url = database_url.to_owned();
    tokio::task::spawn_blocking(move || {
        let mut conn = PgConnection::establish(&url)?;
        let applied = conn
            .run_pending_migrations(set.migrations())
            .map_err(|err| MigrationError::Apply(err.to_string()))?;
        info!(?set, applied = applied.len(), "database migrations applied");
        Ok(())
    })
    .await?
}
