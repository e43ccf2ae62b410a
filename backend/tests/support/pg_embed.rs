//! Embedded PostgreSQL for the Diesel adapter suites.
//!
//! Every suite shares one cluster per test binary and gets its own temporary
//! database with the service's migrations applied. Setup failures panic
//! unless `SKIP_TEST_CLUSTER` is truthy, in which case the test is skipped
//! with a `SKIP-TEST-CLUSTER` marker.

use pg_embedded_setup_unpriv::TemporaryDatabase;
use pg_embedded_setup_unpriv::test_support::shared_cluster_handle;
use sportnews::outbound::persistence::{DbPool, MigrationSet, PoolConfig, run_migrations};
use tokio::runtime::Runtime;

/// A migrated temporary database and the runtime its pool lives on.
///
/// Field order is drop order: the pool closes before the database goes.
pub struct MigratedDatabase {
    pub pool: DbPool,
    pub runtime: Runtime,
    _database: TemporaryDatabase,
}

/// Returns true when `SKIP_TEST_CLUSTER` is "1", "true" or "yes".
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip with a marker when allowed, otherwise fail loudly.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

fn provision(set: MigrationSet) -> Result<MigratedDatabase, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster_handle().map_err(|err| format!("{err:?}"))?;
    let name = format!("test_{}", uuid::Uuid::new_v4().simple());
    let database = cluster
        .temporary_database(name.as_str())
        .map_err(|err| format!("{err:?}"))?;
    let url = database.url().to_string();

    let pool = runtime.block_on(async {
        run_migrations(&url, set)
            .await
            .map_err(|err| err.to_string())?;
        DbPool::connect(PoolConfig::new(&url).with_max_size(2))
            .await
            .map_err(|err| err.to_string())
    })?;

    Ok(MigratedDatabase {
        pool,
        runtime,
        _database: database,
    })
}

/// A fresh database migrated with `set`, or `None` when skipping.
pub fn migrated_database(set: MigrationSet) -> Option<MigratedDatabase> {
    match provision(set) {
        Ok(database) => Some(database),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}
