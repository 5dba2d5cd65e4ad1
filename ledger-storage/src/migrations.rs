use diesel::Connection;
use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_async::AsyncPgConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use ledger_domain::DomainError;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Applies all pending migrations. Forward-only; a no-op run (nothing
/// pending) is not an error (spec.md §6 "Schema evolution").
///
/// `diesel_migrations` only runs against a blocking `diesel::Connection`, so
/// the async connection is bridged via `AsyncConnectionWrapper` and the
/// blocking work is offloaded to `spawn_blocking`, matching the pattern
/// `diesel-async` documents for one-shot migration runs at startup.
pub async fn run(database_url: &str) -> Result<(), DomainError> {
    let database_url = database_url.to_owned();

    tokio::task::spawn_blocking(move || {
        let mut wrapper: AsyncConnectionWrapper<AsyncPgConnection> =
            AsyncConnectionWrapper::establish(&database_url)
                .map_err(|e| DomainError::Internal(format!("connecting for migrations: {e}")))?;

        wrapper
            .run_pending_migrations(MIGRATIONS)
            .map(|_| ())
            .map_err(|e| DomainError::Internal(format!("running migrations: {e}")))
    })
    .await
    .map_err(|e| DomainError::Internal(format!("migration task panicked: {e}")))?
}
