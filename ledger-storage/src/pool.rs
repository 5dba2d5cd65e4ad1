use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::AsyncPgConnection;

use ledger_domain::DomainError;

/// Pooled async Postgres connection handle. `bb8` is the pool the teacher's
/// workspace already pins for `diesel-async`; checkouts are scoped to a
/// single storage call (spec.md §5 "Shared resources").
pub type ConnectionPool = Pool<AsyncPgConnection>;
pub type Connection<'a> = PooledConnection<'a, AsyncPgConnection>;

pub async fn connect(database_url: &str, max_size: u32) -> Result<ConnectionPool, DomainError> {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
    Pool::builder()
        .max_size(max_size)
        .build(manager)
        .await
        .map_err(|e| DomainError::Internal(format!("failed to build connection pool: {e}")))
}
