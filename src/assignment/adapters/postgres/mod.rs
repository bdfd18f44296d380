//! `PostgreSQL` adapters for fair-assignment persistence.
//!
//! Queries run on the blocking thread pool; each repository borrows a
//! shared `r2d2` connection pool built by the host.

mod assignment;
mod group;
mod member;
mod models;
mod schema;

pub use assignment::PostgresAssignmentRepository;
pub use group::PostgresGroupRepository;
pub use member::PostgresMemberRepository;

use crate::assignment::ports::{StoreError, StoreResult};
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};

/// `PostgreSQL` connection pool type used by assignment adapters.
pub type AssignmentPgPool = Pool<ConnectionManager<PgConnection>>;

async fn run_blocking<F, T>(pool: &AssignmentPgPool, f: F) -> StoreResult<T>
where
    F: FnOnce(&mut PgConnection) -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut connection = pool.get().map_err(StoreError::persistence)?;
        f(&mut connection)
    })
    .await
    .map_err(StoreError::persistence)?
}
