//! Repository layer for database operations

pub mod books;
pub mod lendings;
pub mod readers;
pub mod users;

use std::time::Duration;

use sqlx::{Pool, Postgres};

/// Retry budget for idempotent reads hitting transient failures
const READ_RETRIES: usize = 2;
const READ_RETRY_DELAY: Duration = Duration::from_millis(100);

pub(crate) fn is_transient(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut)
}

/// Retry an idempotent read across transient infrastructure failures.
/// Writes are never routed through here.
pub(crate) async fn with_read_retry<T, F, Fut>(mut op: F) -> Result<T, sqlx::Error>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, sqlx::Error>>,
{
    let mut attempts = 0;
    loop {
        match op().await {
            Err(error) if is_transient(&error) && attempts < READ_RETRIES => {
                attempts += 1;
                tracing::warn!(
                    "Transient database error, retrying read ({}/{}): {}",
                    attempts,
                    READ_RETRIES,
                    error
                );
                tokio::time::sleep(READ_RETRY_DELAY).await;
            }
            result => return result,
        }
    }
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub readers: readers::ReadersRepository,
    pub lendings: lendings::LendingsRepository,
    pub users: users::UsersRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            readers: readers::ReadersRepository::new(pool.clone()),
            lendings: lendings::LendingsRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            pool,
        }
    }
}
