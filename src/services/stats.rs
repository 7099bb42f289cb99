//! Dashboard summary service

use crate::{error::AppResult, repository::Repository};

/// Counters shown on the admin dashboard
#[derive(Debug, Clone, Copy)]
pub struct DashboardSummary {
    pub total_books: i64,
    pub total_readers: i64,
    pub total_lendings: i64,
    pub active_lendings: i64,
    pub overdue_lendings: i64,
}

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Cheap connectivity probe for the readiness endpoint
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.repository.pool).await?;
        Ok(())
    }

    pub async fn summary(&self) -> AppResult<DashboardSummary> {
        let (total_books, total_readers, total_lendings, active_lendings, overdue_lendings) = tokio::try_join!(
            self.repository.books.count(),
            self.repository.readers.count(),
            self.repository.lendings.count_all(),
            self.repository.lendings.count_active(),
            self.repository.lendings.count_overdue(),
        )?;

        Ok(DashboardSummary {
            total_books,
            total_readers,
            total_lendings,
            active_lendings,
            overdue_lendings,
        })
    }
}
