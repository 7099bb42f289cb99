//! Lending lifecycle service
//!
//! Owns every state transition of a lending record: creation against the
//! single-active-loan rule, the one-shot return flip, history and overdue
//! queries, and the administrative delete.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::{
    config::LendingConfig,
    error::{AppError, AppResult},
    models::lending::{Lending, LendingDetails, LendingId},
    repository::Repository,
};

#[derive(Clone)]
pub struct LendingsService {
    repository: Repository,
    policy: LendingConfig,
}

impl LendingsService {
    pub fn new(repository: Repository, policy: LendingConfig) -> Self {
        Self { repository, policy }
    }

    /// Lend a book to a reader
    pub async fn create_lending(
        &self,
        reader_ref: &str,
        book_ref: &str,
        due_at: Option<DateTime<Utc>>,
    ) -> AppResult<Lending> {
        let reader_id = parse_reader_ref(reader_ref)?;
        let book_id = parse_book_ref(book_ref)?;

        self.repository.readers.get_by_id(reader_id).await?;
        self.repository.books.get_by_id(book_id).await?;

        // Fast path; the partial unique index still guards the insert
        if self.repository.lendings.has_active_for_book(book_id).await? {
            return Err(AppError::Conflict("Book is already lent out".to_string()));
        }

        let now = Utc::now();
        let due_at = match due_at {
            Some(due) if due <= now => {
                return Err(AppError::Validation(
                    "Due date must be in the future".to_string(),
                ))
            }
            Some(due) => due,
            None => now + Duration::days(self.policy.loan_period_days),
        };

        self.repository
            .lendings
            .create(reader_id, book_id, now, due_at)
            .await
    }

    /// Return a borrowed book
    pub async fn return_lending(&self, lending_ref: &str) -> AppResult<Lending> {
        let lending_id = LendingId::parse(lending_ref)?;
        let now = Utc::now();

        match self
            .repository
            .lendings
            .mark_returned(lending_id.as_str(), now)
            .await?
        {
            Some(lending) => Ok(lending),
            // No unreturned row matched: distinguish a missing record from
            // one that was already returned.
            None => match self.repository.lendings.get(lending_id.as_str()).await? {
                Some(_) => Err(AppError::Conflict("Book already returned".to_string())),
                None => Err(AppError::NotFound("Lending record not found".to_string())),
            },
        }
    }

    /// All lending records, enriched for display
    pub async fn list_all(&self) -> AppResult<Vec<LendingDetails>> {
        self.repository.lendings.find_all().await
    }

    /// Lending history, optionally narrowed to a reader and/or a book
    pub async fn list_history(
        &self,
        reader_ref: Option<&str>,
        book_ref: Option<&str>,
    ) -> AppResult<Vec<LendingDetails>> {
        let reader_id = reader_ref.map(parse_reader_ref).transpose()?;
        let book_id = book_ref.map(parse_book_ref).transpose()?;
        self.repository.lendings.find_history(reader_id, book_id).await
    }

    /// Active lendings whose due date has passed
    pub async fn list_overdue(&self) -> AppResult<Vec<LendingDetails>> {
        self.repository.lendings.find_overdue(Utc::now()).await
    }

    /// Administrative hard delete of a lending record
    pub async fn delete_lending(&self, lending_ref: &str) -> AppResult<()> {
        let lending_id = LendingId::parse(lending_ref)?;
        if !self.repository.lendings.delete(lending_id.as_str()).await? {
            return Err(AppError::NotFound("Lending record not found".to_string()));
        }
        Ok(())
    }
}

fn parse_reader_ref(value: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value).map_err(|_| AppError::Validation("Invalid reader ID".to_string()))
}

fn parse_book_ref(value: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value).map_err(|_| AppError::Validation("Invalid book ID".to_string()))
}
