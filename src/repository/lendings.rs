//! Lending record store
//!
//! The two races of the lending subsystem are both closed here, in storage:
//! the partial unique index `lendings_active_book_key` rejects a second
//! active loan for a book, and the unique `lending_id` column turns
//! identifier allocation into an insert-and-retry loop.

use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::lending::{BookSummary, Lending, LendingDetails, LendingId, ReaderSummary},
};

use super::with_read_retry;

/// Attempts before giving up on identifier allocation under contention
const ALLOCATE_RETRIES: usize = 5;

const DETAILS_SELECT: &str = r#"
    SELECT l.lending_id, l.book_id, l.reader_id, l.borrowed_at, l.due_at,
           l.returned, l.returned_at,
           r.id AS reader_ref, r.name AS reader_name, r.email AS reader_email,
           b.id AS book_ref, b.title AS book_title, b.author AS book_author
    FROM lendings l
    LEFT JOIN readers r ON r.id = l.reader_id
    LEFT JOIN books b ON b.id = l.book_id
"#;

#[derive(Clone)]
pub struct LendingsRepository {
    pool: Pool<Postgres>,
}

impl LendingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Identifier of the most recently allocated record, if any
    pub async fn last_allocated_id(&self) -> AppResult<Option<String>> {
        let last = with_read_retry(|| {
            sqlx::query_scalar::<_, String>(
                "SELECT lending_id FROM lendings ORDER BY id DESC LIMIT 1",
            )
            .fetch_optional(&self.pool)
        })
        .await?;
        Ok(last)
    }

    /// Persist a new lending record.
    ///
    /// Allocates the next lending identifier and inserts in one statement.
    /// Losing the identifier race to a concurrent allocation re-reads the
    /// sequence and retries; losing the active-book race is a conflict.
    pub async fn create(
        &self,
        reader_id: Uuid,
        book_id: Uuid,
        borrowed_at: DateTime<Utc>,
        due_at: DateTime<Utc>,
    ) -> AppResult<Lending> {
        for _ in 0..ALLOCATE_RETRIES {
            let last = self.last_allocated_id().await?;
            let next = LendingId::next_after(last.as_deref());

            let inserted = sqlx::query_as::<_, Lending>(
                r#"
                INSERT INTO lendings (lending_id, book_id, reader_id, borrowed_at, due_at, returned)
                VALUES ($1, $2, $3, $4, $5, FALSE)
                RETURNING *
                "#,
            )
            .bind(next.as_str())
            .bind(book_id)
            .bind(reader_id)
            .bind(borrowed_at)
            .bind(due_at)
            .fetch_one(&self.pool)
            .await;

            match inserted {
                Ok(lending) => return Ok(lending),
                Err(error) => match violated_constraint(&error) {
                    Some("lendings_active_book_key") => {
                        return Err(AppError::Conflict("Book is already lent out".to_string()))
                    }
                    Some("lendings_lending_id_key") => continue,
                    _ => return Err(error.into()),
                },
            }
        }

        Err(AppError::Internal(
            "Lending ID allocation exhausted its retry budget".to_string(),
        ))
    }

    pub async fn get(&self, lending_id: &str) -> AppResult<Option<Lending>> {
        let lending = with_read_retry(|| {
            sqlx::query_as::<_, Lending>("SELECT * FROM lendings WHERE lending_id = $1")
                .bind(lending_id)
                .fetch_optional(&self.pool)
        })
        .await?;
        Ok(lending)
    }

    /// Flip a record to returned.
    ///
    /// The `NOT returned` guard makes this a single atomic check-and-set:
    /// of two concurrent returns exactly one sees a row, the other gets
    /// `None` and the caller decides between missing and already returned.
    pub async fn mark_returned(
        &self,
        lending_id: &str,
        returned_at: DateTime<Utc>,
    ) -> AppResult<Option<Lending>> {
        let updated = sqlx::query_as::<_, Lending>(
            r#"
            UPDATE lendings
            SET returned = TRUE, returned_at = $2
            WHERE lending_id = $1 AND NOT returned
            RETURNING *
            "#,
        )
        .bind(lending_id)
        .bind(returned_at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    /// Administrative hard delete
    pub async fn delete(&self, lending_id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM lendings WHERE lending_id = $1")
            .bind(lending_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Fast-path availability probe; `lendings_active_book_key` stays the
    /// authoritative guard at insert time.
    pub async fn has_active_for_book(&self, book_id: Uuid) -> AppResult<bool> {
        let exists = with_read_retry(|| {
            sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM lendings WHERE book_id = $1 AND NOT returned)",
            )
            .bind(book_id)
            .fetch_one(&self.pool)
        })
        .await?;
        Ok(exists)
    }

    /// All lending records, enriched
    pub async fn find_all(&self) -> AppResult<Vec<LendingDetails>> {
        let sql = format!("{DETAILS_SELECT} ORDER BY l.borrowed_at DESC");
        let rows = with_read_retry(|| sqlx::query(&sql).fetch_all(&self.pool)).await?;
        Ok(collect_details(&rows))
    }

    /// Lending history filtered by reader and/or book, enriched
    pub async fn find_history(
        &self,
        reader_id: Option<Uuid>,
        book_id: Option<Uuid>,
    ) -> AppResult<Vec<LendingDetails>> {
        let sql = format!(
            r#"{DETAILS_SELECT}
            WHERE ($1::uuid IS NULL OR l.reader_id = $1)
              AND ($2::uuid IS NULL OR l.book_id = $2)
            ORDER BY l.borrowed_at DESC"#
        );
        let rows = with_read_retry(|| {
            sqlx::query(&sql)
                .bind(reader_id)
                .bind(book_id)
                .fetch_all(&self.pool)
        })
        .await?;
        Ok(collect_details(&rows))
    }

    /// Active records whose due date has passed, enriched
    pub async fn find_overdue(&self, now: DateTime<Utc>) -> AppResult<Vec<LendingDetails>> {
        let sql = format!("{DETAILS_SELECT} WHERE NOT l.returned AND l.due_at < $1 ORDER BY l.due_at");
        let rows = with_read_retry(|| {
            sqlx::query(&sql).bind(now).fetch_all(&self.pool)
        })
        .await?;
        Ok(collect_details(&rows))
    }

    pub async fn count_all(&self) -> AppResult<i64> {
        let count = with_read_retry(|| {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM lendings").fetch_one(&self.pool)
        })
        .await?;
        Ok(count)
    }

    pub async fn count_active(&self) -> AppResult<i64> {
        let count = with_read_retry(|| {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM lendings WHERE NOT returned")
                .fetch_one(&self.pool)
        })
        .await?;
        Ok(count)
    }

    pub async fn count_overdue(&self) -> AppResult<i64> {
        let count = with_read_retry(|| {
            sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM lendings WHERE NOT returned AND due_at < now()",
            )
            .fetch_one(&self.pool)
        })
        .await?;
        Ok(count)
    }
}

fn violated_constraint(error: &sqlx::Error) -> Option<&str> {
    match error {
        sqlx::Error::Database(db) => db.constraint(),
        _ => None,
    }
}

fn collect_details(rows: &[PgRow]) -> Vec<LendingDetails> {
    let now = Utc::now();
    rows.iter().map(|row| details_from_row(row, now)).collect()
}

fn details_from_row(row: &PgRow, now: DateTime<Utc>) -> LendingDetails {
    let returned: bool = row.get("returned");
    let due_at: DateTime<Utc> = row.get("due_at");

    let reader = row
        .get::<Option<Uuid>, _>("reader_ref")
        .map(|id| ReaderSummary {
            id,
            name: row.get("reader_name"),
            email: row.get("reader_email"),
        });
    let book = row.get::<Option<Uuid>, _>("book_ref").map(|id| BookSummary {
        id,
        title: row.get("book_title"),
        author: row.get("book_author"),
    });

    LendingDetails {
        lending_id: row.get("lending_id"),
        book_id: row.get("book_id"),
        reader_id: row.get("reader_id"),
        borrowed_at: row.get("borrowed_at"),
        due_at,
        returned,
        returned_at: row.get("returned_at"),
        reader,
        book,
        is_overdue: !returned && due_at < now,
    }
}
