//! Books repository for database operations

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
};

use super::with_read_retry;

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let books = with_read_retry(|| {
            sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY title").fetch_all(&self.pool)
        })
        .await?;
        Ok(books)
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Book> {
        with_read_retry(|| {
            sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
        })
        .await?
        .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
    }

    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, description, language)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.description)
        .bind(&book.language)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    pub async fn update(&self, id: Uuid, book: &UpdateBook) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = COALESCE($2, title),
                author = COALESCE($3, author),
                description = COALESCE($4, description),
                language = COALESCE($5, language)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.description)
        .bind(&book.language)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Book not found".to_string()));
        }
        Ok(())
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count = with_read_retry(|| {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM books").fetch_one(&self.pool)
        })
        .await?;
        Ok(count)
    }
}
