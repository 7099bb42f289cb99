//! Readers repository for database operations

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::reader::{CreateReader, Reader, UpdateReader},
};

use super::with_read_retry;

#[derive(Clone)]
pub struct ReadersRepository {
    pool: Pool<Postgres>,
}

impl ReadersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<Reader>> {
        let readers = with_read_retry(|| {
            sqlx::query_as::<_, Reader>("SELECT * FROM readers ORDER BY name").fetch_all(&self.pool)
        })
        .await?;
        Ok(readers)
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Reader> {
        with_read_retry(|| {
            sqlx::query_as::<_, Reader>("SELECT * FROM readers WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
        })
        .await?
        .ok_or_else(|| AppError::NotFound("Reader not found".to_string()))
    }

    pub async fn create(&self, reader: &CreateReader) -> AppResult<Reader> {
        let created = sqlx::query_as::<_, Reader>(
            r#"
            INSERT INTO readers (name, email, phone, address)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&reader.name)
        .bind(&reader.email)
        .bind(&reader.phone)
        .bind(&reader.address)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| match violated_constraint(&error) {
            Some("readers_email_key") => {
                AppError::Conflict("A reader with this email already exists".to_string())
            }
            _ => error.into(),
        })?;
        Ok(created)
    }

    pub async fn update(&self, id: Uuid, reader: &UpdateReader) -> AppResult<Reader> {
        sqlx::query_as::<_, Reader>(
            r#"
            UPDATE readers
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                address = COALESCE($5, address),
                is_active = COALESCE($6, is_active)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&reader.name)
        .bind(&reader.email)
        .bind(&reader.phone)
        .bind(&reader.address)
        .bind(reader.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| match violated_constraint(&error) {
            Some("readers_email_key") => {
                AppError::Conflict("A reader with this email already exists".to_string())
            }
            _ => error.into(),
        })?
        .ok_or_else(|| AppError::NotFound("Reader not found".to_string()))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM readers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Reader not found".to_string()));
        }
        Ok(())
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count = with_read_retry(|| {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM readers").fetch_one(&self.pool)
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
