//! Staff accounts repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::User,
};

use super::with_read_retry;

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        let users = with_read_retry(|| {
            sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY name").fetch_all(&self.pool)
        })
        .await?;
        Ok(users)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        with_read_retry(|| {
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
        })
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = with_read_retry(|| {
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
        })
        .await?;
        Ok(user)
    }

    pub async fn create(&self, name: &str, email: &str, password_hash: &str) -> AppResult<User> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| match &error {
            sqlx::Error::Database(db) if db.constraint() == Some("users_email_key") => {
                AppError::Conflict("Email already in use".to_string())
            }
            _ => error.into(),
        })?;
        Ok(created)
    }
}
