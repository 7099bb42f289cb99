//! Authentication and staff account service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{CreateUser, TokenScope, User, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new staff account
    pub async fn signup(&self, request: CreateUser) -> AppResult<User> {
        if self
            .repository
            .users
            .get_by_email(&request.email)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Email already in use".to_string()));
        }

        let password_hash = self.hash_password(&request.password)?;
        self.repository
            .users
            .create(&request.name, &request.email, &password_hash)
            .await
    }

    /// Authenticate by email and password, returning the account together
    /// with a fresh access/refresh token pair
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(User, String, String)> {
        let user = self
            .repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !self.verify_password(&user, password)? {
            return Err(AppError::Authentication(
                "Invalid email or password".to_string(),
            ));
        }

        let access = self.create_token(&user, TokenScope::Access)?;
        let refresh = self.create_token(&user, TokenScope::Refresh)?;
        Ok((user, access, refresh))
    }

    /// Exchange a refresh token for a new access token
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<String> {
        let claims = UserClaims::from_token(refresh_token, &self.config.jwt_secret)
            .map_err(|_| AppError::Authentication("Invalid refresh token".to_string()))?;

        if claims.scope != TokenScope::Refresh {
            return Err(AppError::Authentication(
                "Invalid refresh token".to_string(),
            ));
        }

        let user = self
            .repository
            .users
            .get_by_id(claims.user_id)
            .await
            .map_err(|_| AppError::Authentication("User not found".to_string()))?;

        self.create_token(&user, TokenScope::Access)
    }

    /// Get a staff account by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// List all staff accounts
    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.repository.users.list().await
    }

    fn create_token(&self, user: &User, scope: TokenScope) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let lifetime_seconds = match scope {
            TokenScope::Access => self.config.access_token_minutes * 60,
            TokenScope::Refresh => self.config.refresh_token_days * 24 * 3600,
        };

        let claims = UserClaims {
            sub: user.email.clone(),
            user_id: user.id,
            scope,
            exp: now + lifetime_seconds,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Verify a password against the stored hash
    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}
