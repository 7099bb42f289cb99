//! Authentication endpoints

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, User},
};

use super::{AuthenticatedUser, MessageResponse};

/// Name of the httpOnly refresh-token cookie
const REFRESH_COOKIE: &str = "refresh_token";
/// Refresh tokens are only ever sent back to the auth endpoints
const REFRESH_COOKIE_PATH: &str = "/api/v1/auth";

/// Login request
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response with the signed-in account and a bearer token
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub access_token: String,
    pub token_type: String,
}

/// Refresh response carrying a fresh access token
#[derive(Serialize, ToSchema)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Register a new staff account
#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "auth",
    request_body = CreateUser,
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn signup(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    request.validate()?;
    let user = state.services.auth.signup(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 401, description = "Invalid email or password")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<LoginResponse>)> {
    let (user, access_token, refresh_token) = state
        .services
        .auth
        .login(&request.email, &request.password)
        .await?;

    let cookie = Cookie::build((REFRESH_COOKIE, refresh_token))
        .http_only(true)
        .path(REFRESH_COOKIE_PATH)
        .same_site(SameSite::Lax)
        .build();

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            access_token,
            token_type: "Bearer".to_string(),
        }),
    ))
}

/// Exchange the refresh cookie for a new access token
#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = "auth",
    responses(
        (status = 200, description = "New access token", body = RefreshResponse),
        (status = 401, description = "Refresh token missing or invalid")
    )
)]
pub async fn refresh(
    State(state): State<crate::AppState>,
    jar: CookieJar,
) -> AppResult<Json<RefreshResponse>> {
    let refresh_token = jar
        .get(REFRESH_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or_else(|| AppError::Authentication("Refresh token missing".to_string()))?;

    let access_token = state.services.auth.refresh(&refresh_token).await?;

    Ok(Json(RefreshResponse {
        access_token,
        token_type: "Bearer".to_string(),
    }))
}

/// Sign out, dropping the refresh cookie
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Signed out", body = MessageResponse)
    )
)]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    let removal = Cookie::build((REFRESH_COOKIE, "")).path(REFRESH_COOKIE_PATH).build();
    (
        jar.remove(removal),
        Json(MessageResponse::new("Logged out successfully")),
    )
}

/// The currently signed-in account
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current account", body = User),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<User>> {
    let user = state.services.auth.get_by_id(claims.user_id).await?;
    Ok(Json(user))
}

/// List all staff accounts
#[utoipa::path(
    get,
    path = "/auth/users",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All staff accounts", body = Vec<User>)
    )
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<User>>> {
    let users = state.services.auth.list_users().await?;
    Ok(Json(users))
}
