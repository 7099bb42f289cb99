//! Reader management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::reader::{CreateReader, Reader, UpdateReader},
};

use super::{AuthenticatedUser, MessageResponse};

/// List all readers
#[utoipa::path(
    get,
    path = "/readers",
    tag = "readers",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All readers", body = Vec<Reader>)
    )
)]
pub async fn list_readers(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Reader>>> {
    let readers = state.services.readers.list().await?;
    Ok(Json(readers))
}

/// Register a new reader
#[utoipa::path(
    post,
    path = "/readers",
    tag = "readers",
    security(("bearer_auth" = [])),
    request_body = CreateReader,
    responses(
        (status = 201, description = "Reader created", body = Reader),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn create_reader(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Json(request): Json<CreateReader>,
) -> AppResult<(StatusCode, Json<Reader>)> {
    request.validate()?;
    let reader = state.services.readers.create(request).await?;
    Ok((StatusCode::CREATED, Json(reader)))
}

/// Get a reader by ID
#[utoipa::path(
    get,
    path = "/readers/{id}",
    tag = "readers",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Reader ID")
    ),
    responses(
        (status = 200, description = "The reader", body = Reader),
        (status = 400, description = "Invalid reader ID"),
        (status = 404, description = "Reader not found")
    )
)]
pub async fn get_reader(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Reader>> {
    let reader = state.services.readers.get(&id).await?;
    Ok(Json(reader))
}

/// Update a reader
#[utoipa::path(
    put,
    path = "/readers/{id}",
    tag = "readers",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Reader ID")
    ),
    request_body = UpdateReader,
    responses(
        (status = 200, description = "Reader updated", body = MessageResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Reader not found")
    )
)]
pub async fn update_reader(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateReader>,
) -> AppResult<Json<MessageResponse>> {
    request.validate()?;
    state.services.readers.update(&id, request).await?;
    Ok(Json(MessageResponse::new("Reader has been updated")))
}

/// Delete a reader
#[utoipa::path(
    delete,
    path = "/readers/{id}",
    tag = "readers",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Reader ID")
    ),
    responses(
        (status = 200, description = "Reader deleted", body = MessageResponse),
        (status = 400, description = "Invalid reader ID"),
        (status = 404, description = "Reader not found")
    )
)]
pub async fn delete_reader(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.services.readers.delete(&id).await?;
    Ok(Json(MessageResponse::new("Reader has been deleted")))
}
