//! Lending management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::{AppError, AppResult},
    models::lending::{Lending, LendingDetails},
    services::notifier::NotifyReport,
};

use super::{AuthenticatedUser, MessageResponse};

/// Lend book request
#[derive(Deserialize, ToSchema)]
pub struct CreateLendingRequest {
    /// Reader ID
    pub reader_id: Option<String>,
    /// Book ID
    pub book_id: Option<String>,
    /// Due date override; defaults to now + the configured loan period
    pub due_at: Option<DateTime<Utc>>,
}

/// Response for a freshly created lending
#[derive(Serialize, ToSchema)]
pub struct LendBookResponse {
    /// Status message
    pub message: String,
    /// The created lending record
    pub lending: Lending,
}

/// Response for a returned lending
#[derive(Serialize, ToSchema)]
pub struct ReturnBookResponse {
    /// Status message
    pub message: String,
    /// The updated lending record
    pub lending: Lending,
}

/// History filter; both filters combine with AND semantics
#[derive(Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// Narrow to one reader
    pub reader_id: Option<String>,
    /// Narrow to one book
    pub book_id: Option<String>,
}

/// List all lending records
#[utoipa::path(
    get,
    path = "/lendings",
    tag = "lendings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All lending records", body = Vec<LendingDetails>)
    )
)]
pub async fn list_lendings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<LendingDetails>>> {
    let lendings = state.services.lendings.list_all().await?;
    Ok(Json(lendings))
}

/// Lend a book to a reader
#[utoipa::path(
    post,
    path = "/lendings",
    tag = "lendings",
    security(("bearer_auth" = [])),
    request_body = CreateLendingRequest,
    responses(
        (status = 201, description = "Book lent", body = LendBookResponse),
        (status = 400, description = "Missing or invalid reference"),
        (status = 404, description = "Reader or book not found"),
        (status = 409, description = "Book is already lent out")
    )
)]
pub async fn create_lending(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Json(request): Json<CreateLendingRequest>,
) -> AppResult<(StatusCode, Json<LendBookResponse>)> {
    let (reader_id, book_id) = match (request.reader_id, request.book_id) {
        (Some(reader_id), Some(book_id)) => (reader_id, book_id),
        _ => {
            return Err(AppError::Validation(
                "Reader ID and Book ID are required".to_string(),
            ))
        }
    };

    let lending = state
        .services
        .lendings
        .create_lending(&reader_id, &book_id, request.due_at)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(LendBookResponse {
            message: "Book lent successfully".to_string(),
            lending,
        }),
    ))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/lendings/{id}/return",
    tag = "lendings",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Lending ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = ReturnBookResponse),
        (status = 400, description = "Invalid lending ID"),
        (status = 404, description = "Lending record not found"),
        (status = 409, description = "Book already returned")
    )
)]
pub async fn return_lending(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(lending_id): Path<String>,
) -> AppResult<Json<ReturnBookResponse>> {
    let lending = state.services.lendings.return_lending(&lending_id).await?;

    Ok(Json(ReturnBookResponse {
        message: "Book returned successfully".to_string(),
        lending,
    }))
}

/// Lending history, optionally filtered by reader and/or book
#[utoipa::path(
    get,
    path = "/lendings/history",
    tag = "lendings",
    security(("bearer_auth" = [])),
    params(HistoryQuery),
    responses(
        (status = 200, description = "Matching lending records", body = Vec<LendingDetails>),
        (status = 400, description = "Invalid reader or book ID")
    )
)]
pub async fn lending_history(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<LendingDetails>>> {
    let lendings = state
        .services
        .lendings
        .list_history(query.reader_id.as_deref(), query.book_id.as_deref())
        .await?;
    Ok(Json(lendings))
}

/// Active lendings whose due date has passed
#[utoipa::path(
    get,
    path = "/lendings/overdue",
    tag = "lendings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Overdue lending records", body = Vec<LendingDetails>)
    )
)]
pub async fn overdue_lendings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<LendingDetails>>> {
    let lendings = state.services.lendings.list_overdue().await?;
    Ok(Json(lendings))
}

/// Email an overdue reminder to every reader holding overdue books
#[utoipa::path(
    post,
    path = "/lendings/notify-overdue",
    tag = "lendings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Notification run digest", body = NotifyReport),
        (status = 500, description = "Overdue query failed")
    )
)]
pub async fn notify_overdue(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<NotifyReport>> {
    let report = state.services.notifier.notify_overdue().await?;
    Ok(Json(report))
}

/// Delete a lending record
#[utoipa::path(
    delete,
    path = "/lendings/{id}",
    tag = "lendings",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Lending ID")
    ),
    responses(
        (status = 200, description = "Lending record deleted", body = MessageResponse),
        (status = 400, description = "Invalid lending ID"),
        (status = 404, description = "Lending record not found")
    )
)]
pub async fn delete_lending(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(lending_id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.services.lendings.delete_lending(&lending_id).await?;
    Ok(Json(MessageResponse::new("Lending record has been deleted")))
}
