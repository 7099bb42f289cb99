//! Dashboard summary endpoint

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppResult;

use super::AuthenticatedUser;

/// Dashboard summary response
#[derive(Serialize, ToSchema)]
pub struct SummaryResponse {
    /// Total number of books in the catalog
    pub total_books: i64,
    /// Total number of registered readers
    pub total_readers: i64,
    /// Total number of lending records, returned ones included
    pub total_lendings: i64,
    /// Lendings currently out
    pub active_lendings: i64,
    /// Lendings currently out and past their due date
    pub overdue_lendings: i64,
}

/// Dashboard summary counters
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard summary", body = SummaryResponse)
    )
)]
pub async fn get_summary(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<SummaryResponse>> {
    let summary = state.services.stats.summary().await?;
    Ok(Json(SummaryResponse {
        total_books: summary.total_books,
        total_readers: summary.total_readers,
        total_lendings: summary.total_lendings,
        active_lendings: summary.active_lendings,
        overdue_lendings: summary.overdue_lendings,
    }))
}
