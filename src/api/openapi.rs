//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, health, lendings, readers, stats};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Book Club Library API",
        version = "0.1.0",
        description = "Library Management System REST API",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::signup,
        auth::login,
        auth::refresh,
        auth::logout,
        auth::me,
        auth::list_users,
        // Books
        books::list_books,
        books::create_book,
        books::get_book,
        books::update_book,
        books::delete_book,
        // Readers
        readers::list_readers,
        readers::create_reader,
        readers::get_reader,
        readers::update_reader,
        readers::delete_reader,
        // Lendings
        lendings::list_lendings,
        lendings::create_lending,
        lendings::return_lending,
        lendings::lending_history,
        lendings::overdue_lendings,
        lendings::notify_overdue,
        lendings::delete_lending,
        // Stats
        stats::get_summary,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::RefreshResponse,
            crate::models::user::User,
            crate::models::user::CreateUser,
            // Books
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            // Readers
            crate::models::reader::Reader,
            crate::models::reader::CreateReader,
            crate::models::reader::UpdateReader,
            // Lendings
            crate::models::lending::Lending,
            crate::models::lending::LendingDetails,
            crate::models::lending::ReaderSummary,
            crate::models::lending::BookSummary,
            lendings::CreateLendingRequest,
            lendings::LendBookResponse,
            lendings::ReturnBookResponse,
            crate::services::notifier::NotifyReport,
            crate::services::notifier::NotifyOutcome,
            crate::services::notifier::NotifyStatus,
            // Stats
            stats::SummaryResponse,
            // Health
            health::HealthResponse,
            // Shared
            crate::api::MessageResponse,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "books", description = "Book catalog management"),
        (name = "readers", description = "Reader management"),
        (name = "lendings", description = "Lending lifecycle"),
        (name = "stats", description = "Dashboard statistics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
