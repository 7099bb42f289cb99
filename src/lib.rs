//! Book Club Library Management System
//!
//! A Rust REST API server for a small community library: a catalog of books,
//! registered readers, and the lending lifecycle that moves books between
//! them, including overdue reminders by email.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
