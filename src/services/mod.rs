//! Business logic services

pub mod auth;
pub mod books;
pub mod email;
pub mod lendings;
pub mod notifier;
pub mod readers;
pub mod stats;

use std::sync::Arc;

use crate::{
    config::{AuthConfig, EmailConfig, LendingConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub books: books::BooksService,
    pub readers: readers::ReadersService,
    pub lendings: lendings::LendingsService,
    pub notifier: notifier::NotifierService,
    pub stats: stats::StatsService,
    pub email: email::EmailService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        auth_config: AuthConfig,
        email_config: EmailConfig,
        lending_config: LendingConfig,
    ) -> Self {
        let email = email::EmailService::new(email_config);
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            books: books::BooksService::new(repository.clone()),
            readers: readers::ReadersService::new(repository.clone()),
            lendings: lendings::LendingsService::new(repository.clone(), lending_config),
            notifier: notifier::NotifierService::new(repository.clone(), Arc::new(email.clone())),
            stats: stats::StatsService::new(repository),
            email,
        }
    }
}
