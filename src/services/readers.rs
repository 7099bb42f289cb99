//! Reader management service

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::reader::{CreateReader, Reader, UpdateReader},
    repository::Repository,
};

#[derive(Clone)]
pub struct ReadersService {
    repository: Repository,
}

impl ReadersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Reader>> {
        self.repository.readers.list().await
    }

    pub async fn get(&self, id: &str) -> AppResult<Reader> {
        self.repository.readers.get_by_id(parse_reader_id(id)?).await
    }

    pub async fn create(&self, reader: CreateReader) -> AppResult<Reader> {
        self.repository.readers.create(&reader).await
    }

    pub async fn update(&self, id: &str, reader: UpdateReader) -> AppResult<Reader> {
        self.repository
            .readers
            .update(parse_reader_id(id)?, &reader)
            .await
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.repository.readers.delete(parse_reader_id(id)?).await
    }
}

fn parse_reader_id(value: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value).map_err(|_| AppError::Validation("Invalid reader ID".to_string()))
}
