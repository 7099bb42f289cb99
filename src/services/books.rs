//! Book catalog service

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list().await
    }

    pub async fn get(&self, id: &str) -> AppResult<Book> {
        self.repository.books.get_by_id(parse_book_id(id)?).await
    }

    pub async fn create(&self, book: CreateBook) -> AppResult<Book> {
        self.repository.books.create(&book).await
    }

    pub async fn update(&self, id: &str, book: UpdateBook) -> AppResult<Book> {
        self.repository.books.update(parse_book_id(id)?, &book).await
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.repository.books.delete(parse_book_id(id)?).await
    }
}

fn parse_book_id(value: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value).map_err(|_| AppError::Validation("Invalid book ID".to_string()))
}
