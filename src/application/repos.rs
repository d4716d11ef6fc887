//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::books::{NewBook, NewReview};
use crate::domain::entities::{BookDetail, BookId, BookRecord, ReviewRecord};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[async_trait]
pub trait BooksRepo: Send + Sync {
    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<BookRecord>, RepoError>;

    /// All books, most recently created first, each with its reviews embedded.
    async fn list_with_reviews(&self) -> Result<Vec<BookDetail>, RepoError>;

    async fn find_with_reviews(&self, id: BookId) -> Result<Option<BookDetail>, RepoError>;

    /// Book row only; used for existence checks.
    async fn find_summary(&self, id: BookId) -> Result<Option<BookRecord>, RepoError>;
}

#[async_trait]
pub trait BooksWriteRepo: Send + Sync {
    /// Fails with [`RepoError::Duplicate`] when the ISBN is already taken.
    async fn create_book(&self, book: NewBook) -> Result<BookRecord, RepoError>;
}

#[async_trait]
pub trait ReviewsRepo: Send + Sync {
    /// Reviews for one book, most recent first.
    async fn list_for_book(&self, book_id: BookId) -> Result<Vec<ReviewRecord>, RepoError>;
}

#[async_trait]
pub trait ReviewsWriteRepo: Send + Sync {
    /// Fails with [`RepoError::NotFound`] when the book does not exist.
    async fn create_review(
        &self,
        book_id: BookId,
        review: NewReview,
    ) -> Result<ReviewRecord, RepoError>;
}

#[async_trait]
pub trait HealthRepo: Send + Sync {
    /// Round-trip to the store; used by the health endpoint.
    async fn ping(&self) -> Result<(), RepoError>;
}
