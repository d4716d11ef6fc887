//! Catalogue reads and writes with the read-through cache in front of the store.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::application::repos::{
    BooksRepo, BooksWriteRepo, RepoError, ReviewsRepo, ReviewsWriteRepo,
};
use crate::cache::{CacheKey, InvalidationPlan, ReadThrough, WriteEvent};
use crate::domain::books::{NewBook, NewReview};
use crate::domain::entities::{BookDetail, BookId, BookRecord, ReviewRecord};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("a book with ISBN `{isbn}` already exists")]
    Conflict { isbn: String },
    #[error("book `{book_id}` not found")]
    NotFound { book_id: BookId },
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct CatalogService {
    books: Arc<dyn BooksRepo>,
    book_writer: Arc<dyn BooksWriteRepo>,
    reviews: Arc<dyn ReviewsRepo>,
    review_writer: Arc<dyn ReviewsWriteRepo>,
    cache: ReadThrough,
}

impl CatalogService {
    pub fn new(
        books: Arc<dyn BooksRepo>,
        book_writer: Arc<dyn BooksWriteRepo>,
        reviews: Arc<dyn ReviewsRepo>,
        review_writer: Arc<dyn ReviewsWriteRepo>,
        cache: ReadThrough,
    ) -> Self {
        Self {
            books,
            book_writer,
            reviews,
            review_writer,
            cache,
        }
    }

    pub fn cache(&self) -> &ReadThrough {
        &self.cache
    }

    /// Every book, most recently created first, with reviews embedded.
    pub async fn get_all_books(&self) -> Result<Vec<BookDetail>, CatalogError> {
        let books = self.books.clone();
        let listing = self
            .cache
            .read_through(CacheKey::AllBooks, || async move {
                books.list_with_reviews().await
            })
            .await?;
        Ok(listing)
    }

    pub async fn get_book_by_id(&self, id: BookId) -> Result<BookDetail, CatalogError> {
        let books = self.books.clone();
        self.cache
            .read_through_optional(CacheKey::Book(id), || async move {
                books.find_with_reviews(id).await
            })
            .await?
            .ok_or(CatalogError::NotFound { book_id: id })
    }

    /// Persist a book whose fields have already been validated.
    pub async fn create_book(&self, book: NewBook) -> Result<BookRecord, CatalogError> {
        if self.books.find_by_isbn(&book.isbn).await?.is_some() {
            debug!(isbn = %book.isbn, "Rejecting book with taken ISBN");
            return Err(CatalogError::Conflict { isbn: book.isbn });
        }

        let isbn = book.isbn.clone();
        let created = match self.book_writer.create_book(book).await {
            Ok(created) => created,
            // Lost a race with a concurrent create of the same ISBN.
            Err(RepoError::Duplicate { .. }) => return Err(CatalogError::Conflict { isbn }),
            Err(err) => return Err(err.into()),
        };

        self.apply(WriteEvent::BookCreated {
            book_id: created.id,
        })
        .await;
        info!(book_id = created.id, isbn = %created.isbn, "Book created");
        Ok(created)
    }

    pub async fn get_reviews_for_book(
        &self,
        book_id: BookId,
    ) -> Result<Vec<ReviewRecord>, CatalogError> {
        self.ensure_book(book_id).await?;

        let reviews = self.reviews.clone();
        let listing = self
            .cache
            .read_through(CacheKey::BookReviews(book_id), || async move {
                reviews.list_for_book(book_id).await
            })
            .await?;
        Ok(listing)
    }

    pub async fn create_review(
        &self,
        book_id: BookId,
        review: NewReview,
    ) -> Result<ReviewRecord, CatalogError> {
        self.ensure_book(book_id).await?;

        let created = match self.review_writer.create_review(book_id, review).await {
            Ok(created) => created,
            // Book deleted between the existence check and the insert.
            Err(RepoError::NotFound) => return Err(CatalogError::NotFound { book_id }),
            Err(err) => return Err(err.into()),
        };

        self.apply(WriteEvent::ReviewCreated { book_id }).await;
        info!(book_id, review_id = created.id, rating = created.rating, "Review created");
        Ok(created)
    }

    async fn ensure_book(&self, book_id: BookId) -> Result<(), CatalogError> {
        match self.books.find_summary(book_id).await? {
            Some(_) => Ok(()),
            None => Err(CatalogError::NotFound { book_id }),
        }
    }

    async fn apply(&self, event: WriteEvent) {
        let plan = InvalidationPlan::for_event(event);
        debug!(?event, keys = plan.keys().len(), "Invalidating cache after write");
        self.cache.invalidate(plan.keys()).await;
    }
}
