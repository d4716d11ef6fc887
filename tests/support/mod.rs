//! Shared doubles for integration tests: an in-memory store with call
//! counters and a cache backend that can be switched into failure.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use time::OffsetDateTime;
use time::macros::datetime;
use tokio::sync::Mutex;

use folio::application::catalog::CatalogService;
use folio::application::repos::{
    BooksRepo, BooksWriteRepo, HealthRepo, RepoError, ReviewsRepo, ReviewsWriteRepo,
};
use folio::cache::{CacheBackend, CacheConfig, CacheError, CacheHandle, MemoryCache, ReadThrough};
use folio::domain::books::{NewBook, NewReview};
use folio::domain::entities::{BookDetail, BookId, BookRecord, ReviewRecord};

const EPOCH: OffsetDateTime = datetime!(2024-01-01 00:00:00 UTC);

#[derive(Default)]
struct StoreState {
    books: Vec<BookRecord>,
    reviews: Vec<ReviewRecord>,
    ticks: i64,
}

impl StoreState {
    fn now(&mut self) -> OffsetDateTime {
        self.ticks += 1;
        EPOCH + time::Duration::seconds(self.ticks)
    }

    fn reviews_for(&self, book_id: BookId) -> Vec<ReviewRecord> {
        let mut reviews: Vec<_> = self
            .reviews
            .iter()
            .filter(|review| review.book_id == book_id)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        reviews
    }

    fn detail(&self, book: &BookRecord) -> BookDetail {
        BookDetail::new(book.clone(), self.reviews_for(book.id))
    }
}

#[derive(Default)]
pub struct StoreCalls {
    pub find_by_isbn: AtomicUsize,
    pub list_with_reviews: AtomicUsize,
    pub find_with_reviews: AtomicUsize,
    pub find_summary: AtomicUsize,
    pub list_for_book: AtomicUsize,
    pub create_book: AtomicUsize,
    pub create_review: AtomicUsize,
}

impl StoreCalls {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// In-memory store mirroring the Postgres repositories, including the ISBN
/// unique constraint and the review foreign key.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
    pub calls: StoreCalls,
    unavailable: AtomicBool,
    skip_isbn_lookup: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every store call fail as if the database were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make `find_by_isbn` report nothing, so a duplicate only surfaces at
    /// insert time (a concurrent-create race).
    pub fn skip_isbn_lookup(&self, skip: bool) {
        self.skip_isbn_lookup.store(skip, Ordering::SeqCst);
    }

    pub async fn review_count(&self) -> usize {
        self.state.lock().await.reviews.len()
    }

    pub async fn snapshot_book(&self, id: BookId) -> Option<BookDetail> {
        let state = self.state.lock().await;
        state
            .books
            .iter()
            .find(|book| book.id == id)
            .map(|book| state.detail(book))
    }

    fn check(&self) -> Result<(), RepoError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepoError::from_persistence("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl BooksRepo for InMemoryStore {
    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<BookRecord>, RepoError> {
        self.calls.find_by_isbn.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        if self.skip_isbn_lookup.load(Ordering::SeqCst) {
            return Ok(None);
        }
        let state = self.state.lock().await;
        Ok(state.books.iter().find(|book| book.isbn == isbn).cloned())
    }

    async fn list_with_reviews(&self) -> Result<Vec<BookDetail>, RepoError> {
        self.calls.list_with_reviews.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let state = self.state.lock().await;
        let mut books: Vec<_> = state.books.iter().map(|book| state.detail(book)).collect();
        books.sort_by(|a, b| (b.book.created_at, b.id()).cmp(&(a.book.created_at, a.id())));
        Ok(books)
    }

    async fn find_with_reviews(&self, id: BookId) -> Result<Option<BookDetail>, RepoError> {
        self.calls.find_with_reviews.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let state = self.state.lock().await;
        Ok(state
            .books
            .iter()
            .find(|book| book.id == id)
            .map(|book| state.detail(book)))
    }

    async fn find_summary(&self, id: BookId) -> Result<Option<BookRecord>, RepoError> {
        self.calls.find_summary.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let state = self.state.lock().await;
        Ok(state.books.iter().find(|book| book.id == id).cloned())
    }
}

#[async_trait]
impl BooksWriteRepo for InMemoryStore {
    async fn create_book(&self, book: NewBook) -> Result<BookRecord, RepoError> {
        self.calls.create_book.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut state = self.state.lock().await;
        if state.books.iter().any(|existing| existing.isbn == book.isbn) {
            return Err(RepoError::Duplicate {
                constraint: "books_isbn_key".to_string(),
            });
        }

        let now = state.now();
        let record = BookRecord {
            id: state.books.len() as BookId + 1,
            title: book.title,
            author: book.author,
            isbn: book.isbn,
            published_year: book.published_year,
            description: book.description,
            created_at: now,
            updated_at: now,
        };
        state.books.push(record.clone());
        Ok(record)
    }
}

#[async_trait]
impl ReviewsRepo for InMemoryStore {
    async fn list_for_book(&self, book_id: BookId) -> Result<Vec<ReviewRecord>, RepoError> {
        self.calls.list_for_book.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.state.lock().await.reviews_for(book_id))
    }
}

#[async_trait]
impl ReviewsWriteRepo for InMemoryStore {
    async fn create_review(
        &self,
        book_id: BookId,
        review: NewReview,
    ) -> Result<ReviewRecord, RepoError> {
        self.calls.create_review.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut state = self.state.lock().await;
        if !state.books.iter().any(|book| book.id == book_id) {
            return Err(RepoError::NotFound);
        }

        let now = state.now();
        let record = ReviewRecord {
            id: state.reviews.len() as i64 + 1,
            rating: review.rating,
            comment: review.comment,
            reviewer_name: review.reviewer_name,
            book_id,
            created_at: now,
            updated_at: now,
        };
        state.reviews.push(record.clone());
        Ok(record)
    }
}

#[async_trait]
impl HealthRepo for InMemoryStore {
    async fn ping(&self) -> Result<(), RepoError> {
        self.check()
    }
}

/// One backend call as seen by [`RecordingCache`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheOp {
    Get(String),
    Set(String),
    Delete(String),
}

/// Memory-backed cache that records every call and can be told to fail.
#[derive(Default)]
pub struct RecordingCache {
    inner: MemoryCache,
    failing: AtomicBool,
    ops: std::sync::Mutex<Vec<CacheOp>>,
}

impl RecordingCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains(key)
    }

    pub async fn seed(&self, key: &str, value: &str) {
        self.inner
            .set_ex(key, value, Duration::from_secs(300))
            .await
            .expect("seed cache");
    }

    pub async fn raw(&self, key: &str) -> Option<String> {
        self.inner.get(key).await.expect("memory get")
    }

    pub fn ops(&self) -> Vec<CacheOp> {
        self.ops.lock().expect("ops lock").clone()
    }

    pub fn clear_ops(&self) {
        self.ops.lock().expect("ops lock").clear();
    }

    /// Keys deleted so far, in call order.
    pub fn deletes(&self) -> Vec<String> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                CacheOp::Delete(key) => Some(key),
                _ => None,
            })
            .collect()
    }

    fn record(&self, op: CacheOp) -> Result<(), CacheError> {
        self.ops.lock().expect("ops lock").push(op);
        if self.failing.load(Ordering::SeqCst) {
            return Err(CacheError::unavailable("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheBackend for RecordingCache {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.record(CacheOp::Get(key.to_string()))?;
        self.inner.get(key).await
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.record(CacheOp::Set(key.to_string()))?;
        self.inner.set_ex(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.record(CacheOp::Delete(key.to_string()))?;
        self.inner.delete(key).await
    }
}

/// Catalog over `store`, with `backend` attached when given.
pub fn catalog(store: &Arc<InMemoryStore>, backend: Option<Arc<dyn CacheBackend>>) -> CatalogService {
    let config = CacheConfig::default();
    let handle = CacheHandle::new(config.op_timeout);
    if let Some(backend) = backend {
        handle.attach(backend);
    }

    CatalogService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        ReadThrough::new(handle, config),
    )
}

pub fn new_book(isbn: &str) -> NewBook {
    NewBook {
        title: format!("Book {isbn}"),
        author: "Test Author".to_string(),
        isbn: isbn.to_string(),
        published_year: Some(2001),
        description: None,
    }
}

pub fn new_review(rating: i32, comment: &str) -> NewReview {
    NewReview {
        rating,
        comment: comment.to_string(),
        reviewer_name: Some("Reader".to_string()),
    }
}
