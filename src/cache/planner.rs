//! Invalidation planning.
//!
//! Maps a committed write to the ordered list of cache keys it makes stale.

use crate::domain::entities::BookId;

use super::keys::CacheKey;

/// A write that has been committed to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteEvent {
    BookCreated { book_id: BookId },
    ReviewCreated { book_id: BookId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationPlan {
    keys: Vec<CacheKey>,
}

impl InvalidationPlan {
    pub fn for_event(event: WriteEvent) -> Self {
        let keys = match event {
            // A new book has no cached detail or reviews yet; only the
            // listing goes stale.
            WriteEvent::BookCreated { .. } => vec![CacheKey::AllBooks],
            // The listing embeds reviews, so it is stale too.
            WriteEvent::ReviewCreated { book_id } => vec![
                CacheKey::BookReviews(book_id),
                CacheKey::Book(book_id),
                CacheKey::AllBooks,
            ],
        };
        Self { keys }
    }

    pub fn keys(&self) -> &[CacheKey] {
        &self.keys
    }
}
