//! Cache key definitions.
//!
//! Every key is a pure function of its inputs; the rendered string is what the
//! backend stores.

use std::fmt;

use crate::domain::entities::BookId;

/// Address of a cached query result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Full book listing with reviews embedded (`books:all`).
    AllBooks,
    /// Single book detail with reviews embedded (`book:{id}`).
    Book(BookId),
    /// Review listing for one book (`reviews:book:{id}`).
    BookReviews(BookId),
}

impl CacheKey {
    /// Key family, used as a low-cardinality metrics label.
    pub fn family(&self) -> &'static str {
        match self {
            CacheKey::AllBooks => "books_all",
            CacheKey::Book(_) => "book",
            CacheKey::BookReviews(_) => "book_reviews",
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::AllBooks => f.write_str("books:all"),
            CacheKey::Book(id) => write!(f, "book:{id}"),
            CacheKey::BookReviews(id) => write!(f, "reviews:book:{id}"),
        }
    }
}
