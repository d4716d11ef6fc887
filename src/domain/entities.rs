//! Domain entities mirrored from persistent storage.
//!
//! These types double as the serialized cache payloads, so their serde
//! representation must round-trip exactly what the store returned.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Store-assigned identifier for books and reviews.
pub type BookId = i64;
pub type ReviewId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub published_year: Option<i32>,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    pub id: ReviewId,
    pub rating: i32,
    pub comment: String,
    pub reviewer_name: Option<String>,
    pub book_id: BookId,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A book together with its reviews, most recent review first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDetail {
    #[serde(flatten)]
    pub book: BookRecord,
    pub reviews: Vec<ReviewRecord>,
}

impl BookDetail {
    pub fn new(book: BookRecord, reviews: Vec<ReviewRecord>) -> Self {
        Self { book, reviews }
    }

    pub fn id(&self) -> BookId {
        self.book.id
    }
}
