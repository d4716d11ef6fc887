use serde::{Deserialize, Serialize};

use crate::domain::books::{NewBook, NewReview};
use crate::domain::error::DomainError;

/// Missing text fields deserialize as empty so they fail validation with a
/// field name instead of a generic body error.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookCreateRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub isbn: String,
    pub published_year: Option<i32>,
    pub description: Option<String>,
}

impl BookCreateRequest {
    pub fn into_command(self) -> Result<NewBook, DomainError> {
        NewBook {
            title: self.title,
            author: self.author,
            isbn: self.isbn,
            published_year: self.published_year,
            description: self.description,
        }
        .normalized()
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewCreateRequest {
    #[serde(default)]
    pub rating: i32,
    #[serde(default)]
    pub comment: String,
    pub reviewer_name: Option<String>,
}

impl ReviewCreateRequest {
    pub fn into_command(self) -> Result<NewReview, DomainError> {
        NewReview {
            rating: self.rating,
            comment: self.comment,
            reviewer_name: self.reviewer_name,
        }
        .normalized()
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub database: &'static str,
    pub cache: &'static str,
}
