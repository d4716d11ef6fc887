//! Write commands for books and reviews, with the field rules the store relies on.

use super::error::DomainError;

pub const MIN_PUBLISHED_YEAR: i32 = 1000;
pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub published_year: Option<i32>,
    pub description: Option<String>,
}

impl NewBook {
    /// Trim text fields and check them against the book rules.
    pub fn normalized(self) -> Result<Self, DomainError> {
        let title = required_text("title", self.title)?;
        let author = required_text("author", self.author)?;
        let isbn = required_text("isbn", self.isbn)?;

        if self
            .published_year
            .is_some_and(|year| year < MIN_PUBLISHED_YEAR)
        {
            return Err(DomainError::validation(
                "publishedYear",
                format!("must be at least {MIN_PUBLISHED_YEAR}"),
            ));
        }

        Ok(Self {
            title,
            author,
            isbn,
            published_year: self.published_year,
            description: optional_text(self.description),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub rating: i32,
    pub comment: String,
    pub reviewer_name: Option<String>,
}

impl NewReview {
    pub fn normalized(self) -> Result<Self, DomainError> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(DomainError::validation(
                "rating",
                format!("must be between {MIN_RATING} and {MAX_RATING}"),
            ));
        }

        Ok(Self {
            rating: self.rating,
            comment: required_text("comment", self.comment)?,
            reviewer_name: optional_text(self.reviewer_name),
        })
    }
}

fn required_text(field: &'static str, value: String) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn optional_text(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}
