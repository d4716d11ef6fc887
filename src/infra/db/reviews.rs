use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{
    application::repos::{RepoError, ReviewsRepo, ReviewsWriteRepo},
    domain::{
        books::NewReview,
        entities::{BookId, ReviewRecord},
    },
};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
pub(super) struct ReviewRow {
    id: i64,
    rating: i32,
    comment: String,
    reviewer_name: Option<String>,
    book_id: i64,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<ReviewRow> for ReviewRecord {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: row.id,
            rating: row.rating,
            comment: row.comment,
            reviewer_name: row.reviewer_name,
            book_id: row.book_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl PostgresRepositories {
    pub(super) async fn reviews_for_book(
        &self,
        book_id: BookId,
    ) -> Result<Vec<ReviewRecord>, RepoError> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            r#"
            SELECT id, rating, comment, reviewer_name, book_id, created_at, updated_at
            FROM reviews
            WHERE book_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(book_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ReviewRecord::from).collect())
    }
}

#[async_trait]
impl ReviewsRepo for PostgresRepositories {
    async fn list_for_book(&self, book_id: BookId) -> Result<Vec<ReviewRecord>, RepoError> {
        self.reviews_for_book(book_id).await
    }
}

#[async_trait]
impl ReviewsWriteRepo for PostgresRepositories {
    async fn create_review(
        &self,
        book_id: BookId,
        review: NewReview,
    ) -> Result<ReviewRecord, RepoError> {
        let result = sqlx::query_as::<_, ReviewRow>(
            r#"
            INSERT INTO reviews (rating, comment, reviewer_name, book_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, rating, comment, reviewer_name, book_id, created_at, updated_at
            "#,
        )
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.reviewer_name.as_deref())
        .bind(book_id)
        .fetch_one(self.pool())
        .await;

        match result {
            Ok(row) => Ok(row.into()),
            Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
                Err(RepoError::NotFound)
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }
}
