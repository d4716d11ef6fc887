use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{
    application::repos::{BooksRepo, BooksWriteRepo, RepoError},
    domain::{
        books::NewBook,
        entities::{BookDetail, BookId, BookRecord, ReviewRecord},
    },
};

use super::{PostgresRepositories, map_sqlx_error, reviews::ReviewRow};

#[derive(sqlx::FromRow)]
struct BookRow {
    id: i64,
    title: String,
    author: String,
    isbn: String,
    published_year: Option<i32>,
    description: Option<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<BookRow> for BookRecord {
    fn from(row: BookRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            author: row.author,
            isbn: row.isbn,
            published_year: row.published_year,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const BOOK_COLUMNS: &str =
    "id, title, author, isbn, published_year, description, created_at, updated_at";

impl PostgresRepositories {
    async fn fetch_book(&self, id: BookId) -> Result<Option<BookRecord>, RepoError> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = $1");
        let row = sqlx::query_as::<_, BookRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(BookRecord::from))
    }
}

#[async_trait]
impl BooksRepo for PostgresRepositories {
    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<BookRecord>, RepoError> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE isbn = $1");
        let row = sqlx::query_as::<_, BookRow>(&sql)
            .bind(isbn)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(BookRecord::from))
    }

    async fn list_with_reviews(&self) -> Result<Vec<BookDetail>, RepoError> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books ORDER BY created_at DESC, id DESC");
        let books = sqlx::query_as::<_, BookRow>(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if books.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = books.iter().map(|book| book.id).collect();
        let reviews = sqlx::query_as::<_, ReviewRow>(
            r#"
            SELECT id, rating, comment, reviewer_name, book_id, created_at, updated_at
            FROM reviews
            WHERE book_id = ANY($1)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(&ids)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let mut by_book: HashMap<BookId, Vec<ReviewRecord>> = HashMap::new();
        for review in reviews {
            let review = ReviewRecord::from(review);
            by_book.entry(review.book_id).or_default().push(review);
        }

        Ok(books
            .into_iter()
            .map(|row| {
                let reviews = by_book.remove(&row.id).unwrap_or_default();
                BookDetail::new(BookRecord::from(row), reviews)
            })
            .collect())
    }

    async fn find_with_reviews(&self, id: BookId) -> Result<Option<BookDetail>, RepoError> {
        let Some(book) = self.fetch_book(id).await? else {
            return Ok(None);
        };
        let reviews = self.reviews_for_book(id).await?;
        Ok(Some(BookDetail::new(book, reviews)))
    }

    async fn find_summary(&self, id: BookId) -> Result<Option<BookRecord>, RepoError> {
        self.fetch_book(id).await
    }
}

#[async_trait]
impl BooksWriteRepo for PostgresRepositories {
    async fn create_book(&self, book: NewBook) -> Result<BookRecord, RepoError> {
        let sql = format!(
            r#"
            INSERT INTO books (title, author, isbn, published_year, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {BOOK_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, BookRow>(&sql)
            .bind(&book.title)
            .bind(&book.author)
            .bind(&book.isbn)
            .bind(book.published_year)
            .bind(book.description.as_deref())
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.into())
    }
}
