use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::warn;

use crate::domain::entities::BookId;

use super::error::{ApiError, codes};
use super::models::{BookCreateRequest, HealthResponse, ReviewCreateRequest};
use super::state::ApiState;

pub async fn list_books(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let books = state.catalog.get_all_books().await?;
    Ok(Json(books))
}

pub async fn get_book(
    State(state): State<ApiState>,
    id: Result<Path<BookId>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = book_id(id)?;
    let book = state.catalog.get_book_by_id(id).await?;
    Ok(Json(book))
}

pub async fn create_book(
    State(state): State<ApiState>,
    payload: Result<Json<BookCreateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload.map_err(body_rejection)?;
    let command = payload.into_command()?;
    let book = state.catalog.create_book(command).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

pub async fn list_reviews(
    State(state): State<ApiState>,
    id: Result<Path<BookId>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = book_id(id)?;
    let reviews = state.catalog.get_reviews_for_book(id).await?;
    Ok(Json(reviews))
}

pub async fn create_review(
    State(state): State<ApiState>,
    id: Result<Path<BookId>, PathRejection>,
    payload: Result<Json<ReviewCreateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = book_id(id)?;
    let Json(payload) = payload.map_err(body_rejection)?;
    let command = payload.into_command()?;
    let review = state.catalog.create_review(id, command).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// Store reachability decides the status; cache state is informational.
pub async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let cache = state.catalog.cache().handle().lifecycle().as_str();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                database: "ok",
                cache,
            }),
        ),
        Err(err) => {
            warn!(error = %err, "Health check: database unreachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    database: "unavailable",
                    cache,
                }),
            )
        }
    }
}

fn book_id(id: Result<Path<BookId>, PathRejection>) -> Result<BookId, ApiError> {
    match id {
        Ok(Path(id)) => Ok(id),
        Err(rejection) => Err(ApiError::bad_request(
            "invalid book id",
            Some(rejection.body_text()),
        )),
    }
}

fn body_rejection(rejection: JsonRejection) -> ApiError {
    ApiError::new(
        StatusCode::BAD_REQUEST,
        codes::BAD_REQUEST,
        "Invalid request body",
        Some(rejection.body_text()),
    )
}
