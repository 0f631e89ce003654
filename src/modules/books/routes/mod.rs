//! HTTP handlers for the Books module.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use bookshelf_http::{ApiResponse, AppError};

use super::models::{BookDetail, BookList, BookPayload, BookQuery, CreatedBook};
use super::store::{BookStore, CatalogError};

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        let message = err.to_string();
        match err {
            CatalogError::MissingName(_) | CatalogError::ReadPageExceedsPageCount(_) => {
                AppError::validation(message)
            }
            CatalogError::NotFound(_) => AppError::not_found(message),
            CatalogError::NotStored => AppError::Internal(anyhow::Error::new(err)),
        }
    }
}

/// Routes of the Books module, relative to its mount point.
pub fn router(store: Arc<BookStore>) -> Router {
    Router::new()
        .route("/", get(list_books).post(add_book))
        .route("/{id}", get(get_book).put(update_book).delete(delete_book))
        .with_state(store)
}

async fn add_book(
    State(store): State<Arc<BookStore>>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<ApiResponse<CreatedBook>, AppError> {
    let Json(payload) = payload?;
    let book_id = store.add_book(payload).await?;

    tracing::info!(book_id = %book_id, "book added");

    Ok(ApiResponse::success(CreatedBook { book_id })
        .with_message("Buku berhasil ditambahkan")
        .with_status_code(StatusCode::CREATED))
}

async fn list_books(
    State(store): State<Arc<BookStore>>,
    query: Result<Query<BookQuery>, QueryRejection>,
) -> Result<ApiResponse<BookList>, AppError> {
    let Query(query) = query?;
    let books = store.list_books(&query).await;
    Ok(ApiResponse::success(BookList { books }))
}

async fn get_book(
    State(store): State<Arc<BookStore>>,
    Path(id): Path<String>,
) -> Result<ApiResponse<BookDetail>, AppError> {
    let book = store.get_book(&id).await?;
    Ok(ApiResponse::success(BookDetail { book }))
}

async fn update_book(
    State(store): State<Arc<BookStore>>,
    Path(id): Path<String>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<ApiResponse<()>, AppError> {
    let Json(payload) = payload?;
    store.update_book(&id, payload).await?;

    tracing::info!(book_id = %id, "book updated");
    Ok(ApiResponse::<()>::message("Buku berhasil diperbarui"))
}

async fn delete_book(
    State(store): State<Arc<BookStore>>,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    store.delete_book(&id).await?;

    tracing::info!(book_id = %id, "book deleted");
    Ok(ApiResponse::<()>::message("Buku berhasil dihapus"))
}
