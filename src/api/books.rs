//! Book management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
};

use super::MessageResponse;

/// Response carrying a status message and the affected book
#[derive(Serialize, ToSchema)]
pub struct BookResponse {
    pub message: String,
    pub book: Book,
}

/// Book list response
#[derive(Serialize, ToSchema)]
pub struct BookListResponse {
    pub books: Vec<Book>,
}

/// Add a new book to the catalog
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = BookResponse),
        (status = 400, description = "Missing title or author", body = crate::error::ErrorResponse),
        (status = 500, description = "Persistence error")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<BookResponse>)> {
    let (title, author) = request.validated().map_err(AppError::Validation)?;

    let book = state.repo.books.create(&title, &author).await?;

    Ok((
        StatusCode::CREATED,
        Json(BookResponse {
            message: "Book added successfully!".to_string(),
            book,
        }),
    ))
}

/// List all books
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "List of books", body = BookListResponse),
        (status = 404, description = "No books in the catalog")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
) -> AppResult<Json<BookListResponse>> {
    let books = state.repo.books.list().await?;

    // An empty catalog is reported as not-found, an intentional quirk of
    // the historical API kept for client compatibility
    if books.is_empty() {
        return Err(AppError::NotFound("No books found".to_string()));
    }

    Ok(Json(BookListResponse { books }))
}

/// Update an existing book (partial: omitted fields are kept)
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = BookResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateBook>,
) -> AppResult<Json<BookResponse>> {
    let book = state.repo.books.update(id, request).await?;

    Ok(Json(BookResponse {
        message: "Book updated successfully".to_string(),
        book,
    }))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book deleted", body = MessageResponse),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book has an active loan")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MessageResponse>> {
    let book = state.repo.books.delete(id).await?;

    Ok(Json(MessageResponse {
        message: format!("Book '{}' has been deleted", book.title),
    }))
}
