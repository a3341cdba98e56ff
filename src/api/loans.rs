//! Loan lifecycle endpoints: borrow and return

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::loan::{BorrowRequest, ReturnRequest},
};

use super::MessageResponse;

/// Borrow response with the computed return date
#[derive(Serialize, ToSchema)]
pub struct BorrowResponse {
    /// Status message
    pub message: String,
    /// Computed return date (YYYY-MM-DD)
    pub return_date: String,
    /// Title of the borrowed book
    pub book_title: String,
    /// Name of the borrowing user
    pub user_name: String,
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/borrow",
    tag = "loans",
    request_body = BorrowRequest,
    responses(
        (status = 201, description = "Loan created", body = BorrowResponse),
        (status = 400, description = "Missing fields, unknown loan type or book unavailable", body = crate::error::ErrorResponse),
        (status = 404, description = "User or book not found"),
        (status = 500, description = "Persistence error")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    Json(request): Json<BorrowRequest>,
) -> AppResult<(StatusCode, Json<BorrowResponse>)> {
    let (user_id, book_id, loan_type) = match (request.user_id, request.book_id, request.loan_type)
    {
        (Some(u), Some(b), Some(t)) => (u, b, t),
        _ => {
            return Err(AppError::Validation(
                "user_id, book_id and loan_type are required".to_string(),
            ))
        }
    };

    let receipt = state
        .repo
        .loans
        .borrow(user_id, book_id, loan_type, &state.config.loans)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(BorrowResponse {
            message: format!(
                "Book '{}' borrowed by {}",
                receipt.book_title, receipt.user_name
            ),
            return_date: receipt.return_date.format("%Y-%m-%d").to_string(),
            book_title: receipt.book_title,
            user_name: receipt.user_name,
        }),
    ))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/return",
    tag = "loans",
    request_body = ReturnRequest,
    responses(
        (status = 200, description = "Book returned", body = MessageResponse),
        (status = 400, description = "Missing fields", body = crate::error::ErrorResponse),
        (status = 404, description = "No active loan for this user and book")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    Json(request): Json<ReturnRequest>,
) -> AppResult<Json<MessageResponse>> {
    let (user_id, book_id) = match (request.user_id, request.book_id) {
        (Some(u), Some(b)) => (u, b),
        _ => {
            return Err(AppError::Validation(
                "user_id and book_id are required".to_string(),
            ))
        }
    };

    state.repo.loans.return_book(user_id, book_id).await?;

    Ok(Json(MessageResponse {
        message: "Book returned successfully".to_string(),
    }))
}
