//! Loans repository: the borrow/return lifecycle

use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::{
    config::LoanPolicy,
    error::{AppError, AppResult},
    models::{
        book::Book,
        loan::{due_date, Loan, LoanPeriod, LoanReceipt},
        user::User,
    },
};

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Sqlite>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Borrow a book: mark it unavailable and record the loan, atomically.
    ///
    /// The availability check and the mark are one guarded UPDATE, executed
    /// as the first statement of the transaction. Two interleaved borrows
    /// on the same book therefore serialize on the write lock and the loser
    /// sees zero affected rows.
    ///
    /// Error precedence: unknown user or book (404) before an unavailable
    /// book (400) before an unknown `loan_type` selector (400).
    pub async fn borrow(
        &self,
        user_id: i64,
        book_id: i64,
        loan_type: i64,
        policy: &LoanPolicy,
    ) -> AppResult<LoanReceipt> {
        let mut tx = self.pool.begin().await?;

        let marked = sqlx::query("UPDATE books SET available = 0 WHERE id = ? AND available = 1")
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        // Existence checks report 404 before the availability conflict
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, active FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", user_id)))?;

        let book = sqlx::query_as::<_, Book>(
            "SELECT id, title, author, available FROM books WHERE id = ?",
        )
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        if marked.rows_affected() == 0 {
            return Err(AppError::Validation("Book is not available".to_string()));
        }

        let period = LoanPeriod::try_from(loan_type).map_err(AppError::Validation)?;

        let borrowed = Utc::now();
        let due = due_date(borrowed, policy.days_for(period));

        let loan_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO loans (user_id, book_id, borrowed_date, return_date, period, returned)
            VALUES (?, ?, ?, ?, ?, 0)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(borrowed)
        .bind(due)
        .bind(period)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            loan_id,
            book_id,
            user_id,
            period = %period,
            "book borrowed"
        );

        Ok(LoanReceipt {
            loan_id,
            return_date: due,
            book_title: book.title,
            user_name: user.username,
        })
    }

    /// Return a book: close the active loan matching (user, book, unreturned)
    /// and restore availability, atomically. A second return of the same
    /// loan finds nothing to close and reports not-found.
    pub async fn return_book(&self, user_id: i64, book_id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let closed = sqlx::query(
            r#"
            UPDATE loans SET returned = 1, returned_date = ?
            WHERE user_id = ? AND book_id = ? AND returned = 0
            "#,
        )
        .bind(now)
        .bind(user_id)
        .bind(book_id)
        .execute(&mut *tx)
        .await?;

        if closed.rows_affected() == 0 {
            return Err(AppError::NotFound(
                "No active loan found for this user and book".to_string(),
            ));
        }

        sqlx::query("UPDATE books SET available = 1 WHERE id = ?")
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(book_id, user_id, "book returned");
        Ok(())
    }
}
