//! Books repository for database operations

use sqlx::{Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, UpdateBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Sqlite>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT id, title, author, available FROM books WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// List all books
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT id, title, author, available FROM books ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// Create a new book, available by default
    pub async fn create(&self, title: &str, author: &str) -> AppResult<Book> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, available)
            VALUES (?, ?, 1)
            RETURNING id, title, author, available
            "#,
        )
        .bind(title)
        .bind(author)
        .fetch_one(&self.pool)
        .await?;
        Ok(book)
    }

    /// Partial update: omitted fields keep their current value
    pub async fn update(&self, id: i64, update: UpdateBook) -> AppResult<Book> {
        let current = self.get_by_id(id).await?;

        let title = update.title.unwrap_or(current.title);
        let author = update.author.unwrap_or(current.author);
        let available = update.available.unwrap_or(current.available);

        let book = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET title = ?, author = ?, available = ?
            WHERE id = ?
            RETURNING id, title, author, available
            "#,
        )
        .bind(title)
        .bind(author)
        .bind(available)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(book)
    }

    /// Delete a book. Rejected while an active loan references it;
    /// closed loan history is removed with the book.
    pub async fn delete(&self, id: i64) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(
            "SELECT id, title, author, available FROM books WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let has_active_loan: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM loans WHERE book_id = ? AND returned = 0)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if has_active_loan {
            return Err(AppError::Conflict(
                "Book has an active loan and cannot be deleted".to_string(),
            ));
        }

        sqlx::query("DELETE FROM loans WHERE book_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(book)
    }
}
