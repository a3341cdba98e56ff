//! Users repository for database operations

use sqlx::{Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::user::{UpdateUser, User},
};

/// The uniqueness pre-checks run outside the insert/update statement, so a
/// concurrent writer can still trip the UNIQUE constraint; surface that as
/// a conflict rather than a generic database failure.
fn conflict_on_unique(err: sqlx::Error, message: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(message.to_string())
        }
        _ => AppError::Database(err),
    }
}

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Sqlite>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT id, username, email, active FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// List all users
    pub async fn list(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, email, active FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    /// Check if username already exists
    pub async fn username_exists(&self, username: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(username) = LOWER(?) AND id != ?)",
            )
            .bind(username)
            .bind(id)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(username) = LOWER(?))")
                .bind(username)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// Check if email already exists
    pub async fn email_exists(&self, email: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER(?) AND id != ?)",
            )
            .bind(email)
            .bind(id)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER(?))")
                .bind(email)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// Create a new user, active by default
    pub async fn create(&self, username: &str, email: &str) -> AppResult<User> {
        if self.username_exists(username, None).await? {
            return Err(AppError::Conflict(format!(
                "Username '{}' already exists",
                username
            )));
        }
        if self.email_exists(email, None).await? {
            return Err(AppError::Conflict(format!(
                "Email '{}' already exists",
                email
            )));
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, active)
            VALUES (?, ?, 1)
            RETURNING id, username, email, active
            "#,
        )
        .bind(username)
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Username or email already exists"))?;
        Ok(user)
    }

    /// Partial update: omitted fields keep their current value
    pub async fn update(&self, id: i64, update: UpdateUser) -> AppResult<User> {
        let current = self.get_by_id(id).await?;

        if let Some(ref username) = update.username {
            if self.username_exists(username, Some(id)).await? {
                return Err(AppError::Conflict(format!(
                    "Username '{}' already exists",
                    username
                )));
            }
        }
        if let Some(ref email) = update.email {
            if self.email_exists(email, Some(id)).await? {
                return Err(AppError::Conflict(format!("Email '{}' already exists", email)));
            }
        }

        let username = update.username.unwrap_or(current.username);
        let email = update.email.unwrap_or(current.email);
        let active = update.active.unwrap_or(current.active);

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET username = ?, email = ?, active = ?
            WHERE id = ?
            RETURNING id, username, email, active
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(active)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Username or email already exists"))?;
        Ok(user)
    }

    /// Delete a user. Rejected while an active loan references them;
    /// closed loan history is removed with the user.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }

        let has_active_loan: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM loans WHERE user_id = ? AND returned = 0)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if has_active_loan {
            return Err(AppError::Conflict(
                "User has an active loan and cannot be deleted".to_string(),
            ));
        }

        sqlx::query("DELETE FROM loans WHERE user_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
