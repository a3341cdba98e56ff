//! User model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// User model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub active: bool,
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    pub username: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

impl CreateUser {
    /// Presence check: both fields required and non-empty
    pub fn validated(&self) -> Result<(String, String), String> {
        let username = self.username.clone().unwrap_or_default();
        let email = self.email.clone().unwrap_or_default();
        if username.trim().is_empty() || email.trim().is_empty() {
            return Err("Username and email are required".to_string());
        }
        Ok((username, email))
    }
}

/// Update user request (partial, including activation toggling)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    pub username: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_requires_both_fields() {
        let req = CreateUser {
            username: Some("alice".to_string()),
            email: None,
        };
        assert!(req.validated().is_err());
    }

    #[test]
    fn create_user_rejects_malformed_email() {
        let req = CreateUser {
            username: Some("alice".to_string()),
            email: Some("not-an-email".to_string()),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn create_user_accepts_valid_request() {
        let req = CreateUser {
            username: Some("alice".to_string()),
            email: Some("a@x.com".to_string()),
        };
        assert!(req.validate().is_ok());
        assert!(req.validated().is_ok());
    }
}
