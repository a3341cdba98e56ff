//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub available: bool,
}

/// Create book request
///
/// Fields are optional at the serde level so a missing key surfaces as a
/// 400 validation error rather than a deserialization rejection.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBook {
    pub title: Option<String>,
    pub author: Option<String>,
}

impl CreateBook {
    /// Presence check: both fields required and non-empty
    pub fn validated(self) -> Result<(String, String), String> {
        let title = self.title.unwrap_or_default();
        let author = self.author.unwrap_or_default();
        if title.trim().is_empty() || author.trim().is_empty() {
            return Err("Title and author are required".to_string());
        }
        Ok((title, author))
    }
}

/// Update book request (partial: omitted fields keep their current value)
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub available: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_book_rejects_missing_fields() {
        let req = CreateBook {
            title: Some("The Trial".to_string()),
            author: None,
        };
        assert!(req.validated().is_err());

        let req = CreateBook {
            title: None,
            author: Some("Kafka".to_string()),
        };
        assert!(req.validated().is_err());
    }

    #[test]
    fn create_book_rejects_blank_fields() {
        let req = CreateBook {
            title: Some("   ".to_string()),
            author: Some("Kafka".to_string()),
        };
        assert!(req.validated().is_err());
    }

    #[test]
    fn create_book_accepts_complete_request() {
        let req = CreateBook {
            title: Some("The Trial".to_string()),
            author: Some("Kafka".to_string()),
        };
        let (title, author) = req.validated().expect("valid request");
        assert_eq!(title, "The Trial");
        assert_eq!(author, "Kafka");
    }
}
