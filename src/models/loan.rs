//! Loan model and the loan-period enumeration

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Loan period category. The wire selector is the numeric code (1/2/3);
/// the database stores the slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum LoanPeriod {
    Short,
    Medium,
    Long,
}

impl LoanPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanPeriod::Short => "short",
            LoanPeriod::Medium => "medium",
            LoanPeriod::Long => "long",
        }
    }
}

impl TryFrom<i64> for LoanPeriod {
    type Error = String;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(LoanPeriod::Short),
            2 => Ok(LoanPeriod::Medium),
            3 => Ok(LoanPeriod::Long),
            other => Err(format!("Invalid loan type: {}", other)),
        }
    }
}

impl std::fmt::Display for LoanPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Loan model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Loan {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
    pub borrowed_date: DateTime<Utc>,
    pub return_date: DateTime<Utc>,
    pub period: LoanPeriod,
    pub returned: bool,
    pub returned_date: Option<DateTime<Utc>>,
}

/// Borrow request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct BorrowRequest {
    pub user_id: Option<i64>,
    pub book_id: Option<i64>,
    /// Numeric loan period selector: 1 = short, 2 = medium, 3 = long
    pub loan_type: Option<i64>,
}

/// Return request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReturnRequest {
    pub user_id: Option<i64>,
    pub book_id: Option<i64>,
}

/// Outcome of a successful borrow, used to build the API response
#[derive(Debug, Clone)]
pub struct LoanReceipt {
    pub loan_id: i64,
    pub return_date: DateTime<Utc>,
    pub book_title: String,
    pub user_name: String,
}

/// Due date for a loan: borrow date plus the configured day offset
pub fn due_date(borrowed: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    borrowed + Duration::days(days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn period_from_numeric_selector() {
        assert_eq!(LoanPeriod::try_from(1), Ok(LoanPeriod::Short));
        assert_eq!(LoanPeriod::try_from(2), Ok(LoanPeriod::Medium));
        assert_eq!(LoanPeriod::try_from(3), Ok(LoanPeriod::Long));
        assert!(LoanPeriod::try_from(0).is_err());
        assert!(LoanPeriod::try_from(4).is_err());
    }

    #[test]
    fn due_date_adds_offset() {
        let borrowed = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let due = due_date(borrowed, 2);
        assert_eq!(due, Utc.with_ymd_and_hms(2024, 3, 12, 12, 0, 0).unwrap());
    }

    #[test]
    fn due_date_rolls_over_month() {
        let borrowed = Utc.with_ymd_and_hms(2024, 1, 31, 8, 30, 0).unwrap();
        let due = due_date(borrowed, 1);
        assert_eq!(due, Utc.with_ymd_and_hms(2024, 2, 1, 8, 30, 0).unwrap());
    }

    #[test]
    fn due_date_rolls_over_year() {
        let borrowed = Utc.with_ymd_and_hms(2023, 12, 30, 23, 0, 0).unwrap();
        let due = due_date(borrowed, 3);
        assert_eq!(due, Utc.with_ymd_and_hms(2024, 1, 2, 23, 0, 0).unwrap());
    }

    #[test]
    fn due_date_handles_leap_day() {
        let borrowed = Utc.with_ymd_and_hms(2024, 2, 28, 10, 0, 0).unwrap();
        let due = due_date(borrowed, 2);
        assert_eq!(due, Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap());
    }
}
