//! Repository-level tests for the loan lifecycle
//!
//! These go below the HTTP layer to assert what actually lands in the
//! loans table: period slug, computed return date, returned flag.

use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use lending_server::{
    config::LoanPolicy,
    models::loan::LoanPeriod,
    repository::Repository,
    AppError, MIGRATOR,
};

static DB_COUNTER: AtomicUsize = AtomicUsize::new(0);

async fn test_repository() -> Repository {
    let db_path = std::env::temp_dir().join(format!(
        "lending-repo-test-{}-{}.db",
        std::process::id(),
        DB_COUNTER.fetch_add(1, Ordering::SeqCst)
    ));

    let connect_options =
        SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.display()))
            .expect("valid sqlite url")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await
        .expect("Failed to open test database");

    MIGRATOR.run(&pool).await.expect("Failed to run migrations");
    Repository::new(pool)
}

#[tokio::test]
async fn borrow_records_period_and_return_date() {
    let repo = test_repository().await;
    let policy = LoanPolicy {
        short_days: 1,
        medium_days: 5,
        long_days: 10,
    };

    let user = repo.users.create("alice", "a@x.com").await.expect("user");
    let book = repo.books.create("The Trial", "Kafka").await.expect("book");

    let before = Utc::now();
    let receipt = repo
        .loans
        .borrow(user.id, book.id, 2, &policy)
        .await
        .expect("borrow");

    let loan = repo.loans.get_by_id(receipt.loan_id).await.expect("loan row");
    assert_eq!(loan.user_id, user.id);
    assert_eq!(loan.book_id, book.id);
    assert_eq!(loan.period, LoanPeriod::Medium);
    assert!(!loan.returned);
    assert!(loan.returned_date.is_none());

    // return_date = borrowed_date + policy offset, to the second
    assert_eq!(
        loan.return_date - loan.borrowed_date,
        ChronoDuration::days(5)
    );
    assert!(loan.borrowed_date >= before - ChronoDuration::seconds(1));

    let book = repo.books.get_by_id(book.id).await.expect("book row");
    assert!(!book.available);
}

#[tokio::test]
async fn return_closes_loan_and_restores_availability() {
    let repo = test_repository().await;
    let policy = LoanPolicy::default();

    let user = repo.users.create("alice", "a@x.com").await.expect("user");
    let book = repo.books.create("The Trial", "Kafka").await.expect("book");

    let receipt = repo
        .loans
        .borrow(user.id, book.id, 1, &policy)
        .await
        .expect("borrow");

    repo.loans
        .return_book(user.id, book.id)
        .await
        .expect("return");

    let loan = repo.loans.get_by_id(receipt.loan_id).await.expect("loan row");
    assert!(loan.returned);
    assert!(loan.returned_date.is_some());

    let book = repo.books.get_by_id(book.id).await.expect("book row");
    assert!(book.available);

    // The closed loan no longer matches the active-loan lookup
    let err = repo
        .loans
        .return_book(user.id, book.id)
        .await
        .expect_err("second return must fail");
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn failed_borrow_leaves_no_partial_state() {
    let repo = test_repository().await;
    let policy = LoanPolicy::default();

    let book = repo.books.create("The Trial", "Kafka").await.expect("book");

    // Borrowing for a nonexistent user fails after the book was marked
    // inside the transaction; the rollback must undo the mark
    let err = repo
        .loans
        .borrow(999, book.id, 1, &policy)
        .await
        .expect_err("borrow must fail");
    assert!(matches!(err, AppError::NotFound(_)));

    let book = repo.books.get_by_id(book.id).await.expect("book row");
    assert!(book.available);
}

#[tokio::test]
async fn selector_validated_after_existence_checks() {
    let repo = test_repository().await;
    let policy = LoanPolicy::default();

    let user = repo.users.create("alice", "a@x.com").await.expect("user");
    let book = repo.books.create("The Trial", "Kafka").await.expect("book");

    // Unknown user wins over a bad selector
    let err = repo
        .loans
        .borrow(999, book.id, 9, &policy)
        .await
        .expect_err("borrow must fail");
    assert!(matches!(err, AppError::NotFound(_)));

    // Bad selector alone is a validation error, and rolls back the mark
    let err = repo
        .loans
        .borrow(user.id, book.id, 9, &policy)
        .await
        .expect_err("borrow must fail");
    assert!(matches!(err, AppError::Validation(_)));

    let book = repo.books.get_by_id(book.id).await.expect("book row");
    assert!(book.available);
}
