//! Data models shared between the repository and API layers

pub mod book;
pub mod loan;
pub mod user;
