//! PostgreSQL database operations for command-api.
//!
//! [`command`] holds the transaction-scoped queries; [`PgCommandRepository`] wraps them behind
//! the [`crate::CommandRepository`] trait. The schema lives in `migrations/` and is embedded
//! with [`migrator`].

/// Command operations scoped to a caller-provided transaction.
pub mod command;

mod repository;

pub use repository::PgCommandRepository;

/// Returns the migrations embedded from the `migrations/` directory at compile time.
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}
