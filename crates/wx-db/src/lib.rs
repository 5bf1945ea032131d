//! SQLite store for raw observations and derived yearly statistics
//!
//! The store enforces the uniqueness invariants -- (station_id, date) for
//! observations and (station_id, year) for statistics -- so that engines
//! can resolve conflicts through upsert statements rather than locking.

pub mod client;
pub mod queries;
pub mod schema;

pub use client::*;
pub use queries::*;
pub use schema::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("invalid database url {url:?}: {source}")]
    InvalidUrl { url: String, source: sqlx::Error },
}

pub type DbResult<T> = Result<T, DbError>;
