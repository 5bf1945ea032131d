//! Yearly statistics engine
//!
//! Recomputes per-(station, year) aggregate statistics from the raw
//! observation table and fully replaces the stored results, so the
//! computation can be re-run at any time after any amount of ingestion.

pub mod aggregator;

pub use aggregator::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("database error: {0}")]
    Db(#[from] wx_db::DbError),
}

pub type StatsResult<T> = Result<T, StatsError>;
