//! Ingestion engine for per-station observation files
//!
//! Walks a directory of tab-delimited station files, parses each line, and
//! stores valid records through conflict-aware inserts. Each file is one
//! transactional unit of work: a failure rolls that file back and the run
//! continues with the next one.

pub mod engine;

pub use engine::*;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("database error: {0}")]
    Db(#[from] wx_db::DbError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("data directory {0} is missing and no dataset provider is configured")]
    MissingDataDir(PathBuf),

    #[error("dataset fetch failed: {0}")]
    Fetch(#[source] anyhow::Error),
}

pub type IngestResult<T> = Result<T, IngestError>;
