//! Remote dataset fetch collaborator
//!
//! Downloads the dataset archive and populates the raw data directory with
//! per-station files. One attempt per run; retry policy is the caller's
//! concern, and a failure here is a setup failure for ingestion.

pub mod remote;

pub use remote::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("download failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("archive contained no station data files under {0:?}")]
    NoStationFiles(String),
}

pub type FetchResult<T> = Result<T, FetchError>;
