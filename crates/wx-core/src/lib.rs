//! Core data types and parsing for daily weather observations
//!
//! This crate provides the record types, the sentinel-aware unit
//! conversions, and the line parser shared by the ingestion and
//! aggregation engines.

pub mod dataset;
pub mod parse;
pub mod types;
pub mod units;

pub use dataset::*;
pub use parse::*;
pub use types::*;
pub use units::*;
