//! Table definitions and row types for the weather store
//!
//! The unique constraints here are load-bearing: ingestion and aggregation
//! both rely on them for conflict-aware upserts, so the DDL must stay in
//! sync with the statements in `queries.rs`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{DbClient, DbResult};

/// Raw daily observation row, unique on (station_id, date)
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ObservationRow {
    pub station_id: String,
    pub date: NaiveDate,
    pub max_temp: Option<f64>,
    pub min_temp: Option<f64>,
    pub precipitation: Option<f64>,
}

/// Derived yearly statistics row, unique on (station_id, year)
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct StationYearStatsRow {
    pub station_id: String,
    pub year: i64,
    pub avg_max_temp: Option<f64>,
    pub avg_min_temp: Option<f64>,
    pub total_precipitation: Option<f64>,
}

/// Table names
pub mod tables {
    pub const OBSERVATIONS: &str = "observations";
    pub const STATION_YEAR_STATS: &str = "station_year_stats";
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS observations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        station_id TEXT NOT NULL,
        date TEXT NOT NULL,
        max_temp REAL,
        min_temp REAL,
        precipitation REAL,
        UNIQUE (station_id, date)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_observations_station ON observations (station_id)",
    r#"
    CREATE TABLE IF NOT EXISTS station_year_stats (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        station_id TEXT NOT NULL,
        year INTEGER NOT NULL,
        avg_max_temp REAL,
        avg_min_temp REAL,
        total_precipitation REAL,
        UNIQUE (station_id, year)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_station_year_stats_station ON station_year_stats (station_id)",
    "CREATE INDEX IF NOT EXISTS idx_station_year_stats_year ON station_year_stats (year)",
];

impl DbClient {
    /// Create tables and indexes when they do not exist yet.
    ///
    /// Safe to call on every startup.
    pub async fn init_schema(&self) -> DbResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(self.pool()).await?;
        }
        Ok(())
    }
}
