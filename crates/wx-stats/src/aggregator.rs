//! NULL-aware station-year aggregation

use std::fmt;

use tracing::{error, info, instrument};

use wx_db::{DbClient, StationYearAggregate, StationYearStatsRow};

use crate::StatsResult;

/// Counts for one aggregation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsReport {
    pub pairs_processed: u64,
    pub pairs_failed: u64,
}

impl fmt::Display for StatsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} station-year combinations processed ({} failed)",
            self.pairs_processed, self.pairs_failed
        )
    }
}

/// Aggregation engine bound to one store
pub struct StatsEngine {
    db: DbClient,
}

impl StatsEngine {
    pub fn new(db: DbClient) -> Self {
        Self { db }
    }

    /// Recompute statistics for every (station, year) present in the
    /// observation table.
    ///
    /// Each result fully replaces the stored row for its key. A failure
    /// writing one pair is logged and skipped; the run continues.
    #[instrument(skip(self))]
    pub async fn compute_station_year_stats(&self) -> StatsResult<StatsReport> {
        let aggregates = self.db.select_station_year_aggregates().await?;
        info!("found {} station-year combinations to process", aggregates.len());

        let mut report = StatsReport::default();
        for aggregate in &aggregates {
            let stats = build_stats_row(aggregate);
            match self.db.upsert_station_year_stats(&stats).await {
                Ok(()) => report.pairs_processed += 1,
                Err(err) => {
                    error!(
                        station_id = %aggregate.station_id,
                        year = aggregate.year,
                        error = %err,
                        "error writing statistics, skipping pair"
                    );
                    report.pairs_failed += 1;
                }
            }
        }

        info!(%report, "statistics calculation complete");
        Ok(report)
    }
}

/// Convert one grouped aggregate into its statistics row.
///
/// A field with no present source values stays NULL, never zero.
fn build_stats_row(aggregate: &StationYearAggregate) -> StationYearStatsRow {
    StationYearStatsRow {
        station_id: aggregate.station_id.clone(),
        year: aggregate.year,
        avg_max_temp: present(aggregate.avg_max_temp, aggregate.max_temp_count),
        avg_min_temp: present(aggregate.avg_min_temp, aggregate.min_temp_count),
        total_precipitation: present(aggregate.total_precipitation, aggregate.precipitation_count),
    }
}

fn present(value: Option<f64>, count: i64) -> Option<f64> {
    if count > 0 {
        value
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregate() -> StationYearAggregate {
        StationYearAggregate {
            station_id: "ST1".to_string(),
            year: 2025,
            avg_max_temp: Some(15.0),
            avg_min_temp: Some(7.5),
            total_precipitation: Some(5.0),
            max_temp_count: 2,
            min_temp_count: 2,
            precipitation_count: 2,
        }
    }

    #[test]
    fn carries_values_when_counts_are_positive() {
        let row = build_stats_row(&aggregate());
        assert_eq!(row.avg_max_temp, Some(15.0));
        assert_eq!(row.avg_min_temp, Some(7.5));
        assert_eq!(row.total_precipitation, Some(5.0));
    }

    #[test]
    fn zero_count_forces_null_per_field() {
        let mut agg = aggregate();
        agg.max_temp_count = 0;
        agg.avg_max_temp = None;
        let row = build_stats_row(&agg);
        assert_eq!(row.avg_max_temp, None);
        assert_eq!(row.avg_min_temp, Some(7.5));
        assert_eq!(row.total_precipitation, Some(5.0));
    }
}
