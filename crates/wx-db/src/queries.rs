//! Query operations for the observation and statistics tables

use chrono::NaiveDate;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteExecutor};
use tracing::{debug, instrument};

use wx_core::DailyObservation;

use crate::schema::{ObservationRow, StationYearStatsRow};
use crate::{DbClient, DbResult};

/// One row of the grouped station-year aggregate query.
///
/// The per-field counts track how many source rows carried a value; a
/// count of zero means the corresponding aggregate must stay NULL.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct StationYearAggregate {
    pub station_id: String,
    pub year: i64,
    pub avg_max_temp: Option<f64>,
    pub avg_min_temp: Option<f64>,
    pub total_precipitation: Option<f64>,
    pub max_temp_count: i64,
    pub min_temp_count: i64,
    pub precipitation_count: i64,
}

/// Filter for raw observation queries
#[derive(Debug, Clone, Default)]
pub struct ObservationFilter {
    pub station_id: Option<String>,
    pub date: Option<NaiveDate>,
}

/// Filter for yearly statistics queries
#[derive(Debug, Clone, Default)]
pub struct StatsFilter {
    pub station_id: Option<String>,
    pub year: Option<i64>,
}

/// Pagination window (1-based page number)
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

impl Page {
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

/// Insert one observation, ignoring duplicates on (station_id, date).
///
/// Generic over the executor so callers can run it inside a transaction
/// or directly against the pool. Returns true when a row was inserted and
/// false when the key already existed.
pub async fn insert_observation<'e, E>(
    executor: E,
    station_id: &str,
    obs: &DailyObservation,
) -> DbResult<bool>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO observations (station_id, date, max_temp, min_temp, precipitation)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT (station_id, date) DO NOTHING
        "#,
    )
    .bind(station_id)
    .bind(obs.date)
    .bind(obs.max_temp)
    .bind(obs.min_temp)
    .bind(obs.precipitation)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

impl DbClient {
    /// Insert or fully replace the statistics row for (station_id, year)
    #[instrument(skip(self, stats), fields(station_id = %stats.station_id, year = stats.year))]
    pub async fn upsert_station_year_stats(&self, stats: &StationYearStatsRow) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO station_year_stats
                (station_id, year, avg_max_temp, avg_min_temp, total_precipitation)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (station_id, year) DO UPDATE SET
                avg_max_temp = excluded.avg_max_temp,
                avg_min_temp = excluded.avg_min_temp,
                total_precipitation = excluded.total_precipitation
            "#,
        )
        .bind(&stats.station_id)
        .bind(stats.year)
        .bind(stats.avg_max_temp)
        .bind(stats.avg_min_temp)
        .bind(stats.total_precipitation)
        .execute(self.pool())
        .await?;

        debug!("upserted statistics row");
        Ok(())
    }

    /// Group all observations by station and calendar year in one pass.
    ///
    /// SQL aggregates skip NULL inputs, so the averages and sum already
    /// reflect only present values; the counts let callers distinguish
    /// "no present values" from a genuine result.
    #[instrument(skip(self))]
    pub async fn select_station_year_aggregates(&self) -> DbResult<Vec<StationYearAggregate>> {
        let rows = sqlx::query_as::<_, StationYearAggregate>(
            r#"
            SELECT
                station_id,
                CAST(strftime('%Y', date) AS INTEGER) AS year,
                AVG(max_temp) AS avg_max_temp,
                AVG(min_temp) AS avg_min_temp,
                SUM(precipitation) AS total_precipitation,
                COUNT(max_temp) AS max_temp_count,
                COUNT(min_temp) AS min_temp_count,
                COUNT(precipitation) AS precipitation_count
            FROM observations
            GROUP BY station_id, year
            ORDER BY station_id, year
            "#,
        )
        .fetch_all(self.pool())
        .await?;

        debug!("grouped {} station-year combinations", rows.len());
        Ok(rows)
    }

    /// Count observations matching the filter
    pub async fn count_observations(&self, filter: &ObservationFilter) -> DbResult<i64> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM observations");
        push_observation_filter(&mut qb, filter);

        Ok(qb.build_query_scalar::<i64>().fetch_one(self.pool()).await?)
    }

    /// Fetch one page of observations matching the filter,
    /// ordered by (station_id, date)
    #[instrument(skip(self, filter))]
    pub async fn select_observations(
        &self,
        filter: &ObservationFilter,
        page: Page,
    ) -> DbResult<Vec<ObservationRow>> {
        let mut qb = QueryBuilder::new(
            "SELECT station_id, date, max_temp, min_temp, precipitation FROM observations",
        );
        push_observation_filter(&mut qb, filter);
        qb.push(" ORDER BY station_id, date LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());

        Ok(qb
            .build_query_as::<ObservationRow>()
            .fetch_all(self.pool())
            .await?)
    }

    /// Count statistics rows matching the filter
    pub async fn count_station_year_stats(&self, filter: &StatsFilter) -> DbResult<i64> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM station_year_stats");
        push_stats_filter(&mut qb, filter);

        Ok(qb.build_query_scalar::<i64>().fetch_one(self.pool()).await?)
    }

    /// Fetch one page of statistics rows matching the filter,
    /// ordered by (station_id, year)
    #[instrument(skip(self, filter))]
    pub async fn select_station_year_stats(
        &self,
        filter: &StatsFilter,
        page: Page,
    ) -> DbResult<Vec<StationYearStatsRow>> {
        let mut qb = QueryBuilder::new(
            "SELECT station_id, year, avg_max_temp, avg_min_temp, total_precipitation \
             FROM station_year_stats",
        );
        push_stats_filter(&mut qb, filter);
        qb.push(" ORDER BY station_id, year LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());

        Ok(qb
            .build_query_as::<StationYearStatsRow>()
            .fetch_all(self.pool())
            .await?)
    }
}

fn push_observation_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &ObservationFilter) {
    let mut prefix = " WHERE ";
    if let Some(station_id) = &filter.station_id {
        qb.push(prefix)
            .push("station_id = ")
            .push_bind(station_id.clone());
        prefix = " AND ";
    }
    if let Some(date) = filter.date {
        qb.push(prefix).push("date = ").push_bind(date);
    }
}

fn push_stats_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &StatsFilter) {
    let mut prefix = " WHERE ";
    if let Some(station_id) = &filter.station_id {
        qb.push(prefix)
            .push("station_id = ")
            .push_bind(station_id.clone());
        prefix = " AND ";
    }
    if let Some(year) = filter.year {
        qb.push(prefix).push("year = ").push_bind(year);
    }
}
