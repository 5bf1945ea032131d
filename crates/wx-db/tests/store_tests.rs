//! Store-level tests against a real temporary SQLite database

use chrono::NaiveDate;
use wx_core::DailyObservation;
use wx_db::{
    insert_observation, DbClient, ObservationFilter, Page, StationYearStatsRow, StatsFilter,
};

async fn test_db() -> (tempfile::TempDir, DbClient) {
    let dir = tempfile::tempdir().unwrap();
    let db = DbClient::open_file(dir.path().join("wx.db")).await.unwrap();
    db.init_schema().await.unwrap();
    (dir, db)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn obs(y: i32, m: u32, d: u32, max: Option<f64>, min: Option<f64>, prcp: Option<f64>) -> DailyObservation {
    DailyObservation {
        date: date(y, m, d),
        max_temp: max,
        min_temp: min,
        precipitation: prcp,
    }
}

#[tokio::test]
async fn insert_reports_new_vs_duplicate() {
    let (_dir, db) = test_db().await;

    let first = obs(2025, 1, 1, Some(10.0), Some(5.0), Some(0.0));
    assert!(insert_observation(db.pool(), "ST1", &first).await.unwrap());

    // Same key again, even with different values, is a no-op skip
    let second = obs(2025, 1, 1, Some(99.0), Some(99.0), Some(99.0));
    assert!(!insert_observation(db.pool(), "ST1", &second).await.unwrap());

    let rows = db
        .select_observations(&ObservationFilter::default(), Page { page: 1, limit: 10 })
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].max_temp, Some(10.0));

    // Same date at a different station is a distinct key
    assert!(insert_observation(db.pool(), "ST2", &first).await.unwrap());
}

#[tokio::test]
async fn dropped_transaction_rolls_back() {
    let (_dir, db) = test_db().await;

    {
        let mut tx = db.begin().await.unwrap();
        let rec = obs(2025, 1, 1, Some(10.0), None, None);
        insert_observation(&mut *tx, "ST1", &rec).await.unwrap();
        // dropped without commit
    }

    let total = db
        .count_observations(&ObservationFilter::default())
        .await
        .unwrap();
    assert_eq!(total, 0);
}

#[tokio::test]
async fn grouped_aggregates_skip_missing_values() {
    let (_dir, db) = test_db().await;

    insert_observation(db.pool(), "ST1", &obs(2025, 1, 1, Some(10.0), Some(5.0), None))
        .await
        .unwrap();
    insert_observation(db.pool(), "ST1", &obs(2025, 1, 2, Some(20.0), None, None))
        .await
        .unwrap();
    insert_observation(db.pool(), "ST1", &obs(2024, 12, 31, Some(0.0), Some(-5.0), Some(1.5)))
        .await
        .unwrap();

    let aggregates = db.select_station_year_aggregates().await.unwrap();
    assert_eq!(aggregates.len(), 2);

    let y2024 = &aggregates[0];
    assert_eq!(y2024.year, 2024);
    assert_eq!(y2024.avg_max_temp, Some(0.0));
    assert_eq!(y2024.total_precipitation, Some(1.5));
    assert_eq!(y2024.precipitation_count, 1);

    let y2025 = &aggregates[1];
    assert_eq!(y2025.year, 2025);
    assert_eq!(y2025.avg_max_temp, Some(15.0));
    assert_eq!(y2025.max_temp_count, 2);
    assert_eq!(y2025.avg_min_temp, Some(5.0));
    assert_eq!(y2025.min_temp_count, 1);
    // No precipitation measured at all in 2025
    assert_eq!(y2025.total_precipitation, None);
    assert_eq!(y2025.precipitation_count, 0);
}

#[tokio::test]
async fn stats_upsert_replaces_existing_row() {
    let (_dir, db) = test_db().await;

    let initial = StationYearStatsRow {
        station_id: "ST1".to_string(),
        year: 2025,
        avg_max_temp: Some(15.0),
        avg_min_temp: Some(7.5),
        total_precipitation: Some(5.0),
    };
    db.upsert_station_year_stats(&initial).await.unwrap();

    let replacement = StationYearStatsRow {
        avg_max_temp: Some(16.0),
        avg_min_temp: None,
        total_precipitation: Some(6.0),
        ..initial.clone()
    };
    db.upsert_station_year_stats(&replacement).await.unwrap();

    let rows = db
        .select_station_year_stats(&StatsFilter::default(), Page { page: 1, limit: 10 })
        .await
        .unwrap();
    assert_eq!(rows, vec![replacement]);
}

#[tokio::test]
async fn observation_filters_and_pagination() {
    let (_dir, db) = test_db().await;

    for day in 1..=5 {
        insert_observation(db.pool(), "ST1", &obs(2025, 1, day, Some(day as f64), None, None))
            .await
            .unwrap();
    }
    insert_observation(db.pool(), "ST2", &obs(2025, 1, 1, Some(7.0), None, None))
        .await
        .unwrap();

    let st1 = ObservationFilter {
        station_id: Some("ST1".to_string()),
        date: None,
    };
    assert_eq!(db.count_observations(&st1).await.unwrap(), 5);

    let page2 = db
        .select_observations(&st1, Page { page: 2, limit: 2 })
        .await
        .unwrap();
    assert_eq!(page2.len(), 2);
    assert_eq!(page2[0].date, date(2025, 1, 3));

    let by_date = ObservationFilter {
        station_id: None,
        date: Some(date(2025, 1, 1)),
    };
    assert_eq!(db.count_observations(&by_date).await.unwrap(), 2);

    let both = ObservationFilter {
        station_id: Some("ST2".to_string()),
        date: Some(date(2025, 1, 1)),
    };
    let rows = db
        .select_observations(&both, Page { page: 1, limit: 10 })
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].station_id, "ST2");
}

#[tokio::test]
async fn stats_filters_by_station_and_year() {
    let (_dir, db) = test_db().await;

    for (station, year) in [("ST1", 2024), ("ST1", 2025), ("ST2", 2025)] {
        db.upsert_station_year_stats(&StationYearStatsRow {
            station_id: station.to_string(),
            year,
            avg_max_temp: Some(1.0),
            avg_min_temp: None,
            total_precipitation: None,
        })
        .await
        .unwrap();
    }

    let by_year = StatsFilter {
        station_id: None,
        year: Some(2025),
    };
    assert_eq!(db.count_station_year_stats(&by_year).await.unwrap(), 2);

    let by_station = StatsFilter {
        station_id: Some("ST1".to_string()),
        year: None,
    };
    let rows = db
        .select_station_year_stats(&by_station, Page { page: 1, limit: 10 })
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].year, 2024);
}
