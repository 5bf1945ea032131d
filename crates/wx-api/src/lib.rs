//! Read API over the observation store
//!
//! Thin axum layer serving both tables with filtering and pagination.
//! Every data endpoint requires a bearer credential accepted by the
//! configured [`Authenticator`]; the engines own all the interesting
//! logic, this crate only shapes responses.

pub mod auth;

pub use auth::*;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use opentelemetry::metrics::{Counter, MeterProvider};
use opentelemetry_prometheus::exporter;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use prometheus::{Encoder, Registry, TextEncoder};
use serde::{Deserialize, Serialize};
use tracing::error;

use wx_db::{DbClient, ObservationFilter, ObservationRow, Page, StationYearStatsRow, StatsFilter};

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 1000;
const MIN_STATS_YEAR: i64 = 1900;
const MAX_STATS_YEAR: i64 = 2100;

pub struct AppState {
    db: DbClient,
    auth: Arc<dyn Authenticator>,
    ready: AtomicBool,
    registry: Registry,
    #[allow(dead_code)]
    provider: SdkMeterProvider,
    requests_total: Counter<u64>,
}

/// Build the router and shared state.
///
/// The app starts not-ready; callers flip it with [`set_ready`] once
/// startup is complete.
pub fn build_app(db: DbClient, auth: Arc<dyn Authenticator>) -> (Router, Arc<AppState>) {
    // Prometheus exporter via OpenTelemetry
    let registry = Registry::new();
    let reader = exporter()
        .with_registry(registry.clone())
        .build()
        .expect("prom exporter");
    let provider = SdkMeterProvider::builder().with_reader(reader).build();
    let meter = provider.meter("wx-api");

    let requests_total = meter
        .u64_counter("wx_requests_total")
        .with_description("Total HTTP requests served")
        .init();

    let state = Arc::new(AppState {
        db,
        auth,
        ready: AtomicBool::new(false),
        registry,
        provider,
        requests_total,
    });

    let router = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/weather", get(get_weather))
        .route("/api/weather/stats", get(get_weather_stats))
        .with_state(Arc::clone(&state));

    (router, state)
}

pub fn set_ready(state: &Arc<AppState>, is_ready: bool) {
    state.ready.store(is_ready, Ordering::Relaxed);
}

#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    BadRequest(String),
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "invalid or missing token".to_string(),
            ),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            ),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<wx_db::DbError> for ApiError {
    fn from(err: wx_db::DbError) -> Self {
        error!(error = %err, "database error serving request");
        ApiError::Internal
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl PaginationInfo {
    fn new(page: Page, total: i64) -> Self {
        let pages = if total > 0 {
            (total + page.limit - 1) / page.limit
        } else {
            0
        };
        Self {
            page: page.page,
            limit: page.limit,
            total,
            pages,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub station_id: Option<String>,
    pub date: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub station_id: Option<String>,
    pub year: Option<i64>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<Principal, ApiError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    state
        .auth
        .authenticate(token)
        .ok_or(ApiError::Unauthorized)
}

fn validate_page(page: Option<i64>, limit: Option<i64>) -> Result<Page, ApiError> {
    let page = page.unwrap_or(1);
    let limit = limit.unwrap_or(DEFAULT_LIMIT);
    if page < 1 {
        return Err(ApiError::BadRequest("page must be >= 1".to_string()));
    }
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        )));
    }
    Ok(Page { page, limit })
}

async fn healthz(State(state): State<Arc<AppState>>) -> StatusCode {
    state.requests_total.add(1, &[]);
    StatusCode::OK
}

async fn readyz(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.ready.load(Ordering::Relaxed) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn metrics(
    State(state): State<Arc<AppState>>,
) -> ([(axum::http::header::HeaderName, axum::http::HeaderValue); 1], String) {
    let encoder = TextEncoder::new();
    let metric_families = state.registry.gather();
    let mut buf = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buf) {
        tracing::warn!(error = ?e, "failed to encode metrics");
    }
    let body = String::from_utf8(buf).unwrap_or_default();
    let header = (
        header::CONTENT_TYPE,
        axum::http::HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    ([header], body)
}

/// GET /api/weather — raw observations with optional station/date filters
async fn get_weather(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<PaginatedResponse<ObservationRow>>, ApiError> {
    state.requests_total.add(1, &[]);
    authorize(&state, &headers)?;

    let page = validate_page(query.page, query.limit)?;
    let date = query
        .date
        .as_deref()
        .map(|raw| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                ApiError::BadRequest("invalid date format, use YYYY-MM-DD".to_string())
            })
        })
        .transpose()?;

    let filter = ObservationFilter {
        station_id: query.station_id,
        date,
    };
    let total = state.db.count_observations(&filter).await?;
    let data = state.db.select_observations(&filter, page).await?;

    Ok(Json(PaginatedResponse {
        data,
        pagination: PaginationInfo::new(page, total),
    }))
}

/// GET /api/weather/stats — yearly statistics with optional
/// station/year filters
async fn get_weather_stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<StatsQuery>,
) -> Result<Json<PaginatedResponse<StationYearStatsRow>>, ApiError> {
    state.requests_total.add(1, &[]);
    authorize(&state, &headers)?;

    let page = validate_page(query.page, query.limit)?;
    if let Some(year) = query.year {
        if !(MIN_STATS_YEAR..=MAX_STATS_YEAR).contains(&year) {
            return Err(ApiError::BadRequest(format!(
                "year must be between {MIN_STATS_YEAR} and {MAX_STATS_YEAR}"
            )));
        }
    }

    let filter = StatsFilter {
        station_id: query.station_id,
        year: query.year,
    };
    let total = state.db.count_station_year_stats(&filter).await?;
    let data = state.db.select_station_year_stats(&filter, page).await?;

    Ok(Json(PaginatedResponse {
        data,
        pagination: PaginationInfo::new(page, total),
    }))
}
