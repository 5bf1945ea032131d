//! Record types for raw and aggregated weather data

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of observations at a single station, as parsed from a data file.
///
/// Each measurement is independently optional: `None` means the station
/// reported no measurement for that field, which is distinct from zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyObservation {
    /// Calendar date of the observation
    pub date: NaiveDate,

    /// Maximum temperature in degrees Celsius
    pub max_temp: Option<f64>,

    /// Minimum temperature in degrees Celsius
    pub min_temp: Option<f64>,

    /// Accumulated precipitation in centimeters
    pub precipitation: Option<f64>,
}
