//! Data models for body-scan measurements

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics::real_value;

/// A single scaled reading inside a scan session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measure {
    /// Withings metric-type code
    #[serde(rename = "type")]
    pub metric_type: u16,
    /// Raw integer value
    pub value: i64,
    /// Power-of-ten exponent applied to `value`
    pub unit: i32,
}

impl Measure {
    pub fn new(metric_type: u16, value: i64, unit: i32) -> Self {
        Self {
            metric_type,
            value,
            unit,
        }
    }

    /// Real value of the reading
    pub fn real_value(&self) -> f64 {
        real_value(self.value, self.unit)
    }
}

/// One scan session as reported by the server
///
/// `timestamp` identifies the session; a session carries at most one
/// measure per metric type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementGroup {
    /// Seconds since epoch, UTC
    #[serde(alias = "date")]
    pub timestamp: i64,
    pub measures: Vec<Measure>,
}

impl MeasurementGroup {
    pub fn new(timestamp: i64, measures: Vec<Measure>) -> Self {
        Self {
            timestamp,
            measures,
        }
    }
}

/// Fixed historical reference point for long-run deviation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    /// Seconds since epoch, UTC
    pub timestamp: i64,
    pub weight_kg: f64,
    /// Short name shown in commentary, e.g. a treatment start
    pub label: String,
}

impl Baseline {
    /// Baseline at midnight UTC of `date`
    pub fn from_date(date: NaiveDate, weight_kg: f64, label: impl Into<String>) -> Self {
        let timestamp = date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or_default();
        Self {
            timestamp,
            weight_kg,
            label: label.into(),
        }
    }

    /// Calendar date of the baseline in UTC
    pub fn date(&self) -> Option<NaiveDate> {
        DateTime::<Utc>::from_timestamp(self.timestamp, 0).map(|dt| dt.date_naive())
    }
}

impl Default for Baseline {
    fn default() -> Self {
        // 18 Jan 2025, 00:00:00 UTC
        Self {
            timestamp: 1_737_158_400,
            weight_kg: 126.3,
            label: "Mounjaro start".to_string(),
        }
    }
}

/// Whether dashboard data came from the scale or the placeholder set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Live,
    Fallback,
}
