//! Trend analysis and progress commentary
//!
//! Compares the newest and oldest columns of a normalized table and turns the
//! differences into short sentences plus rule-based advice. A metric that is
//! missing or unparsable is skipped; it never reads as "no change".

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::dates::format_day;
use crate::metrics::MetricType;
use crate::models::Baseline;
use crate::normalize::MetricRow;

const SECONDS_PER_DAY: f64 = 86_400.0;
const SECONDS_PER_WEEK: f64 = 7.0 * SECONDS_PER_DAY;

/// Returned when there are no columns or rows to compare
pub const INSUFFICIENT_DATA_MESSAGE: &str = "Not enough data for a commentary yet.";

/// Weekly change (kg/week) beyond which weight advice is given, in either direction
pub const FAST_LOSS_KG_PER_WEEK: f64 = 1.0;
/// Body-fat increase (percentage points) that triggers advice
pub const FAT_RISE_THRESHOLD: f64 = 0.5;
/// Muscle-mass decrease (kg) that triggers advice
pub const MUSCLE_DROP_THRESHOLD: f64 = -0.5;

/// Deviation of the current weight from the configured baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineDelta {
    /// `baseline − now`; positive means lighter than at baseline
    pub change_kg: f64,
    pub weeks: f64,
    pub kg_per_week: f64,
}

/// Result of a trend analysis
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrendSummary {
    /// Positive when weight is decreasing
    pub weekly_weight_rate: Option<f64>,
    pub baseline: Option<BaselineDelta>,
    /// `now − then` in percentage points
    pub body_fat_change: Option<f64>,
    /// `now − then` in kg
    pub muscle_change: Option<f64>,
    pub observations: Vec<String>,
    pub recommendations: Vec<String>,
    pub insufficient_data: bool,
}

impl TrendSummary {
    fn insufficient() -> Self {
        Self {
            insufficient_data: true,
            ..Self::default()
        }
    }

    /// Commentary as a single block of text
    pub fn text(&self) -> String {
        if self.insufficient_data {
            return INSUFFICIENT_DATA_MESSAGE.to_string();
        }
        let mut bits = self.observations.clone();
        if !self.recommendations.is_empty() {
            bits.push(format!("What to improve: {}", self.recommendations.join(" ")));
        }
        bits.join(" ")
    }
}

impl fmt::Display for TrendSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Parse a display value, accepting either `,` or `.` as decimal separator
///
/// Empty, unparsable and non-finite input yields `None`.
pub fn parse_locale_decimal(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .replacen(',', ".", 1)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn find_row(rows: &[MetricRow], metric: MetricType) -> Option<&MetricRow> {
    rows.iter().find(|r| r.metric_type == metric.code())
}

/// Newest and oldest parsed values of a metric, if both are available
fn endpoints(rows: &[MetricRow], metric: MetricType) -> (Option<f64>, Option<f64>) {
    match find_row(rows, metric) {
        Some(row) => (parse_locale_decimal(row.latest()), parse_locale_decimal(row.earliest())),
        None => (None, None),
    }
}

fn delta(rows: &[MetricRow], metric: MetricType) -> Option<f64> {
    match endpoints(rows, metric) {
        (Some(now), Some(then)) => Some(now - then),
        _ => None,
    }
}

/// Analyze progress between the newest and oldest columns
///
/// `columns` must be sorted newest first, as produced by the normalizer.
pub fn analyze(columns: &[i64], rows: &[MetricRow], baseline: &Baseline) -> TrendSummary {
    let (Some(&now_ts), Some(&then_ts)) = (columns.first(), columns.last()) else {
        return TrendSummary::insufficient();
    };
    if rows.is_empty() {
        return TrendSummary::insufficient();
    }

    let (weight_now, weight_then) = endpoints(rows, MetricType::Weight);
    let elapsed_days = ((now_ts - then_ts) as f64 / SECONDS_PER_DAY).max(1.0);

    let weekly_weight_rate = match (weight_now, weight_then) {
        (Some(now), Some(then)) => Some((now - then) / elapsed_days * 7.0 * -1.0),
        _ => None,
    };

    let weeks_since_baseline = (now_ts - baseline.timestamp) as f64 / SECONDS_PER_WEEK;
    let baseline_delta = weight_now.filter(|_| weeks_since_baseline > 0.0).map(|now| {
        let change_kg = baseline.weight_kg - now;
        BaselineDelta {
            change_kg,
            weeks: weeks_since_baseline,
            kg_per_week: change_kg / weeks_since_baseline,
        }
    });

    let body_fat_change = delta(rows, MetricType::FatRatio);
    let muscle_change = delta(rows, MetricType::MuscleMass);

    let mut observations = Vec::new();
    if let Some(rate) = weekly_weight_rate {
        let direction = if rate > 0.0 { "decreasing" } else { "increasing" };
        observations.push(format!("Weight is {} at ~{:.2} kg/week.", direction, rate.abs()));
    }
    if let Some(b) = &baseline_delta {
        let direction = if b.change_kg >= 0.0 { "down" } else { "up" };
        let since = baseline
            .date()
            .map(|d| format!("{} ({})", baseline.label, format_day(d)))
            .unwrap_or_else(|| baseline.label.clone());
        observations.push(format!(
            "Since {} weight is {} {:.1} kg (≈ {:.2} kg/week).",
            since,
            direction,
            b.change_kg.abs(),
            b.kg_per_week.abs()
        ));
    }
    if let Some(fat) = body_fat_change {
        let direction = if fat <= 0.0 { "fell" } else { "rose" };
        observations.push(format!(
            "Body fat over the selected period {} by {:.1} pp.",
            direction,
            fat.abs()
        ));
    }
    if let Some(muscle) = muscle_change {
        let direction = if muscle >= 0.0 { "grew" } else { "fell" };
        observations.push(format!(
            "Muscle mass over the selected period {} by {:.2} kg.",
            direction,
            muscle.abs()
        ));
    }

    let recommendations = recommend(weekly_weight_rate, body_fat_change, muscle_change);

    TrendSummary {
        weekly_weight_rate,
        baseline: baseline_delta,
        body_fat_change,
        muscle_change,
        observations,
        recommendations,
        insufficient_data: false,
    }
}

fn recommend(weekly_rate: Option<f64>, fat: Option<f64>, muscle: Option<f64>) -> Vec<String> {
    let mut rec = Vec::new();
    if let Some(rate) = weekly_rate {
        if rate > FAST_LOSS_KG_PER_WEEK {
            rec.push("Weight loss is fast; consider more protein and a smaller calorie deficit.");
        }
        if rate < -FAST_LOSS_KG_PER_WEEK {
            rec.push("Weight is going up; consider a smaller calorie intake or more activity.");
        }
    }
    if fat.is_some_and(|f| f > FAT_RISE_THRESHOLD) {
        rec.push("Body fat % is rising; check sugar intake and meal timing.");
    }
    if muscle.is_some_and(|m| m < MUSCLE_DROP_THRESHOLD) {
        rec.push("Muscle mass is falling; add strength training and protein (1.6-2.2 g/kg).");
    }
    rec.into_iter().map(String::from).collect()
}
