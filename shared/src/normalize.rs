//! Measurement normalizer
//!
//! Turns scan sessions into a metric-major table: one row per metric, one
//! column per distinct timestamp (newest first), with values formatted to the
//! metric's display precision.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::metrics::MetricType;
use crate::models::MeasurementGroup;

/// Number of KPI cards shown at a glance
pub const CARD_COUNT: usize = 6;

/// Range and column-count filters applied before reshaping
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    /// Inclusive lower bound on group timestamp
    pub from: Option<i64>,
    /// Inclusive upper bound on group timestamp
    pub to: Option<i64>,
    /// Maximum number of (most recent) columns; `None` or `Some(0)` is unbounded
    pub limit: Option<usize>,
}

impl Filters {
    pub fn contains(&self, timestamp: i64) -> bool {
        self.from.map_or(true, |from| timestamp >= from)
            && self.to.map_or(true, |to| timestamp <= to)
    }

    fn column_limit(&self) -> Option<usize> {
        self.limit.filter(|&n| n > 0)
    }
}

/// One metric's values aligned to the table columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRow {
    #[serde(rename = "type")]
    pub metric_type: u16,
    pub label: String,
    pub unit: String,
    #[serde(default)]
    pub decimals: usize,
    /// Formatted values; empty string where the metric has no reading
    pub values: Vec<String>,
}

impl MetricRow {
    /// Most recent value (first column), empty when there are no columns
    pub fn latest(&self) -> &str {
        self.values.first().map(String::as_str).unwrap_or("")
    }

    /// Oldest value in the window (last column)
    pub fn earliest(&self) -> &str {
        self.values.last().map(String::as_str).unwrap_or("")
    }
}

/// At-a-glance value for a dashboard card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub label: String,
    pub value: String,
    pub unit: String,
}

/// Normalized, render-ready table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedTable {
    /// Distinct timestamps, newest first
    pub columns: Vec<i64>,
    pub rows: Vec<MetricRow>,
    pub cards: Vec<Card>,
}

impl NormalizedTable {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn row(&self, metric: MetricType) -> Option<&MetricRow> {
        self.rows.iter().find(|r| r.metric_type == metric.code())
    }
}

/// Normalize scan sessions into a table
///
/// The value lookup is built from every group inside the range, before the
/// column limit is applied, so each surviving column resolves against the
/// full filtered set.
pub fn normalize(
    groups: &[MeasurementGroup],
    order: &[MetricType],
    filters: &Filters,
) -> NormalizedTable {
    let filtered: Vec<&MeasurementGroup> = groups
        .iter()
        .filter(|g| filters.contains(g.timestamp))
        .collect();

    let mut timestamps: Vec<i64> = filtered.iter().map(|g| g.timestamp).collect();
    timestamps.sort_unstable_by(|a, b| b.cmp(a));
    let mut seen = HashSet::new();
    let mut columns: Vec<i64> = timestamps.into_iter().filter(|ts| seen.insert(*ts)).collect();

    if let Some(limit) = filters.column_limit() {
        columns.truncate(limit);
    }

    let mut lookup: HashMap<(u16, i64), f64> = HashMap::new();
    for group in &filtered {
        for measure in &group.measures {
            lookup.insert((measure.metric_type, group.timestamp), measure.real_value());
        }
    }

    let rows: Vec<MetricRow> = order
        .iter()
        .map(|metric| {
            let def = metric.definition();
            let values = columns
                .iter()
                .map(|ts| {
                    lookup
                        .get(&(metric.code(), *ts))
                        .map(|v| metric.format_value(*v))
                        .unwrap_or_default()
                })
                .collect();
            MetricRow {
                metric_type: metric.code(),
                label: def.display_name.to_string(),
                unit: def.unit.to_string(),
                decimals: def.decimal_places,
                values,
            }
        })
        .collect();

    let cards = cards_from_rows(&rows);

    NormalizedTable { columns, rows, cards }
}

/// First `CARD_COUNT` rows paired with their most recent value
pub fn cards_from_rows(rows: &[MetricRow]) -> Vec<Card> {
    rows.iter()
        .take(CARD_COUNT)
        .map(|r| Card {
            label: r.label.clone(),
            value: r.latest().to_string(),
            unit: r.unit.clone(),
        })
        .collect()
}
