//! Body-Scan Dashboard WASM Module
//!
//! Browser bindings over the shared crate, so the page can re-run the
//! commentary and the CSV export on a table it already holds.

use body_scan_shared::export::build_csv;
use body_scan_shared::trend::analyze;
use body_scan_shared::{Baseline, MetricRow, MetricType};
use wasm_bindgen::prelude::*;

/// Commentary text for a table, as the dashboard shows it
///
/// `timestamps` are the table columns (newest first), `rows_json` the
/// serialized rows of a data or dashboard response.
#[wasm_bindgen]
pub fn analyze_progress(
    timestamps: &[f64],
    rows_json: &str,
    baseline_ts: f64,
    baseline_weight: f64,
    baseline_label: &str,
) -> Result<String, JsValue> {
    progress_text(timestamps, rows_json, baseline_ts, baseline_weight, baseline_label)
        .map_err(|e| JsValue::from_str(&e))
}

/// CSV export of a table; `dates_json` holds the formatted column headers
#[wasm_bindgen]
pub fn export_csv(dates_json: &str, rows_json: &str) -> Result<String, JsValue> {
    table_csv(dates_json, rows_json).map_err(|e| JsValue::from_str(&e))
}

/// Format a real value for the given Withings metric code
///
/// Unknown codes are formatted with two decimals.
#[wasm_bindgen]
pub fn format_metric_value(metric_code: u16, value: f64) -> String {
    match MetricType::from_code(metric_code) {
        Some(metric) => metric.format_value(value),
        None => format!("{:.2}", value),
    }
}

fn parse_rows(rows_json: &str) -> Result<Vec<MetricRow>, String> {
    serde_json::from_str(rows_json).map_err(|e| format!("invalid rows: {}", e))
}

fn progress_text(
    timestamps: &[f64],
    rows_json: &str,
    baseline_ts: f64,
    baseline_weight: f64,
    baseline_label: &str,
) -> Result<String, String> {
    let rows = parse_rows(rows_json)?;
    let columns: Vec<i64> = timestamps.iter().map(|ts| *ts as i64).collect();
    let baseline = Baseline {
        timestamp: baseline_ts as i64,
        weight_kg: baseline_weight,
        label: baseline_label.to_string(),
    };

    Ok(analyze(&columns, &rows, &baseline).text())
}

fn table_csv(dates_json: &str, rows_json: &str) -> Result<String, String> {
    let dates: Vec<String> =
        serde_json::from_str(dates_json).map_err(|e| format!("invalid dates: {}", e))?;
    let rows = parse_rows(rows_json)?;

    build_csv(&dates, &rows).map_err(|e| e.to_string())
}
