//! Body Scan Dashboard Shared Library
//!
//! This crate contains the measurement normalizer, trend analyzer, CSV
//! export and API types used by the backend and the WASM module.

pub mod dates;
pub mod errors;
pub mod export;
pub mod fallback;
pub mod metrics;
pub mod models;
pub mod normalize;
pub mod trend;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use metrics::{MetricDefinition, MetricType};
pub use models::{Baseline, DataSource, Measure, MeasurementGroup};
pub use normalize::{normalize, Card, Filters, MetricRow, NormalizedTable};
pub use trend::{analyze, TrendSummary};
pub use types::*;
