//! Placeholder dataset shown when live data is unavailable
//!
//! Six scan sessions from 10-15 Aug 2025, run through the normal normalizer
//! so the fallback table has the same shape as live output.

use crate::metrics::MetricType;
use crate::models::{Measure, MeasurementGroup};
use crate::normalize::{normalize, Filters, NormalizedTable};

/// Commentary shown instead of an analysis of placeholder data
pub const PLACEHOLDER_COMMENT: &str = "Still collecting data…";

// (timestamp, weight, fat, muscle, water), all scaled by 10^-1
const SESSIONS: [(i64, i64, i64, i64, i64); 6] = [
    (1_755_238_320, 1126, 334, 682, 451),
    (1_755_151_740, 1129, 336, 680, 450),
    (1_755_064_920, 1131, 338, 679, 449),
    (1_754_978_280, 1135, 340, 678, 448),
    (1_754_892_600, 1132, 339, 679, 448),
    (1_754_806_020, 1138, 341, 677, 447),
];

/// Raw placeholder sessions; the newest also carries PWV and vascular age
pub fn placeholder_groups() -> Vec<MeasurementGroup> {
    SESSIONS
        .iter()
        .enumerate()
        .map(|(i, &(ts, weight, fat, muscle, water))| {
            let mut measures = vec![
                Measure::new(MetricType::Weight.code(), weight, -1),
                Measure::new(MetricType::FatRatio.code(), fat, -1),
                Measure::new(MetricType::MuscleMass.code(), muscle, -1),
                Measure::new(MetricType::WaterMass.code(), water, -1),
            ];
            if i == 0 {
                measures.push(Measure::new(MetricType::PulseWaveVelocity.code(), 68, -1));
                measures.push(Measure::new(MetricType::VascularAge.code(), 49, 0));
            }
            MeasurementGroup::new(ts, measures)
        })
        .collect()
}

/// Normalized placeholder table
pub fn placeholder_table() -> NormalizedTable {
    normalize(&placeholder_groups(), &MetricType::ALL, &Filters::default())
}
