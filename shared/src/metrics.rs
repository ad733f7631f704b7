//! Metric catalog for body-scan measurements
//!
//! Withings reports each reading with an integer metric-type code. This module
//! maps the codes the dashboard displays to their labels, units and display
//! precision.
//!
//! # Design Principles
//!
//! 1. **Fixed order**: `MetricType::ALL` defines the row order of every table
//! 2. **Codes at the boundary**: raw codes stay `u16` in wire types so unknown
//!    codes from the upstream API pass through without failing deserialization

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Metric Types
// ============================================================================

/// A measured quantity reported by the scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum MetricType {
    Weight,
    FatRatio,
    MuscleMass,
    WaterMass,
    PulseWaveVelocity,
    VascularAge,
}

/// Static display definition for a metric type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDefinition {
    pub metric_type: MetricType,
    pub display_name: &'static str,
    pub unit: &'static str,
    pub decimal_places: usize,
}

impl MetricType {
    /// Every displayed metric, in row order
    pub const ALL: [MetricType; 6] = [
        MetricType::Weight,
        MetricType::FatRatio,
        MetricType::MuscleMass,
        MetricType::WaterMass,
        MetricType::PulseWaveVelocity,
        MetricType::VascularAge,
    ];

    /// Withings `meastype` code
    pub fn code(&self) -> u16 {
        match self {
            MetricType::Weight => 1,
            MetricType::FatRatio => 6,
            MetricType::MuscleMass => 8,
            MetricType::WaterMass => 9,
            MetricType::PulseWaveVelocity => 91,
            MetricType::VascularAge => 123,
        }
    }

    /// Look up a metric by its Withings code
    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.code() == code)
    }

    pub fn definition(&self) -> MetricDefinition {
        let (display_name, unit, decimal_places) = match self {
            MetricType::Weight => ("Weight", "kg", 2),
            MetricType::FatRatio => ("Body fat (%)", "%", 1),
            MetricType::MuscleMass => ("Muscle (kg)", "kg", 2),
            MetricType::WaterMass => ("Water (kg)", "kg", 2),
            MetricType::PulseWaveVelocity => ("PWV", "m/s", 2),
            MetricType::VascularAge => ("Vascular age", "years", 0),
        };
        MetricDefinition {
            metric_type: *self,
            display_name,
            unit,
            decimal_places,
        }
    }

    /// Format a real value with this metric's fixed precision
    pub fn format_value(&self, value: f64) -> String {
        format!("{:.*}", self.definition().decimal_places, value)
    }

    /// Comma-separated code list for the `meastypes` request parameter
    pub fn code_list(types: &[MetricType]) -> String {
        types
            .iter()
            .map(|t| t.code().to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl From<MetricType> for u16 {
    fn from(metric: MetricType) -> u16 {
        metric.code()
    }
}

impl TryFrom<u16> for MetricType {
    type Error = String;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        MetricType::from_code(code).ok_or_else(|| format!("Unknown metric type code: {}", code))
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.definition().display_name)
    }
}

impl std::str::FromStr for MetricType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weight" => Ok(MetricType::Weight),
            "fat" | "fat_ratio" | "body_fat" => Ok(MetricType::FatRatio),
            "muscle" | "muscle_mass" => Ok(MetricType::MuscleMass),
            "water" | "water_mass" | "hydration" => Ok(MetricType::WaterMass),
            "pwv" | "pulse_wave_velocity" => Ok(MetricType::PulseWaveVelocity),
            "vascular_age" => Ok(MetricType::VascularAge),
            other => other
                .parse::<u16>()
                .ok()
                .and_then(MetricType::from_code)
                .ok_or_else(|| format!("Unknown metric type: {}", s)),
        }
    }
}

/// Reconstitute a scaled reading: `value × 10^exponent`
pub fn real_value(value: i64, exponent: i32) -> f64 {
    value as f64 * 10f64.powi(exponent)
}
