//! Business logic services
//!
//! Services coordinate between the Withings API and the shared
//! normalization, trend and export logic.

pub mod dashboard;
pub mod export;
pub mod measurements;

pub use dashboard::DashboardService;
pub use export::ExportService;
pub use measurements::MeasurementService;
