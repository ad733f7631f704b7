//! CSV export service
//!
//! Exports the same normalized table the data endpoint serves, one metric
//! per row and one scan session per column.

use super::measurements::MeasurementService;
use crate::error::ApiError;
use crate::withings::WithingsApi;
use body_scan_shared::dates::format_columns;
use body_scan_shared::export::build_csv;
use body_scan_shared::{Filters, NormalizedTable};
use chrono_tz::Tz;
use tracing::info;

/// Export service
pub struct ExportService;

impl ExportService {
    /// Fetch live data and render it as CSV
    pub async fn export_csv(
        api: &dyn WithingsApi,
        access_token: &str,
        filters: &Filters,
        tz: Tz,
    ) -> Result<String, ApiError> {
        let table = MeasurementService::fetch_table(api, access_token, filters).await?;
        let csv = Self::table_csv(&table, tz)?;

        info!(columns = table.columns.len(), bytes = csv.len(), "Exported CSV");
        Ok(csv)
    }

    /// Render an already normalized table
    pub fn table_csv(table: &NormalizedTable, tz: Tz) -> Result<String, ApiError> {
        let dates = format_columns(&table.columns, tz);
        Ok(build_csv(&dates, &table.rows)?)
    }
}
