//! Measurement service
//!
//! Fetches scan sessions from Withings and runs them through the normalizer.

use crate::withings::{WithingsApi, WithingsError};
use body_scan_shared::dates::format_columns;
use body_scan_shared::{normalize, DataResponse, Filters, MetricType, NormalizedTable, STATUS_OK};
use chrono_tz::Tz;
use tracing::debug;

/// Measurement service for fetching and normalizing scale data
pub struct MeasurementService;

impl MeasurementService {
    /// Fetch all displayed metric types and normalize them
    pub async fn fetch_table(
        api: &dyn WithingsApi,
        access_token: &str,
        filters: &Filters,
    ) -> Result<NormalizedTable, WithingsError> {
        let groups = api.fetch_measures(access_token, &MetricType::ALL).await?;
        let table = normalize(&groups, &MetricType::ALL, filters);

        debug!(
            groups = groups.len(),
            columns = table.columns.len(),
            from = ?filters.from,
            to = ?filters.to,
            limit = ?filters.limit,
            "Normalized Withings measurements"
        );

        Ok(table)
    }

    /// Shape a table into the data endpoint payload
    pub fn to_response(table: NormalizedTable, tz: Tz) -> DataResponse {
        DataResponse {
            status: STATUS_OK,
            dates: format_columns(&table.columns, tz),
            timestamps: table.columns,
            rows: table.rows,
            cards: table.cards,
        }
    }
}
