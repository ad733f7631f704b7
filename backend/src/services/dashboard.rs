//! Dashboard service
//!
//! Loads live data for the dashboard with a single refresh-and-retry on
//! authorization failure, and falls back to the placeholder dataset when
//! no live data can be obtained.

use super::measurements::MeasurementService;
use crate::withings::{WithingsApi, WithingsError};
use body_scan_shared::dates::format_columns;
use body_scan_shared::fallback::{placeholder_table, PLACEHOLDER_COMMENT};
use body_scan_shared::{
    analyze, Baseline, Credentials, DashboardResponse, DataSource, Filters, NormalizedTable,
};
use chrono_tz::Tz;
use tracing::{debug, info, warn};

/// Notice shown when the dashboard has no credentials to work with
pub const NOT_CONNECTED_NOTICE: &str = "Not connected to Withings";

/// Outcome of a fetch under the refresh-once policy
#[derive(Debug)]
pub struct FetchAttempt {
    /// Table on success, or the last error encountered
    pub result: Result<NormalizedTable, WithingsError>,
    /// Credentials to hand back to the client (renewed if a refresh happened)
    pub credentials: Credentials,
    /// Whether a refresh succeeded during this attempt
    pub refreshed: bool,
}

/// Dashboard service
pub struct DashboardService;

impl DashboardService {
    /// Build the dashboard for the given credentials
    ///
    /// Never fails: any missing credential or upstream error produces the
    /// placeholder dashboard with a notice.
    pub async fn load(
        api: &dyn WithingsApi,
        credentials: Option<Credentials>,
        filters: &Filters,
        baseline: &Baseline,
        tz: Tz,
    ) -> DashboardResponse {
        let Some(credentials) = credentials else {
            debug!("No credentials, serving placeholder dashboard");
            return Self::fallback(None, NOT_CONNECTED_NOTICE.to_string(), tz);
        };

        let attempt = Self::fetch_with_refresh(api, credentials, filters).await;

        match attempt.result {
            Ok(table) => Self::live(table, attempt.credentials, baseline, tz),
            Err(err) => {
                warn!(
                    error = %err,
                    refreshed = attempt.refreshed,
                    "Live data unavailable, serving placeholder"
                );
                Self::fallback(Some(attempt.credentials), err.to_string(), tz)
            }
        }
    }

    /// Fetch once; on an authorization failure refresh the token and retry exactly once
    pub async fn fetch_with_refresh(
        api: &dyn WithingsApi,
        credentials: Credentials,
        filters: &Filters,
    ) -> FetchAttempt {
        let first = MeasurementService::fetch_table(api, &credentials.access_token, filters).await;

        let refresh_token = match &first {
            Err(err) if err.is_unauthorized() => credentials.refresh_token.clone(),
            _ => None,
        };
        let Some(refresh_token) = refresh_token else {
            return FetchAttempt {
                result: first,
                credentials,
                refreshed: false,
            };
        };

        info!("Access token rejected, refreshing");

        let tokens = match api.refresh_token(&refresh_token).await {
            Ok(tokens) => tokens,
            Err(err) => {
                return FetchAttempt {
                    result: Err(err),
                    credentials,
                    refreshed: false,
                }
            }
        };

        let renewed = tokens.into_credentials(Some(refresh_token));
        let result = MeasurementService::fetch_table(api, &renewed.access_token, filters).await;

        FetchAttempt {
            result,
            credentials: renewed,
            refreshed: true,
        }
    }

    fn live(
        table: NormalizedTable,
        credentials: Credentials,
        baseline: &Baseline,
        tz: Tz,
    ) -> DashboardResponse {
        let trend = analyze(&table.columns, &table.rows, baseline);
        let text = trend.text();
        let comment = if text.is_empty() {
            PLACEHOLDER_COMMENT.to_string()
        } else {
            text
        };

        DashboardResponse {
            source: DataSource::Live,
            dates: format_columns(&table.columns, tz),
            timestamps: table.columns,
            rows: table.rows,
            cards: table.cards,
            comment,
            trend: Some(trend),
            credentials: Some(credentials),
            notice: None,
        }
    }

    fn fallback(credentials: Option<Credentials>, notice: String, tz: Tz) -> DashboardResponse {
        let table = placeholder_table();

        DashboardResponse {
            source: DataSource::Fallback,
            dates: format_columns(&table.columns, tz),
            timestamps: table.columns,
            rows: table.rows,
            cards: table.cards,
            comment: PLACEHOLDER_COMMENT.to_string(),
            trend: None,
            credentials,
            notice: Some(notice),
        }
    }
}
