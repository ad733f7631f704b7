//! Data export API routes

use crate::error::ApiError;
use crate::services::ExportService;
use crate::state::AppState;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
    routing::get,
    Router,
};
use body_scan_shared::export::EXPORT_FILENAME;
use body_scan_shared::validation::validate_access_token;
use body_scan_shared::{AccessTokenQuery, FilterParams};
use chrono::Utc;

/// Create export routes
pub fn export_routes() -> Router<AppState> {
    Router::new().route("/csv", get(export_csv))
}

/// GET /api/export/csv - Export the measurement table as CSV
async fn export_csv(
    State(state): State<AppState>,
    Query(token): Query<AccessTokenQuery>,
    params: Result<Query<FilterParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let access_token = validate_access_token(token.at.as_deref())?;
    let Query(params) = params?;
    let filters = params.resolve(Utc::now(), state.timezone)?;

    let csv =
        ExportService::export_csv(state.withings(), access_token, &filters, state.timezone).await?;

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{EXPORT_FILENAME}\""))
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Invalid header value: {}", e)))?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    headers.insert(header::CONTENT_DISPOSITION, disposition);

    Ok((headers, csv))
}
