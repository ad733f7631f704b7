//! Measurement data route

use crate::error::ApiError;
use crate::services::MeasurementService;
use crate::state::AppState;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use body_scan_shared::validation::validate_access_token;
use body_scan_shared::{AccessTokenQuery, DataResponse, FilterParams};
use chrono::Utc;

/// Create data routes
pub fn data_routes() -> Router<AppState> {
    Router::new().route("/data", get(get_data))
}

/// GET /api/data - Normalized measurement table for the given access token
async fn get_data(
    State(state): State<AppState>,
    Query(token): Query<AccessTokenQuery>,
    params: Result<Query<FilterParams>, QueryRejection>,
) -> Result<Json<DataResponse>, ApiError> {
    let access_token = validate_access_token(token.at.as_deref())?;
    let Query(params) = params?;
    let filters = params.resolve(Utc::now(), state.timezone)?;

    let table = MeasurementService::fetch_table(state.withings(), access_token, &filters).await?;

    Ok(Json(MeasurementService::to_response(table, state.timezone)))
}
