//! Dashboard route
//!
//! Unlike `/api/data`, this endpoint never surfaces upstream failures: it
//! answers with the placeholder dashboard and a notice instead.

use crate::error::ApiError;
use crate::services::DashboardService;
use crate::state::AppState;
use axum::{extract::State, routing::post, Json, Router};
use body_scan_shared::validation::validate_access_token;
use body_scan_shared::{Credentials, DashboardRequest, DashboardResponse};
use chrono::Utc;

/// Create dashboard routes
pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/dashboard", post(load_dashboard))
}

/// POST /api/dashboard - Live or placeholder dashboard with commentary
async fn load_dashboard(
    State(state): State<AppState>,
    Json(request): Json<DashboardRequest>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let filters = request.filters.resolve(Utc::now(), state.timezone)?;
    let credentials = credentials_from(&request)?;

    let response = DashboardService::load(
        state.withings(),
        credentials,
        &filters,
        &state.baseline,
        state.timezone,
    )
    .await;

    Ok(Json(response))
}

/// A blank access token means "not connected"; a malformed one is rejected
fn credentials_from(request: &DashboardRequest) -> Result<Option<Credentials>, ApiError> {
    let Some(token) = request.access_token.as_deref().filter(|t| !t.trim().is_empty()) else {
        return Ok(None);
    };
    let access_token = validate_access_token(Some(token))?;
    let refresh_token = request
        .refresh_token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    Ok(Some(Credentials::new(access_token, refresh_token)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_token_means_not_connected() {
        let request = DashboardRequest {
            access_token: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(credentials_from(&request).unwrap().is_none());
    }

    #[test]
    fn test_blank_refresh_token_is_dropped() {
        let request = DashboardRequest {
            access_token: Some("abc".to_string()),
            refresh_token: Some(String::new()),
            ..Default::default()
        };
        let credentials = credentials_from(&request).unwrap().unwrap();
        assert_eq!(credentials.access_token, "abc");
        assert!(credentials.refresh_token.is_none());
    }
}
