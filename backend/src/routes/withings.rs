//! Withings OAuth routes
//!
//! Login redirects to the Withings authorization page, the callback
//! exchanges the code and hands the token pair to the browser, and refresh
//! renews a pair on demand.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use body_scan_shared::validation::validate_refresh_token;
use body_scan_shared::{RefreshRequest, TokenResponse, TokenSet};
use reqwest::Url;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

/// Cookie carrying the OAuth state between login and callback
pub const STATE_COOKIE: &str = "oauth_state";

/// Where the callback sends the browser after a failed login
const OAUTH_ERROR_REDIRECT: &str = "/?error=oauth";

/// Create Withings routes
pub fn withings_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login))
        .route("/callback", get(callback))
        .route("/refresh", post(refresh))
}

/// Callback query parameters
#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
}

/// GET /api/withings/login - Redirect to the Withings authorization page
async fn login(State(state): State<AppState>) -> Result<Response, ApiError> {
    let oauth_state = Uuid::new_v4().to_string();
    let location = state.withings().authorize_url(&oauth_state);

    let cookie =
        format!("{STATE_COOKIE}={oauth_state}; Path=/; HttpOnly; SameSite=Lax; Max-Age=600");
    let cookie = HeaderValue::from_str(&cookie)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Invalid state cookie: {}", e)))?;

    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, cookie);

    Ok((headers, Redirect::to(&location)).into_response())
}

/// GET /api/withings/callback - Exchange the authorization code
async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Redirect {
    let Some(code) = params.code.filter(|c| !c.trim().is_empty()) else {
        return Redirect::to("/");
    };

    let expected = state_from_cookies(&headers);
    if expected.is_none() || expected.as_deref() != params.state.as_deref() {
        warn!("OAuth state mismatch");
        return Redirect::to(OAUTH_ERROR_REDIRECT);
    }

    match state.withings().exchange_code(&code).await {
        Ok(tokens) => {
            info!("Withings login completed");
            Redirect::to(&token_redirect(&tokens))
        }
        Err(err) => {
            warn!(error = %err, "Authorization code exchange failed");
            Redirect::to(OAUTH_ERROR_REDIRECT)
        }
    }
}

/// POST /api/withings/refresh - Renew a token pair
async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let refresh_token = validate_refresh_token(payload.refresh_token.as_deref())?;
    let tokens = state.withings().refresh_token(refresh_token).await?;

    Ok(Json(TokenResponse::from(tokens)))
}

/// Read the OAuth state from the request cookies
fn state_from_cookies(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == STATE_COOKIE)
        .map(|(_, value)| value.to_string())
}

/// Root-relative redirect carrying the token pair as `at` / `rt`
fn token_redirect(tokens: &TokenSet) -> String {
    let mut url = match Url::parse("http://localhost/") {
        Ok(url) => url,
        Err(_) => return "/".to_string(),
    };
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("at", &tokens.access_token);
        if let Some(rt) = &tokens.refresh_token {
            pairs.append_pair("rt", rt);
        }
    }
    format!("/?{}", url.query().unwrap_or_default())
}
