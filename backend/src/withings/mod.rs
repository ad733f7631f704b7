//! Withings API integration
//!
//! The [`WithingsApi`] trait is the seam between the dashboard service and
//! the upstream API; [`WithingsClient`] is the reqwest-backed implementation.

mod client;

pub use client::WithingsClient;

use async_trait::async_trait;
use body_scan_shared::{MeasurementGroup, MetricType, TokenSet};
use thiserror::Error;

/// Withings failure modes
#[derive(Error, Debug)]
pub enum WithingsError {
    #[error("Withings rejected the credentials (status {0})")]
    Unauthorized(i64),

    #[error("Withings API error (status {status}): {message}")]
    Api { status: i64, message: String },

    #[error("Withings request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected Withings response: {0}")]
    Decode(String),
}

impl WithingsError {
    /// Authorization failures are the only errors worth a token refresh
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, WithingsError::Unauthorized(_))
    }

    /// Classify a non-zero Withings envelope status
    pub fn from_status(status: i64, message: Option<String>) -> Self {
        match status {
            100..=102 | 401 => WithingsError::Unauthorized(status),
            _ => WithingsError::Api {
                status,
                message: message.unwrap_or_else(|| "withings error".to_string()),
            },
        }
    }
}

/// Operations the dashboard needs from Withings
#[async_trait]
pub trait WithingsApi: Send + Sync {
    /// Whether client credentials are configured
    fn is_configured(&self) -> bool;

    /// Authorization page URL for the OAuth code flow
    fn authorize_url(&self, state: &str) -> String;

    /// Exchange an authorization code for a token pair
    async fn exchange_code(&self, code: &str) -> Result<TokenSet, WithingsError>;

    /// Obtain a fresh token pair from a refresh token
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenSet, WithingsError>;

    /// Fetch every measurement group of the given types
    async fn fetch_measures(
        &self,
        access_token: &str,
        types: &[MetricType],
    ) -> Result<Vec<MeasurementGroup>, WithingsError>;
}
