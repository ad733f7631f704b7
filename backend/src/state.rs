//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction.
//!
//! # Design Principles
//!
//! 1. **Pre-compute derived settings**: timezone and baseline are resolved once
//! 2. **Cheap cloning**: All fields use Arc or are already Clone-cheap
//! 3. **Immutable after creation**: State is read-only during request handling

use crate::config::AppConfig;
use crate::withings::{WithingsApi, WithingsClient};
use anyhow::Result;
use body_scan_shared::Baseline;
use chrono_tz::Tz;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Withings API (real client, or a fake in tests)
    pub withings: Arc<dyn WithingsApi>,
    /// Display timezone parsed from configuration
    pub timezone: Tz,
    /// Trend baseline built from configuration
    pub baseline: Arc<Baseline>,
}

impl AppState {
    /// Create application state with the reqwest-backed Withings client
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = WithingsClient::new(&config.withings)?;
        Self::with_api(config, Arc::new(client))
    }

    /// Create application state around any Withings implementation
    pub fn with_api(config: AppConfig, withings: Arc<dyn WithingsApi>) -> Result<Self> {
        let timezone = config.timezone()?;
        let baseline = Arc::new(config.baseline());

        Ok(Self {
            config: Arc::new(config),
            withings,
            timezone,
            baseline,
        })
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get a reference to the Withings API
    #[inline]
    pub fn withings(&self) -> &dyn WithingsApi {
        self.withings.as_ref()
    }
}
