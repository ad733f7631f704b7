//! Configuration management for the Body Scan Dashboard backend
//!
//! Configuration is loaded hierarchically:
//! 1. Default values (in code)
//! 2. TOML config files (config/development.toml or config/production.toml)
//! 3. Environment variables (prefix: BSD__)

use anyhow::Result;
use body_scan_shared::dates::parse_timezone;
use body_scan_shared::Baseline;
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::env;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub withings: WithingsConfig,
    #[serde(default)]
    pub baseline: BaselineConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Withings API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithingsConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub authorize_url: String,
    pub token_url: String,
    pub measure_url: String,
    pub scope: String,
    pub timeout_secs: u64,
    /// Upper bound on `getmeas` pages followed per request
    pub max_pages: u32,
}

/// Long-run reference point for the commentary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineConfig {
    pub date: NaiveDate,
    pub weight_kg: f64,
    pub label: String,
}

/// Presentation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// IANA timezone for column headers and calendar-day filters
    pub timezone: String,
}

impl Default for WithingsConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: "http://localhost:8080/api/withings/callback".to_string(),
            authorize_url: "https://account.withings.com/oauth2_user/authorize2".to_string(),
            token_url: "https://wbsapi.withings.net/v2/oauth2".to_string(),
            measure_url: "https://wbsapi.withings.net/measure".to_string(),
            scope: "user.metrics".to_string(),
            timeout_secs: 15,
            max_pages: 20,
        }
    }
}

impl Default for BaselineConfig {
    fn default() -> Self {
        let baseline = Baseline::default();
        Self {
            date: baseline.date().unwrap_or_default(),
            weight_kg: baseline.weight_kg,
            label: baseline.label,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            timezone: "Europe/Prague".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            withings: WithingsConfig::default(),
            baseline: BaselineConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// Loading order (later sources override earlier):
    /// 1. Default values
    /// 2. Config file based on RUST_ENV (development.toml or production.toml)
    /// 3. Environment variables with BSD__ prefix
    pub fn load() -> Result<Self> {
        let env = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
        let config_file = format!("config/{}.toml", env);

        let config = config::Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // Load from environment-specific config file
            .add_source(
                config::File::with_name(&config_file)
                    .required(false)
            )
            // Override with environment variables (BSD__ prefix)
            // e.g., BSD__WITHINGS__CLIENT_ID sets withings.client_id
            .add_source(
                config::Environment::with_prefix("BSD")
                    .separator("__")
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Check if running in production mode
    pub fn is_production() -> bool {
        env::var("RUST_ENV")
            .map(|v| v == "production")
            .unwrap_or(false)
    }

    /// Baseline used by the trend analyzer
    pub fn baseline(&self) -> Baseline {
        Baseline::from_date(
            self.baseline.date,
            self.baseline.weight_kg,
            self.baseline.label.clone(),
        )
    }

    /// Display timezone
    pub fn timezone(&self) -> Result<Tz> {
        Ok(parse_timezone(&self.display.timezone)?)
    }
}
