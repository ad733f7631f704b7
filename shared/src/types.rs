//! API request and response types

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::dates::{end_of_day, parse_day, start_of_day, QuickRange};
use crate::errors::ValidationError;
use crate::models::DataSource;
use crate::normalize::{Card, Filters, MetricRow};
use crate::trend::TrendSummary;
use crate::validation::validate_range;

/// Status value of a successful response envelope
pub const STATUS_OK: i32 = 0;

// ============================================================================
// Credentials
// ============================================================================

/// Client-held Withings token pair, treated as opaque
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
        }
    }
}

/// Token set returned by the OAuth token endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub userid: Option<serde_json::Value>,
}

impl TokenSet {
    /// Credentials after a refresh, keeping the previous refresh token when
    /// the server does not rotate it
    pub fn into_credentials(self, previous_refresh: Option<String>) -> Credentials {
        Credentials {
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(previous_refresh),
        }
    }
}

// ============================================================================
// Filters
// ============================================================================

/// Access-token query parameter (`?at=...`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessTokenQuery {
    #[serde(default)]
    pub at: Option<String>,
}

/// Range and limit parameters shared by data, dashboard and export requests
///
/// Precedence: explicit `from`/`to` epoch seconds, then `from_date`/`to_date`
/// calendar days, then a named `range`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterParams {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub from: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub to: Option<i64>,
    #[serde(default)]
    pub from_date: Option<String>,
    #[serde(default)]
    pub to_date: Option<String>,
    #[serde(default)]
    pub range: Option<String>,
    /// Column limit; zero or negative means unbounded
    #[serde(default, deserialize_with = "lenient_i64")]
    pub limit: Option<i64>,
}

/// Integer parameter that treats an empty or null value as absent
///
/// Accepts JSON numbers as well as the strings a query string carries.
fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct LenientI64;

    impl<'de> Visitor<'de> for LenientI64 {
        type Value = Option<i64>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an integer or an empty value")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            i64::try_from(v).map(Some).map_err(|_| E::custom(format!("integer out of range: {v}")))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
                Ok(Some(v as i64))
            } else {
                Err(E::custom(format!("not an integer: {v}")))
            }
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            let v = v.trim();
            if v.is_empty() {
                return Ok(None);
            }
            v.parse().map(Some).map_err(|_| E::custom(format!("not an integer: {v}")))
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D2: Deserializer<'de>>(self, d: D2) -> Result<Self::Value, D2::Error> {
            d.deserialize_any(LenientI64)
        }
    }

    deserializer.deserialize_any(LenientI64)
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl FilterParams {
    /// Resolve into normalizer filters relative to `now` in `tz`
    pub fn resolve(&self, now: DateTime<Utc>, tz: Tz) -> Result<Filters, ValidationError> {
        let (mut from, mut to) = match non_blank(&self.range) {
            Some(range) => range.parse::<QuickRange>()?.bounds(now, tz),
            None => (None, None),
        };

        if let Some(day) = non_blank(&self.from_date) {
            from = Some(start_of_day(parse_day(day)?, tz));
        }
        if let Some(day) = non_blank(&self.to_date) {
            to = Some(end_of_day(parse_day(day)?, tz));
        }
        from = self.from.or(from);
        to = self.to.or(to);

        validate_range(from, to)?;

        Ok(Filters {
            from,
            to,
            limit: self.limit.filter(|n| *n > 0).map(|n| n as usize),
        })
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Normalized measurement data (`GET /api/data`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataResponse {
    pub status: i32,
    /// Formatted column headers
    pub dates: Vec<String>,
    /// Column timestamps, newest first
    pub timestamps: Vec<i64>,
    pub rows: Vec<MetricRow>,
    pub cards: Vec<Card>,
}

/// Refresh token request (`POST /api/withings/refresh`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Refreshed token pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub status: i32,
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
}

impl From<TokenSet> for TokenResponse {
    fn from(tokens: TokenSet) -> Self {
        Self {
            status: STATUS_OK,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
        }
    }
}

/// Dashboard request (`POST /api/dashboard`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardRequest {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(flatten)]
    pub filters: FilterParams,
}

/// Complete dashboard payload, live or placeholder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub source: DataSource,
    pub dates: Vec<String>,
    pub timestamps: Vec<i64>,
    pub rows: Vec<MetricRow>,
    pub cards: Vec<Card>,
    pub comment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<TrendSummary>,
    /// Credentials to keep client-side; rotated when a refresh happened
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,
    /// Why live data could not be shown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}
