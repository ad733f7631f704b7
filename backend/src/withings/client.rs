//! reqwest-backed Withings client
//!
//! Every Withings call is a form-encoded POST answered with a JSON envelope
//! `{ status, body, error }`. A zero status is success; the HTTP status is
//! almost always 200, so the envelope status is what gets classified.

use super::{WithingsApi, WithingsError};
use crate::config::WithingsConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use body_scan_shared::{MeasurementGroup, MetricType, TokenSet};
use reqwest::{StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Withings response envelope
///
/// Error replies still carry a (usually empty) `body`, so the body stays
/// untyped until the status has been checked.
#[derive(Debug, Deserialize)]
struct Envelope {
    status: i64,
    body: Option<serde_json::Value>,
    error: Option<String>,
}

/// Body of a `getmeas` response
#[derive(Debug, Deserialize)]
struct MeasureBody {
    #[serde(default)]
    measuregrps: Vec<MeasurementGroup>,
    /// 0/1 (or boolean) flag for further pages
    #[serde(default)]
    more: serde_json::Value,
    #[serde(default)]
    offset: Option<i64>,
}

impl MeasureBody {
    fn has_more(&self) -> bool {
        self.more.as_bool().unwrap_or(false) || self.more.as_i64().is_some_and(|n| n != 0)
    }
}

/// Withings HTTP client
pub struct WithingsClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: SecretString,
    redirect_uri: String,
    scope: String,
    authorize_url: Url,
    token_url: Url,
    measure_url: Url,
    max_pages: u32,
}

impl WithingsClient {
    /// Build a client from configuration
    ///
    /// Fails on malformed endpoint URLs; missing credentials are allowed so
    /// the service can start and serve placeholder data.
    pub fn new(config: &WithingsConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            client_id: config.client_id.clone(),
            client_secret: SecretString::new(config.client_secret.clone()),
            redirect_uri: config.redirect_uri.clone(),
            scope: config.scope.clone(),
            authorize_url: Url::parse(&config.authorize_url)
                .context("Invalid Withings authorize URL")?,
            token_url: Url::parse(&config.token_url).context("Invalid Withings token URL")?,
            measure_url: Url::parse(&config.measure_url).context("Invalid Withings measure URL")?,
            max_pages: config.max_pages.max(1),
        })
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        url: &Url,
        params: &[(&str, &str)],
    ) -> Result<T, WithingsError> {
        let response = self.http.post(url.clone()).form(params).send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(WithingsError::Unauthorized(401));
        }

        let envelope: Envelope = response.json().await?;
        if envelope.status != 0 {
            return Err(WithingsError::from_status(envelope.status, envelope.error));
        }

        let body = envelope
            .body
            .ok_or_else(|| WithingsError::Decode("missing response body".to_string()))?;
        serde_json::from_value(body).map_err(|e| WithingsError::Decode(e.to_string()))
    }

    async fn request_token(&self, grant: &[(&str, &str)]) -> Result<TokenSet, WithingsError> {
        let secret = self.client_secret.expose_secret();
        let mut params = vec![
            ("action", "requesttoken"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", secret.as_str()),
        ];
        params.extend_from_slice(grant);
        self.post_form(&self.token_url, &params).await
    }
}

#[async_trait]
impl WithingsApi for WithingsClient {
    fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.expose_secret().is_empty()
    }

    fn authorize_url(&self, state: &str) -> String {
        let mut url = self.authorize_url.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.client_id)
            .append_pair("state", state)
            .append_pair("scope", &self.scope)
            .append_pair("redirect_uri", &self.redirect_uri);
        url.to_string()
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenSet, WithingsError> {
        let tokens = self
            .request_token(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .await?;
        info!("Exchanged authorization code for Withings tokens");
        Ok(tokens)
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenSet, WithingsError> {
        let tokens = self
            .request_token(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .await
            .map_err(|e| {
                warn!(error = %e, "Withings token refresh failed");
                e
            })?;
        info!("Refreshed Withings access token");
        Ok(tokens)
    }

    async fn fetch_measures(
        &self,
        access_token: &str,
        types: &[MetricType],
    ) -> Result<Vec<MeasurementGroup>, WithingsError> {
        let meastypes = MetricType::code_list(types);
        let mut groups = Vec::new();
        let mut offset: Option<String> = None;

        for page in 1..=self.max_pages {
            let mut params = vec![
                ("action", "getmeas"),
                ("access_token", access_token),
                ("category", "1"),
                ("meastypes", meastypes.as_str()),
            ];
            if let Some(offset) = offset.as_deref() {
                params.push(("offset", offset));
            }

            let body: MeasureBody = self.post_form(&self.measure_url, &params).await?;
            debug!(page, groups = body.measuregrps.len(), "Fetched Withings measure page");
            let has_more = body.has_more();
            groups.extend(body.measuregrps);

            match (has_more, body.offset) {
                (true, Some(next)) => offset = Some(next.to_string()),
                _ => return Ok(groups),
            }
        }

        warn!(
            max_pages = self.max_pages,
            "Stopped following Withings pages at the configured limit"
        );
        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base: &str) -> WithingsConfig {
        WithingsConfig {
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            redirect_uri: "http://localhost:8080/api/withings/callback".to_string(),
            authorize_url: format!("{}/oauth2_user/authorize2", base),
            token_url: format!("{}/v2/oauth2", base),
            measure_url: format!("{}/measure", base),
            scope: "user.metrics".to_string(),
            timeout_secs: 5,
            max_pages: 5,
        }
    }

    #[test]
    fn test_authorize_url_carries_oauth_params() {
        let client = WithingsClient::new(&test_config("https://account.example")).unwrap();
        let url = Url::parse(&client.authorize_url("abc")).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("response_type".to_string(), "code".to_string())));
        assert!(pairs.contains(&("client_id".to_string(), "client-id".to_string())));
        assert!(pairs.contains(&("state".to_string(), "abc".to_string())));
        assert!(pairs.contains(&("scope".to_string(), "user.metrics".to_string())));
        assert!(!url.as_str().contains("client-secret"));
    }

    #[test]
    fn test_missing_credentials_are_reported() {
        let mut config = test_config("https://account.example");
        config.client_secret.clear();
        let client = WithingsClient::new(&config).unwrap();
        assert!(!client.is_configured());
    }

    #[test]
    fn test_invalid_endpoint_is_rejected() {
        let mut config = test_config("https://account.example");
        config.measure_url = "not a url".to_string();
        assert!(WithingsClient::new(&config).is_err());
    }

    #[tokio::test]
    async fn test_fetch_measures_decodes_groups() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/measure"))
            .and(body_string_contains("action=getmeas"))
            .and(body_string_contains("meastypes=1%2C6%2C8%2C9%2C91%2C123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 0,
                "body": {
                    "updatetime": 1755238400,
                    "measuregrps": [
                        {"grpid": 1, "date": 1755238320, "category": 1,
                         "measures": [{"value": 1126, "type": 1, "unit": -1, "algo": 0}]}
                    ],
                    "more": 0
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = WithingsClient::new(&test_config(&server.uri())).unwrap();
        let groups = client.fetch_measures("token", &MetricType::ALL).await.unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].timestamp, 1755238320);
        assert!((groups[0].measures[0].real_value() - 112.6).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_fetch_measures_follows_pages() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/measure"))
            .and(body_string_contains("offset=10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 0,
                "body": {"measuregrps": [{"date": 100, "measures": []}], "more": 0}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/measure"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 0,
                "body": {"measuregrps": [{"date": 200, "measures": []}], "more": 1, "offset": 10}
            })))
            .mount(&server)
            .await;

        let client = WithingsClient::new(&test_config(&server.uri())).unwrap();
        let groups = client.fetch_measures("token", &MetricType::ALL).await.unwrap();
        let timestamps: Vec<i64> = groups.iter().map(|g| g.timestamp).collect();
        assert_eq!(timestamps, vec![200, 100]);
    }

    #[tokio::test]
    async fn test_invalid_token_status_is_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/measure"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 401,
                "body": {},
                "error": "XRequestID: Not provided invalid_token"
            })))
            .mount(&server)
            .await;

        let client = WithingsClient::new(&test_config(&server.uri())).unwrap();
        let err = client.fetch_measures("expired", &MetricType::ALL).await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_http_unauthorized_is_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = WithingsClient::new(&test_config(&server.uri())).unwrap();
        let err = client.fetch_measures("expired", &MetricType::ALL).await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_refresh_token_posts_grant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/oauth2"))
            .and(body_string_contains("action=requesttoken"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=rt-1"))
            .and(body_string_contains("client_secret=client-secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 0,
                "body": {
                    "access_token": "at-2",
                    "refresh_token": "rt-2",
                    "expires_in": 10800,
                    "userid": "42"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = WithingsClient::new(&test_config(&server.uri())).unwrap();
        let tokens = client.refresh_token("rt-1").await.unwrap();
        assert_eq!(tokens.access_token, "at-2");
        assert_eq!(tokens.refresh_token.as_deref(), Some("rt-2"));
        assert_eq!(tokens.expires_in, Some(10800));
    }

    #[tokio::test]
    async fn test_failed_exchange_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/oauth2"))
            .and(body_string_contains("grant_type=authorization_code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 503,
                "error": "Invalid Params: invalid code"
            })))
            .mount(&server)
            .await;

        let client = WithingsClient::new(&test_config(&server.uri())).unwrap();
        let err = client.exchange_code("bad").await.unwrap_err();
        assert!(matches!(err, WithingsError::Api { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_error_reply_with_empty_body_keeps_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/oauth2"))
            .and(body_string_contains("grant_type=refresh_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 503,
                "body": {},
                "error": "Invalid Params: invalid refresh_token"
            })))
            .mount(&server)
            .await;

        let client = WithingsClient::new(&test_config(&server.uri())).unwrap();
        let err = client.refresh_token("rt").await.unwrap_err();
        match err {
            WithingsError::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "Invalid Params: invalid refresh_token");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_token_reply_with_empty_body_is_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/oauth2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 401,
                "body": {},
                "error": "invalid_token"
            })))
            .mount(&server)
            .await;

        let client = WithingsClient::new(&test_config(&server.uri())).unwrap();
        let err = client.refresh_token("rt").await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/oauth2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 0,
                "body": {}
            })))
            .mount(&server)
            .await;

        let client = WithingsClient::new(&test_config(&server.uri())).unwrap();
        let err = client.refresh_token("rt").await.unwrap_err();
        assert!(matches!(err, WithingsError::Decode(_)));
    }
}
