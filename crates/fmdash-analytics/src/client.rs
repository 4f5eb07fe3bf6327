//! HTTP client for the facility-management analytics backend

use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::error::{AnalyticsError, AnalyticsResult};
use fmdash_core::config::ApiConfig;

/// API client for making analytics requests to the backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    access_token: Option<String>,
}

impl ApiClient {
    /// Create a client for `base_url` with default timeouts
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute URL or the HTTP client
    /// cannot be built.
    pub fn new(base_url: &str) -> AnalyticsResult<Self> {
        Self::build(base_url, Duration::from_secs(30), Duration::from_secs(5))
    }

    /// Create a client from the API configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configured base URL is invalid or the HTTP
    /// client cannot be built.
    pub fn from_config(config: &ApiConfig) -> AnalyticsResult<Self> {
        let client = Self::build(
            &config.base_url,
            Duration::from_secs(config.request_timeout),
            Duration::from_secs(config.connect_timeout),
        )?;
        Ok(match &config.access_token {
            Some(token) => client.with_access_token(token.clone()),
            None => client,
        })
    }

    fn build(base_url: &str, timeout: Duration, connect_timeout: Duration) -> AnalyticsResult<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|e| {
            AnalyticsError::configuration(format!("invalid base URL '{base_url}': {e}"))
        })?;

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self {
            client,
            base_url,
            access_token: None,
        })
    }

    /// Set the access token sent with every request
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Base URL requests are resolved against
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// GET `path` with `query` and decode the JSON body
    ///
    /// The access token, when set, is appended as `access_token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the backend answers with a
    /// non-success status, or the body is not JSON.
    pub async fn get_json(&self, path: &str, query: &[(&str, String)]) -> AnalyticsResult<Value> {
        let mut url = self.base_url.clone();
        let base_path = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{base_path}{path}"));

        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
            if let Some(token) = &self.access_token {
                pairs.append_pair("access_token", token);
            }
        }

        debug!(path, "requesting analytics");

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalyticsError::status(status));
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_relative_base_url() {
        let err = ApiClient::new("not a url").unwrap_err();
        assert!(matches!(err, AnalyticsError::Configuration { .. }));
    }

    #[test]
    fn test_from_config_carries_token() {
        let config = ApiConfig {
            base_url: "https://fm.example.com/api/".to_string(),
            access_token: Some("secret".to_string()),
            ..ApiConfig::default()
        };
        let client = ApiClient::from_config(&config).unwrap();
        assert_eq!(client.base_url().as_str(), "https://fm.example.com/api");
        assert_eq!(client.access_token.as_deref(), Some("secret"));
    }
}
