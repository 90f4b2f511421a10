//! HTTP client for the social network API

use super::error::{ApiError, Result};
use super::models::ApiEnvelope;
use super::traits::SocialApi;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Parameters the client always sets itself
const RESERVED_PARAMS: [&str; 2] = ["access_token", "v"];

/// Client for the `method/<name>` API
#[derive(Clone)]
pub struct VkClient {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
    version: String,
    rate_limit_delay: Duration,
}

impl VkClient {
    /// Create a new client.
    ///
    /// `base_url` gets a trailing `/` appended when missing so method names can
    /// be concatenated directly.
    pub fn new(
        base_url: &str,
        access_token: &str,
        version: &str,
        timeout: Duration,
        rate_limit_delay: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Setup(e.to_string()))?;

        let mut base_url = base_url.to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self {
            client,
            base_url,
            access_token: access_token.to_string(),
            version: version.to_string(),
            rate_limit_delay,
        })
    }

    /// Build a client from the application configuration
    pub fn from_config(config: &crate::Config) -> Result<Self> {
        Self::new(
            &config.api_url,
            &config.access_token,
            &config.api_version,
            Duration::from_secs(config.api_timeout_secs),
            Duration::from_millis(config.rate_limit_delay_ms),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Call a method, retrying for as long as the API reports a rate limit.
    pub async fn call(&self, method: &str, params: &[(&str, String)]) -> Result<Option<Value>> {
        let url = format!("{}{}", self.base_url, method);

        let mut query: Vec<(&str, &str)> = params
            .iter()
            .filter(|(key, _)| !RESERVED_PARAMS.contains(key))
            .map(|(key, value)| (*key, value.as_str()))
            .collect();
        query.push(("access_token", self.access_token.as_str()));
        query.push(("v", self.version.as_str()));

        loop {
            let resp = self.client.get(&url).query(&query).send().await?;

            let status = resp.status();
            let body = resp.text().await?;
            if !status.is_success() {
                return Err(ApiError::Http {
                    status: status.as_u16(),
                    body,
                });
            }

            let envelope: ApiEnvelope = match serde_json::from_str(&body) {
                Ok(envelope) => envelope,
                Err(e) => {
                    tracing::error!(method, "Malformed API response: {}", e);
                    return Ok(None);
                }
            };

            if let Some(error) = envelope.error {
                if error.is_rate_limit() {
                    tracing::warn!(
                        method,
                        "Rate limit exceeded, retrying in {:?}",
                        self.rate_limit_delay
                    );
                    tokio::time::sleep(self.rate_limit_delay).await;
                    continue;
                }

                tracing::error!(
                    method,
                    error_code = error.error_code,
                    "API error: {}",
                    error.error_msg.as_deref().unwrap_or("unknown error")
                );
                return Ok(None);
            }

            if envelope.response.is_none() {
                tracing::error!(method, "API response carries neither response nor error");
            }
            return Ok(envelope.response);
        }
    }
}

#[async_trait]
impl SocialApi for VkClient {
    async fn call(&self, method: &str, params: &[(&str, String)]) -> Result<Option<Value>> {
        VkClient::call(self, method, params).await
    }
}
