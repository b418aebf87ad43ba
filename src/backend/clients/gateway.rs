//! Profile Gateway Sink
//!
//! Writes the profile name through an HTTP gateway that holds the messaging
//! account's user session. The gateway contract:
//!
//! - `GET  {base}/profile` returns `{"last_name": "..."}`
//! - `PUT  {base}/profile` with `{"last_name": "..."}` replaces it
//!
//! Requests carry the session token as a bearer token. Responses are
//! classified as:
//!
//! - `429`, or `420` with a `FLOOD_WAIT_<n>` body: rate limited, with the
//!   wait taken from `Retry-After`, `{"retry_after": n}` or the flood-wait
//!   suffix
//! - `401` / `403`: fatal (session expired or revoked)
//! - anything else unsuccessful, plus network failures: transient

use crate::backend::clients::{ProfileSink, SinkError};
use async_trait::async_trait;
use reqwest::{header::RETRY_AFTER, Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gateway endpoint and session
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub session_token: String,
    pub timeout: Duration,
}

#[derive(Debug, Serialize, Deserialize)]
struct ProfileBody {
    #[serde(default)]
    last_name: String,
}

#[derive(Debug, Deserialize)]
struct RetryBody {
    retry_after: Option<u64>,
}

/// HTTP profile sink
pub struct GatewayProfileSink {
    config: GatewayConfig,
    client: Client,
}

impl GatewayProfileSink {
    pub fn new(config: GatewayConfig) -> Result<Self, SinkError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SinkError::Transient(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn profile_url(&self) -> String {
        format!("{}/profile", self.config.base_url.trim_end_matches('/'))
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, SinkError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let header_wait = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let body = response.text().await.unwrap_or_default();
        Err(classify(status, header_wait, &body))
    }
}

fn classify(status: StatusCode, header_wait: Option<u64>, body: &str) -> SinkError {
    let flood_wait = parse_flood_wait(body);
    if status == StatusCode::TOO_MANY_REQUESTS || flood_wait.is_some() {
        let body_wait = serde_json::from_str::<RetryBody>(body)
            .ok()
            .and_then(|b| b.retry_after);
        return SinkError::RateLimited {
            retry_after: header_wait.or(body_wait).or(flood_wait),
        };
    }
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            SinkError::Fatal(format!("gateway returned {}: {}", status, body.trim()))
        }
        _ => SinkError::Transient(format!("gateway returned {}", status)),
    }
}

/// Extract `n` from a `FLOOD_WAIT_<n>` marker
fn parse_flood_wait(body: &str) -> Option<u64> {
    let start = body.find("FLOOD_WAIT_")? + "FLOOD_WAIT_".len();
    let digits: String = body[start..].chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

fn network_error(e: reqwest::Error) -> SinkError {
    if e.is_timeout() {
        SinkError::Transient("gateway request timed out".to_string())
    } else {
        SinkError::Transient(format!("gateway request failed: {}", e))
    }
}

#[async_trait]
impl ProfileSink for GatewayProfileSink {
    async fn profile_name(&self) -> Result<String, SinkError> {
        let response = self
            .client
            .get(self.profile_url())
            .bearer_auth(&self.config.session_token)
            .send()
            .await
            .map_err(network_error)?;
        let body = Self::check(response)
            .await?
            .json::<ProfileBody>()
            .await
            .map_err(|e| SinkError::Transient(format!("bad profile response: {}", e)))?;
        Ok(body.last_name)
    }

    async fn set_profile_name(&self, value: &str) -> Result<(), SinkError> {
        let response = self
            .client
            .put(self.profile_url())
            .bearer_auth(&self.config.session_token)
            .json(&ProfileBody {
                last_name: value.to_string(),
            })
            .send()
            .await
            .map_err(network_error)?;
        Self::check(response).await?;
        tracing::debug!("Gateway accepted profile name {:?}", value);
        Ok(())
    }
}
