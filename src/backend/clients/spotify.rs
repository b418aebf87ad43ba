/**
 * Spotify Track Source
 *
 * Reads the currently playing track from the Spotify Web API.
 *
 * # Authentication
 *
 * The client holds a long-lived refresh token and trades it for short-lived
 * access tokens at the accounts service. A token is refreshed 300 seconds
 * before it expires, and once more when the player endpoint answers 401.
 * If the accounts service rotates the refresh token, the new one replaces
 * the old one.
 *
 * With a state store attached, every refresh is saved under the `tokens` key
 * and the first request after a restart starts from the saved pair rather
 * than the configured refresh token. A saved refresh token that the accounts
 * service rejects falls back to the configured one once. Store failures are
 * logged and never fail a track read.
 *
 * # Error Classification
 *
 * - `invalid_grant` / `invalid_client` on refresh: `SourceError::Fatal`
 * - network errors, timeouts, 5xx, repeated 401: `SourceError::Transient`
 */
use crate::backend::clients::{SourceError, TrackSource};
use crate::backend::store::{self, load_tokens, StateStore, TOKENS_KEY};
use crate::shared::{SpotifyTokens, Track};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub const DEFAULT_API_URL: &str = "https://api.spotify.com";
pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";

const REFRESH_MARGIN_SECS: i64 = 300;
const DEFAULT_EXPIRES_IN: u64 = 3600;
const MAX_EXPIRES_IN: u64 = 366 * 24 * 3600;

/// Credentials and endpoints for the Spotify client
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub api_url: String,
    pub accounts_url: String,
    pub timeout: Duration,
}

impl SpotifyConfig {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_token: refresh_token.into(),
            api_url: DEFAULT_API_URL.to_string(),
            accounts_url: DEFAULT_ACCOUNTS_URL.to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self) -> bool {
        Utc::now() + chrono::Duration::seconds(REFRESH_MARGIN_SECS) < self.expires_at
    }
}

#[derive(Debug)]
struct TokenState {
    refresh_token: String,
    access: Option<AccessToken>,
    /// Whether the saved pair has been read from the store yet
    restored: bool,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
}

#[derive(Debug, Deserialize)]
struct CurrentlyPlaying {
    #[serde(default)]
    is_playing: bool,
    item: Option<PlayingItem>,
}

#[derive(Debug, Deserialize)]
struct PlayingItem {
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    artists: Vec<NamedObject>,
    album: Option<NamedObject>,
}

#[derive(Debug, Deserialize)]
struct NamedObject {
    #[serde(default)]
    name: String,
}

/// Spotify Web API client
pub struct SpotifyClient {
    config: SpotifyConfig,
    client: Client,
    tokens: Mutex<TokenState>,
    store: Option<Arc<dyn StateStore>>,
}

impl SpotifyClient {
    pub fn new(config: SpotifyConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SourceError::Transient(format!("failed to build HTTP client: {}", e)))?;
        let tokens = Mutex::new(TokenState {
            refresh_token: config.refresh_token.clone(),
            access: None,
            restored: false,
        });
        Ok(Self {
            config,
            client,
            tokens,
            store: None,
        })
    }

    /// Persist refreshed tokens in `store` and start from the saved pair
    pub fn with_store(mut self, store: Arc<dyn StateStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// A usable access token, refreshing when close to expiry or when forced
    pub async fn access_token(&self, force_refresh: bool) -> Result<String, SourceError> {
        let mut tokens = self.tokens.lock().await;
        if !tokens.restored {
            tokens.restored = true;
            self.restore(&mut tokens).await;
        }
        if !force_refresh {
            if let Some(access) = tokens.access.as_ref().filter(|a| a.is_fresh()) {
                return Ok(access.value.clone());
            }
        }

        let response = match self.refresh(&tokens.refresh_token).await {
            Err(SourceError::Fatal(reason)) if tokens.refresh_token != self.config.refresh_token => {
                tracing::warn!(
                    "Saved refresh token rejected ({}), retrying with the configured one",
                    reason
                );
                tokens.refresh_token = self.config.refresh_token.clone();
                self.refresh(&tokens.refresh_token).await?
            }
            other => other?,
        };
        let expires_in = response
            .expires_in
            .unwrap_or(DEFAULT_EXPIRES_IN)
            .min(MAX_EXPIRES_IN);
        if let Some(rotated) = response.refresh_token {
            tracing::info!("Spotify rotated the refresh token");
            tokens.refresh_token = rotated;
        }
        let access = AccessToken {
            value: response.access_token,
            expires_at: Utc::now() + chrono::Duration::seconds(expires_in as i64),
        };
        tracing::debug!("Refreshed Spotify access token (expires in {}s)", expires_in);
        self.persist(&tokens.refresh_token, &access).await;
        let value = access.value.clone();
        tokens.access = Some(access);
        Ok(value)
    }

    async fn restore(&self, tokens: &mut TokenState) {
        let Some(store) = &self.store else {
            return;
        };
        match load_tokens(store.as_ref()).await {
            Ok(Some(saved)) => {
                tracing::info!("Using saved Spotify tokens");
                tokens.refresh_token = saved.refresh_token;
                tokens.access = Some(AccessToken {
                    value: saved.access_token,
                    expires_at: saved.expires_at,
                });
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Failed to load saved Spotify tokens: {}", e),
        }
    }

    async fn persist(&self, refresh_token: &str, access: &AccessToken) {
        let Some(store) = &self.store else {
            return;
        };
        let saved = SpotifyTokens {
            access_token: access.value.clone(),
            refresh_token: refresh_token.to_string(),
            expires_at: access.expires_at,
        };
        if let Err(e) = store::save(store.as_ref(), TOKENS_KEY, &saved).await {
            tracing::warn!("Failed to save Spotify tokens: {}", e);
        }
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, SourceError> {
        let url = format!("{}/api/token", self.config.accounts_url);
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token)])
            .send()
            .await
            .map_err(|e| SourceError::Transient(format!("token refresh failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<TokenResponse>()
                .await
                .map_err(|e| SourceError::Transient(format!("bad token response: {}", e)));
        }

        let body = response.text().await.unwrap_or_default();
        let error_code = serde_json::from_str::<TokenErrorResponse>(&body)
            .map(|e| e.error)
            .unwrap_or_default();
        match (status, error_code.as_str()) {
            (StatusCode::BAD_REQUEST, "invalid_grant")
            | (StatusCode::BAD_REQUEST, "invalid_client")
            | (StatusCode::UNAUTHORIZED, _) => Err(SourceError::Fatal(format!(
                "token refresh rejected ({}): {}",
                status, body
            ))),
            _ => Err(SourceError::Transient(format!(
                "token refresh returned {}",
                status
            ))),
        }
    }

    async fn fetch_playing(&self, token: &str) -> Result<reqwest::Response, SourceError> {
        let url = format!("{}/v1/me/player/currently-playing", self.config.api_url);
        self.client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| SourceError::Transient(format!("player request failed: {}", e)))
    }
}

#[async_trait]
impl TrackSource for SpotifyClient {
    async fn current_track(&self) -> Result<Option<Track>, SourceError> {
        let token = self.access_token(false).await?;
        let mut response = self.fetch_playing(&token).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::info!("Spotify access token rejected, refreshing once");
            let token = self.access_token(true).await?;
            response = self.fetch_playing(&token).await?;
        }

        match response.status() {
            StatusCode::NO_CONTENT => return Ok(None),
            StatusCode::OK => {}
            StatusCode::UNAUTHORIZED => {
                return Err(SourceError::Transient(
                    "player endpoint rejected a fresh token".to_string(),
                ));
            }
            status => {
                return Err(SourceError::Transient(format!(
                    "player endpoint returned {}",
                    status
                )));
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Transient(format!("failed to read player response: {}", e)))?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        let playing: CurrentlyPlaying = serde_json::from_str(&body)
            .map_err(|e| SourceError::Transient(format!("bad player response: {}", e)))?;
        Ok(into_track(playing))
    }
}

fn into_track(playing: CurrentlyPlaying) -> Option<Track> {
    if !playing.is_playing {
        return None;
    }
    let item = playing.item?;
    let title = item.name.trim().to_string();
    if title.is_empty() {
        return None;
    }
    let artists: Vec<String> = item
        .artists
        .into_iter()
        .map(|a| a.name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    // Local files have no Spotify id
    let id = item.id.unwrap_or_else(|| format!("local:{}", title));
    let album = item.album.map(|a| a.name).unwrap_or_default();
    Some(Track::new(id, title, artists).with_album(album))
}
