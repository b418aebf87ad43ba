//! Spotify token record
//!
//! The access/refresh token pair is stored under the `tokens` key so a
//! rotated refresh token survives a restart. The status view only ever sees
//! the derived [`TokenStatus`], never the secrets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpotifyTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl SpotifyTokens {
    pub fn status(&self, now: DateTime<Utc>) -> TokenStatus {
        let valid = self.expires_at > now;
        TokenStatus {
            valid,
            expires_at: self.expires_at,
            expires_in_seconds: if valid {
                (self.expires_at - now).num_seconds()
            } else {
                0
            },
        }
    }
}

impl std::fmt::Debug for SpotifyTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyTokens")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Access token validity shown on the dashboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenStatus {
    pub valid: bool,
    pub expires_at: DateTime<Utc>,
    pub expires_in_seconds: i64,
}
