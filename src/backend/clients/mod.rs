//! Collaborator Clients
//!
//! The two remote services the sync controller talks to, expressed as traits
//! so the controller can be driven by fakes in tests:
//!
//! - **`TrackSource`** - what is playing right now on the music account
//! - **`ProfileSink`** - reads and writes the messaging account's profile name
//!
//! Concrete implementations:
//!
//! - **`spotify`** - Spotify Web API with the refresh-token flow
//! - **`gateway`** - HTTP gateway in front of the messaging account
//!
//! Both report failures already classified into the categories the
//! controller acts on, so no raw HTTP error ever reaches the decision logic.

use crate::shared::Track;
use async_trait::async_trait;
use thiserror::Error;

/// Spotify Web API track source
pub mod spotify;

/// Messaging-account profile gateway
pub mod gateway;

pub use gateway::{GatewayConfig, GatewayProfileSink};
pub use spotify::{SpotifyClient, SpotifyConfig};

/// Track source failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Network hiccup, timeout or unexpected response; retry next tick
    #[error("track source unavailable: {0}")]
    Transient(String),

    /// Credentials rejected for good; needs a new refresh token
    #[error("track source credentials rejected: {0}")]
    Fatal(String),
}

/// Profile sink failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The messaging service refused the write because of its quota
    #[error("profile update rate limited{}", retry_hint(.retry_after))]
    RateLimited {
        /// Seconds the service asked us to wait, when it said
        retry_after: Option<u64>,
    },

    /// Invalid or expired session, permanent rejection
    #[error("profile update rejected: {0}")]
    Fatal(String),

    /// Network failure or timeout
    #[error("profile update failed: {0}")]
    Transient(String),
}

fn retry_hint(retry_after: &Option<u64>) -> String {
    match retry_after {
        Some(secs) => format!(" (server asked for {}s)", secs),
        None => String::new(),
    }
}

/// Source of the currently playing track
#[async_trait]
pub trait TrackSource: Send + Sync {
    /// The track playing now, `None` when playback is stopped or paused
    async fn current_track(&self) -> Result<Option<Track>, SourceError>;
}

/// Destination of the formatted profile name
#[async_trait]
pub trait ProfileSink: Send + Sync {
    /// The name the profile shows now
    async fn profile_name(&self) -> Result<String, SinkError>;

    /// Replace the profile name
    async fn set_profile_name(&self, value: &str) -> Result<(), SinkError>;
}
