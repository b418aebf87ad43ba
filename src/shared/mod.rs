//! Shared Module
//!
//! Platform-agnostic types used by the sync controller, the state store and
//! the HTTP API. Everything here is plain data plus pure functions; nothing
//! performs I/O.

/// Track reported by the music account
pub mod track;

/// Persisted sync state and tick outcomes
pub mod state;

/// Name template expansion and truncation
pub mod format;

/// Dashboard-facing records
pub mod status;

/// Stored Spotify tokens
pub mod token;

/// Shared error types
pub mod error;

/// Sync configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use track::Track;
pub use state::{SyncState, TickOutcome};
pub use format::{NameTemplate, truncate};
pub use status::{ErrorEntry, ErrorLog, StatusReport, TrackSnapshot};
pub use token::{SpotifyTokens, TokenStatus};
pub use error::SharedError;
pub use config::{ConfigError, IdlePolicy, SyncConfig, SyncConfigBuilder};
