//! tracksync - Main Library
//!
//! Mirrors the track currently playing on a Spotify account into a
//! messaging account's profile name, on a fixed schedule, backing off when
//! the messaging service rate limits profile updates.
//!
//! # Module Structure
//!
//! - **`shared`** - Plain data and pure functions
//!   - Track, sync state, tick outcomes
//!   - Name template expansion and truncation
//!   - Sync configuration and error types
//!
//! - **`backend`** - I/O and orchestration
//!   - Spotify and profile gateway clients
//!   - Versioned state store (SQLite via `sqlx`)
//!   - Sync controller, service and scheduler
//!   - Axum HTTP server (`ssr` feature)
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - HTTP server modules and the `tracksync-server` binary
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tracksync::backend::clients::{GatewayConfig, GatewayProfileSink, SpotifyClient, SpotifyConfig};
//! use tracksync::backend::store::MemoryStore;
//! use tracksync::backend::sync::{SyncController, SyncService};
//! use tracksync::shared::SyncConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = SpotifyClient::new(SpotifyConfig::new("id", "secret", "refresh"))?;
//! let sink = GatewayProfileSink::new(GatewayConfig {
//!     base_url: "http://localhost:8081".to_string(),
//!     session_token: "session".to_string(),
//!     timeout: std::time::Duration::from_secs(15),
//! })?;
//! let controller = SyncController::new(Arc::new(source), Arc::new(sink), SyncConfig::default());
//! let service = SyncService::new(Arc::new(MemoryStore::new()), controller);
//!
//! let report = service.tick(chrono::Utc::now()).await?;
//! println!("{}: {}", report.outcome, report.message);
//! # Ok(())
//! # }
//! ```

/// Shared types and data structures
pub mod shared;

/// Clients, store, sync loop and server
pub mod backend;
