//! Backend Module
//!
//! Everything that talks to the outside world: the collaborator clients, the
//! state store, the sync loop and the HTTP server around it.
//!
//! # Architecture
//!
//! - **`clients`** - Spotify track source and profile gateway sink
//! - **`store`** - Versioned key-value persistence (SQLite, in-memory)
//! - **`sync`** - Controller, service, status, initializer, scheduler
//! - **`server`** - Settings, application state, app creation
//! - **`routes`** - Router assembly
//! - **`handlers`** - HTTP handlers
//! - **`middleware`** - Cron secret guard
//! - **`error`** - API error type and JSON responses
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── clients/        - TrackSource / ProfileSink and their HTTP clients
//! ├── store/          - StateStore trait and backends
//! ├── sync/           - Update-or-backoff loop
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── handlers/       - Request handlers
//! ├── middleware/     - Request middleware
//! └── error/          - Error types
//! ```
//!
//! The HTTP modules are only compiled with the `ssr` feature (on by default).
//! The sync loop itself does not depend on them.

/// Remote collaborators
pub mod clients;

/// State persistence
pub mod store;

/// Sync loop
pub mod sync;

/// Server setup and configuration
#[cfg(feature = "ssr")]
pub mod server;

/// Route configuration
#[cfg(feature = "ssr")]
pub mod routes;

/// HTTP handlers
#[cfg(feature = "ssr")]
pub mod handlers;

/// Middleware for request processing
#[cfg(feature = "ssr")]
pub mod middleware;

/// Backend error types
#[cfg(feature = "ssr")]
pub mod error;

pub use clients::{ProfileSink, SinkError, SourceError, TrackSource};
pub use store::{StateStore, StoreError};
pub use sync::{SyncController, SyncService, TickReport};

#[cfg(feature = "ssr")]
pub use error::BackendError;
#[cfg(feature = "ssr")]
pub use server::create_app;
