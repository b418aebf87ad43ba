//! Server Module
//!
//! Initialization and configuration of the Axum HTTP server.
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and FromRef implementations
//! ├── config.rs       - Settings from environment and TOML file
//! └── init.rs         - Store opening, service wiring, app creation
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Configuration Loading**: `Settings::load()`
//! 2. **State Creation**: `init::load_state()` opens the store and builds clients
//! 3. **Router Creation**: `create_app()` configures routes and tracing
//!
//! # Example
//!
//! ```rust,no_run
//! use tracksync::backend::server::{config::Settings, create_app, init::load_state};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::load()?;
//! let app = create_app(load_state(&settings).await?);
//! # Ok(())
//! # }
//! ```

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use config::Settings;
pub use init::{create_app, StartupError};
pub use state::AppState;
