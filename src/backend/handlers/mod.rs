//! HTTP Handlers
//!
//! - **`health`** - `GET /`
//! - **`status`** - `GET /api/status`
//! - **`sync`** - `GET|POST /api/sync`
//! - **`init`** - `GET|POST /api/init`

pub mod health;
pub mod init;
pub mod status;
pub mod sync;
pub mod types;

pub use health::health;
pub use init::run_init;
pub use status::get_status;
pub use sync::run_sync;
pub use types::{HealthResponse, SyncResponse};
