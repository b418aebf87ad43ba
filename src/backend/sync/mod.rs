//! Sync Module
//!
//! The update-or-backoff loop and the operations around it.
//!
//! # Architecture
//!
//! - **`controller`** - one tick of the decision logic, pure over its inputs
//! - **`backoff`** - exponential and fixed delay windows
//! - **`service`** - loads state, runs the controller, persists the result
//! - **`status`** - read-only status report
//! - **`init`** - first-time setup and re-initialization
//! - **`scheduler`** - optional in-process interval trigger

pub mod backoff;
pub mod controller;
pub mod init;
pub mod scheduler;
pub mod service;
pub mod status;

pub use backoff::BackoffPolicy;
pub use controller::{SyncController, TickReport};
pub use init::{InitReport, Initializer};
pub use scheduler::SyncScheduler;
pub use service::SyncService;
pub use status::{is_healthy, status};
