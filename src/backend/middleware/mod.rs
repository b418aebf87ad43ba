//! Middleware Module
//!
//! HTTP middleware applied before requests reach handlers.
//!
//! - **`cron_auth`** - bearer-secret guard for the endpoints that trigger work

pub mod cron_auth;

pub use cron_auth::{cron_auth_middleware, is_authorized};
