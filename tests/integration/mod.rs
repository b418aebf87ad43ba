//! Integration tests
//!
//! - `api_test` - HTTP API through `axum-test`
//! - `spotify_test` / `gateway_test` - HTTP clients against `wiremock`
//! - `sqlite_test` - SQLite store on temporary files
//! - `config_test` - settings from the process environment

pub mod api_test;
pub mod gateway_test;
pub mod sqlite_test;
