//! Property-based tests

pub mod backoff_proptest;
pub mod format_proptest;
