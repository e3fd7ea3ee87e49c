//! LVP prober: load generator and last-value-persistence probe for a
//! price-oracle external adapter.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod catalog;
pub mod client;
pub mod clock;
pub mod config;
pub mod prober;
pub mod recorder;
pub mod session_log;
pub mod types;
