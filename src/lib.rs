//! macro-pulse: scheduled macro risk and exchange volume monitor.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod alerts;
pub mod config;
pub mod data;
pub mod engine;
pub mod notify;
pub mod report;
pub mod risk;
pub mod storage;
pub mod types;
