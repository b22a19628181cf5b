//! # RailDB Library
//!
//! This library exposes the RailDB modules for testing and integration.
//!
//! The main binary uses these modules through the `main.rs` entry point.

pub mod api;
pub mod cli;
pub mod config;

// Re-export raildb_core for convenience
pub use raildb_core;
