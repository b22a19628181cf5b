//! # Formats Module
//!
//! Parsing of grade import payloads.
//!
//! Note: File I/O stays in the app layer (apps/raildb).
//! This module only turns text into validated [`NewGrade`](crate::grade::NewGrade) values.

mod import;

pub use import::*;
