//! # Storage Module
//!
//! Disk-backed grade storage using redb.
//!
//! Uses redb embedded database for:
//! - ACID transactions, one per store operation
//! - Crash safety (copy-on-write B-trees)
//! - MVCC (concurrent readers, single writer)

mod redb_store;

pub use redb_store::{GradeStore, StoreError, UpsertOutcome};
