//! Store Metrics Core - Shared types library.
//!
//! This crate provides the record and value types used across the store
//! metrics components:
//! - `reporting` - Aggregation, formatting and spreadsheet export
//! - `cli` - Command-line entry point used by cron
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, statuses, billing terms, orders and subscriptions

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
