//! Tickerwatch Core - domain types, services and traits.
//!
//! This crate holds the refresh, storage and bootstrap logic of the service.
//! It is database-agnostic and defines traits that are implemented by the
//! `storage-postgres` crate.

pub mod config;
pub mod database;
pub mod errors;
pub mod quotes;
pub mod scheduler;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
