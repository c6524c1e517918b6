//! PostgreSQL storage implementation for tickerwatch.
//!
//! This crate provides all database-related functionality using Diesel ORM with
//! PostgreSQL. It implements the traits defined in `tickerwatch-core` and
//! contains:
//! - Connection pooling
//! - Embedded Diesel migrations
//! - The quote repository and the connectivity probe
//!
//! ```text
//!     core (domain)
//!          │
//!          ▼
//! storage-postgres (this crate)
//!          │
//!          ▼
//!     PostgreSQL
//! ```

pub mod db;
pub mod errors;
pub mod quotes;
pub mod schema;

// Re-export database utilities
pub use db::{create_pool, get_connection, run_migrations, DbConnection, DbPool, PgProbe};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from tickerwatch-core for convenience
pub use tickerwatch_core::errors::{DatabaseError, Error, Result};
