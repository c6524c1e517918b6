//! Market data models
//!
//! This module contains the core data types for quote fetching:
//! - `quote` - The normalized quote returned by providers (Quote)
//! - `batch` - Outcome of a partial-success batch fetch (BatchOutcome)

mod batch;
mod quote;

pub use batch::{BatchOutcome, FailedSymbol};
pub use quote::Quote;
