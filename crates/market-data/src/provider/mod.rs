//! Quote provider abstractions and implementations.
//!
//! This module contains:
//! - The `QuoteProvider` trait that all providers implement
//! - `HttpQuoteProvider`, a templated-URL JSON provider
//!
//! Providers are deliberately thin: one request, one typed decode. Anything
//! that spans several requests lives in the fetcher.

mod traits;

pub mod http;

// Re-exports
pub use http::{HttpProviderConfig, HttpQuoteProvider};
pub use traits::QuoteProvider;
