//! Tickerwatch Market Data Crate
//!
//! Provider-agnostic quote fetching for the tickerwatch service.
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |   QuoteFetcher   |  (ordering, retry, cancellation, batch policy)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |  QuoteProvider   |  (one request per symbol)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |      Quote       |  (symbol, price, timestamp, source)
//! +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`QuoteProvider`] - Trait implemented by quote sources
//! - [`HttpQuoteProvider`] - Templated-URL JSON provider
//! - [`QuoteFetcher`] - Fail-fast and partial-success batch fetching
//! - [`MarketDataError`] - Error taxonomy with retry classification

pub mod errors;
pub mod fetcher;
pub mod models;
pub mod provider;

pub use errors::{MarketDataError, RetryClass};
pub use fetcher::{QuoteFetcher, RetryPolicy, DEFAULT_CONCURRENCY};
pub use models::{BatchOutcome, FailedSymbol, Quote};
pub use provider::{HttpProviderConfig, HttpQuoteProvider, QuoteProvider};
