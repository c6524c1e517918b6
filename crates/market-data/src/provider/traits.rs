//! Quote provider trait definitions.
//!
//! This module defines the core `QuoteProvider` trait that all
//! quote sources must implement.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::Quote;

/// Trait for quote providers.
///
/// Implement this trait to add support for a new quote source. A provider
/// performs exactly one request per call; retries, ordering and cancellation
/// are handled by [`QuoteFetcher`](crate::fetcher::QuoteFetcher).
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use tickerwatch_market_data::{MarketDataError, Quote, QuoteProvider};
///
/// struct FixedProvider;
///
/// #[async_trait]
/// impl QuoteProvider for FixedProvider {
///     fn id(&self) -> &'static str {
///         "FIXED"
///     }
///
///     async fn get_latest_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
///         Ok(Quote::new(symbol, 1.0, self.id()))
///     }
/// }
/// ```
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Used for logging and as the `source` of produced quotes.
    fn id(&self) -> &'static str;

    /// Fetch the latest quote for a symbol.
    ///
    /// # Arguments
    ///
    /// * `symbol` - A non-empty symbol; the provider is the source of truth
    ///   for whether it exists.
    ///
    /// # Returns
    ///
    /// The latest quote on success, or a `MarketDataError` on failure.
    async fn get_latest_quote(&self, symbol: &str) -> Result<Quote, MarketDataError>;
}
