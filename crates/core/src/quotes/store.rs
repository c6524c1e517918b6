//! Quote storage trait.
//!
//! Abstracts the persistence layer so the service and scheduler can be tested
//! against in-memory stores and run against PostgreSQL in production.

use async_trait::async_trait;

use super::model::Quote;
use crate::errors::Result;

/// Storage interface for the latest quote per symbol.
///
/// Rows are keyed by symbol. There is no history: a write replaces the
/// previous price for that symbol.
#[async_trait]
pub trait QuoteStore: Send + Sync {
    /// Insert or overwrite the row for `quote.symbol`.
    async fn upsert(&self, quote: &Quote) -> Result<()>;

    /// Upsert each quote in order.
    ///
    /// This is a sequence of independent writes, not a transaction: the
    /// first failure is returned and rows written before it stay written.
    /// Returns the number of rows written.
    async fn upsert_all(&self, quotes: &[Quote]) -> Result<usize>;

    /// Read back the stored row for a symbol.
    async fn latest(&self, symbol: &str) -> Result<Option<Quote>>;

    /// Number of distinct symbols stored.
    async fn count(&self) -> Result<i64>;

    /// Cheap liveness check against the backing database.
    async fn ping(&self) -> Result<()>;
}
