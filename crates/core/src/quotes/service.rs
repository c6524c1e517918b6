//! Quote service.
//!
//! The single entry point used by the HTTP handlers and the refresh scheduler.
//! It fetches through [`QuoteFetcher`] and writes through [`QuoteStore`].
//!
//! Storage is best-effort on the request path: a failed write is logged and
//! the fetched quotes are still returned to the caller.

use async_trait::async_trait;
use log::{debug, error, warn};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use tickerwatch_market_data::QuoteFetcher;

use super::model::{normalize_symbol, Quote};
use super::store::QuoteStore;
use crate::config::BatchMode;
use crate::errors::{Error, Result, ValidationError};

/// What a refresh wrote and what it could not fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshSummary {
    pub stored: usize,
    pub failed: Vec<String>,
}

#[async_trait]
pub trait QuoteServiceTrait: Send + Sync {
    /// Fetch one symbol and store it.
    async fn get_quote(&self, symbol: &str, cancel: &CancellationToken) -> Result<Quote>;

    /// Fetch all symbols fail-fast and store them.
    ///
    /// On success the quotes are in input order. Any fetch error aborts the
    /// call and nothing is written.
    async fn get_quotes(&self, symbols: &[String], cancel: &CancellationToken)
        -> Result<Vec<Quote>>;

    /// Fetch and store a symbol set according to `mode`.
    ///
    /// Unlike the request path, storage errors are returned so the caller can
    /// report the tick as failed.
    async fn refresh(
        &self,
        symbols: &[String],
        mode: BatchMode,
        cancel: &CancellationToken,
    ) -> Result<RefreshSummary>;

    /// Liveness of the backing store.
    async fn ping(&self) -> Result<()>;
}

pub struct QuoteService {
    fetcher: Arc<QuoteFetcher>,
    store: Arc<dyn QuoteStore>,
}

impl QuoteService {
    pub fn new(fetcher: Arc<QuoteFetcher>, store: Arc<dyn QuoteStore>) -> Self {
        Self { fetcher, store }
    }

    fn normalize_all(symbols: &[String]) -> Result<Vec<String>> {
        symbols
            .iter()
            .map(|s| {
                normalize_symbol(s).ok_or_else(|| {
                    Error::from(ValidationError::InvalidInput(
                        "ticker symbols must not be empty".to_string(),
                    ))
                })
            })
            .collect()
    }
}

#[async_trait]
impl QuoteServiceTrait for QuoteService {
    async fn get_quote(&self, symbol: &str, cancel: &CancellationToken) -> Result<Quote> {
        let symbol = normalize_symbol(symbol)
            .ok_or_else(|| ValidationError::MissingField("ticker".to_string()))?;

        let quote: Quote = self.fetcher.fetch(&symbol, cancel).await?.into();

        if let Err(e) = self.store.upsert(&quote).await {
            error!("Failed to store quote for {}: {}", quote.symbol, e);
        }
        Ok(quote)
    }

    async fn get_quotes(
        &self,
        symbols: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<Quote>> {
        let symbols = Self::normalize_all(symbols)?;

        let quotes: Vec<Quote> = self
            .fetcher
            .fetch_all(&symbols, cancel)
            .await?
            .into_iter()
            .map(Quote::from)
            .collect();

        if let Err(e) = self.store.upsert_all(&quotes).await {
            error!("Failed to store {} quotes: {}", quotes.len(), e);
        }
        Ok(quotes)
    }

    async fn refresh(
        &self,
        symbols: &[String],
        mode: BatchMode,
        cancel: &CancellationToken,
    ) -> Result<RefreshSummary> {
        let (quotes, failed) = match mode {
            BatchMode::FailFast => {
                let quotes = self.fetcher.fetch_all(symbols, cancel).await?;
                (quotes, Vec::new())
            }
            BatchMode::Partial => {
                let outcome = self.fetcher.fetch_all_partial(symbols, cancel).await;
                for failure in &outcome.failed {
                    warn!("Refresh of {} failed: {}", failure.symbol, failure.error);
                }
                let failed: Vec<String> = outcome
                    .failed
                    .iter()
                    .map(|f| f.symbol.clone())
                    .collect();
                (outcome.succeeded, failed)
            }
        };

        let quotes: Vec<Quote> = quotes.into_iter().map(Quote::from).collect();
        let stored = if quotes.is_empty() {
            0
        } else {
            self.store.upsert_all(&quotes).await?
        };
        debug!(
            "Refresh stored {} quotes via {} ({} failed)",
            stored,
            self.fetcher.provider_id(),
            failed.len()
        );

        Ok(RefreshSummary { stored, failed })
    }

    async fn ping(&self) -> Result<()> {
        self.store.ping().await
    }
}
