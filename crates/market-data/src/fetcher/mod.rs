//! Batch quote fetching on top of a single [`QuoteProvider`].
//!
//! Two batch policies are offered:
//!
//! - [`QuoteFetcher::fetch_all`] walks the symbols in order, one request at a
//!   time, and aborts on the first failure. Callers never see a partial list.
//! - [`QuoteFetcher::fetch_all_partial`] fetches with bounded parallelism and
//!   reports successes and failures separately.
//!
//! Both go through [`QuoteFetcher::fetch`], which applies the retry policy
//! and honours the cancellation token.

mod retry_policy;

pub use retry_policy::RetryPolicy;

use futures::stream::{self, StreamExt};
use log::{debug, warn};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::errors::MarketDataError;
use crate::models::{BatchOutcome, FailedSymbol, Quote};
use crate::provider::QuoteProvider;

/// Default parallelism for partial-success batches
pub const DEFAULT_CONCURRENCY: usize = 4;

pub struct QuoteFetcher {
    provider: Arc<dyn QuoteProvider>,
    retry: RetryPolicy,
    concurrency: usize,
}

impl QuoteFetcher {
    pub fn new(provider: Arc<dyn QuoteProvider>) -> Self {
        Self {
            provider,
            retry: RetryPolicy::default(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn provider_id(&self) -> &'static str {
        self.provider.id()
    }

    /// Fetch one symbol, retrying transient failures.
    pub async fn fetch(
        &self,
        symbol: &str,
        cancel: &CancellationToken,
    ) -> Result<Quote, MarketDataError> {
        let mut attempt = 0;
        loop {
            if cancel.is_cancelled() {
                return Err(MarketDataError::Cancelled);
            }

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(MarketDataError::Cancelled),
                res = self.provider.get_latest_quote(symbol) => res,
            };

            match result {
                Ok(quote) => return Ok(quote),
                Err(e) if e.is_transient() && attempt < self.retry.max_retries => {
                    let delay = self.retry.delay_for(attempt);
                    attempt += 1;
                    warn!(
                        "Quote fetch for {} from {} failed ({}), retry {}/{} in {:?}",
                        symbol,
                        self.provider.id(),
                        e,
                        attempt,
                        self.retry.max_retries,
                        delay
                    );
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(MarketDataError::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Fetch every symbol sequentially; the first error aborts the batch.
    ///
    /// On success the quotes are in the same order as `symbols`.
    pub async fn fetch_all(
        &self,
        symbols: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<Quote>, MarketDataError> {
        let mut quotes = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let quote = self.fetch(symbol, cancel).await.map_err(|e| {
                debug!("Batch aborted at {}: {}", symbol, e);
                e
            })?;
            quotes.push(quote);
        }
        Ok(quotes)
    }

    /// Fetch every symbol with bounded parallelism, keeping going past failures.
    pub async fn fetch_all_partial(
        &self,
        symbols: &[String],
        cancel: &CancellationToken,
    ) -> BatchOutcome {
        let results: Vec<(String, Result<Quote, MarketDataError>)> =
            stream::iter(symbols.to_vec())
                .map(|symbol: String| async move {
                    let result = self.fetch(&symbol, cancel).await;
                    (symbol, result)
                })
                .buffered(self.concurrency)
                .collect()
                .await;

        let mut outcome = BatchOutcome::default();
        for (symbol, result) in results {
            match result {
                Ok(quote) => outcome.succeeded.push(quote),
                Err(error) => outcome.failed.push(FailedSymbol { symbol, error }),
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Clone)]
    enum Behavior {
        Price(f64),
        Schema,
        FailTransient { times: u32, then: f64 },
        Hang,
    }

    #[derive(Default)]
    struct ScriptedProvider {
        behaviors: HashMap<String, Behavior>,
        calls: Mutex<HashMap<String, u32>>,
    }

    impl ScriptedProvider {
        fn with(behaviors: &[(&str, Behavior)]) -> Self {
            Self {
                behaviors: behaviors
                    .iter()
                    .map(|(s, b)| (s.to_string(), b.clone()))
                    .collect(),
                calls: Mutex::new(HashMap::new()),
            }
        }

        fn calls_for(&self, symbol: &str) -> u32 {
            *self.calls.lock().unwrap().get(symbol).unwrap_or(&0)
        }
    }

    #[async_trait]
    impl QuoteProvider for ScriptedProvider {
        fn id(&self) -> &'static str {
            "SCRIPTED"
        }

        async fn get_latest_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                let entry = calls.entry(symbol.to_string()).or_insert(0);
                *entry += 1;
                *entry
            };
            match self.behaviors.get(symbol) {
                Some(Behavior::Price(p)) => Ok(Quote::new(symbol, *p, "SCRIPTED")),
                Some(Behavior::Schema) => Err(MarketDataError::Schema {
                    symbol: symbol.to_string(),
                    message: "missing field 'price'".to_string(),
                }),
                Some(Behavior::FailTransient { times, then }) => {
                    if call <= *times {
                        Err(MarketDataError::Timeout {
                            provider: "SCRIPTED".to_string(),
                        })
                    } else {
                        Ok(Quote::new(symbol, *then, "SCRIPTED"))
                    }
                }
                Some(Behavior::Hang) => std::future::pending().await,
                None => Err(MarketDataError::SymbolNotFound(symbol.to_string())),
            }
        }
    }

    fn symbols(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn fetcher(provider: Arc<ScriptedProvider>) -> QuoteFetcher {
        QuoteFetcher::new(provider).with_retry_policy(RetryPolicy::new(2, Duration::from_millis(10)))
    }

    #[tokio::test]
    async fn test_fetch_all_preserves_input_order() {
        let provider = Arc::new(ScriptedProvider::with(&[
            ("MSFT", Behavior::Price(420.0)),
            ("AAPL", Behavior::Price(190.5)),
            ("GOOG", Behavior::Price(150.0)),
        ]));
        let quotes = fetcher(provider)
            .fetch_all(&symbols(&["GOOG", "AAPL", "MSFT"]), &CancellationToken::new())
            .await
            .unwrap();

        let got: Vec<(&str, f64)> = quotes.iter().map(|q| (q.symbol.as_str(), q.price)).collect();
        assert_eq!(got, vec![("GOOG", 150.0), ("AAPL", 190.5), ("MSFT", 420.0)]);
    }

    #[tokio::test]
    async fn test_fetch_all_fails_fast_on_first_error() {
        let provider = Arc::new(ScriptedProvider::with(&[
            ("AAPL", Behavior::Price(190.5)),
            ("MSFT", Behavior::Schema),
            ("GOOG", Behavior::Price(150.0)),
        ]));
        let result = fetcher(provider.clone())
            .fetch_all(&symbols(&["AAPL", "MSFT", "GOOG"]), &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(MarketDataError::Schema { .. })));
        // Symbols after the failure are never requested
        assert_eq!(provider.calls_for("GOOG"), 0);
        // Schema errors are not retried
        assert_eq!(provider.calls_for("MSFT"), 1);
    }

    #[tokio::test]
    async fn test_fetch_all_empty_input() {
        let provider = Arc::new(ScriptedProvider::default());
        let quotes = fetcher(provider)
            .fetch_all(&[], &CancellationToken::new())
            .await
            .unwrap();
        assert!(quotes.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_are_retried() {
        let provider = Arc::new(ScriptedProvider::with(&[(
            "AAPL",
            Behavior::FailTransient {
                times: 2,
                then: 191.0,
            },
        )]));
        let quote = fetcher(provider.clone())
            .fetch("AAPL", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(quote.price, 191.0);
        assert_eq!(provider.calls_for("AAPL"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_budget_is_bounded() {
        let provider = Arc::new(ScriptedProvider::with(&[(
            "AAPL",
            Behavior::FailTransient {
                times: 10,
                then: 191.0,
            },
        )]));
        let err = fetcher(provider.clone())
            .fetch("AAPL", &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, MarketDataError::Timeout { .. }));
        assert_eq!(provider.calls_for("AAPL"), 3);
    }

    #[tokio::test]
    async fn test_partial_batch_reports_successes_and_failures() {
        let provider = Arc::new(ScriptedProvider::with(&[
            ("AAPL", Behavior::Price(190.5)),
            ("MSFT", Behavior::Schema),
            ("GOOG", Behavior::Price(150.0)),
        ]));
        let outcome = fetcher(provider)
            .with_concurrency(2)
            .fetch_all_partial(
                &symbols(&["AAPL", "MSFT", "GOOG", "NOPE"]),
                &CancellationToken::new(),
            )
            .await;

        let ok: Vec<&str> = outcome.succeeded.iter().map(|q| q.symbol.as_str()).collect();
        assert_eq!(ok, vec!["AAPL", "GOOG"]);
        assert_eq!(outcome.failed_symbols(), vec!["MSFT", "NOPE"]);
        assert!(!outcome.is_complete());
    }

    #[tokio::test]
    async fn test_partial_batch_runs_on_spawned_task() {
        let provider = Arc::new(ScriptedProvider::with(&[
            ("AAPL", Behavior::Price(190.5)),
            ("MSFT", Behavior::Price(420.0)),
        ]));
        let fetcher = Arc::new(fetcher(provider).with_concurrency(2));
        let list = symbols(&["MSFT", "NOPE", "AAPL"]);

        let outcome = tokio::spawn(async move {
            let cancel = CancellationToken::new();
            fetcher.fetch_all_partial(&list, &cancel).await
        })
        .await
        .unwrap();

        let ok: Vec<&str> = outcome.succeeded.iter().map(|q| q.symbol.as_str()).collect();
        assert_eq!(ok, vec!["MSFT", "AAPL"]);
        assert_eq!(outcome.failed_symbols(), vec!["NOPE"]);
    }

    #[tokio::test]
    async fn test_cancellation_aborts_outstanding_request() {
        let provider = Arc::new(ScriptedProvider::with(&[("AAPL", Behavior::Hang)]));
        let fetcher = fetcher(provider);
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = fetcher.fetch("AAPL", &cancel).await.unwrap_err();
        assert!(matches!(err, MarketDataError::Cancelled));
    }

    #[tokio::test]
    async fn test_already_cancelled_token_skips_provider() {
        let provider = Arc::new(ScriptedProvider::with(&[("AAPL", Behavior::Price(1.0))]));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = fetcher(provider.clone())
            .fetch_all(&symbols(&["AAPL"]), &cancel)
            .await;
        assert!(matches!(result, Err(MarketDataError::Cancelled)));
        assert_eq!(provider.calls_for("AAPL"), 0);
    }
}
