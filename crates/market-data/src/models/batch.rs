use super::quote::Quote;
use crate::errors::MarketDataError;

/// A symbol whose fetch failed inside a partial-success batch.
#[derive(Debug)]
pub struct FailedSymbol {
    pub symbol: String,
    pub error: MarketDataError,
}

/// Result of a partial-success batch fetch.
///
/// `succeeded` keeps the input order of the symbols that resolved.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub succeeded: Vec<Quote>,
    pub failed: Vec<FailedSymbol>,
}

impl BatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_symbols(&self) -> Vec<&str> {
        self.failed.iter().map(|f| f.symbol.as_str()).collect()
    }
}
