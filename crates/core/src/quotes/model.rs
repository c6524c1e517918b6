//! Quote domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tickerwatch_market_data::Quote as ProviderQuote;

/// Latest known price for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Normalized symbol (trimmed, upper case)
    pub symbol: String,
    pub price: f64,
    /// When the price was observed, or written for rows read back from the store
    pub observed_at: DateTime<Utc>,
}

impl Quote {
    pub fn new(symbol: impl Into<String>, price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            observed_at: Utc::now(),
        }
    }
}

impl From<ProviderQuote> for Quote {
    fn from(quote: ProviderQuote) -> Self {
        Self {
            symbol: quote.symbol,
            price: quote.price,
            observed_at: quote.timestamp,
        }
    }
}

/// Trim and upper-case a symbol. Returns `None` when nothing is left.
pub fn normalize_symbol(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}
