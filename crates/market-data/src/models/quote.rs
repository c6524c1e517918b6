use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latest price for a symbol as reported by a provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Symbol exactly as it was requested
    pub symbol: String,

    /// Current price
    pub price: f64,

    /// When the quote was received
    pub timestamp: DateTime<Utc>,

    /// Provider that produced the quote
    pub source: String,
}

impl Quote {
    /// Create a quote stamped with the current time
    pub fn new(symbol: impl Into<String>, price: f64, source: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            timestamp: Utc::now(),
            source: source.into(),
        }
    }
}
