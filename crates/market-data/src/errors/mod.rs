//! Error types and retry classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all quote fetching operations
//! - [`RetryClass`]: Classification for determining retry behavior

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors that can occur while fetching quotes from a provider.
///
/// Each variant is classified into a [`RetryClass`] via the
/// [`retry_class`](Self::retry_class) method, which determines how the
/// fetcher should handle the error.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The symbol was empty after trimming.
    #[error("Invalid symbol: '{0}'")]
    InvalidSymbol(String),

    /// The transport failed before a response was received.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The response body could not be parsed as JSON.
    #[error("Failed to decode response for {symbol}: {message}")]
    Decode {
        /// The symbol that was requested
        symbol: String,
        /// Parser error message
        message: String,
    },

    /// The response parsed but the price field is absent or not numeric.
    #[error("Unexpected response schema for {symbol}: {message}")]
    Schema {
        /// The symbol that was requested
        symbol: String,
        /// Description of the mismatch
        message: String,
    },

    /// The provider does not know the requested symbol (HTTP 404).
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The provider rate limited the request (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The provider answered with an unexpected HTTP status.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// HTTP status code, if the error came from a response
        status: Option<u16>,
        /// The error message from the provider
        message: String,
    },

    /// The caller cancelled the operation before it completed.
    #[error("Request cancelled")]
    Cancelled,
}

impl MarketDataError {
    /// Returns the retry classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use tickerwatch_market_data::errors::{MarketDataError, RetryClass};
    ///
    /// let error = MarketDataError::RateLimited { provider: "HTTP".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    ///
    /// let error = MarketDataError::SymbolNotFound("INVALID".to_string());
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            // Transient errors - retry with backoff
            Self::Network(_) | Self::Timeout { .. } | Self::RateLimited { .. } => {
                RetryClass::WithBackoff
            }

            // Server-side failures may clear up, client errors won't
            Self::ProviderError { status, .. } => match status {
                Some(code) if *code >= 500 => RetryClass::WithBackoff,
                _ => RetryClass::Never,
            },

            // Terminal errors - never retry
            Self::InvalidSymbol(_)
            | Self::Decode { .. }
            | Self::Schema { .. }
            | Self::SymbolNotFound(_)
            | Self::Cancelled => RetryClass::Never,
        }
    }

    /// Returns true if this error is transient and should be retried.
    pub fn is_transient(&self) -> bool {
        self.retry_class() == RetryClass::WithBackoff
    }
}
