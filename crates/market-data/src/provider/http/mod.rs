//! Templated-URL JSON quote provider.
//!
//! Issues one `GET` per symbol against a URL template such as
//! `https://api.schwab.com/v1/markets/quotes/{symbol}` and reads a single
//! numeric field out of the JSON body.
//!
//! # Response Format
//!
//! Only the price field is consumed. Its location is configurable as a
//! dotted path (`price`, `quote.lastPrice`, ...). Anything else in the body is
//! ignored.

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

use crate::errors::MarketDataError;
use crate::models::Quote;
use crate::provider::QuoteProvider;

const PROVIDER_ID: &str = "HTTP";

/// Placeholder substituted with the URL-encoded symbol.
pub const SYMBOL_PLACEHOLDER: &str = "{symbol}";

/// Default endpoint template
pub const DEFAULT_URL_TEMPLATE: &str = "https://api.schwab.com/v1/markets/quotes/{symbol}";

/// Default location of the price inside the response body
pub const DEFAULT_PRICE_FIELD: &str = "price";

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest slice of an error body kept in error messages
const ERROR_BODY_EXCERPT: usize = 200;

/// Settings for [`HttpQuoteProvider`].
#[derive(Clone, Debug)]
pub struct HttpProviderConfig {
    pub url_template: String,
    pub price_field: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for HttpProviderConfig {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            price_field: DEFAULT_PRICE_FIELD.to_string(),
            api_key: None,
            timeout: REQUEST_TIMEOUT,
        }
    }
}

/// HTTP provider that reads one price field from a JSON document.
///
/// # Example
///
/// ```ignore
/// let provider = HttpQuoteProvider::new(HttpProviderConfig {
///     url_template: "http://localhost:9000/quotes/{symbol}".into(),
///     ..Default::default()
/// })?;
/// let quote = provider.get_latest_quote("AAPL").await?;
/// ```
pub struct HttpQuoteProvider {
    client: Client,
    config: HttpProviderConfig,
    price_pointer: String,
}

impl HttpQuoteProvider {
    /// Create a provider; fails only if the TLS backend cannot be initialised.
    pub fn new(config: HttpProviderConfig) -> Result<Self, MarketDataError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        let price_pointer = field_path_to_pointer(&config.price_field);

        Ok(Self {
            client,
            config,
            price_pointer,
        })
    }

    /// Build the request URL for a symbol.
    pub fn url_for(&self, symbol: &str) -> String {
        self.config
            .url_template
            .replace(SYMBOL_PLACEHOLDER, &urlencoding::encode(symbol))
    }

    fn map_transport_error(err: reqwest::Error) -> MarketDataError {
        if err.is_timeout() {
            MarketDataError::Timeout {
                provider: PROVIDER_ID.to_string(),
            }
        } else {
            MarketDataError::Network(err)
        }
    }

    /// Send the request and return the raw body of a successful response.
    async fn fetch(&self, symbol: &str) -> Result<String, MarketDataError> {
        let url = self.url_for(symbol);
        debug!("Fetching quote for {} from {}", symbol, url);

        let mut request = self.client.get(&url);
        if let Some(key) = self.config.api_key.as_deref().filter(|k| !k.is_empty()) {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(Self::map_transport_error)?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(MarketDataError::SymbolNotFound(symbol.to_string()));
        }

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let excerpt: String = body.chars().take(ERROR_BODY_EXCERPT).collect();
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                status: Some(status.as_u16()),
                message: format!("HTTP error: {} {}", status, excerpt.trim()),
            });
        }

        response.text().await.map_err(Self::map_transport_error)
    }
}

#[async_trait]
impl QuoteProvider for HttpQuoteProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn get_latest_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        if symbol.trim().is_empty() {
            return Err(MarketDataError::InvalidSymbol(symbol.to_string()));
        }

        let body = self.fetch(symbol).await?;
        let price = decode_price(&body, &self.price_pointer, symbol)?;

        Ok(Quote::new(symbol, price, PROVIDER_ID))
    }
}

/// Convert a dotted field path (`quote.lastPrice`) into a JSON pointer
/// (`/quote/lastPrice`).
fn field_path_to_pointer(path: &str) -> String {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .map(|segment| format!("/{}", segment.replace('~', "~0").replace('/', "~1")))
        .collect()
}

/// Typed decode of the provider body.
///
/// A body that is not JSON is a decode error; a JSON document without a
/// numeric value at `pointer` is a schema error.
fn decode_price(body: &str, pointer: &str, symbol: &str) -> Result<f64, MarketDataError> {
    let document: Value = serde_json::from_str(body).map_err(|e| MarketDataError::Decode {
        symbol: symbol.to_string(),
        message: e.to_string(),
    })?;

    let field = pointer.trim_start_matches('/').replace('/', ".");
    match document.pointer(pointer) {
        None | Some(Value::Null) => Err(MarketDataError::Schema {
            symbol: symbol.to_string(),
            message: format!("missing field '{}'", field),
        }),
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| MarketDataError::Schema {
            symbol: symbol.to_string(),
            message: format!("field '{}' is out of range", field),
        }),
        Some(other) => Err(MarketDataError::Schema {
            symbol: symbol.to_string(),
            message: format!("field '{}' is not numeric (got {})", field, json_kind(other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
