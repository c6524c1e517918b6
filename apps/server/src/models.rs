use serde::{Deserialize, Serialize};
use tickerwatch_core::quotes::Quote;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TickerInfo {
    pub ticker: String,
    pub price: f64,
}

impl From<Quote> for TickerInfo {
    fn from(q: Quote) -> Self {
        Self {
            ticker: q.symbol,
            price: q.price,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TickerRequest {
    pub tickers: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TickerQuery {
    pub ticker: Option<String>,
}
