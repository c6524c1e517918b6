//! Database model for the latest quote per symbol.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use tickerwatch_core::quotes::Quote;

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::tickers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TickerDB {
    pub ticker: String,
    pub price: f64,
    pub updated_at: DateTime<Utc>,
}

impl TickerDB {
    /// Row for `quote`, stamped with the write time.
    pub fn for_write(quote: &Quote) -> Self {
        Self {
            ticker: quote.symbol.clone(),
            price: quote.price,
            updated_at: Utc::now(),
        }
    }
}

impl From<TickerDB> for Quote {
    fn from(row: TickerDB) -> Self {
        Quote {
            symbol: row.ticker,
            price: row.price,
            observed_at: row.updated_at,
        }
    }
}
