use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::upsert::excluded;
use std::sync::Arc;

use super::model::TickerDB;
use crate::db::{get_connection, run_blocking, DbPool};
use crate::errors::IntoCore;
use crate::schema::tickers::dsl as tickers_dsl;
use tickerwatch_core::quotes::{Quote, QuoteStore};
use tickerwatch_core::Result;

pub struct QuoteRepository {
    pool: Arc<DbPool>,
}

impl QuoteRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    async fn with_connection<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut PgConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        run_blocking(move || {
            let mut conn = get_connection(&pool)?;
            job(&mut conn)
        })
        .await
    }
}

fn upsert_row(conn: &mut PgConnection, row: &TickerDB) -> Result<()> {
    diesel::insert_into(tickers_dsl::tickers)
        .values(row)
        .on_conflict(tickers_dsl::ticker)
        .do_update()
        .set((
            tickers_dsl::price.eq(excluded(tickers_dsl::price)),
            tickers_dsl::updated_at.eq(excluded(tickers_dsl::updated_at)),
        ))
        .execute(conn)
        .into_core()?;
    Ok(())
}

#[async_trait]
impl QuoteStore for QuoteRepository {
    async fn upsert(&self, quote: &Quote) -> Result<()> {
        let row = TickerDB::for_write(quote);
        self.with_connection(move |conn| upsert_row(conn, &row)).await
    }

    async fn upsert_all(&self, quotes: &[Quote]) -> Result<usize> {
        if quotes.is_empty() {
            return Ok(0);
        }

        let rows: Vec<TickerDB> = quotes.iter().map(TickerDB::for_write).collect();
        self.with_connection(move |conn| {
            let mut written = 0;
            for row in &rows {
                upsert_row(conn, row)?;
                written += 1;
            }
            Ok(written)
        })
        .await
    }

    async fn latest(&self, symbol: &str) -> Result<Option<Quote>> {
        let symbol = symbol.to_string();
        self.with_connection(move |conn| {
            let row = tickers_dsl::tickers
                .find(symbol)
                .select(TickerDB::as_select())
                .first::<TickerDB>(conn)
                .optional()
                .into_core()?;
            Ok(row.map(Quote::from))
        })
        .await
    }

    async fn count(&self) -> Result<i64> {
        self.with_connection(|conn| {
            tickers_dsl::tickers
                .count()
                .get_result::<i64>(conn)
                .into_core()
        })
        .await
    }

    async fn ping(&self) -> Result<()> {
        self.with_connection(|conn| {
            diesel::sql_query("SELECT 1").execute(conn).into_core()?;
            Ok(())
        })
        .await
    }
}
