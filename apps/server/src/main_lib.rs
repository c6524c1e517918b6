use std::sync::Arc;

use tickerwatch_core::{
    config::{ServerConfig, YamlServerConfigStore},
    database::{DatabaseLifecycle, PgCtl},
    quotes::{QuoteService, QuoteServiceTrait, QuoteStore},
};
use tickerwatch_market_data::{HttpQuoteProvider, QuoteFetcher};
use tickerwatch_storage_postgres::{create_pool, quotes::QuoteRepository, run_migrations, PgProbe};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub struct AppState {
    pub quote_service: Arc<dyn QuoteServiceTrait>,
    /// Root token; handlers and the refresh loop hang child tokens off it.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(quote_service: Arc<dyn QuoteServiceTrait>, shutdown: CancellationToken) -> Self {
        Self {
            quote_service,
            shutdown,
        }
    }
}

/// `RUST_LOG` wins over `default_level`. `TICKERWATCH_LOG_FORMAT=json` switches
/// to structured output.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let json = std::env::var("TICKERWATCH_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn build_quote_service(
    server: &ServerConfig,
    api_key: &str,
    concurrency: usize,
    store: Arc<dyn QuoteStore>,
) -> anyhow::Result<Arc<QuoteService>> {
    let provider = Arc::new(HttpQuoteProvider::new(server.provider.http_config(api_key))?);
    let fetcher = QuoteFetcher::new(provider)
        .with_retry_policy(server.provider.retry_policy())
        .with_concurrency(concurrency);
    Ok(Arc::new(QuoteService::new(Arc::new(fetcher), store)))
}

/// Bring the database up, migrate it and wire the quote service.
pub async fn build_state(
    config: &Config,
    shutdown: CancellationToken,
) -> anyhow::Result<Arc<AppState>> {
    let server = &config.server;
    let mut lifecycle = DatabaseLifecycle::new(
        server.clone(),
        Arc::new(PgProbe::new(server.db_conn_str.clone())),
        Arc::new(PgCtl::new(&server.postgres.binary_path)),
        Arc::new(YamlServerConfigStore::new(&config.server_config_path)),
    );
    lifecycle.ensure_running().await?;
    tracing::info!("Database reachable ({:?})", lifecycle.state());

    let conn_str = server.db_conn_str.clone();
    let pool = tokio::task::spawn_blocking(move || -> tickerwatch_core::Result<_> {
        let pool = create_pool(&conn_str)?;
        run_migrations(&pool)?;
        Ok(pool)
    })
    .await??;

    let store: Arc<dyn QuoteStore> = Arc::new(QuoteRepository::new(pool));
    let quote_service = build_quote_service(
        server,
        &config.api_key,
        config.tickers.job.concurrency,
        store,
    )?;

    Ok(Arc::new(AppState::new(quote_service, shutdown)))
}
