use std::sync::Arc;

use tickerwatch_core::scheduler::{RefreshHandle, RefreshScheduler};

use crate::{config::Config, main_lib::AppState};

/// Start the background quote refresh when the tickers config enables it.
///
/// The loop runs on a child of the process shutdown token.
pub fn start_refresh_scheduler(
    state: Arc<AppState>,
    config: &Config,
) -> anyhow::Result<Option<RefreshHandle>> {
    let job = &config.tickers.job;
    if !job.enabled {
        tracing::info!("Quote refresh job disabled");
        return Ok(None);
    }
    if config.tickers.tickers.is_empty() {
        tracing::warn!("Quote refresh job enabled but no tickers are configured");
        return Ok(None);
    }

    let scheduler = RefreshScheduler::from_job(
        state.quote_service.clone(),
        config.tickers.tickers.clone(),
        job,
    )?;
    Ok(Some(scheduler.spawn(state.shutdown.child_token())))
}
