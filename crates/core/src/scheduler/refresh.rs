//! Periodic quote refresh.
//!
//! One background task fires a tick every `interval`, measured from the
//! moment the scheduler starts (the first tick is one interval after start).
//! A slow tick pushes the following ones back instead of bursting to catch up.

use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::trading_hours::{is_trading_hours, Clock, LocalClock, TzClock};
use crate::config::{BatchMode, JobConfig};
use crate::errors::{ConfigError, Error};
use crate::quotes::QuoteServiceTrait;

/// Immutable settings of the refresh loop.
#[derive(Clone, Debug, PartialEq)]
pub struct RefreshPolicy {
    pub interval: Duration,
    pub trading_hours_only: bool,
    pub batch_mode: BatchMode,
}

impl RefreshPolicy {
    pub fn from_job(job: &JobConfig) -> Result<Self, ConfigError> {
        job.validate()?;
        Ok(Self {
            interval: job.refresh_interval(),
            trading_hours_only: job.trading_hours_only,
            batch_mode: job.batch_mode,
        })
    }
}

/// What a single tick did.
#[derive(Clone, Debug, PartialEq)]
pub enum TickOutcome {
    /// Outside trading hours, nothing fetched.
    Skipped,
    Refreshed { stored: usize, failed: Vec<String> },
    /// The tick was abandoned; the loop keeps going.
    Failed(String),
}

pub struct RefreshScheduler {
    service: Arc<dyn QuoteServiceTrait>,
    symbols: Vec<String>,
    policy: RefreshPolicy,
    clock: Arc<dyn Clock>,
}

impl RefreshScheduler {
    pub fn new(
        service: Arc<dyn QuoteServiceTrait>,
        symbols: Vec<String>,
        policy: RefreshPolicy,
    ) -> Self {
        Self {
            service,
            symbols,
            policy,
            clock: Arc::new(LocalClock),
        }
    }

    /// Build from the tickers config, evaluating trading hours in `job.timezone`
    /// when one is set.
    pub fn from_job(
        service: Arc<dyn QuoteServiceTrait>,
        symbols: Vec<String>,
        job: &JobConfig,
    ) -> Result<Self, ConfigError> {
        let policy = RefreshPolicy::from_job(job)?;
        let scheduler = Self::new(service, symbols, policy);
        Ok(match job.timezone()? {
            Some(tz) => scheduler.with_clock(Arc::new(TzClock(tz))),
            None => scheduler,
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn policy(&self) -> &RefreshPolicy {
        &self.policy
    }

    fn is_eligible(&self) -> bool {
        !self.policy.trading_hours_only || is_trading_hours(self.clock.now_local())
    }

    /// Run one tick now.
    pub async fn tick(&self, cancel: &CancellationToken) -> TickOutcome {
        if !self.is_eligible() {
            return TickOutcome::Skipped;
        }

        match self
            .service
            .refresh(&self.symbols, self.policy.batch_mode, cancel)
            .await
        {
            Ok(summary) => TickOutcome::Refreshed {
                stored: summary.stored,
                failed: summary.failed,
            },
            Err(e) => TickOutcome::Failed(e.to_string()),
        }
    }

    /// Drive ticks until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        info!(
            "Quote refresh scheduler started ({} symbols every {:?}, trading hours only: {})",
            self.symbols.len(),
            self.policy.interval,
            self.policy.trading_hours_only
        );

        let period = self.policy.interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            match self.tick(&cancel).await {
                TickOutcome::Skipped => debug!("Refresh tick skipped: outside trading hours"),
                TickOutcome::Refreshed { stored, failed } if failed.is_empty() => {
                    info!("Refresh tick stored {} quotes", stored)
                }
                TickOutcome::Refreshed { stored, failed } => warn!(
                    "Refresh tick stored {} quotes, {} failed: {}",
                    stored,
                    failed.len(),
                    failed.join(", ")
                ),
                TickOutcome::Failed(reason) => {
                    if cancel.is_cancelled() {
                        break;
                    }
                    warn!("Refresh tick failed: {}", reason)
                }
            }
        }

        info!("Quote refresh scheduler stopped");
    }

    /// Start the loop on the runtime. Cancelling `cancel` (or calling
    /// [`RefreshHandle::shutdown`]) stops it.
    pub fn spawn(self, cancel: CancellationToken) -> RefreshHandle {
        let token = cancel.clone();
        let task = tokio::spawn(self.run(cancel));
        RefreshHandle { token, task }
    }
}

/// Owner of a running refresh loop.
pub struct RefreshHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.token
    }

    /// Cancel the loop and wait up to `bound` for it to exit.
    ///
    /// Returns `Err` if the task panicked or did not stop in time; in the
    /// latter case it is aborted.
    pub async fn shutdown(self, bound: Duration) -> Result<(), Error> {
        self.token.cancel();
        let mut task = self.task;
        match tokio::time::timeout(bound, &mut task).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(Error::Unexpected(format!("refresh task failed: {}", e))),
            Err(_) => {
                task.abort();
                Err(Error::Unexpected(format!(
                    "refresh task did not stop within {:?}",
                    bound
                )))
            }
        }
    }
}
