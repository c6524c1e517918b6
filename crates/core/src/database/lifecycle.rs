//! Bring the PostgreSQL server up before anything else touches it.
//!
//! ```text
//! Unknown ──probe ok──────────────────────────────────────────▶ Running
//!    │
//!    └─probe fails─▶ Unreachable ─startup, no marker─▶ Initializing ─┐
//!                        │  │                                         │
//!                        │  └─startup, marker present─┐               │
//!                        └─load───────────────────────┴──▶ Starting ◀─┘
//!                                                            │
//!                            settle ▶ status ▶ re-probe ─────┴──▶ Running
//! ```
//!
//! Any command or re-probe failure ends in `Failed`, which is fatal for the
//! process.

use log::{info, warn};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use super::commands::ServerControl;
use super::probe::DatabaseProbe;
use crate::config::{LifecycleMode, ServerConfig, ServerConfigStore};
use crate::errors::LifecycleError;

/// File whose presence marks an initialized data directory.
pub const INIT_MARKER: &str = "postgresql.conf";

/// Upper bound for a single connectivity probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    Unknown,
    Unreachable,
    Initializing,
    Starting,
    Running,
    Failed,
}

pub fn is_initialized(data_dir: &Path) -> bool {
    data_dir.join(INIT_MARKER).is_file()
}

pub struct DatabaseLifecycle {
    config: ServerConfig,
    probe: Arc<dyn DatabaseProbe>,
    control: Arc<dyn ServerControl>,
    config_store: Arc<dyn ServerConfigStore>,
    state: LifecycleState,
    transitions: Vec<(LifecycleState, LifecycleState)>,
}

impl DatabaseLifecycle {
    pub fn new(
        config: ServerConfig,
        probe: Arc<dyn DatabaseProbe>,
        control: Arc<dyn ServerControl>,
        config_store: Arc<dyn ServerConfigStore>,
    ) -> Self {
        Self {
            config,
            probe,
            control,
            config_store,
            state: LifecycleState::Unknown,
            transitions: Vec::new(),
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn transitions(&self) -> &[(LifecycleState, LifecycleState)] {
        &self.transitions
    }

    /// Configuration as it stands after the run, including any persisted mutation.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    fn transition(&mut self, to: LifecycleState) {
        info!("Database lifecycle: {:?} -> {:?}", self.state, to);
        self.transitions.push((self.state, to));
        self.state = to;
    }

    /// Make sure the server answers, starting it if necessary.
    ///
    /// An invalid mode is reported before the server is probed.
    pub async fn ensure_running(&mut self) -> Result<(), LifecycleError> {
        let result = self.bring_up().await;
        if let Err(e) = &result {
            if self.state != LifecycleState::Unknown {
                warn!("Database lifecycle failed: {}", e);
                self.transition(LifecycleState::Failed);
            }
        }
        result
    }

    async fn bring_up(&mut self) -> Result<(), LifecycleError> {
        let mode = self.config.postgres.lifecycle_mode()?;

        match self.probe_once().await {
            Ok(()) => {
                info!("PostgreSQL is already running");
                self.transition(LifecycleState::Running);
                return Ok(());
            }
            Err(message) => {
                info!("PostgreSQL is not reachable ({}), starting it", message);
                self.transition(LifecycleState::Unreachable);
            }
        }

        let pg = self.config.postgres.clone();
        let dir = match mode {
            LifecycleMode::Startup => {
                let data_dir = pg.data_dir()?;
                if is_initialized(&data_dir) {
                    info!(
                        "Data directory {} already initialized, skipping initdb",
                        data_dir.display()
                    );
                } else {
                    self.transition(LifecycleState::Initializing);
                    let output = self.control.init_db(&data_dir).await?;
                    info!("initdb output: {}", output.trim());
                }
                data_dir
            }
            LifecycleMode::Load => pg.load_path()?,
        };

        self.transition(LifecycleState::Starting);
        let output = self.control.start(&dir, &pg.startup_params).await?;
        info!("PostgreSQL start output: {}", output.trim());

        tokio::time::sleep(pg.settle_delay()).await;

        let status = self.control.status(&dir).await?;
        info!("PostgreSQL status: {}", status.trim());

        self.wait_until_reachable(pg.probe_attempts, pg.probe_backoff())
            .await?;
        self.transition(LifecycleState::Running);

        if mode == LifecycleMode::Startup {
            self.persist_attach_mode()?;
        }
        Ok(())
    }

    async fn probe_once(&self) -> Result<(), String> {
        match tokio::time::timeout(PROBE_TIMEOUT, self.probe.ping()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!("probe timed out after {:?}", PROBE_TIMEOUT)),
        }
    }

    async fn wait_until_reachable(
        &self,
        attempts: u32,
        backoff: Duration,
    ) -> Result<(), LifecycleError> {
        let attempts = attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match self.probe_once().await {
                Ok(()) => return Ok(()),
                Err(message) => {
                    warn!(
                        "PostgreSQL probe {}/{} failed: {}",
                        attempt, attempts, message
                    );
                    last_error = message;
                }
            }
            if attempt < attempts {
                tokio::time::sleep(backoff).await;
            }
        }

        Err(LifecycleError::Unreachable {
            attempts,
            message: last_error,
        })
    }

    /// After a first-run start, switch the config to attach mode so the next
    /// run reuses the same data directory.
    fn persist_attach_mode(&mut self) -> Result<(), LifecycleError> {
        let pg = &mut self.config.postgres;
        pg.mode = LifecycleMode::Load.as_str().to_string();
        if pg.load_path.trim().is_empty() {
            pg.load_path = pg.data_dir.clone();
        }
        self.config_store.save(&self.config)?;
        Ok(())
    }
}
