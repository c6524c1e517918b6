//! YAML configuration for the server and the refresh job.
//!
//! Two documents are read at startup:
//!
//! - `server_config.yaml` ([`ServerConfig`]): credentials, database
//!   connection, listen port, PostgreSQL bootstrap and provider settings.
//! - `tickers_config.yaml` ([`TickersConfig`]): the symbol set and the
//!   refresh job policy.
//!
//! Only the server document is ever written back, and only by the database
//! lifecycle on its first-run path (see [`ServerConfigStore`]).

mod server;
mod store;
mod tickers;

pub use server::{LifecycleMode, PostgresConfig, ProviderSettings, ServerConfig};
pub use store::{ServerConfigStore, YamlServerConfigStore};
pub use tickers::{BatchMode, JobConfig, TickersConfig, MAX_REFRESH_INTERVAL_MINUTES};

use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;

use crate::errors::ConfigError;

pub(crate) fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let data = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    serde_yaml::from_str(&data).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Serialize `value` and replace the file at `path`.
///
/// The document is written to a sibling temp file first and then renamed
/// over the target so a crash never leaves a truncated config behind.
pub(crate) fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<(), ConfigError> {
    let write_err = |message: String| ConfigError::Write {
        path: path.to_path_buf(),
        message,
    };

    let data = serde_yaml::to_string(value).map_err(|e| write_err(e.to_string()))?;
    let tmp = path.with_extension("yaml.tmp");
    std::fs::write(&tmp, data).map_err(|e| write_err(e.to_string()))?;
    std::fs::rename(&tmp, path).map_err(|e| write_err(e.to_string()))
}
