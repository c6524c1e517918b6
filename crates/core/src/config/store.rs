use std::path::PathBuf;

use super::ServerConfig;
use crate::errors::ConfigError;

/// Destination for configuration the service mutates at runtime.
pub trait ServerConfigStore: Send + Sync {
    fn save(&self, config: &ServerConfig) -> Result<(), ConfigError>;
}

/// Writes the server config back to the YAML file it was loaded from.
pub struct YamlServerConfigStore {
    path: PathBuf,
}

impl YamlServerConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ServerConfigStore for YamlServerConfigStore {
    fn save(&self, config: &ServerConfig) -> Result<(), ConfigError> {
        log::info!("Persisting server configuration to {}", self.path.display());
        config.save(&self.path)
    }
}
