use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tickerwatch_market_data::provider::http::{
    DEFAULT_PRICE_FIELD, DEFAULT_URL_TEMPLATE, SYMBOL_PLACEHOLDER,
};
use tickerwatch_market_data::{HttpProviderConfig, RetryPolicy};

use super::{read_yaml, write_yaml};
use crate::errors::{ConfigError, LifecycleError};

/// `server_config.yaml`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub api_key: String,
    pub db_conn_str: String,
    pub log_level: String,
    /// `":8080"`, `"8080"` or a full `host:port`
    pub port: String,
    pub postgres: PostgresConfig,
    pub provider: ProviderSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            db_conn_str: String::new(),
            log_level: "info".to_string(),
            port: ":8080".to_string(),
            postgres: PostgresConfig::default(),
            provider: ProviderSettings::default(),
        }
    }
}

impl ServerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config: Self = read_yaml(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        write_yaml(path, self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.db_conn_str.trim().is_empty() {
            return Err(ConfigError::invalid("db_conn_str", "must not be empty"));
        }
        if self.port.trim().is_empty() {
            return Err(ConfigError::invalid("port", "must not be empty"));
        }
        self.provider.validate()
    }

    /// Socket address string to bind, with a bare port bound on all interfaces.
    pub fn listen_addr(&self) -> String {
        let port = self.port.trim();
        if port.starts_with(':') {
            format!("0.0.0.0{}", port)
        } else if port.contains(':') {
            port.to_string()
        } else {
            format!("0.0.0.0:{}", port)
        }
    }
}

/// How the database lifecycle brings up a server that is not reachable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleMode {
    /// Initialize `data_dir` if needed, then start it.
    Startup,
    /// Start an existing cluster at `load_path`.
    Load,
}

impl LifecycleMode {
    pub fn parse(value: &str) -> Result<Self, LifecycleError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "startup" => Ok(LifecycleMode::Startup),
            "load" => Ok(LifecycleMode::Load),
            _ => Err(LifecycleError::InvalidMode(value.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleMode::Startup => "startup",
            LifecycleMode::Load => "load",
        }
    }
}

/// `postgres` section of the server config.
///
/// `mode` stays a string so that an unknown or missing value survives parsing
/// and is reported by the lifecycle before it touches the server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostgresConfig {
    pub mode: String,
    pub data_dir: String,
    pub binary_path: String,
    pub startup_params: String,
    pub load_path: String,
    pub settle_delay_secs: u64,
    pub probe_attempts: u32,
    pub probe_backoff_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            mode: String::new(),
            data_dir: String::new(),
            binary_path: String::new(),
            startup_params: String::new(),
            load_path: String::new(),
            settle_delay_secs: 5,
            probe_attempts: 5,
            probe_backoff_ms: 1000,
        }
    }
}

impl PostgresConfig {
    pub fn lifecycle_mode(&self) -> Result<LifecycleMode, LifecycleError> {
        LifecycleMode::parse(&self.mode)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_delay_secs)
    }

    pub fn probe_backoff(&self) -> Duration {
        Duration::from_millis(self.probe_backoff_ms)
    }

    pub fn data_dir(&self) -> Result<PathBuf, LifecycleError> {
        non_empty_path(&self.data_dir, "data_dir")
    }

    pub fn load_path(&self) -> Result<PathBuf, LifecycleError> {
        non_empty_path(&self.load_path, "load_path")
    }
}

fn non_empty_path(value: &str, key: &'static str) -> Result<PathBuf, LifecycleError> {
    if value.trim().is_empty() {
        Err(LifecycleError::MissingSetting(key))
    } else {
        Ok(PathBuf::from(value))
    }
}

/// `provider` section of the server config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub quote_url_template: String,
    /// Dotted path of the price inside the response body
    pub price_field: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            quote_url_template: DEFAULT_URL_TEMPLATE.to_string(),
            price_field: DEFAULT_PRICE_FIELD.to_string(),
            timeout_secs: 10,
            max_retries: 2,
            retry_backoff_ms: 250,
        }
    }
}

impl ProviderSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.quote_url_template.contains(SYMBOL_PLACEHOLDER) {
            return Err(ConfigError::invalid(
                "provider.quote_url_template",
                format!("must contain the {} placeholder", SYMBOL_PLACEHOLDER),
            ));
        }
        if self.price_field.trim().is_empty() {
            return Err(ConfigError::invalid("provider.price_field", "must not be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::invalid("provider.timeout_secs", "must be positive"));
        }
        Ok(())
    }

    pub fn http_config(&self, api_key: &str) -> HttpProviderConfig {
        HttpProviderConfig {
            url_template: self.quote_url_template.clone(),
            price_field: self.price_field.clone(),
            api_key: Some(api_key.to_string()).filter(|k| !k.is_empty()),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries,
            Duration::from_millis(self.retry_backoff_ms),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"
api_key: "secret"
db_conn_str: "postgres://postgres@localhost:5432/stonks?sslmode=disable"
log_level: debug
port: ":9090"
postgres:
  mode: startup
  data_dir: /var/lib/tickerwatch/pgdata
  binary_path: /usr/lib/postgresql/16/bin
  startup_params: "-p 5432"
"#;

    #[test]
    fn test_parse_fills_defaults() {
        let config: ServerConfig = serde_yaml::from_str(SAMPLE).unwrap();
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.postgres.lifecycle_mode().unwrap(), LifecycleMode::Startup);
        assert_eq!(config.postgres.load_path, "");
        assert_eq!(config.postgres.settle_delay_secs, 5);
        assert_eq!(config.postgres.probe_attempts, 5);
        assert_eq!(config.provider, ProviderSettings::default());
        config.validate().unwrap();
    }

    #[test]
    fn test_missing_mode_is_not_a_lifecycle_mode() {
        let config: ServerConfig = serde_yaml::from_str(
            "db_conn_str: postgres://localhost/stonks\npostgres:\n  data_dir: /tmp/pg\n",
        )
        .unwrap();
        assert_eq!(config.postgres.mode, "");
        assert!(matches!(
            config.postgres.lifecycle_mode(),
            Err(LifecycleError::InvalidMode(m)) if m.is_empty()
        ));
    }

    #[test]
    fn test_listen_addr_forms() {
        let mut config = ServerConfig::default();
        assert_eq!(config.listen_addr(), "0.0.0.0:8080");

        config.port = "9000".to_string();
        assert_eq!(config.listen_addr(), "0.0.0.0:9000");

        config.port = "127.0.0.1:7000".to_string();
        assert_eq!(config.listen_addr(), "127.0.0.1:7000");
    }

    #[test]
    fn test_lifecycle_mode_parse() {
        assert_eq!(LifecycleMode::parse("Load").unwrap(), LifecycleMode::Load);
        assert_eq!(LifecycleMode::parse(" startup ").unwrap(), LifecycleMode::Startup);
        assert!(matches!(
            LifecycleMode::parse("restore"),
            Err(LifecycleError::InvalidMode(m)) if m == "restore"
        ));
    }

    #[test]
    fn test_validate_rejects_template_without_placeholder() {
        let mut config: ServerConfig = serde_yaml::from_str(SAMPLE).unwrap();
        config.provider.quote_url_template = "https://example.com/quotes".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("provider.quote_url_template"));
    }

    #[test]
    fn test_validate_rejects_missing_connection_string() {
        let config = ServerConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { key, .. }) if key == "db_conn_str"
        ));
    }

    #[test]
    fn test_save_then_load_keeps_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("server_config.yaml");

        let mut config: ServerConfig = serde_yaml::from_str(SAMPLE).unwrap();
        config.postgres.mode = "load".to_string();
        config.postgres.load_path = config.postgres.data_dir.clone();
        config.save(&path).unwrap();

        let loaded = ServerConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert!(!path.with_extension("yaml.tmp").exists());
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let dir = tempdir().unwrap();
        let err = ServerConfig::load(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_http_config_omits_blank_key() {
        let settings = ProviderSettings::default();
        assert_eq!(settings.http_config("").api_key, None);
        assert_eq!(settings.http_config("k").api_key.as_deref(), Some("k"));
        assert_eq!(settings.http_config("k").timeout, Duration::from_secs(10));
    }
}
