use std::{
    env,
    net::SocketAddr,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use tickerwatch_core::config::{ServerConfig, TickersConfig};

pub const DEFAULT_SERVER_CONFIG: &str = "config/server_config.yaml";
pub const DEFAULT_TICKERS_CONFIG: &str = "config/tickers_config.yaml";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

pub struct Config {
    /// Where the server document lives; the database lifecycle writes back here.
    pub server_config_path: PathBuf,
    /// The server document as read from disk, without environment overrides.
    pub server: ServerConfig,
    pub tickers: TickersConfig,
    /// Provider credential, `QUOTE_API_KEY` taking precedence over the file.
    pub api_key: String,
    pub listen_addr: SocketAddr,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let server_path = env::var("TICKERWATCH_SERVER_CONFIG")
            .unwrap_or_else(|_| DEFAULT_SERVER_CONFIG.to_string());
        let tickers_path = env::var("TICKERWATCH_TICKERS_CONFIG")
            .unwrap_or_else(|_| DEFAULT_TICKERS_CONFIG.to_string());
        Self::load(PathBuf::from(server_path), Path::new(&tickers_path))
    }

    /// Read both YAML documents and apply the environment overrides.
    pub fn load(server_config_path: PathBuf, tickers_config_path: &Path) -> anyhow::Result<Self> {
        let server = ServerConfig::load(&server_config_path).with_context(|| {
            format!(
                "Failed to load server config from {}",
                server_config_path.display()
            )
        })?;
        let tickers = TickersConfig::load(tickers_config_path).with_context(|| {
            format!(
                "Failed to load tickers config from {}",
                tickers_config_path.display()
            )
        })?;

        let api_key = env::var("QUOTE_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .unwrap_or_else(|| server.api_key.clone());

        let listen_addr = env::var("TICKERWATCH_LISTEN_ADDR")
            .unwrap_or_else(|_| server.listen_addr());
        let listen_addr: SocketAddr = listen_addr
            .parse()
            .with_context(|| format!("Invalid listen address: {}", listen_addr))?;

        let timeout_ms = env::var("TICKERWATCH_REQUEST_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS);

        Ok(Self {
            server_config_path,
            server,
            tickers,
            api_key,
            listen_addr,
            request_timeout: Duration::from_millis(timeout_ms),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_reads_both_documents() {
        let dir = tempdir().unwrap();
        let server_path = dir.path().join("server_config.yaml");
        let tickers_path = dir.path().join("tickers_config.yaml");
        std::fs::write(
            &server_path,
            "db_conn_str: postgres://postgres@localhost:5432/stonks\nport: \":9191\"\n",
        )
        .unwrap();
        std::fs::write(&tickers_path, "tickers: [aapl, msft]\n").unwrap();

        let config = Config::load(server_path.clone(), &tickers_path).unwrap();
        assert_eq!(config.server_config_path, server_path);
        assert_eq!(config.tickers.tickers, vec!["AAPL", "MSFT"]);
        assert_eq!(config.server.log_level, "info");
        assert!(!config.tickers.job.enabled);
    }

    #[test]
    fn test_missing_server_config_is_an_error() {
        let dir = tempdir().unwrap();
        let tickers_path = dir.path().join("tickers_config.yaml");
        std::fs::write(&tickers_path, "tickers: []\n").unwrap();

        let err = Config::load(dir.path().join("absent.yaml"), &tickers_path)
            .err()
            .unwrap();
        assert!(err.to_string().contains("Failed to load server config"));
    }
}
