use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use super::read_yaml;
use crate::errors::ConfigError;
use crate::quotes::normalize_symbol;

/// `tickers_config.yaml`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickersConfig {
    pub tickers: Vec<String>,
    pub job: JobConfig,
}

impl TickersConfig {
    /// Load, normalize and validate the tickers document.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw: Self = read_yaml(path)?;
        raw.normalized()
    }

    /// Upper-case and de-duplicate the symbol list, keeping first occurrences,
    /// and validate the job section.
    pub fn normalized(self) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        let mut tickers = Vec::with_capacity(self.tickers.len());
        for (idx, raw) in self.tickers.iter().enumerate() {
            let symbol = normalize_symbol(raw)
                .ok_or_else(|| ConfigError::invalid(format!("tickers[{}]", idx), "empty symbol"))?;
            if seen.insert(symbol.clone()) {
                tickers.push(symbol);
            }
        }

        self.job.validate()?;
        Ok(Self {
            tickers,
            job: self.job,
        })
    }
}

/// What a refresh tick does when some symbols fail.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchMode {
    /// Any failure discards the whole tick.
    #[default]
    FailFast,
    /// Store whatever succeeded and log the rest.
    Partial,
}

/// Longest accepted refresh interval: one week.
pub const MAX_REFRESH_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

/// `job` section of the tickers config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    pub enabled: bool,
    pub trading_hours_only: bool,
    pub refresh_interval_minutes: u64,
    /// IANA zone used for the trading-hours window; process local time when unset
    pub timezone: Option<String>,
    pub batch_mode: BatchMode,
    /// Parallel requests per tick in partial mode
    pub concurrency: usize,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            trading_hours_only: false,
            refresh_interval_minutes: 15,
            timezone: None,
            batch_mode: BatchMode::default(),
            concurrency: 4,
        }
    }
}

impl JobConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.refresh_interval_minutes == 0 {
            return Err(ConfigError::invalid(
                "job.refresh_interval_minutes",
                "must be positive when the job is enabled",
            ));
        }
        if self.refresh_interval_minutes > MAX_REFRESH_INTERVAL_MINUTES {
            return Err(ConfigError::invalid(
                "job.refresh_interval_minutes",
                format!("too large (at most {})", MAX_REFRESH_INTERVAL_MINUTES),
            ));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::invalid("job.concurrency", "must be positive"));
        }
        self.timezone()?;
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(
            self.refresh_interval_minutes
                .min(MAX_REFRESH_INTERVAL_MINUTES)
                .saturating_mul(60),
        )
    }

    pub fn timezone(&self) -> Result<Option<Tz>, ConfigError> {
        match self.timezone.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(name) => name
                .parse::<Tz>()
                .map(Some)
                .map_err(|e| ConfigError::invalid("job.timezone", e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_normalizes_and_dedupes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tickers_config.yaml");
        std::fs::write(
            &path,
            r#"
tickers: [aapl, " MSFT ", AAPL, goog]
job:
  enabled: true
  trading_hours_only: true
  refresh_interval_minutes: 5
"#,
        )
        .unwrap();

        let config = TickersConfig::load(&path).unwrap();
        assert_eq!(config.tickers, vec!["AAPL", "MSFT", "GOOG"]);
        assert!(config.job.enabled);
        assert!(config.job.trading_hours_only);
        assert_eq!(config.job.refresh_interval(), Duration::from_secs(300));
        assert_eq!(config.job.batch_mode, BatchMode::FailFast);
        assert_eq!(config.job.concurrency, 4);
    }

    #[test]
    fn test_empty_symbol_is_rejected() {
        let config = TickersConfig {
            tickers: vec!["AAPL".to_string(), "  ".to_string()],
            job: JobConfig::default(),
        };
        let err = config.normalized().unwrap_err();
        assert!(err.to_string().contains("tickers[1]"));
    }

    #[test]
    fn test_zero_interval_rejected_only_when_enabled() {
        let mut job = JobConfig {
            refresh_interval_minutes: 0,
            ..Default::default()
        };
        job.validate().unwrap();

        job.enabled = true;
        assert!(matches!(
            job.validate(),
            Err(ConfigError::InvalidValue { key, .. }) if key == "job.refresh_interval_minutes"
        ));
    }

    #[test]
    fn test_oversized_interval_is_rejected() {
        let job = JobConfig {
            enabled: true,
            refresh_interval_minutes: u64::MAX / 2,
            ..Default::default()
        };
        assert!(matches!(
            job.validate(),
            Err(ConfigError::InvalidValue { ref key, ref message })
                if key == "job.refresh_interval_minutes" && message.contains("too large")
        ));
        assert_eq!(
            job.refresh_interval(),
            Duration::from_secs(MAX_REFRESH_INTERVAL_MINUTES * 60)
        );

        let week = JobConfig {
            enabled: true,
            refresh_interval_minutes: MAX_REFRESH_INTERVAL_MINUTES,
            ..Default::default()
        };
        week.validate().unwrap();
    }

    #[test]
    fn test_batch_mode_and_timezone_parse() {
        let job: JobConfig = serde_yaml::from_str(
            "enabled: true\nrefresh_interval_minutes: 1\nbatch_mode: partial\ntimezone: America/New_York\n",
        )
        .unwrap();
        assert_eq!(job.batch_mode, BatchMode::Partial);
        assert_eq!(job.timezone().unwrap(), Some(chrono_tz::America::New_York));
    }

    #[test]
    fn test_unknown_timezone_rejected() {
        let job = JobConfig {
            timezone: Some("Mars/Olympus".to_string()),
            ..Default::default()
        };
        assert!(job.validate().is_err());
    }
}
