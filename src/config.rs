use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub settlement: SettlementConfig,
    #[serde(default)]
    pub sports: SportsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    /// Maximum characters of raw block text kept on a failure record
    #[serde(default = "default_failure_excerpt_chars")]
    pub failure_excerpt_chars: usize,
    /// Game strings shorter than this with no "vs" are flagged incomplete
    #[serde(default = "default_incomplete_matchup_max_len")]
    pub incomplete_matchup_max_len: usize,
}

fn default_failure_excerpt_chars() -> usize {
    200
}

fn default_incomplete_matchup_max_len() -> usize {
    50
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            failure_excerpt_chars: default_failure_excerpt_chars(),
            incomplete_matchup_max_len: default_incomplete_matchup_max_len(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SettlementConfig {
    /// Request budget of the results provider
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,
    /// Timeout for a single provider call in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Wagers settled concurrently in a batch
    #[serde(default = "default_max_concurrent_wagers")]
    pub max_concurrent_wagers: usize,
    /// Days either side of the leg date searched for the event
    #[serde(default = "default_event_window_days")]
    pub event_window_days: i64,
    /// Accept Won/Lost leg tags reported by the book without a provider lookup
    #[serde(default = "default_trust_book_leg_status")]
    pub trust_book_leg_status: bool,
}

fn default_requests_per_minute() -> u32 {
    30
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_max_concurrent_wagers() -> usize {
    4
}

fn default_event_window_days() -> i64 {
    1
}

fn default_trust_book_leg_status() -> bool {
    true
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: default_requests_per_minute(),
            request_timeout_ms: default_request_timeout_ms(),
            max_concurrent_wagers: default_max_concurrent_wagers(),
            event_window_days: default_event_window_days(),
            trust_book_leg_status: default_trust_book_leg_status(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SportsConfig {
    /// External sport lookup table (TOML); the built-in table is used when unset
    #[serde(default)]
    pub lookup_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
    /// Directory for the rolling log file
    #[serde(default)]
    pub dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            dir: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Defaults, then `<dir>/default.toml`, then `<dir>/<WAGERBOOK_ENV>`,
    /// then `WAGERBOOK_<SECTION>__<KEY>` variables
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let dir = config_dir.as_ref();
        let env_name = std::env::var("WAGERBOOK_ENV").unwrap_or_else(|_| "development".into());

        Config::builder()
            .set_default("logging.level", default_log_level())?
            .set_default("logging.json", false)?
            .set_default(
                "settlement.requests_per_minute",
                i64::from(default_requests_per_minute()),
            )?
            .set_default(
                "settlement.request_timeout_ms",
                default_request_timeout_ms() as i64,
            )?
            .add_source(File::from(dir.join("default.toml")).required(false))
            .add_source(File::from(dir.join(env_name)).required(false))
            .add_source(
                Environment::with_prefix("WAGERBOOK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_config_dir() {
        let cfg = AppConfig::load_from("/nonexistent/wagerbook-config").unwrap();
        assert_eq!(cfg.import.failure_excerpt_chars, 200);
        assert_eq!(cfg.import.incomplete_matchup_max_len, 50);
        assert_eq!(cfg.settlement.requests_per_minute, 30);
        assert_eq!(cfg.settlement.request_timeout_ms, 10_000);
        assert!(cfg.settlement.trust_book_leg_status);
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.sports.lookup_path.is_none());
    }
}
