//! Runtime configuration.
//!
//! A [`Config`] is built once at startup (defaults, then an optional TOML
//! file, then environment overrides) and passed by reference to every
//! component that talks to the API or the store.

use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "camara.toml";

/// Default base URL of the Câmara dos Deputados open-data API.
pub const DEFAULT_API_URL: &str = "https://dadosabertos.camara.leg.br/api/v2";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub graph: GraphConfig,
    pub throttle: ThrottleConfig,
    pub window: VotationWindow,
}

/// Upstream REST API settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Page size for the deputies collection.
    pub deputies_page_size: u32,
    /// Page size for every other paginated collection.
    pub page_size: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 30,
            deputies_page_size: 600,
            page_size: 100,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Configuration for connecting to Neo4j.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "neo4j".to_string(),
            database: "neo4j".to_string(),
        }
    }
}

/// Fixed delays between per-item fetches, in milliseconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    pub membership_delay_ms: u64,
    pub votation_delay_ms: u64,
    pub proposition_delay_ms: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            membership_delay_ms: 100,
            votation_delay_ms: 200,
            proposition_delay_ms: 500,
        }
    }
}

impl ThrottleConfig {
    /// No delays at all. Used by tests and local replays.
    pub fn none() -> Self {
        Self {
            membership_delay_ms: 0,
            votation_delay_ms: 0,
            proposition_delay_ms: 0,
        }
    }

    pub fn membership_delay(&self) -> Duration {
        Duration::from_millis(self.membership_delay_ms)
    }

    pub fn votation_delay(&self) -> Duration {
        Duration::from_millis(self.votation_delay_ms)
    }

    pub fn proposition_delay(&self) -> Duration {
        Duration::from_millis(self.proposition_delay_ms)
    }
}

/// Inclusive date range of votations ingested by one run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VotationWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Default for VotationWindow {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap_or(NaiveDate::MIN),
            end: NaiveDate::from_ymd_opt(2025, 9, 30).unwrap_or(NaiveDate::MIN),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from [`DEFAULT_CONFIG_FILE`] when it
    /// exists, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML config file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded config file");
        Self::from_toml_str(&raw, &path.display().to_string())
    }

    /// Parse configuration from TOML text. Missing sections keep their defaults.
    pub fn from_toml_str(raw: &str, origin: &str) -> ConfigResult<Self> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse {
            origin: origin.to_string(),
            source,
        })
    }

    /// Apply overrides from a key lookup (the process environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("CAMARA_API_URL") {
            self.api.base_url = url;
        }
        if let Some(uri) = lookup("NEO4J_URI") {
            self.graph.uri = uri;
        }
        if let Some(user) = lookup("NEO4J_USER") {
            self.graph.user = user;
        }
        if let Some(password) = lookup("NEO4J_PASSWORD") {
            self.graph.password = password;
        }
        if let Some(database) = lookup("NEO4J_DATABASE") {
            self.graph.database = database;
        }
        if let Some(start) = lookup("CAMARA_WINDOW_START") {
            self.window.start = parse_date("CAMARA_WINDOW_START", &start)?;
        }
        if let Some(end) = lookup("CAMARA_WINDOW_END") {
            self.window.end = parse_date("CAMARA_WINDOW_END", &end)?;
        }
        Ok(())
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.window.start > self.window.end {
            return Err(ConfigError::InvalidWindow {
                start: self.window.start,
                end: self.window.end,
            });
        }
        if self.api.page_size == 0 || self.api.deputies_page_size == 0 {
            return Err(ConfigError::invalid_value("api.page_size", "0"));
        }
        Ok(())
    }
}

fn parse_date(key: &str, value: &str) -> ConfigResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ConfigError::invalid_value(key, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, DEFAULT_API_URL);
        assert_eq!(config.api.page_size, 100);
        assert_eq!(config.api.deputies_page_size, 600);
        assert_eq!(config.throttle.votation_delay(), Duration::from_millis(200));
        assert_eq!(config.window.start.to_string(), "2025-09-01");
        assert_eq!(config.window.end.to_string(), "2025-09-30");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let raw = r#"
            [graph]
            uri = "bolt://graph.internal:7687"

            [window]
            start = "2024-03-01"
            end = "2024-03-31"
        "#;
        let config = Config::from_toml_str(raw, "inline").unwrap();
        assert_eq!(config.graph.uri, "bolt://graph.internal:7687");
        assert_eq!(config.graph.user, "neo4j");
        assert_eq!(config.window.start.to_string(), "2024-03-01");
        assert_eq!(config.api.timeout_secs, 30);
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml_str("[api\nbase_url = 1", "inline").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("NEO4J_URI", "bolt://db:7687"),
            ("NEO4J_PASSWORD", "secret"),
            ("CAMARA_WINDOW_START", "2025-01-01"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.graph.uri, "bolt://db:7687");
        assert_eq!(config.graph.password, "secret");
        assert_eq!(config.window.start.to_string(), "2025-01-01");
        assert_eq!(config.graph.user, "neo4j");
    }

    #[test]
    fn test_bad_date_override() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(|key| (key == "CAMARA_WINDOW_END").then(|| "30/09/2025".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_inverted_window_rejected() {
        let mut config = Config::default();
        std::mem::swap(&mut config.window.start, &mut config.window.end);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWindow { .. })
        ));
    }
}
