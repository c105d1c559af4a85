//! Configuration loading
//!
//! Bootstrap configuration comes from a TOML file whose path is resolved in
//! priority order:
//! 1. Command-line argument (highest priority)
//! 2. `ANIRELAY_CONFIG` environment variable
//! 3. `<config dir>/anirelay/config.toml`
//! 4. Compiled defaults (fallback)
//!
//! A missing or unreadable file is never fatal: it logs a warning and the
//! compiled defaults are used. Individual values can then be overridden by
//! environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::models::{EnrichmentPath, Source};
use crate::{Error, Result};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "ANIRELAY_CONFIG";
/// Environment override for the aggregator base URL
pub const BASE_URL_ENV_VAR: &str = "ANIRELAY_BASE_URL";
/// Environment override for the enrichment provider base URL
pub const ENRICHMENT_URL_ENV_VAR: &str = "ANIRELAY_ENRICHMENT_URL";
/// Environment override for the log level
pub const LOG_LEVEL_ENV_VAR: &str = "ANIRELAY_LOG_LEVEL";

const DEFAULT_BASE_URL: &str = "https://web-anime-api.vercel.app";
const DEFAULT_ENRICHMENT_URL: &str = "https://api.jikan.moe/v4";
const DEFAULT_USER_AGENT: &str = concat!("anirelay/", env!("CARGO_PKG_VERSION"));

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Provider used when a caller does not name one
    pub default_source: Source,
    pub upstream: UpstreamConfig,
    pub enrichment: EnrichmentConfig,
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            default_source: Source::default(),
            upstream: UpstreamConfig::default(),
            enrichment: EnrichmentConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Primary aggregator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Enrichment provider settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    pub base_url: String,
    /// Minimum gap between one queued task finishing and the next starting
    pub queue_gap_ms: u64,
    /// Fixed delay before a direct (unqueued) lookup
    pub direct_delay_ms: u64,
    /// Hard ceiling shared by queued and direct lookups
    pub requests_per_second: u32,
    /// Call path used for the metadata lookup behind a detail view
    pub detail_path: EnrichmentPath,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ENRICHMENT_URL.to_string(),
            queue_gap_ms: 400,
            direct_delay_ms: 300,
            requests_per_second: 3,
            detail_path: EnrichmentPath::Direct,
        }
    }
}

impl EnrichmentConfig {
    pub fn queue_gap(&self) -> Duration {
        Duration::from_millis(self.queue_gap_ms)
    }

    pub fn direct_delay(&self) -> Duration {
        Duration::from_millis(self.direct_delay_ms)
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    pub level: String,

    /// Log file path (logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Resolves which config file to load and loads it
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit path given on the command line
    pub fn with_cli_path(mut self, path: Option<PathBuf>) -> Self {
        self.cli_path = path;
        self
    }

    /// Config file path by priority, or `None` when only defaults apply
    pub fn resolve_path(&self) -> Option<PathBuf> {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_path {
            return Some(path.clone());
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        // Priority 3: Per-user config file, only when it exists
        dirs::config_dir()
            .map(|dir| dir.join("anirelay").join("config.toml"))
            .filter(|path| path.exists())
    }

    /// Load configuration, degrading to defaults on any file problem
    ///
    /// Logs the outcome immediately. Callers that install the tracing
    /// subscriber from the loaded config use [`ConfigResolver::load_with_report`]
    /// and log the report once tracing is up.
    pub fn load(&self) -> TomlConfig {
        let (config, report) = self.load_with_report();
        report.log();
        config
    }

    /// Load configuration and describe where it came from without logging
    pub fn load_with_report(&self) -> (TomlConfig, LoadReport) {
        let (mut config, report) = match self.resolve_path() {
            Some(path) => match load_config_file(&path) {
                Ok(config) => (config, LoadReport::Loaded(path)),
                Err(e) => (
                    TomlConfig::default(),
                    LoadReport::Fallback {
                        path,
                        error: e.to_string(),
                    },
                ),
            },
            None => (TomlConfig::default(), LoadReport::Defaults),
        };

        config.apply_env_overrides();
        (config, report)
    }
}

/// Where the loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadReport {
    /// Parsed from this file
    Loaded(PathBuf),
    /// No file found; compiled defaults
    Defaults,
    /// The file was unreadable or invalid; compiled defaults
    Fallback { path: PathBuf, error: String },
}

impl LoadReport {
    pub fn is_fallback(&self) -> bool {
        matches!(self, LoadReport::Fallback { .. })
    }

    /// Emit the outcome through tracing
    pub fn log(&self) {
        match self {
            LoadReport::Loaded(path) => {
                info!(path = %path.display(), "Loaded configuration file");
            }
            LoadReport::Defaults => {
                debug!("No config file found, using compiled defaults");
            }
            LoadReport::Fallback { path, error } => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Config file unusable, falling back to compiled defaults"
                );
            }
        }
    }
}

impl TomlConfig {
    /// Apply per-value environment overrides
    pub fn apply_env_overrides(&mut self) {
        if let Some(url) = non_empty_env(BASE_URL_ENV_VAR) {
            self.upstream.base_url = url;
        }
        if let Some(url) = non_empty_env(ENRICHMENT_URL_ENV_VAR) {
            self.enrichment.base_url = url;
        }
        if let Some(level) = non_empty_env(LOG_LEVEL_ENV_VAR) {
            self.logging.level = level;
        }
    }
}

/// Read and parse a TOML config file
pub fn load_config_file(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}
