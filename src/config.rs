//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub query: QueryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend sample API connection
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Sent as `X-API-Key` when present
    #[serde(default)]
    pub api_key: Option<String>,

    /// Unset means the transport default
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            request_timeout_secs: None,
        }
    }
}

impl BackendConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = normalize_key(Some(api_key.into()));
        self
    }

    /// API key with blank values treated as unset
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

fn normalize_key(key: Option<String>) -> Option<String> {
    key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty())
}

/// Dashboard HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8084
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Fetch cache timing
#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    #[serde(default = "default_samples_refetch")]
    pub samples_refetch_secs: u64,

    #[serde(default = "default_detail_stale")]
    pub detail_stale_secs: u64,

    #[serde(default = "default_gc")]
    pub gc_secs: u64,
}

fn default_samples_refetch() -> u64 {
    10
}

fn default_detail_stale() -> u64 {
    30
}

fn default_gc() -> u64 {
    300 // 5 minutes
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            samples_refetch_secs: default_samples_refetch(),
            detail_stale_secs: default_detail_stale(),
            gc_secs: default_gc(),
        }
    }
}

impl QueryConfig {
    pub fn samples_refetch_interval(&self) -> Duration {
        Duration::from_secs(self.samples_refetch_secs.max(1))
    }

    pub fn detail_stale_time(&self) -> Duration {
        Duration::from_secs(self.detail_stale_secs)
    }

    pub fn gc_time(&self) -> Duration {
        Duration::from_secs(self.gc_secs)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        config.backend.api_key = normalize_key(config.backend.api_key.take());

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("ngs-dashboard").join("config.toml")),
            Some(PathBuf::from("/etc/ngs-dashboard/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Backend overrides
        if let Some(url) = lookup("NGS_API_BASE_URL").filter(|u| !u.trim().is_empty()) {
            self.backend.base_url = url;
        }
        if let Some(key) = lookup("NGS_API_KEY") {
            self.backend.api_key = normalize_key(Some(key));
        }
        if let Some(secs) = lookup("NGS_API_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            self.backend.request_timeout_secs = Some(secs);
        }

        // Server overrides
        if let Some(host) = lookup("NGS_DASHBOARD_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("NGS_DASHBOARD_PORT").and_then(|s| s.parse().ok()) {
            self.server.port = port;
        }

        if let Some(secs) = lookup("NGS_SAMPLES_REFETCH_SECS").and_then(|s| s.parse().ok()) {
            self.query.samples_refetch_secs = secs;
        }

        // Logging overrides
        if let Some(level) = lookup("NGS_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("NGS_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# NGS Dashboard Configuration
#
# Environment variables override these settings:
# - NGS_API_BASE_URL
# - NGS_API_KEY
# - NGS_API_TIMEOUT_SECS
# - NGS_DASHBOARD_HOST
# - NGS_DASHBOARD_PORT
# - NGS_SAMPLES_REFETCH_SECS
# - NGS_LOG_LEVEL
# - NGS_LOG_FORMAT

[backend]
# Sample API base URL
base_url = "http://localhost:8000"

# API key sent as the X-API-Key header (leave unset for unauthenticated access)
# api_key = ""

# Request timeout in seconds (unset = transport default)
# request_timeout_secs = 30

[server]
# Dashboard host
host = "0.0.0.0"

# Dashboard port
port = 8084

[query]
# How often the sample list is refetched (seconds)
samples_refetch_secs = 10

# How long a sample detail stays fresh (seconds)
detail_stale_secs = 30

# Drop cached queries nobody has looked at for this long (seconds)
gc_secs = 300

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.backend.base_url, "http://localhost:8000");
        assert!(config.backend.api_key().is_none());
        assert!(config.backend.request_timeout().is_none());
        assert_eq!(config.server.addr(), "0.0.0.0:8084");
        assert_eq!(config.query.samples_refetch_interval(), Duration::from_secs(10));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides(lookup_from(&[
            ("NGS_API_BASE_URL", "https://api.example.org"),
            ("NGS_API_KEY", "secret"),
            ("NGS_DASHBOARD_PORT", "9000"),
            ("NGS_LOG_FORMAT", "json"),
        ]));

        assert_eq!(config.backend.base_url, "https://api.example.org");
        assert_eq!(config.backend.api_key(), Some("secret"));
        assert_eq!(config.server.port, 9000);
        assert!(config.logging.is_json());
    }

    #[test]
    fn test_blank_api_key_is_unset() {
        let mut config = Config::default();
        config.apply_overrides(lookup_from(&[("NGS_API_KEY", "   ")]));
        assert!(config.backend.api_key().is_none());

        let backend = BackendConfig::new("http://x").with_api_key("");
        assert!(backend.api_key().is_none());
    }

    #[test]
    fn test_invalid_port_ignored() {
        let mut config = Config::default();
        config.apply_overrides(lookup_from(&[("NGS_DASHBOARD_PORT", "not-a-port")]));
        assert_eq!(config.server.port, 8084);
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[backend]\nbase_url = \"http://pipeline:8000\"\napi_key = \"k1\"\n\n[query]\nsamples_refetch_secs = 5\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.backend.base_url, "http://pipeline:8000");
        assert_eq!(config.backend.api_key(), Some("k1"));
        assert_eq!(config.query.samples_refetch_secs, 5);
        assert_eq!(config.query.detail_stale_secs, 30);
        assert_eq!(config.server.port, 8084);
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[backend\nbase_url = ").unwrap();

        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
        assert!(matches!(
            Config::load(&dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_generated_config_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.backend.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.query.samples_refetch_secs, 10);
    }
}
