use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "CLUSTERSCOPE_";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub inventory: InventoryConfig,
    #[serde(default)]
    pub daemon: DaemonConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub url: String,
    /// Request timeout handed to the engine and to the HTTP client.
    pub timeout_secs: u64,
    /// Width of the query window ending now.
    pub lookback_hours: i64,
    #[serde(default)]
    pub api_token: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:9200".to_string(),
            timeout_secs: 120,
            lookback_hours: 6,
            api_token: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    pub path: String,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        let path = dirs::config_dir()
            .map(|d| d.join("clusterscope").join("clusters.yaml"))
            .unwrap_or_else(|| PathBuf::from("clusters.yaml"));
        Self {
            path: path.display().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    pub http_addr: String,
    pub log_level: String,
    /// Zero disables periodic refresh.
    pub refresh_interval_secs: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            http_addr: "127.0.0.1:9110".to_string(),
            log_level: "info".to_string(),
            refresh_interval_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub enabled: bool,
    pub vector_url: String,
    pub push_interval_secs: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            vector_url: "http://127.0.0.1:8686/clusterscope".to_string(),
            push_interval_secs: 60,
        }
    }
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("could not determine config directory")?;
        Ok(config_dir.join("clusterscope").join("config.yaml"))
    }

    /// Defaults, then the YAML file at `path` (if present), then
    /// `CLUSTERSCOPE_*` environment variables (`__` separates sections).
    pub fn load_from(path: &Path) -> Result<Self> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("loading configuration from {}", path.display()))
    }
}

/// Load from `custom` if given, otherwise from the default location.
pub fn load(custom: Option<&str>) -> Result<Config> {
    match custom {
        Some(p) => Config::load_from(Path::new(p)),
        None => Config::load_from(&Config::path()?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.yaml")).unwrap();
        assert_eq!(cfg.engine.timeout_secs, 120);
        assert_eq!(cfg.daemon.http_addr, "127.0.0.1:9110");
        assert!(!cfg.telemetry.enabled);
    }

    #[test]
    fn yaml_overrides_defaults_per_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "engine:\n  url: http://engine.internal\n  timeout_secs: 30\n  lookback_hours: 1\ndaemon:\n  http_addr: 0.0.0.0:9000\n  log_level: debug\n  refresh_interval_secs: 0\n",
        )
        .unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.engine.url, "http://engine.internal");
        assert_eq!(cfg.engine.timeout_secs, 30);
        assert_eq!(cfg.daemon.refresh_interval_secs, 0);
        assert_eq!(cfg.telemetry.push_interval_secs, 60);
    }
}
