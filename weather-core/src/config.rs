use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BASE_URL: &str = "http://api.weatherapi.com/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_STATIC_DIR: &str = "public";

/// HTTP listener and static client settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Directory holding `index.html` and the client assets.
    pub static_dir: PathBuf,

    /// Include internal failure detail in the `debug` field of error bodies.
    pub expose_error_details: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            expose_error_details: false,
        }
    }
}

/// Settings for the outbound call to WeatherAPI.com.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_string(), timeout_secs: DEFAULT_TIMEOUT_SECS }
    }
}

/// Process-wide configuration, built once at startup and never mutated afterwards.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
///
/// [server]
/// port = 3000
///
/// [upstream]
/// timeout_secs = 10
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
}

impl Config {
    /// Returns the API key, treating an empty or blank value as absent.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|key| !key.is_empty())
    }

    pub fn api_key_configured(&self) -> bool {
        self.api_key().is_some()
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key.trim().to_string());
    }

    /// Load config from the platform config file, or an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Load config from `path`, or an empty default if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, fall back to env and defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-proxy", "weather-server")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Overlay environment variables read through `lookup`.
    ///
    /// Recognised keys: `WEATHER_API_KEY`, `PORT`, `HOST`, `WEATHER_API_BASE_URL`,
    /// `WEATHER_API_TIMEOUT_SECS`, `WEATHER_STATIC_DIR`.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("WEATHER_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = parse_var("PORT", &port)?;
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(base_url) = lookup("WEATHER_API_BASE_URL") {
            self.upstream.base_url = base_url;
        }
        if let Some(timeout) = lookup("WEATHER_API_TIMEOUT_SECS") {
            self.upstream.timeout_secs = parse_var("WEATHER_API_TIMEOUT_SECS", &timeout)?;
        }
        if let Some(dir) = lookup("WEATHER_STATIC_DIR") {
            self.server.static_dir = PathBuf::from(dir);
        }

        Ok(self)
    }

    /// Convenience helper: file config at `path` overlaid with the process environment.
    pub fn from_file_and_env(path: &Path) -> Result<Self> {
        Self::load_from(path)?.with_env(|key| std::env::var(key).ok())
    }
}

fn parse_var<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.trim().parse().with_context(|| format!("Invalid value for {name}: '{value}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_documented_contract() {
        let cfg = Config::default();

        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.upstream.base_url, "http://api.weatherapi.com/v1");
        assert!(!cfg.api_key_configured());
        assert!(!cfg.server.expose_error_details);
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let cfg = Config::default().with_env(env(&[("WEATHER_API_KEY", "   ")])).unwrap();

        assert_eq!(cfg.api_key(), None);
        assert!(!cfg.api_key_configured());
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg = Config::default();
        cfg.set_api_key("FROM_FILE".into());
        cfg.server.port = 8080;

        let cfg = cfg
            .with_env(env(&[
                ("WEATHER_API_KEY", "FROM_ENV"),
                ("PORT", "4000"),
                ("WEATHER_API_BASE_URL", "http://localhost:9999"),
            ]))
            .unwrap();

        assert_eq!(cfg.api_key(), Some("FROM_ENV"));
        assert_eq!(cfg.server.port, 4000);
        assert_eq!(cfg.upstream.base_url, "http://localhost:9999");
    }

    #[test]
    fn invalid_port_is_an_error() {
        let err = Config::default().with_env(env(&[("PORT", "not-a-port")])).unwrap_err();

        assert!(err.to_string().contains("Invalid value for PORT"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_api_key("SAVED_KEY".into());
        cfg.server.port = 5050;
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api_key(), Some("SAVED_KEY"));
        assert_eq!(loaded.server.port, 5050);
        assert_eq!(loaded.upstream, UpstreamConfig::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[server]\nport = 8123\n").unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.server.port, 8123);
        assert_eq!(cfg.server.host, DEFAULT_HOST);
        assert_eq!(cfg.api_key, None);
    }
}
