//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value. The
//! CLI layer owns config; the core crate only ever sees the
//! [`GeneratorSettings`] section.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment: `REGEN__SECTION__KEY`, e.g. `REGEN__WATCH__POLL_INTERVAL_MS=250`
//! 3. Config file: `--config FILE`, else the platform config dir, else `./.regen.toml`
//! 4. Built-in defaults

use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use config::{Config, Environment, File};
use regen_core::domain::GeneratorSettings;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "REGEN";
/// Local configuration file, looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = ".regen.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub generator: GeneratorSettings,
    pub watch: WatchConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Delay between two filesystem snapshots.
    pub poll_interval_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "human".into(),
        }
    }
}

impl AppConfig {
    /// Load configuration, layering file and environment over the defaults.
    ///
    /// An explicit `config_file` must exist; the implicit locations are
    /// optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let (path, required) = match config_file {
            Some(path) => (path.clone(), true),
            None => (Self::config_path(), false),
        };
        debug!(path = %path.display(), required, "loading configuration");

        let defaults = Config::try_from(&Self::default()).context("serialising defaults")?;
        let settings = Config::builder()
            .add_source(defaults)
            .add_source(File::from(path.as_path()).required(required))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("reading configuration from {}", path.display()))?;

        settings
            .try_deserialize()
            .context("configuration has invalid values")
    }

    /// The configuration file consulted when `--config` is not given.
    ///
    /// The platform config dir wins when a file exists there; otherwise
    /// `./.regen.toml`.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "regen", "regen")
            .map(|d| d.config_dir().join("config.toml"))
            .filter(|p| p.is_file())
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE))
    }

    /// Look up a dotted key such as `generator.render_on_save`.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = serde_json::to_value(self).ok()?;
        let pointer = format!("/{}", key.replace('.', "/"));
        match value.pointer(&pointer)? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Watch poll interval, never below 10ms.
    pub fn poll_interval(&self, override_ms: Option<u64>) -> Duration {
        Duration::from_millis(override_ms.unwrap_or(self.watch.poll_interval_ms).max(10))
    }
}
