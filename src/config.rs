//! Layered configuration for the monitor.
//!
//! Sources, lowest to highest precedence:
//! - built-in defaults
//! - TOML config file (`/etc/filemon/config.toml` unless overridden)
//! - environment variables prefixed `FILEMON_`, with double underscores
//!   separating nested levels (`FILEMON_NOTIFIER__TIMEOUT_SECS=30` sets
//!   `notifier.timeout_secs`)

use std::collections::HashMap;
use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Config file consulted when `-c` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/filemon/config.toml";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Base URL of the indexing API.
    #[serde(default = "default_api")]
    pub api: String,

    /// Plugin chain, run in exactly this order for every event.
    #[serde(default)]
    pub plugins: Vec<String>,

    /// When true, a failing plugin abandons the event (no notifier call)
    /// instead of being logged and skipped.
    #[serde(default = "default_false")]
    pub raise_plugin_errors: bool,

    /// Base parameters copied into every event's parameter set. Plugins
    /// read their own settings from here (mapping prefixes, denylists).
    #[serde(default)]
    pub params: HashMap<String, Value>,

    #[serde(default)]
    pub watcher: WatcherConfig,

    #[serde(default)]
    pub notifier: NotifierConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WatcherConfig {
    /// Watch directories recursively.
    #[serde(default = "default_true")]
    pub recursive: bool,

    /// How long a modified file must stay quiet before it counts as a
    /// completed write.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Bound on the raw event queue. A full queue blocks the watch
    /// source rather than buffering without limit.
    #[serde(default = "default_queue_size")]
    pub queue_size: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NotifierConfig {
    /// Request timeout for notification calls.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default log level (error, warn, info, debug, trace).
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module level overrides, e.g. `chain = "debug"`.
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_api() -> String {
    "http://localhost/search-apps/api".to_string()
}
fn default_false() -> bool {
    false
}
fn default_true() -> bool {
    true
}
fn default_debounce_ms() -> u64 {
    500
}
fn default_queue_size() -> usize {
    100
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api: default_api(),
            plugins: Vec::new(),
            raise_plugin_errors: false,
            params: HashMap::new(),
            watcher: WatcherConfig::default(),
            notifier: NotifierConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            recursive: default_true(),
            debounce_ms: default_debounce_ms(),
            queue_size: default_queue_size(),
        }
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load settings from defaults, config file, and environment.
    ///
    /// A missing config file is not an error: the monitor can run on
    /// defaults with paths supplied on the command line.
    pub fn load(config_path: Option<&Path>) -> Result<Self, Box<figment::Error>> {
        let path = config_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
        if config_path.is_some() && !path.is_file() {
            tracing::warn!("config file {} not found, using defaults", path.display());
        }
        Self::load_from(path)
    }

    /// Load from a specific file plus environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(
                Env::prefixed("FILEMON_")
                    .map(|key| key.as_str().to_lowercase().replace("__", ".").into()),
            )
            .extract()
            .map_err(Box::new)
    }
}
