//! Shared configuration for the farmdash binary.
//!
//! Layered loading (defaults, TOML file, Home-Assistant style JSON options
//! file, `FARMDASH_` env vars), temperature presets, API key resolution
//! (env var, keyring, plaintext) and translation into
//! `farmdash_core::PrinterConfig` / `ManagerSettings`.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use farmdash_core::{CoreError, ManagerSettings, PrinterConfig, PrinterKind};

/// Env var naming an explicit config file.
pub const CONFIG_ENV: &str = "FARMDASH_CONFIG";

const KEYRING_SERVICE: &str = "farmdash";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl From<CoreError> for ConfigError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ValidationFailed { field, reason } => Self::Validation { field, reason },
            other => Self::Validation {
                field: "printer".into(),
                reason: other.to_string(),
            },
        }
    }
}

// ── Config structs ──────────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Configured printers, in display order.
    #[serde(default)]
    pub printers: Vec<PrinterEntry>,

    /// Quick-pick temperatures per heater type.
    #[serde(default)]
    pub temperature_presets: TemperaturePresets,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Status read timeout in seconds.
    #[serde(default = "default_status_timeout")]
    pub status_timeout: u64,

    /// Background poll interval in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,

    #[serde(default = "default_max_concurrent_polls")]
    pub max_concurrent_polls: usize,

    /// Look API keys up in the system keyring.
    #[serde(default = "default_true")]
    pub use_keyring: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            status_timeout: default_status_timeout(),
            poll_interval: default_poll_interval(),
            max_concurrent_polls: default_max_concurrent_polls(),
            use_keyring: true,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_status_timeout() -> u64 {
    5
}
fn default_poll_interval() -> u64 {
    5
}
fn default_max_concurrent_polls() -> usize {
    8
}
fn default_true() -> bool {
    true
}
fn default_kind() -> String {
    "klipper".into()
}

/// One printer as written in the config file.
///
/// Fields are kept loose so a single bad entry is skipped with a warning
/// instead of failing the whole load.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PrinterEntry {
    #[serde(default)]
    pub name: String,

    /// `klipper` (alias `moonraker`) or `octoprint`.
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,

    /// Printer base URL (e.g., "http://voron.local:7125").
    #[serde(default)]
    pub url: String,

    /// API key (plaintext — prefer keyring or env var).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    #[serde(default = "default_true")]
    pub use_websocket: bool,
}

/// Quick-pick temperatures per heater type.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TemperaturePresets {
    #[serde(default = "default_extruder_presets")]
    pub extruder: Vec<f64>,
    #[serde(default = "default_bed_presets")]
    pub bed: Vec<f64>,
    #[serde(default = "default_chamber_presets")]
    pub chamber: Vec<f64>,
}

impl Default for TemperaturePresets {
    fn default() -> Self {
        Self {
            extruder: default_extruder_presets(),
            bed: default_bed_presets(),
            chamber: default_chamber_presets(),
        }
    }
}

fn default_extruder_presets() -> Vec<f64> {
    vec![0.0, 200.0, 220.0, 250.0]
}
fn default_bed_presets() -> Vec<f64> {
    vec![0.0, 60.0, 80.0, 100.0]
}
fn default_chamber_presets() -> Vec<f64> {
    vec![0.0, 40.0, 60.0, 80.0]
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `FARMDASH_CONFIG`, else the platform
/// config directory.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("dev", "farmdash", "farmdash").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("farmdash");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full config from the default path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path(), None)
}

/// Load config from an explicit TOML path, an optional JSON options file
/// layered on top, then `FARMDASH_` env vars (`__` separates nesting, e.g.
/// `FARMDASH_DEFAULTS__STATUS_TIMEOUT=10`).
///
/// Missing files are skipped.
pub fn load_config_from(path: &Path, options: Option<&Path>) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), options = ?options, "loading config");

    let mut figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path));
    if let Some(options) = options {
        figment = figment.merge(Json::file(options));
    }
    let figment = figment.merge(
        Env::prefixed("FARMDASH_")
            .ignore(&["config", "options", "log"])
            .split("__"),
    );

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve a printer's API key: `api_key_env`, then the keyring entry
/// `farmdash/<printer>/api-key`, then plaintext. `None` when nothing is
/// configured.
pub fn resolve_api_key(entry: &PrinterEntry, use_keyring: bool) -> Option<SecretString> {
    // 1. Entry's api_key_env → env var lookup
    if let Some(ref env_name) = entry.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
        debug!(printer = %entry.name, env = %env_name, "api key env var not set");
    }

    // 2. System keyring
    if use_keyring {
        if let Ok(key) = keyring::Entry::new(KEYRING_SERVICE, &format!("{}/api-key", entry.name)) {
            if let Ok(secret) = key.get_password() {
                return Some(SecretString::from(secret));
            }
        }
    }

    // 3. Plaintext in config
    entry
        .api_key
        .as_ref()
        .filter(|k| !k.is_empty())
        .map(|k| SecretString::from(k.clone()))
}

// ── Translation to core types ───────────────────────────────────────

/// Build a validated `PrinterConfig` from a config entry.
pub fn entry_to_printer_config(
    entry: &PrinterEntry,
    use_keyring: bool,
) -> Result<PrinterConfig, ConfigError> {
    let kind = PrinterKind::from_str(entry.kind.trim()).map_err(|_| ConfigError::Validation {
        field: "type".into(),
        reason: format!(
            "expected 'klipper', 'moonraker' or 'octoprint', got '{}'",
            entry.kind
        ),
    })?;

    Ok(PrinterConfig::new(&entry.name, kind, &entry.url)?
        .with_api_key(resolve_api_key(entry, use_keyring))
        .with_websocket(entry.use_websocket))
}

/// All usable printers of a config; invalid entries are skipped with a
/// warning.
pub fn resolve_printers(config: &Config) -> Vec<PrinterConfig> {
    config
        .printers
        .iter()
        .filter_map(
            |entry| match entry_to_printer_config(entry, config.defaults.use_keyring) {
                Ok(printer) => Some(printer),
                Err(e) => {
                    warn!(printer = %entry.name, error = %e, "skipping invalid printer entry");
                    None
                }
            },
        )
        .collect()
}

/// Manager tunables from the config defaults.
pub fn manager_settings(defaults: &Defaults) -> ManagerSettings {
    ManagerSettings {
        status_timeout: Duration::from_secs(defaults.status_timeout.max(1)),
        max_concurrent_polls: defaults.max_concurrent_polls.max(1),
        poll_interval: Duration::from_secs(defaults.poll_interval.max(1)),
    }
}
