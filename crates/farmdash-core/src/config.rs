// ── Runtime printer configuration ──
//
// These types describe *how* to reach a printer. They carry no file or
// env-var semantics; `farmdash-config` resolves those and hands over
// validated `PrinterConfig` values.

use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use url::Url;

use crate::error::CoreError;

/// Which firmware API a printer speaks.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum PrinterKind {
    /// Klipper behind Moonraker. `moonraker` is accepted as an alias.
    #[serde(alias = "moonraker")]
    #[strum(to_string = "klipper", serialize = "moonraker")]
    Klipper,
    #[serde(rename = "octoprint")]
    #[strum(to_string = "octoprint")]
    OctoPrint,
}

/// One configured printer.
#[derive(Debug, Clone)]
pub struct PrinterConfig {
    pub name: String,
    pub kind: PrinterKind,
    pub base_url: Url,
    pub api_key: Option<SecretString>,
    /// Advisory for Klipper printers; no WebSocket client is built.
    pub use_websocket: bool,
}

impl PrinterConfig {
    /// Validate and build a printer config.
    ///
    /// Rejects an empty name, an empty URL, and URLs that are not
    /// absolute `http`/`https` URLs.
    pub fn new(name: &str, kind: PrinterKind, base_url: &str) -> Result<Self, CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::validation("name", "printer name is empty"));
        }
        let raw = base_url.trim();
        if raw.is_empty() {
            return Err(CoreError::validation("url", format!("no URL for printer '{name}'")));
        }
        let base_url = Url::parse(raw)
            .map_err(|e| CoreError::validation("url", format!("'{raw}' for printer '{name}': {e}")))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(CoreError::validation(
                "url",
                format!("'{raw}' for printer '{name}' is not an http(s) URL"),
            ));
        }

        Ok(Self {
            name: name.to_owned(),
            kind,
            base_url,
            api_key: None,
            use_websocket: true,
        })
    }

    pub fn with_api_key(mut self, api_key: Option<SecretString>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_websocket(mut self, use_websocket: bool) -> Self {
        self.use_websocket = use_websocket;
        self
    }
}

/// Tunables for the printer manager.
#[derive(Debug, Clone)]
pub struct ManagerSettings {
    /// Per-request timeout for status reads.
    pub status_timeout: Duration,
    /// Upper bound on printers polled at the same time.
    pub max_concurrent_polls: usize,
    /// Interval of the optional background poller.
    pub poll_interval: Duration,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        Self {
            status_timeout: Duration::from_secs(5),
            max_concurrent_polls: 8,
            poll_interval: Duration::from_secs(5),
        }
    }
}

impl ManagerSettings {
    /// Whole-printer deadline for one status call.
    ///
    /// A Klipper status makes two sequential rounds of requests, each
    /// bounded by `status_timeout`; the rest is grace.
    pub fn status_deadline(&self) -> Duration {
        self.status_timeout.saturating_mul(3)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn status_deadline_saturates() {
        let settings = ManagerSettings {
            status_timeout: Duration::from_secs(u64::MAX),
            ..ManagerSettings::default()
        };
        assert_eq!(settings.status_deadline(), Duration::MAX);
        assert_eq!(
            ManagerSettings::default().status_deadline(),
            Duration::from_secs(15)
        );
    }

    #[test]
    fn moonraker_is_an_alias_for_klipper() {
        assert_eq!(PrinterKind::from_str("moonraker").ok(), Some(PrinterKind::Klipper));
        assert_eq!(PrinterKind::from_str("Klipper").ok(), Some(PrinterKind::Klipper));
        assert_eq!(PrinterKind::from_str("OctoPrint").ok(), Some(PrinterKind::OctoPrint));
        assert!(PrinterKind::from_str("prusalink").is_err());
        assert_eq!(PrinterKind::Klipper.to_string(), "klipper");
    }

    #[test]
    fn kind_deserializes_from_config_strings() {
        let kind: PrinterKind = serde_json::from_str(r#""moonraker""#).unwrap();
        assert_eq!(kind, PrinterKind::Klipper);
        let kind: PrinterKind = serde_json::from_str(r#""octoprint""#).unwrap();
        assert_eq!(kind, PrinterKind::OctoPrint);
    }

    #[test]
    fn new_rejects_bad_entries() {
        assert!(PrinterConfig::new("  ", PrinterKind::Klipper, "http://voron.local").is_err());
        assert!(PrinterConfig::new("voron", PrinterKind::Klipper, "").is_err());
        assert!(PrinterConfig::new("voron", PrinterKind::Klipper, "voron.local:7125").is_err());
        assert!(PrinterConfig::new("voron", PrinterKind::Klipper, "ftp://voron.local").is_err());
    }

    #[test]
    fn new_trims_and_defaults() {
        let cfg = PrinterConfig::new(" voron ", PrinterKind::Klipper, " http://voron.local:7125 ")
            .unwrap();
        assert_eq!(cfg.name, "voron");
        assert_eq!(cfg.base_url.as_str(), "http://voron.local:7125/");
        assert!(cfg.use_websocket);
        assert!(cfg.api_key.is_none());
    }
}
