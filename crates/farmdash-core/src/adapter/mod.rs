// ── Printer adapters ──
//
// One adapter per configured printer, chosen from `PrinterConfig::kind`
// when the registry is built. Both variants expose the same operations;
// the enum dispatches to the firmware-specific implementation.

pub mod klipper;
pub mod octoprint;

use farmdash_api::moonraker::PrintAction;
use farmdash_api::octoprint::JobCommand;
use farmdash_api::{MoonrakerClient, OctoPrintClient, TransportConfig};
use serde_json::Value;

pub use klipper::KlipperAdapter;
pub use octoprint::OctoPrintAdapter;

use crate::command::{Axis, HeaterTarget, HomeAxes};
use crate::config::{PrinterConfig, PrinterKind};
use crate::error::CoreError;
use crate::model::NormalizedStatus;

/// A printer adapter of either firmware family.
#[derive(Debug)]
pub enum PrinterAdapter {
    Klipper(KlipperAdapter),
    OctoPrint(OctoPrintAdapter),
}

impl PrinterAdapter {
    /// Build the adapter matching `config.kind`.
    pub fn from_config(
        config: &PrinterConfig,
        transport: &TransportConfig,
    ) -> Result<Self, CoreError> {
        let base_url = config.base_url.clone();
        let api_key = config.api_key.clone();
        Ok(match config.kind {
            PrinterKind::Klipper => Self::Klipper(KlipperAdapter::new(
                &config.name,
                MoonrakerClient::new(base_url, api_key, transport)?,
            )),
            PrinterKind::OctoPrint => Self::OctoPrint(OctoPrintAdapter::new(
                &config.name,
                OctoPrintClient::new(base_url, api_key, transport)?,
            )),
        })
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Klipper(a) => a.name(),
            Self::OctoPrint(a) => a.name(),
        }
    }

    pub fn kind(&self) -> PrinterKind {
        match self {
            Self::Klipper(_) => PrinterKind::Klipper,
            Self::OctoPrint(_) => PrinterKind::OctoPrint,
        }
    }

    /// Poll and normalize. Never fails: unreachable and unusable printers
    /// come back as offline / error records.
    pub async fn status(&self) -> NormalizedStatus {
        match self {
            Self::Klipper(a) => a.status().await,
            Self::OctoPrint(a) => a.status().await,
        }
    }

    pub async fn pause(&self) -> Result<Value, CoreError> {
        match self {
            Self::Klipper(a) => a.print_action(PrintAction::Pause).await,
            Self::OctoPrint(a) => a.job_command(JobCommand::Pause).await,
        }
    }

    pub async fn resume(&self) -> Result<Value, CoreError> {
        match self {
            Self::Klipper(a) => a.print_action(PrintAction::Resume).await,
            Self::OctoPrint(a) => a.job_command(JobCommand::Resume).await,
        }
    }

    pub async fn cancel(&self) -> Result<Value, CoreError> {
        match self {
            Self::Klipper(a) => a.print_action(PrintAction::Cancel).await,
            Self::OctoPrint(a) => a.job_command(JobCommand::Cancel).await,
        }
    }

    pub async fn reprint(&self) -> Result<Value, CoreError> {
        match self {
            Self::Klipper(a) => a.reprint().await,
            Self::OctoPrint(a) => a.reprint().await,
        }
    }

    pub async fn home(&self, axes: &HomeAxes) -> Result<Value, CoreError> {
        match self {
            Self::Klipper(a) => a.home(axes).await,
            Self::OctoPrint(a) => a.home(axes).await,
        }
    }

    pub async fn jog(&self, axis: Axis, distance: f64) -> Result<Value, CoreError> {
        match self {
            Self::Klipper(a) => a.jog(axis, distance).await,
            Self::OctoPrint(a) => a.jog(axis, distance).await,
        }
    }

    /// `celsius` must already be clamped to be non-negative.
    pub async fn set_temperature(
        &self,
        heater: &HeaterTarget,
        celsius: f64,
    ) -> Result<Value, CoreError> {
        match self {
            Self::Klipper(a) => a.set_temperature(heater, celsius).await,
            Self::OctoPrint(a) => a.set_temperature(heater, celsius).await,
        }
    }
}
