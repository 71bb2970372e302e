// ── OctoPrint adapter ──
//
// OctoPrint exposes structured REST endpoints for everything except the
// chamber heater, which is driven with a raw `M141`.

use farmdash_api::OctoPrintClient;
use farmdash_api::octoprint::JobCommand;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::command::{Axis, HeaterTarget, HomeAxes};
use crate::config::PrinterKind;
use crate::convert::normalize_octoprint;
use crate::error::CoreError;
use crate::model::NormalizedStatus;

/// Adapter for one OctoPrint printer.
#[derive(Debug)]
pub struct OctoPrintAdapter {
    name: String,
    client: OctoPrintClient,
}

impl OctoPrintAdapter {
    pub fn new(name: &str, client: OctoPrintClient) -> Self {
        Self {
            name: name.to_owned(),
            client,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn status(&self) -> NormalizedStatus {
        let (printer, job) = tokio::join!(self.client.printer_state(), self.client.job());

        let (printer, job) = match (printer, job) {
            (Ok(printer), Ok(job)) if !printer.is_null() && !job.is_null() => (printer, job),
            (printer, job) => {
                if let Err(e) = printer.as_ref().and(job.as_ref()) {
                    warn!(printer = %self.name, error = %e, "status query failed");
                } else {
                    warn!(printer = %self.name, "status query returned an empty body");
                }
                return NormalizedStatus::offline(&self.name, PrinterKind::OctoPrint);
            }
        };

        match normalize_octoprint(&printer, &job) {
            Ok(telemetry) => {
                NormalizedStatus::online(&self.name, PrinterKind::OctoPrint, telemetry)
            }
            Err(e) => {
                warn!(printer = %self.name, error = %e, "unusable status response");
                NormalizedStatus::error(&self.name, PrinterKind::OctoPrint, e.to_string())
            }
        }
    }

    pub async fn job_command(&self, command: JobCommand) -> Result<Value, CoreError> {
        Ok(self.client.job_command(command).await?)
    }

    /// Select the current job's file again and start it.
    pub async fn reprint(&self) -> Result<Value, CoreError> {
        let job = self.client.job().await.map_err(|e| {
            debug!(printer = %self.name, error = %e, "job query failed");
            CoreError::failed("Could not get job information")
        })?;

        let file = &job["job"]["file"];
        let Some(name) = file["name"].as_str().filter(|s| !s.is_empty()) else {
            return Err(CoreError::failed("No file found to reprint"));
        };
        let path = file["path"].as_str().filter(|s| !s.is_empty()).unwrap_or(name);

        self.client.select_and_print(path).await?;
        Ok(json!({ "filename": path }))
    }

    pub async fn home(&self, axes: &HomeAxes) -> Result<Value, CoreError> {
        let keys: Vec<&str> = match axes {
            HomeAxes::All => vec!["x", "y", "z"],
            HomeAxes::Single(axis) => vec![axis.key()],
            HomeAxes::Many(list) => list.iter().map(|a| a.key()).collect(),
        };
        Ok(self.client.home(&keys).await?)
    }

    pub async fn jog(&self, axis: Axis, distance: f64) -> Result<Value, CoreError> {
        Ok(self.client.jog(axis.key(), distance).await?)
    }

    pub async fn set_temperature(
        &self,
        heater: &HeaterTarget,
        celsius: f64,
    ) -> Result<Value, CoreError> {
        match heater {
            HeaterTarget::Extruder => self.client.set_tool_target(celsius).await?,
            HeaterTarget::Bed => self.client.set_bed_target(celsius).await?,
            HeaterTarget::Chamber { .. } => {
                self.client.send_command(&format!("M141 S{celsius}")).await?
            }
        };
        Ok(json!({
            "message": format!("{} temperature set to {celsius}°C", heater.label())
        }))
    }
}
