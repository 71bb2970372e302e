// ── Klipper (Moonraker) adapter ──
//
// Status comes from a combined `printer/objects/query` plus best-effort
// side queries; motion and temperature commands are G-code scripts posted
// to `printer/gcode/script`. Chamber sensor kinds learned during status
// polls are cached so a later set-temperature can pick the right G-code.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use farmdash_api::MoonrakerClient;
use farmdash_api::moonraker::PrintAction;
use farmdash_api::moonraker::printer::BASE_STATUS_OBJECTS;
use indexmap::IndexMap;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::command::{Axis, HeaterTarget, HomeAxes};
use crate::config::PrinterKind;
use crate::convert::{
    ChamberSensor, KlipperSnapshot, discover_chamber_sensors, friendly_sensor_name,
    normalize_klipper,
};
use crate::error::{CoreError, error_message};
use crate::model::{ChamberSensorKind, NormalizedStatus};

const HOME_ALL_TIMEOUT: Duration = Duration::from_secs(60);
const HOME_SINGLE_TIMEOUT: Duration = Duration::from_secs(45);
const HOME_LIST_TIMEOUT: Duration = Duration::from_secs(50);
const TEMPERATURE_TIMEOUT: Duration = Duration::from_secs(10);
const JOG_FEEDRATE: u32 = 1800;

type SensorKinds = IndexMap<String, ChamberSensorKind>;

// ── G-code builders ────────────────────────────────────────────────

/// Relative move wrapped in G91/G90 so the printer is left in absolute mode.
pub fn jog_script(axis: Axis, distance: f64) -> String {
    format!("G91\nG0 {}{distance} F{JOG_FEEDRATE}\nG90", axis.letter())
}

/// Two seconds per millimetre, clamped to 15..=30 s.
pub fn jog_timeout(distance: f64) -> Duration {
    Duration::from_secs_f64((distance.abs() * 2.0).clamp(15.0, 30.0))
}

pub fn home_script(axes: &HomeAxes) -> (String, Duration) {
    match axes {
        HomeAxes::All => ("G28".into(), HOME_ALL_TIMEOUT),
        HomeAxes::Single(axis) => (format!("G28 {}", axis.letter()), HOME_SINGLE_TIMEOUT),
        HomeAxes::Many(list) => {
            let letters: Vec<String> = list.iter().map(|a| a.letter().to_string()).collect();
            (format!("G28 {}", letters.join(" ")), HOME_LIST_TIMEOUT)
        }
    }
}

/// Find the cached sensor a chamber heater name refers to.
///
/// Display names match case-insensitively; otherwise the name with spaces
/// turned into underscores is looked for inside the object ids.
fn resolve_chamber_sensor<'a>(
    kinds: &'a SensorKinds,
    heater_name: &str,
) -> Option<(&'a str, ChamberSensorKind)> {
    let wanted = heater_name.trim();
    kinds
        .iter()
        .find(|(id, _)| friendly_sensor_name(id).eq_ignore_ascii_case(wanted))
        .or_else(|| {
            let needle = wanted.to_lowercase().replace(' ', "_");
            kinds
                .iter()
                .find(|(id, _)| id.to_lowercase().contains(&needle))
        })
        .map(|(id, kind)| (id.as_str(), *kind))
}

/// G-code that sets a chamber target, or why it can't be set.
pub fn chamber_script(
    sensor: Option<(&str, ChamberSensorKind)>,
    heater_name: &str,
    celsius: f64,
) -> Result<String, CoreError> {
    let kind = sensor.map_or(ChamberSensorKind::Unknown, |(_, kind)| kind);
    let object_name = sensor
        .and_then(|(id, _)| id.split_once(' ').map(|(_, name)| name.to_owned()))
        .unwrap_or_else(|| heater_name.trim().to_lowercase().replace(' ', "_"));

    if !kind.accepts_target() {
        return Err(CoreError::Unsupported {
            what: "chamber sensor type".into(),
            detail: kind.to_string(),
        });
    }
    if kind == ChamberSensorKind::TemperatureFan {
        Ok(format!(
            "SET_TEMPERATURE_FAN_TARGET temperature_fan={object_name} target={celsius}"
        ))
    } else {
        Ok(format!(
            "SET_HEATER_TEMPERATURE HEATER={object_name} TARGET={celsius}"
        ))
    }
}

/// `null` (no body) and `{}` both mean the printer gave no answer.
fn is_empty_body(body: &Value) -> bool {
    match body {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Treat a Moonraker body carrying an `error` key as a failure.
fn check_response(body: Value) -> Result<Value, CoreError> {
    match body.get("error") {
        Some(error) if !error.is_null() => Err(CoreError::Rejected {
            message: error_message(error),
            status: None,
        }),
        _ => Ok(body),
    }
}

// ── Adapter ─────────────────────────────────────────────────────────

/// Adapter for one Klipper printer.
#[derive(Debug)]
pub struct KlipperAdapter {
    name: String,
    client: MoonrakerClient,
    chamber_sensor_types: ArcSwap<SensorKinds>,
}

impl KlipperAdapter {
    pub fn new(name: &str, client: MoonrakerClient) -> Self {
        Self {
            name: name.to_owned(),
            client,
            chamber_sensor_types: ArcSwap::from_pointee(SensorKinds::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn remember_sensors(&self, sensors: &[ChamberSensor]) {
        let kinds: SensorKinds = sensors.iter().map(|s| (s.id.clone(), s.kind)).collect();
        self.chamber_sensor_types.store(Arc::new(kinds));
    }

    /// Refresh the sensor cache from `printer/objects/list`.
    async fn discover_sensors(&self) -> Vec<ChamberSensor> {
        match self.client.list_objects().await {
            Ok(objects) => {
                let sensors = discover_chamber_sensors(&objects);
                self.remember_sensors(&sensors);
                sensors
            }
            Err(e) => {
                debug!(printer = %self.name, error = %e, "object list unavailable");
                Vec::new()
            }
        }
    }

    // ── Status ───────────────────────────────────────────────────────

    pub async fn status(&self) -> NormalizedStatus {
        let (info, sensors) = tokio::join!(self.client.printer_info(), self.discover_sensors());

        let mut objects: Vec<&str> = BASE_STATUS_OBJECTS.to_vec();
        objects.extend(sensors.iter().map(|s| s.id.as_str()));

        let (query, print_stats, job_queue) = tokio::join!(
            self.client.query_objects(&objects),
            self.client.print_stats(),
            self.client.job_queue_status(),
        );

        let query = match query {
            Ok(body) if is_empty_body(&body) => {
                warn!(printer = %self.name, "objects query returned an empty body");
                return NormalizedStatus::offline(&self.name, PrinterKind::Klipper);
            }
            Ok(body) => body,
            Err(e) => {
                warn!(printer = %self.name, error = %e, "objects query failed");
                return NormalizedStatus::offline(&self.name, PrinterKind::Klipper);
            }
        };

        let snapshot = KlipperSnapshot {
            query: &query,
            print_stats: print_stats.as_ref().ok(),
            job_queue: job_queue.as_ref().ok(),
            info: info.as_ref().ok(),
            sensors: &sensors,
        };

        match normalize_klipper(&snapshot) {
            Ok(telemetry) => NormalizedStatus::online(&self.name, PrinterKind::Klipper, telemetry),
            Err(e) => {
                warn!(printer = %self.name, error = %e, "unusable status response");
                NormalizedStatus::error(&self.name, PrinterKind::Klipper, e.to_string())
            }
        }
    }

    // ── Print lifecycle ──────────────────────────────────────────────

    pub async fn print_action(&self, action: PrintAction) -> Result<Value, CoreError> {
        check_response(self.client.print_action(action).await?)
    }

    /// Restart the most recent job from the print history.
    pub async fn reprint(&self) -> Result<Value, CoreError> {
        let jobs = self.client.history(1).await.map_err(|e| {
            debug!(printer = %self.name, error = %e, "history query failed");
            CoreError::failed("Could not get print history")
        })?;
        let last = jobs
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::failed("No print history found"))?;
        let filename = last
            .filename
            .filter(|f| !f.is_empty())
            .ok_or_else(|| CoreError::failed("No filename found in last print job"))?;

        check_response(self.client.start_print(&filename).await?)?;
        Ok(json!({ "filename": filename }))
    }

    // ── Motion and temperature ───────────────────────────────────────

    /// Run a G-code script; an empty answer counts as success.
    pub async fn send_gcode(&self, script: &str, timeout: Duration) -> Result<Value, CoreError> {
        let body = check_response(self.client.run_gcode(script, timeout).await?)?;
        if body.is_null() {
            Ok(json!({ "status": "ok", "response": "empty" }))
        } else {
            Ok(body)
        }
    }

    pub async fn home(&self, axes: &HomeAxes) -> Result<Value, CoreError> {
        let (script, timeout) = home_script(axes);
        self.send_gcode(&script, timeout).await
    }

    pub async fn jog(&self, axis: Axis, distance: f64) -> Result<Value, CoreError> {
        self.send_gcode(&jog_script(axis, distance), jog_timeout(distance))
            .await
    }

    pub async fn set_temperature(
        &self,
        heater: &HeaterTarget,
        celsius: f64,
    ) -> Result<Value, CoreError> {
        let script = match heater {
            HeaterTarget::Extruder => format!("M104 S{celsius}"),
            HeaterTarget::Bed => format!("M140 S{celsius}"),
            HeaterTarget::Chamber { name } => {
                if self.chamber_sensor_types.load().is_empty() {
                    self.discover_sensors().await;
                }
                let kinds = self.chamber_sensor_types.load();
                chamber_script(resolve_chamber_sensor(&kinds, name), name, celsius)?
            }
        };
        self.send_gcode(&script, TEMPERATURE_TIMEOUT).await?;
        Ok(json!({
            "message": format!("{} temperature set to {celsius}°C", heater.label())
        }))
    }
}
