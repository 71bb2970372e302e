// ── Normalized printer status ──
//
// One record shape for both firmwares. Telemetry is flattened into the
// top level when the printer is online and absent otherwise, so an offline
// record can never carry stale temperatures or positions.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::Display;

use crate::config::PrinterKind;

/// `error` text of a printer that gave no answer at all.
pub const OFFLINE_MESSAGE: &str = "Cannot connect to printer";

/// Canonical status of one printer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedStatus {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PrinterKind,
    pub online: bool,
    pub state: String,
    #[serde(flatten)]
    pub telemetry: Option<Telemetry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NormalizedStatus {
    /// The printer answered and the answer was usable.
    pub fn online(name: &str, kind: PrinterKind, telemetry: Telemetry) -> Self {
        Self {
            name: name.to_owned(),
            kind,
            online: true,
            state: telemetry.state.clone(),
            telemetry: Some(telemetry),
            error: None,
        }
    }

    /// No upstream response.
    pub fn offline(name: &str, kind: PrinterKind) -> Self {
        Self {
            name: name.to_owned(),
            kind,
            online: false,
            state: "offline".into(),
            telemetry: None,
            error: Some(OFFLINE_MESSAGE.into()),
        }
    }

    /// A response arrived but could not be turned into a status.
    pub fn error(name: &str, kind: PrinterKind, message: impl Into<String>) -> Self {
        Self {
            name: name.to_owned(),
            kind,
            online: false,
            state: "error".into(),
            telemetry: None,
            error: Some(message.into()),
        }
    }
}

/// Live readings of an online printer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Telemetry {
    /// Mirrored into `NormalizedStatus::state`; not serialized twice.
    #[serde(skip)]
    pub state: String,
    /// Percent, one decimal.
    pub progress: f64,
    pub file: String,
    /// `HH:MM:SS`
    pub print_time: String,
    /// `HH:MM:SS`, or `Unknown` when the firmware gives no estimate.
    pub remaining_time: String,
    pub extruder_temp: Temperature,
    pub bed_temp: Temperature,
    pub position: Position,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub chamber_temps: Vec<ChamberTemp>,

    // Klipper only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub klippy_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_status: Option<Vec<Value>>,

    // OctoPrint only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_uploaded: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    pub actual: f64,
    pub target: f64,
}

/// Toolhead position in millimetres, two decimals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// One chamber sensor reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChamberTemp {
    pub name: String,
    pub sensor_id: String,
    pub sensor_type: ChamberSensorKind,
    pub actual: f64,
    pub target: Option<f64>,
}

/// Klipper object family a chamber sensor belongs to.
///
/// Only fans and generic heaters accept a target temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChamberSensorKind {
    TemperatureSensor,
    TemperatureFan,
    HeaterGeneric,
    Unknown,
}

impl ChamberSensorKind {
    /// Classify a Klipper object id such as `temperature_fan chamber`.
    pub fn from_object_id(id: &str) -> Option<Self> {
        if id.contains("temperature_sensor") {
            Some(Self::TemperatureSensor)
        } else if id.contains("temperature_fan") {
            Some(Self::TemperatureFan)
        } else if id.contains("heater_generic") {
            Some(Self::HeaterGeneric)
        } else {
            None
        }
    }

    pub fn accepts_target(self) -> bool {
        matches!(self, Self::TemperatureFan | Self::HeaterGeneric)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn offline_record_has_no_telemetry_keys() {
        let status = NormalizedStatus::offline("voron", PrinterKind::Klipper);
        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            json!({
                "name": "voron",
                "type": "klipper",
                "online": false,
                "state": "offline",
                "error": "Cannot connect to printer",
            })
        );
    }

    #[test]
    fn online_record_flattens_telemetry() {
        let telemetry = Telemetry {
            state: "printing".into(),
            progress: 42.0,
            file: "benchy.gcode".into(),
            print_time: "00:10:00".into(),
            remaining_time: "00:13:48".into(),
            klippy_state: Some("ready".into()),
            ..Telemetry::default()
        };
        let value =
            serde_json::to_value(NormalizedStatus::online("voron", PrinterKind::Klipper, telemetry))
                .unwrap();

        assert_eq!(value["state"], "printing");
        assert_eq!(value["progress"], 42.0);
        assert_eq!(value["extruder_temp"], json!({ "actual": 0.0, "target": 0.0 }));
        assert_eq!(value["klippy_state"], "ready");
        assert!(value.get("error").is_none());
        assert!(value.get("chamber_temps").is_none());
        assert!(value.get("ready").is_none());
    }

    #[test]
    fn sensor_kind_from_object_id() {
        assert_eq!(
            ChamberSensorKind::from_object_id("temperature_fan chamber"),
            Some(ChamberSensorKind::TemperatureFan)
        );
        assert_eq!(
            ChamberSensorKind::from_object_id("heater_generic chamber_heater"),
            Some(ChamberSensorKind::HeaterGeneric)
        );
        assert_eq!(ChamberSensorKind::from_object_id("chamber_light"), None);
        assert_eq!(ChamberSensorKind::TemperatureSensor.to_string(), "temperature_sensor");
        assert!(!ChamberSensorKind::TemperatureSensor.accepts_target());
    }
}
