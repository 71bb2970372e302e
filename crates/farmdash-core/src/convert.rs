// ── Upstream-to-domain conversions ──
//
// Pure functions that turn loosely-typed Moonraker and OctoPrint bodies
// into `Telemetry`. Missing or mistyped fields fall back to per-field
// defaults; only a structurally unusable body is an error.

use serde_json::Value;

use crate::error::CoreError;
use crate::model::{ChamberSensorKind, ChamberTemp, Position, Telemetry, Temperature};

/// Object-id prefixes stripped when building a chamber sensor's display name.
const SENSOR_PREFIXES: [&str; 3] = ["temperature_sensor ", "temperature_fan ", "heater_generic "];

static NULL: Value = Value::Null;

// ── Helpers ────────────────────────────────────────────────────────

/// Round to `digits` decimal places.
pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

/// Read a number that may arrive as a JSON number or a numeric string.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn number_or_zero(value: &Value) -> f64 {
    as_number(value).unwrap_or(0.0)
}

/// A field counts as present when it is neither null nor an empty string.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
}

/// Format seconds as `HH:MM:SS`; zero, negative and NaN all give `00:00:00`.
///
/// Hours are not wrapped at 24.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::as_conversions)]
pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "00:00:00".into();
    }
    let total = seconds.floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Seconds left given the elapsed time and percent complete.
///
/// Only meaningful strictly between 0 and 100 percent; otherwise 0.
pub fn estimate_remaining(elapsed_secs: f64, progress_percent: f64) -> f64 {
    if progress_percent > 0.0 && progress_percent < 100.0 {
        elapsed_secs / (progress_percent / 100.0) - elapsed_secs
    } else {
        0.0
    }
}

/// Python-style title case: upper-case the first letter of every run of
/// letters, lower-case the rest.
fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_alpha = false;
    for c in input.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Display name for a chamber sensor id.
///
/// `temperature_fan chamber_fan` → `Chamber Fan`.
pub fn friendly_sensor_name(sensor_id: &str) -> String {
    let bare = SENSOR_PREFIXES
        .iter()
        .find_map(|prefix| sensor_id.strip_prefix(prefix))
        .unwrap_or(sensor_id);
    title_case(&bare.replace('_', " "))
}

// ── Klipper ────────────────────────────────────────────────────────

/// A chamber object discovered in `printer/objects/list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChamberSensor {
    pub id: String,
    pub kind: ChamberSensorKind,
}

/// Pick the chamber sensors out of a Klipper object list.
///
/// An object qualifies when its id mentions "chamber" (any case) and it
/// belongs to one of the temperature object families.
pub fn discover_chamber_sensors<S: AsRef<str>>(objects: &[S]) -> Vec<ChamberSensor> {
    objects
        .iter()
        .map(AsRef::as_ref)
        .filter(|id| id.to_lowercase().contains("chamber"))
        .filter_map(|id| {
            ChamberSensorKind::from_object_id(id).map(|kind| ChamberSensor {
                id: id.to_owned(),
                kind,
            })
        })
        .collect()
}

/// Everything one Klipper status poll collected.
///
/// Only `query` is mandatory; the other bodies are best-effort and
/// `None` when their request failed.
#[derive(Debug, Clone, Copy)]
pub struct KlipperSnapshot<'a> {
    /// `printer/objects/query` body.
    pub query: &'a Value,
    /// `printer/print_stats` body.
    pub print_stats: Option<&'a Value>,
    /// `server/job_queue/status` body.
    pub job_queue: Option<&'a Value>,
    /// `printer/info` body.
    pub info: Option<&'a Value>,
    pub sensors: &'a [ChamberSensor],
}

/// Progress in percent from the three overlapping Klipper sources.
///
/// The first present source wins, even when its value turns out to be
/// unparseable (that yields 0). Fractions are scaled to percent;
/// `display_status.progress` is taken as-is.
fn klipper_progress(status: &Value, direct: &Value) -> f64 {
    let sources = [
        (&status["virtual_sdcard"]["progress"], 100.0),
        (&direct["progress"], 100.0),
        (&status["display_status"]["progress"], 1.0),
    ];
    sources
        .into_iter()
        .find(|(value, _)| is_present(value))
        .map_or(0.0, |(value, scale)| {
            as_number(value).map_or(0.0, |p| round_to(p * scale, 1))
        })
}

fn temperature(object: &Value) -> Temperature {
    Temperature {
        actual: round_to(number_or_zero(&object["temperature"]), 1),
        target: round_to(number_or_zero(&object["target"]), 1),
    }
}

fn klipper_position(toolhead: &Value) -> Position {
    let axis = |i: usize| round_to(number_or_zero(&toolhead["position"][i]), 2);
    Position {
        x: axis(0),
        y: axis(1),
        z: axis(2),
    }
}

fn klipper_chamber(status: &Value, sensors: &[ChamberSensor]) -> Vec<ChamberTemp> {
    sensors
        .iter()
        .filter_map(|sensor| {
            let data = &status[sensor.id.as_str()];
            let actual = as_number(&data["temperature"])?;
            Some(ChamberTemp {
                name: friendly_sensor_name(&sensor.id),
                sensor_id: sensor.id.clone(),
                sensor_type: sensor.kind,
                actual: round_to(actual, 1),
                target: as_number(&data["target"]).map(|t| round_to(t, 1)),
            })
        })
        .collect()
}

/// Normalize a Klipper status poll.
///
/// Fails only when the objects query body is not a JSON object or its
/// `result.status` is present but not an object.
pub fn normalize_klipper(snapshot: &KlipperSnapshot<'_>) -> Result<Telemetry, CoreError> {
    if !snapshot.query.is_object() {
        return Err(CoreError::Internal(
            "objects query returned a non-object body".into(),
        ));
    }
    let status = &snapshot.query["result"]["status"];
    if !status.is_null() && !status.is_object() {
        return Err(CoreError::Internal(
            "objects query status is not an object".into(),
        ));
    }

    let direct = snapshot
        .print_stats
        .map_or(&NULL, |body| &body["result"]["print_stats"]);
    let combined = &status["print_stats"];

    let progress = klipper_progress(status, direct);

    let elapsed = if is_present(&direct["info"]["print_duration"]) {
        number_or_zero(&direct["info"]["print_duration"])
    } else {
        number_or_zero(&combined["print_duration"])
    };

    let file = non_empty_str(&direct["filename"])
        .or_else(|| combined["filename"].as_str())
        .unwrap_or_default()
        .to_owned();

    let state = non_empty_str(&direct["state"])
        .or_else(|| non_empty_str(&combined["state"]))
        .unwrap_or("ready")
        .to_lowercase();

    let klippy_state = status["webhooks"]["state"]
        .as_str()
        .or_else(|| snapshot.info.and_then(|info| info["result"]["state"].as_str()))
        .unwrap_or("unknown")
        .to_owned();

    let queue_status = snapshot
        .job_queue
        .and_then(|body| body["result"]["queued_jobs"].as_array())
        .cloned()
        .unwrap_or_default();

    Ok(Telemetry {
        state,
        progress,
        file,
        print_time: format_duration(elapsed),
        remaining_time: format_duration(estimate_remaining(elapsed, progress)),
        extruder_temp: temperature(&status["extruder"]),
        bed_temp: temperature(&status["heater_bed"]),
        position: klipper_position(&status["toolhead"]),
        message: status["display_status"]["message"]
            .as_str()
            .unwrap_or_default()
            .to_owned(),
        chamber_temps: klipper_chamber(status, snapshot.sensors),
        klippy_state: Some(klippy_state),
        queue_status: Some(queue_status),
        file_uploaded: None,
        ready: None,
    })
}

// ── OctoPrint ──────────────────────────────────────────────────────

fn octoprint_temperature(entry: &Value) -> Temperature {
    Temperature {
        actual: round_to(number_or_zero(&entry["actual"]), 1),
        target: round_to(number_or_zero(&entry["target"]), 1),
    }
}

fn octoprint_chamber(temperatures: &Value) -> Vec<ChamberTemp> {
    let Some(map) = temperatures.as_object() else {
        return Vec::new();
    };
    map.iter()
        .filter(|(key, _)| key.to_lowercase().contains("chamber"))
        .filter_map(|(key, entry)| {
            let actual = as_number(&entry["actual"])?;
            Some(ChamberTemp {
                name: friendly_sensor_name(key),
                sensor_id: key.clone(),
                sensor_type: ChamberSensorKind::Unknown,
                actual: round_to(actual, 1),
                target: as_number(&entry["target"]).map(|t| round_to(t, 1)),
            })
        })
        .collect()
}

/// Normalize the `api/printer` and `api/job` bodies of an OctoPrint poll.
///
/// Either body not being a JSON object is an error.
pub fn normalize_octoprint(printer: &Value, job: &Value) -> Result<Telemetry, CoreError> {
    if !printer.is_object() || !job.is_object() {
        return Err(CoreError::Internal(
            "OctoPrint returned a non-object status body".into(),
        ));
    }

    let state_text = printer["state"]["text"].as_str().unwrap_or("Unknown");
    let progress = &job["progress"];
    let temps = &printer["temperature"];

    let time_left = number_or_zero(&progress["printTimeLeft"]);
    let remaining_time = if time_left > 0.0 {
        format_duration(time_left)
    } else {
        "Unknown".into()
    };

    let position = &printer["position"];
    let position = if position.is_object() {
        Position {
            x: round_to(number_or_zero(&position["x"]), 2),
            y: round_to(number_or_zero(&position["y"]), 2),
            z: round_to(number_or_zero(&position["z"]), 2),
        }
    } else {
        Position::default()
    };

    let uploaded = &job["job"]["file"]["date"];

    Ok(Telemetry {
        state: state_text.to_lowercase(),
        progress: round_to(number_or_zero(&progress["completion"]), 1),
        file: job["job"]["file"]["name"]
            .as_str()
            .unwrap_or_default()
            .to_owned(),
        print_time: format_duration(number_or_zero(&progress["printTime"])),
        remaining_time,
        extruder_temp: octoprint_temperature(&temps["tool0"]),
        bed_temp: octoprint_temperature(&temps["bed"]),
        position,
        message: state_text.to_owned(),
        chamber_temps: octoprint_chamber(temps),
        klippy_state: None,
        queue_status: None,
        file_uploaded: (!uploaded.is_null()).then(|| uploaded.clone()),
        ready: Some(printer["state"]["flags"]["ready"].as_bool().unwrap_or(false)),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn snapshot<'a>(query: &'a Value, sensors: &'a [ChamberSensor]) -> KlipperSnapshot<'a> {
        KlipperSnapshot {
            query,
            print_stats: None,
            job_queue: None,
            info: None,
            sensors,
        }
    }

    #[test]
    fn format_duration_cases() {
        assert_eq!(format_duration(0.0), "00:00:00");
        assert_eq!(format_duration(-5.0), "00:00:00");
        assert_eq!(format_duration(f64::NAN), "00:00:00");
        assert_eq!(format_duration(59.9), "00:00:59");
        assert_eq!(format_duration(3723.0), "01:02:03");
        assert_eq!(format_duration(90_000.0), "25:00:00");
    }

    #[test]
    fn remaining_time_at_half_way() {
        assert_eq!(format_duration(estimate_remaining(600.0, 50.0)), "00:10:00");
        assert!(estimate_remaining(600.0, 0.0).abs() < f64::EPSILON);
        assert!(estimate_remaining(600.0, 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn friendly_names() {
        assert_eq!(friendly_sensor_name("temperature_fan chamber_fan"), "Chamber Fan");
        assert_eq!(friendly_sensor_name("heater_generic chamber"), "Chamber");
        assert_eq!(friendly_sensor_name("temperature_sensor CHAMBER_top"), "Chamber Top");
        assert_eq!(friendly_sensor_name("chamber"), "Chamber");
    }

    #[test]
    fn discovery_needs_chamber_and_a_known_family() {
        let sensors = discover_chamber_sensors(&[
            "toolhead",
            "temperature_sensor Chamber",
            "temperature_fan chamber_fan",
            "heater_generic chamber_heater",
            "temperature_sensor mcu",
            "output_pin chamber_light",
        ]);
        let ids: Vec<_> = sensors.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "temperature_sensor Chamber",
                "temperature_fan chamber_fan",
                "heater_generic chamber_heater"
            ]
        );
        assert_eq!(sensors[1].kind, ChamberSensorKind::TemperatureFan);
    }

    #[test]
    fn virtual_sdcard_progress_wins() {
        let query = json!({ "result": { "status": {
            "virtual_sdcard": { "progress": 0.42 },
            "display_status": { "progress": 99 },
        }}});
        let direct = json!({ "result": { "print_stats": { "progress": 0.1 } } });
        let mut snap = snapshot(&query, &[]);
        snap.print_stats = Some(&direct);

        let t = normalize_klipper(&snap).unwrap();
        assert!((t.progress - 42.0).abs() < f64::EPSILON);
    }

    #[test]
    fn display_status_progress_is_taken_as_is() {
        let query = json!({ "result": { "status": { "display_status": { "progress": 37.25 } } } });
        let t = normalize_klipper(&snapshot(&query, &[])).unwrap();
        assert!((t.progress - 37.3).abs() < 1e-9);
    }

    #[test]
    fn unparseable_winning_progress_is_zero() {
        let query = json!({ "result": { "status": {
            "virtual_sdcard": { "progress": "n/a" },
            "display_status": { "progress": 50 },
        }}});
        let t = normalize_klipper(&snapshot(&query, &[])).unwrap();
        assert!(t.progress.abs() < f64::EPSILON);
    }

    #[test]
    fn klipper_defaults_for_sparse_status() {
        let query = json!({ "result": {} });
        let t = normalize_klipper(&snapshot(&query, &[])).unwrap();

        assert_eq!(t.state, "ready");
        assert_eq!(t.file, "");
        assert_eq!(t.print_time, "00:00:00");
        assert_eq!(t.position, Position::default());
        assert_eq!(t.klippy_state.as_deref(), Some("unknown"));
        assert_eq!(t.queue_status, Some(Vec::new()));
        assert!(t.chamber_temps.is_empty());
    }

    #[test]
    fn klipper_full_status() {
        let sensors = discover_chamber_sensors(&["temperature_fan chamber", "temperature_sensor chamber_top"]);
        let query = json!({ "result": { "status": {
            "print_stats": { "state": "Printing", "filename": "combined.gcode", "print_duration": 100 },
            "toolhead": { "position": [120.456, 80.111, 3.999, 1500.0] },
            "extruder": { "temperature": 214.96, "target": 215.0 },
            "heater_bed": { "temperature": 59.94, "target": 60 },
            "display_status": { "message": "Layer 3/120" },
            "virtual_sdcard": { "progress": 0.5 },
            "webhooks": { "state": "ready" },
            "temperature_fan chamber": { "temperature": 41.26, "target": 45 },
            "temperature_sensor chamber_top": { "temperature": 38.04 },
        }}});
        let direct = json!({ "result": { "print_stats": {
            "filename": "direct.gcode",
            "state": "printing",
            "info": { "print_duration": 600 },
        }}});
        let queue = json!({ "result": { "queued_jobs": [{ "filename": "next.gcode" }] } });

        let snap = KlipperSnapshot {
            query: &query,
            print_stats: Some(&direct),
            job_queue: Some(&queue),
            info: None,
            sensors: &sensors,
        };
        let t = normalize_klipper(&snap).unwrap();

        assert_eq!(t.state, "printing");
        assert_eq!(t.file, "direct.gcode");
        assert_eq!(t.print_time, "00:10:00");
        assert_eq!(t.remaining_time, "00:10:00");
        assert_eq!(t.extruder_temp, Temperature { actual: 215.0, target: 215.0 });
        assert_eq!(t.bed_temp, Temperature { actual: 59.9, target: 60.0 });
        assert_eq!(t.position, Position { x: 120.46, y: 80.11, z: 4.0 });
        assert_eq!(t.message, "Layer 3/120");
        assert_eq!(t.klippy_state.as_deref(), Some("ready"));
        assert_eq!(t.queue_status.as_ref().map(Vec::len), Some(1));
        assert_eq!(
            t.chamber_temps,
            vec![
                ChamberTemp {
                    name: "Chamber".into(),
                    sensor_id: "temperature_fan chamber".into(),
                    sensor_type: ChamberSensorKind::TemperatureFan,
                    actual: 41.3,
                    target: Some(45.0),
                },
                ChamberTemp {
                    name: "Chamber Top".into(),
                    sensor_id: "temperature_sensor chamber_top".into(),
                    sensor_type: ChamberSensorKind::TemperatureSensor,
                    actual: 38.0,
                    target: None,
                },
            ]
        );
    }

    #[test]
    fn klippy_state_falls_back_to_printer_info() {
        let query = json!({ "result": { "status": {} } });
        let info = json!({ "result": { "state": "shutdown" } });
        let mut snap = snapshot(&query, &[]);
        snap.info = Some(&info);
        let t = normalize_klipper(&snap).unwrap();
        assert_eq!(t.klippy_state.as_deref(), Some("shutdown"));
    }

    #[test]
    fn malformed_klipper_bodies_are_errors() {
        let not_object = json!(["print_stats"]);
        assert!(normalize_klipper(&snapshot(&not_object, &[])).is_err());

        let bad_status = json!({ "result": { "status": "oops" } });
        assert!(normalize_klipper(&snapshot(&bad_status, &[])).is_err());
    }

    #[test]
    fn octoprint_printing() {
        let printer = json!({
            "state": { "text": "Printing", "flags": { "ready": false, "printing": true } },
            "temperature": {
                "tool0": { "actual": 209.87, "target": 210 },
                "bed": { "actual": 60.04, "target": 60 },
                "chamber": { "actual": 35.55, "target": null },
            },
        });
        let job = json!({
            "job": { "file": { "name": "clip.gcode", "path": "parts/clip.gcode", "date": 1_700_000_000 } },
            "progress": { "completion": 12.345, "printTime": 3723, "printTimeLeft": 600 },
        });

        let t = normalize_octoprint(&printer, &job).unwrap();
        assert_eq!(t.state, "printing");
        assert_eq!(t.message, "Printing");
        assert!((t.progress - 12.3).abs() < 1e-9);
        assert_eq!(t.file, "clip.gcode");
        assert_eq!(t.print_time, "01:02:03");
        assert_eq!(t.remaining_time, "00:10:00");
        assert_eq!(t.extruder_temp, Temperature { actual: 209.9, target: 210.0 });
        assert_eq!(t.chamber_temps.len(), 1);
        assert_eq!(t.chamber_temps[0].name, "Chamber");
        assert_eq!(t.chamber_temps[0].target, None);
        assert_eq!(t.file_uploaded, Some(json!(1_700_000_000)));
        assert_eq!(t.ready, Some(false));
        assert!(t.klippy_state.is_none());
    }

    #[test]
    fn octoprint_idle_has_unknown_remaining() {
        let printer = json!({ "state": { "text": "Operational", "flags": { "ready": true } } });
        let job = json!({ "job": { "file": { "name": null } }, "progress": { "completion": null } });

        let t = normalize_octoprint(&printer, &job).unwrap();
        assert_eq!(t.state, "operational");
        assert_eq!(t.remaining_time, "Unknown");
        assert_eq!(t.file, "");
        assert!(t.progress.abs() < f64::EPSILON);
        assert!(t.file_uploaded.is_none());
        assert_eq!(t.ready, Some(true));
    }

    #[test]
    fn octoprint_non_object_body_is_an_error() {
        assert!(normalize_octoprint(&json!(null), &json!({})).is_err());
    }
}
