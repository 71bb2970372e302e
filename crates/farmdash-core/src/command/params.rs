// Validation of loosely-typed `{action, params}` requests into `Command`s.
//
// Everything is checked before an adapter is touched, so a rejected request
// never reaches the printer.

use std::str::FromStr;

use serde_json::{Map, Value};

use super::{Action, Axis, Command, HeaterTarget, HomeAxes};
use crate::convert::as_number;
use crate::error::CoreError;

impl Command {
    /// Build a command from an action name and its parameter object.
    ///
    /// Error messages name the offending field.
    pub fn from_params(action: &str, params: &Map<String, Value>) -> Result<Self, CoreError> {
        let action = Action::from_str(action.trim())
            .map_err(|_| CoreError::validation("action", format!("unknown action '{action}'")))?;

        match action {
            Action::Pause => Ok(Self::Pause),
            Action::Resume => Ok(Self::Resume),
            Action::Cancel => Ok(Self::Cancel),
            Action::Reprint => Ok(Self::Reprint),
            Action::Home => parse_home_axes(params.get("axes")).map(Self::Home),
            Action::Jog => parse_jog(params),
            Action::SetTemperature => parse_set_temperature(params),
        }
    }
}

fn parse_axis(raw: &str) -> Option<Axis> {
    Axis::from_str(raw.trim()).ok()
}

fn parse_home_axes(axes: Option<&Value>) -> Result<HomeAxes, CoreError> {
    match axes {
        None | Some(Value::Null) => Ok(HomeAxes::All),
        Some(Value::String(s)) if s.trim().eq_ignore_ascii_case("all") => Ok(HomeAxes::All),
        Some(Value::String(s)) => parse_axis(s)
            .map(HomeAxes::Single)
            .ok_or_else(|| CoreError::validation("axes", format!("'{s}' is not one of X, Y, Z"))),
        Some(Value::Array(items)) => {
            let valid: Vec<Axis> = items
                .iter()
                .filter_map(Value::as_str)
                .filter_map(parse_axis)
                .collect();
            if valid.is_empty() {
                Err(CoreError::validation("axes", "no valid axes given"))
            } else {
                Ok(HomeAxes::Many(valid))
            }
        }
        Some(other) => Err(CoreError::validation(
            "axes",
            format!("expected \"all\", an axis or a list of axes, got {other}"),
        )),
    }
}

/// Read a required numeric parameter (number or numeric string).
fn required_number(params: &Map<String, Value>, field: &str) -> Result<f64, CoreError> {
    match params.get(field) {
        None | Some(Value::Null) => Err(CoreError::validation(field, "missing")),
        Some(raw) => as_number(raw)
            .filter(|n| n.is_finite())
            .ok_or_else(|| CoreError::validation(field, format!("{raw} is not a number"))),
    }
}

fn required_str<'a>(params: &'a Map<String, Value>, field: &str) -> Result<&'a str, CoreError> {
    params
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CoreError::validation(field, "missing"))
}

fn parse_jog(params: &Map<String, Value>) -> Result<Command, CoreError> {
    let raw_axis = required_str(params, "axis")?;
    let axis = parse_axis(raw_axis)
        .ok_or_else(|| CoreError::validation("axis", format!("'{raw_axis}' is not one of X, Y, Z")))?;
    let distance = required_number(params, "distance")?;
    Ok(Command::Jog { axis, distance })
}

fn parse_set_temperature(params: &Map<String, Value>) -> Result<Command, CoreError> {
    let heater_type = required_str(params, "heater_type")?;
    let celsius = required_number(params, "temperature")?.max(0.0);

    let heater = match heater_type.to_ascii_lowercase().as_str() {
        "extruder" => HeaterTarget::Extruder,
        "bed" => HeaterTarget::Bed,
        "chamber" => HeaterTarget::Chamber {
            name: required_str(params, "heater_name")?.to_owned(),
        },
        _ => {
            return Err(CoreError::validation(
                "heater_type",
                format!("'{heater_type}' is not one of extruder, bed, chamber"),
            ));
        }
    };

    Ok(Command::SetTemperature { heater, celsius })
}
