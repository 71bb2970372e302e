// ── Command API ──
//
// Typed control actions. Callers either build a `Command` directly or go
// through `Command::from_params`, which validates the loosely-typed
// `{action, params}` shape a web front-end sends.

mod params;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Action names accepted by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    Pause,
    Resume,
    Cancel,
    Reprint,
    Home,
    Jog,
    SetTemperature,
}

/// A motion axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Upper-case letter used in G-code.
    pub fn letter(self) -> char {
        match self {
            Self::X => 'X',
            Self::Y => 'Y',
            Self::Z => 'Z',
        }
    }

    /// Lower-case key used by the OctoPrint printhead API.
    pub fn key(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        }
    }
}

/// Which axes a home command covers.
///
/// `Single` and `Many` are kept apart because Klipper gets a different
/// timeout for each, even when `Many` holds one axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomeAxes {
    All,
    Single(Axis),
    Many(Vec<Axis>),
}

/// Heater addressed by a set-temperature command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaterTarget {
    Extruder,
    Bed,
    /// A chamber heater, addressed by display name or object name.
    Chamber { name: String },
}

impl HeaterTarget {
    /// Capitalized label for user-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Extruder => "Extruder",
            Self::Bed => "Bed",
            Self::Chamber { .. } => "Chamber",
        }
    }
}

/// A validated control action.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Pause,
    Resume,
    Cancel,
    /// Restart the most recent job.
    Reprint,
    Home(HomeAxes),
    Jog { axis: Axis, distance: f64 },
    /// `celsius` is never negative.
    SetTemperature { heater: HeaterTarget, celsius: f64 },
}

impl Command {
    pub fn action(&self) -> Action {
        match self {
            Self::Pause => Action::Pause,
            Self::Resume => Action::Resume,
            Self::Cancel => Action::Cancel,
            Self::Reprint => Action::Reprint,
            Self::Home(_) => Action::Home,
            Self::Jog { .. } => Action::Jog,
            Self::SetTemperature { .. } => Action::SetTemperature,
        }
    }
}
