// ── Domain model ──
//
// Canonical printer-state and control-outcome types shared by both
// firmware adapters. Everything here serializes to the JSON shape the
// dashboard front-end consumes.

pub mod control;
pub mod status;

pub use control::ControlResult;
pub use status::{
    ChamberSensorKind, ChamberTemp, NormalizedStatus, Position, Telemetry, Temperature,
    OFFLINE_MESSAGE,
};
