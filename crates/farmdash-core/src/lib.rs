// farmdash-core: status normalization and control dispatch over Klipper and OctoPrint printers.

pub mod adapter;
pub mod command;
pub mod config;
pub mod convert;
pub mod dispatch;
pub mod error;
pub mod manager;
pub mod model;

// ── Primary re-exports ──────────────────────────────────────────────
pub use adapter::PrinterAdapter;
pub use command::{Action, Axis, Command, HeaterTarget, HomeAxes};
pub use config::{ManagerSettings, PrinterConfig, PrinterKind};
pub use error::CoreError;
pub use manager::{HealthSummary, PrinterManager, PrinterSummary, StatusMap, PRINTER_NOT_FOUND};
pub use model::{
    ChamberSensorKind, ChamberTemp, ControlResult, NormalizedStatus, Position, Telemetry,
    Temperature,
};
