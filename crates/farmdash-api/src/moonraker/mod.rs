// Moonraker API client modules
//
// Hand-written client for the Moonraker HTTP API fronting Klipper.
// Read endpoints return loosely-typed JSON: the object set and field
// shapes vary with the printer's Klipper configuration.

pub mod client;
pub mod models;
pub mod printer;
pub mod server;

pub use client::MoonrakerClient;
pub use models::{HistoryJob, PrintAction};
