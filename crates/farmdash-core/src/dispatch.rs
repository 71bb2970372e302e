// ── Command dispatch ──
//
// Validates an `{action, params}` request, routes it to the adapter and
// folds every outcome into a `ControlResult`.

use serde_json::{Map, Value};
use tracing::{error, info};

use crate::adapter::PrinterAdapter;
use crate::command::Command;
use crate::error::CoreError;
use crate::model::ControlResult;

/// Run a validated command against an adapter.
pub async fn execute(adapter: &PrinterAdapter, command: &Command) -> Result<Value, CoreError> {
    match command {
        Command::Pause => adapter.pause().await,
        Command::Resume => adapter.resume().await,
        Command::Cancel => adapter.cancel().await,
        Command::Reprint => adapter.reprint().await,
        Command::Home(axes) => adapter.home(axes).await,
        Command::Jog { axis, distance } => adapter.jog(*axis, *distance).await,
        Command::SetTemperature { heater, celsius } => {
            adapter.set_temperature(heater, celsius.max(0.0)).await
        }
    }
}

/// Run a command and wrap the outcome.
pub async fn run(adapter: &PrinterAdapter, command: &Command) -> ControlResult {
    info!(printer = adapter.name(), action = %command.action(), "control action");
    let outcome = execute(adapter, command).await;
    if let Err(ref e) = outcome {
        error!(printer = adapter.name(), action = %command.action(), error = %e, "control action failed");
    }
    ControlResult::from(outcome)
}

/// Validate a loosely-typed request, then run it.
///
/// Invalid requests fail before anything is sent to the printer.
pub async fn dispatch(
    adapter: &PrinterAdapter,
    action: &str,
    params: &Map<String, Value>,
) -> ControlResult {
    match Command::from_params(action, params) {
        Ok(command) => run(adapter, &command).await,
        Err(e) => {
            info!(printer = adapter.name(), action, error = %e, "rejected control request");
            ControlResult::failed(e.to_string())
        }
    }
}
