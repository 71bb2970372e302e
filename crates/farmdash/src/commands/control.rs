//! `control` handler.
//!
//! Flags are folded into the same `{action, params}` shape any other front
//! end would send, validated by `Command::from_params`, then executed.

use serde_json::{Map, Value, json};
use tracing::debug;

use farmdash_core::{Command, ControlResult};

use super::Context;
use crate::cli::{ControlArgs, OutputFormat};
use crate::error::CliError;
use crate::output;

/// Build the loosely-typed parameter object from CLI flags.
fn params(args: &ControlArgs) -> Map<String, Value> {
    let mut params = Map::new();
    if let Some(axis) = &args.axis {
        params.insert("axis".into(), json!(axis));
    }
    if let Some(distance) = args.distance {
        params.insert("distance".into(), json!(distance));
    }
    match args.axes.as_slice() {
        [] => {}
        [single] => {
            params.insert("axes".into(), json!(single));
        }
        many => {
            params.insert("axes".into(), json!(many));
        }
    }
    if let Some(heater_type) = &args.heater_type {
        params.insert("heater_type".into(), json!(heater_type));
    }
    if let Some(temperature) = args.temperature {
        params.insert("temperature".into(), json!(temperature));
    }
    if let Some(heater_name) = &args.heater_name {
        params.insert("heater_name".into(), json!(heater_name));
    }
    params
}

fn summary(result: &ControlResult) -> String {
    match &result.result {
        Some(Value::Object(obj)) => obj
            .get("message")
            .or_else(|| obj.get("response"))
            .and_then(Value::as_str)
            .map_or_else(|| "OK".into(), str::to_owned),
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => "OK".into(),
    }
}

pub async fn handle(args: ControlArgs, ctx: &Context) -> Result<(), CliError> {
    let manager = ctx.manager();
    if !manager.printer_names().contains(&args.printer) {
        return Err(CliError::PrinterNotFound { name: args.printer });
    }

    let command = Command::from_params(&args.action, &params(&args))?;
    debug!(printer = %args.printer, action = %command.action(), "sending control action");
    let result = manager.execute(&args.printer, &command).await;

    if ctx.output != OutputFormat::Table {
        let out = output::render_single(ctx.output, &result, summary, |r| {
            r.error.clone().unwrap_or_else(|| summary(r))
        })?;
        ctx.print(&out);
    }

    if result.success {
        if ctx.output == OutputFormat::Table {
            ctx.print(&format!(
                "{} {}: {}",
                output::paint_ok("✓", ctx.color),
                args.printer,
                summary(&result)
            ));
        }
        Ok(())
    } else {
        let message = result.error.unwrap_or_default();
        Err(CliError::ControlFailed {
            printer: args.printer,
            action: command.action().to_string(),
            message,
        })
    }
}
