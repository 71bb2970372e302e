//! `config` subcommand handlers.

use serde_json::Value;

use farmdash_config::config_path;

use super::Context;
use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "********";

/// The loaded config as a JSON tree with plaintext API keys masked.
fn redacted(ctx: &Context) -> Result<Value, CliError> {
    let mut value = serde_json::to_value(&ctx.config)?;
    if let Some(printers) = value.get_mut("printers").and_then(Value::as_array_mut) {
        for printer in printers.iter_mut().filter_map(Value::as_object_mut) {
            if let Some(key) = printer.get_mut("api_key") {
                *key = Value::String(REDACTED.into());
            }
        }
    }
    Ok(value)
}

/// `path` never loads the file, so it works even when the config is broken.
pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            let path = global.config.clone().unwrap_or_else(config_path);
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }
        ConfigCommand::Show => {
            let ctx = &Context::load(global)?;
            let value = redacted(ctx)?;
            let out = match ctx.output {
                OutputFormat::Table | OutputFormat::Plain => toml::to_string_pretty(&value)?,
                format => output::render_single(format, &value, Value::to_string, Value::to_string)?,
            };
            ctx.print(&out);
            Ok(())
        }
    }
}
