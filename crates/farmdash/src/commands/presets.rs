//! `presets` handler.

use serde::Serialize;
use tabled::Tabled;

use super::Context;
use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct PresetSet<'a> {
    heater: &'static str,
    temperatures: &'a [f64],
}

#[derive(Tabled)]
struct PresetRow {
    #[tabled(rename = "Heater")]
    heater: &'static str,
    #[tabled(rename = "Presets (°C)")]
    temperatures: String,
}

fn join(temps: &[f64]) -> String {
    temps
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn handle(ctx: &Context) -> Result<(), CliError> {
    let presets = &ctx.config.temperature_presets;

    // Structured formats keep the config's own `{extruder, bed, chamber}` shape.
    if matches!(
        ctx.output,
        OutputFormat::Json | OutputFormat::JsonCompact | OutputFormat::Yaml
    ) {
        let out = output::render_single(ctx.output, presets, |_| String::new(), |_| String::new())?;
        ctx.print(&out);
        return Ok(());
    }

    let sets = [
        PresetSet { heater: "extruder", temperatures: &presets.extruder },
        PresetSet { heater: "bed", temperatures: &presets.bed },
        PresetSet { heater: "chamber", temperatures: &presets.chamber },
    ];
    let out = output::render_list(
        ctx.output,
        &sets,
        |s| PresetRow {
            heater: s.heater,
            temperatures: join(s.temperatures),
        },
        |s| format!("{}\t{}", s.heater, join(s.temperatures)),
    )?;
    ctx.print(&out);
    Ok(())
}
