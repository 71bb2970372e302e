//! `printers` handler.

use tabled::Tabled;

use farmdash_core::PrinterSummary;

use super::Context;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct PrinterRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "API Key")]
    api_key: &'static str,
}

impl From<&PrinterSummary> for PrinterRow {
    fn from(p: &PrinterSummary) -> Self {
        Self {
            name: p.name.clone(),
            kind: p.kind.to_string(),
            url: p.url.clone(),
            api_key: if p.has_api_key { "yes" } else { "-" },
        }
    }
}

pub fn handle(ctx: &Context) -> Result<(), CliError> {
    let printers = ctx.manager().printers();
    if printers.is_empty() && !ctx.quiet {
        eprintln!("No printers configured in {}", ctx.config_path.display());
    }
    let out = output::render_list(ctx.output, &printers, |p| PrinterRow::from(p), |p| p.name.clone())?;
    ctx.print(&out);
    Ok(())
}
