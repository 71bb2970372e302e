//! `health` handler.

use farmdash_core::HealthSummary;

use super::Context;
use crate::error::CliError;
use crate::output;

fn detail(h: &HealthSummary) -> String {
    format!(
        "Status:      {}\nPrinters:    {}\nLast update: {}",
        h.status,
        h.printers_count,
        h.last_update
            .map_or_else(|| "never".into(), |ts| ts.to_rfc3339()),
    )
}

/// Polls every printer once so `last_update` reflects the current farm.
pub async fn handle(ctx: &Context) -> Result<(), CliError> {
    let manager = ctx.manager();
    let statuses = manager.get_all_status().await;
    let online = statuses.values().filter(|s| s.online).count();
    tracing::debug!(online, total = statuses.len(), "health poll finished");

    let health = manager.health();
    let out = output::render_single(ctx.output, &health, detail, |h| h.status.to_owned())?;
    ctx.print(&out);
    Ok(())
}
