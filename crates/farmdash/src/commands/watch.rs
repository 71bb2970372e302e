//! `watch` handler: runs the background poller and prints every snapshot
//! until Ctrl-C (or `--count` snapshots).

use std::time::Duration;

use chrono::Local;
use tracing::{debug, info};

use farmdash_core::NormalizedStatus;

use super::Context;
use super::status::render_statuses;
use crate::cli::{OutputFormat, WatchArgs};
use crate::error::CliError;

pub async fn handle(args: WatchArgs, ctx: &Context) -> Result<(), CliError> {
    let mut settings = ctx.settings();
    if let Some(secs) = args.interval {
        settings.poll_interval = Duration::from_secs(secs.max(1));
    }
    let manager = ctx.manager_with(settings);
    let mut snapshots = manager.subscribe();
    manager.start_polling().await;

    let mut printed = 0_u64;
    let outcome = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, stopping watch");
                break Ok(());
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    debug!("snapshot channel closed");
                    break Ok(());
                }
                let snapshot = snapshots.borrow_and_update().clone();
                let statuses: Vec<NormalizedStatus> = snapshot.values().cloned().collect();
                let rendered = match render_statuses(ctx.output, &statuses, ctx.color) {
                    Ok(rendered) => rendered,
                    Err(e) => break Err(e),
                };
                if ctx.output == OutputFormat::Table && !ctx.quiet {
                    println!("── {} ──", Local::now().format("%Y-%m-%d %H:%M:%S"));
                }
                ctx.print(&rendered);

                printed += 1;
                if args.count.is_some_and(|limit| printed >= limit) {
                    break Ok(());
                }
            }
        }
    };

    manager.stop_polling().await;
    outcome
}
