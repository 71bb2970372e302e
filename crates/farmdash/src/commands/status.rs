//! `status` handler, plus the status table shared with `watch`.

use std::fmt::Write as _;

use tabled::Tabled;

use farmdash_core::{NormalizedStatus, Temperature};

use super::Context;
use crate::cli::{OutputFormat, StatusArgs};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(crate) struct StatusRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Progress")]
    progress: String,
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Remaining")]
    remaining: String,
    #[tabled(rename = "Extruder")]
    extruder: String,
    #[tabled(rename = "Bed")]
    bed: String,
}

fn temp(t: Temperature) -> String {
    format!("{:.1}/{:.0}°C", t.actual, t.target)
}

impl StatusRow {
    fn new(s: &NormalizedStatus, color: bool) -> Self {
        let mut row = Self {
            name: s.name.clone(),
            kind: s.kind.to_string(),
            state: output::paint_state(&s.state, s.online, color),
            progress: "-".into(),
            file: "-".into(),
            remaining: "-".into(),
            extruder: "-".into(),
            bed: "-".into(),
        };
        if let Some(t) = &s.telemetry {
            row.progress = format!("{:.1}%", t.progress);
            if !t.file.is_empty() {
                row.file.clone_from(&t.file);
            }
            row.remaining.clone_from(&t.remaining_time);
            row.extruder = temp(t.extruder_temp);
            row.bed = temp(t.bed_temp);
        } else if let Some(err) = &s.error {
            row.file.clone_from(err);
        }
        row
    }
}

fn detail(s: &NormalizedStatus, color: bool) -> String {
    let mut out = format!(
        "Name:      {}\nType:      {}\nState:     {}\nOnline:    {}",
        s.name,
        s.kind,
        output::paint_state(&s.state, s.online, color),
        if s.online { "yes" } else { "no" },
    );
    if let Some(err) = &s.error {
        let _ = write!(out, "\nError:     {err}");
    }
    let Some(t) = &s.telemetry else {
        return out;
    };

    let _ = write!(
        out,
        "\nFile:      {}\nProgress:  {:.1}%\nElapsed:   {}\nRemaining: {}\nExtruder:  {}\nBed:       {}\nPosition:  X{:.2} Y{:.2} Z{:.2}",
        if t.file.is_empty() { "-" } else { &t.file },
        t.progress,
        t.print_time,
        t.remaining_time,
        temp(t.extruder_temp),
        temp(t.bed_temp),
        t.position.x,
        t.position.y,
        t.position.z,
    );
    if !t.message.is_empty() {
        let _ = write!(out, "\nMessage:   {}", t.message);
    }
    if let Some(klippy) = &t.klippy_state {
        let _ = write!(out, "\nKlippy:    {klippy}");
    }
    for chamber in &t.chamber_temps {
        let target = chamber
            .target
            .map_or_else(|| "-".into(), |v| format!("{v:.0}°C"));
        let _ = write!(
            out,
            "\nChamber:   {} ({}) {:.1}°C / {target}",
            chamber.name, chamber.sensor_type, chamber.actual
        );
    }
    out
}

/// Render a set of statuses as a list.
pub(crate) fn render_statuses(
    format: OutputFormat,
    statuses: &[NormalizedStatus],
    color: bool,
) -> Result<String, CliError> {
    output::render_list(
        format,
        statuses,
        |s| StatusRow::new(s, color),
        |s| format!("{}\t{}", s.name, s.state),
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: StatusArgs, ctx: &Context) -> Result<(), CliError> {
    let manager = ctx.manager();

    let out = match args.name {
        Some(name) => {
            let status = manager
                .get_status(&name)
                .await
                .ok_or(CliError::PrinterNotFound { name })?;
            output::render_single(
                ctx.output,
                &status,
                |s| detail(s, ctx.color),
                |s| s.state.clone(),
            )?
        }
        None => {
            let statuses: Vec<NormalizedStatus> =
                manager.get_all_status().await.into_values().collect();
            render_statuses(ctx.output, &statuses, ctx.color)?
        }
    };

    ctx.print(&out);
    Ok(())
}
