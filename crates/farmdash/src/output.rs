//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

/// Paint a printer state by severity.
pub fn paint_state(state: &str, online: bool, color: bool) -> String {
    if !color {
        return state.to_owned();
    }
    if !online {
        return state.dimmed().to_string();
    }
    match state.to_ascii_lowercase().as_str() {
        "printing" => state.green().bold().to_string(),
        "paused" | "pausing" => state.yellow().to_string(),
        "error" | "cancelled" | "offline" => state.red().to_string(),
        "complete" | "standby" | "ready" | "operational" => state.cyan().to_string(),
        _ => state.to_owned(),
    }
}

pub fn paint_ok(text: &str, color: bool) -> String {
    if color {
        text.green().to_string()
    } else {
        text.to_owned()
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: builds a pretty table from `to_row`
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            if data.is_empty() {
                return Ok(String::new());
            }
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since detail views don't use a
/// `Tabled` derive.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize + ?Sized,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(id_fn(data)),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
    let _ = stdout.flush();
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let text = if compact {
        serde_json::to_string(data)?
    } else {
        serde_json::to_string_pretty(data)?
    };
    Ok(text)
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    Ok(serde_yaml::to_string(data)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct Item {
        name: &'static str,
    }

    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "Name")]
        name: String,
    }

    fn row(item: &Item) -> Row {
        Row {
            name: item.name.into(),
        }
    }

    #[test]
    fn plain_emits_one_id_per_line() {
        let items = [Item { name: "voron" }, Item { name: "mk3" }];
        let out = render_list(OutputFormat::Plain, &items, row, |i| i.name.into()).unwrap();
        assert_eq!(out, "voron\nmk3");
    }

    #[test]
    fn compact_json_is_single_line() {
        let items = [Item { name: "voron" }];
        let out = render_list(OutputFormat::JsonCompact, &items, row, |i| i.name.into()).unwrap();
        assert_eq!(out, r#"[{"name":"voron"}]"#);
    }

    #[test]
    fn table_has_headers_and_empty_list_renders_nothing() {
        let items = [Item { name: "voron" }];
        let out = render_list(OutputFormat::Table, &items, row, |i| i.name.into()).unwrap();
        assert!(out.contains("Name"));
        assert!(out.contains("voron"));

        let none: [Item; 0] = [];
        let out = render_list(OutputFormat::Table, &none, row, |i| i.name.into()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn uncolored_state_is_untouched() {
        assert_eq!(paint_state("printing", true, false), "printing");
        assert_ne!(paint_state("printing", true, true), "printing");
    }
}
