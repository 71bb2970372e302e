//! Clap derive structures for the `farmdash` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// farmdash -- one dashboard for a farm of Klipper and OctoPrint printers
#[derive(Debug, Parser)]
#[command(
    name = "farmdash",
    version,
    about = "Monitor and control 3D printer farms from the command line",
    long_about = "Polls Klipper (Moonraker) and OctoPrint printers, normalizes their\n\
        status into one model, and sends pause/resume/cancel/reprint, homing,\n\
        jogging and temperature commands.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (TOML)
    #[arg(long, env = "FARMDASH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// JSON options file layered over the config file
    #[arg(long, env = "FARMDASH_OPTIONS", global = true)]
    pub options: Option<PathBuf>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "FARMDASH_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: from config, else auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Status timeout in seconds (overrides config)
    #[arg(long, env = "FARMDASH_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List configured printers
    #[command(alias = "ls")]
    Printers,

    /// Show normalized status of one or all printers
    #[command(alias = "st")]
    Status(StatusArgs),

    /// Send a control action to a printer
    #[command(alias = "ctl")]
    Control(ControlArgs),

    /// Poll all printers continuously and print each snapshot
    Watch(WatchArgs),

    /// Show manager health (printer count, last successful update)
    Health,

    /// Show temperature presets per heater type
    Presets,

    /// Inspect configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Status ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Printer name (all printers when omitted)
    pub name: Option<String>,
}

// ── Control ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ControlArgs {
    /// Printer name
    pub printer: String,

    /// pause, resume, cancel, reprint, home, jog or set_temperature
    pub action: String,

    /// Axis to jog (X, Y, Z)
    #[arg(long)]
    pub axis: Option<String>,

    /// Jog distance in mm (negative moves toward home)
    #[arg(long, allow_hyphen_values = true)]
    pub distance: Option<f64>,

    /// Axes to home: "all" or a comma-separated list (x,y)
    #[arg(long, value_delimiter = ',')]
    pub axes: Vec<String>,

    /// Heater to set: extruder, bed or chamber
    #[arg(long)]
    pub heater_type: Option<String>,

    /// Target temperature in °C
    #[arg(long, allow_hyphen_values = true)]
    pub temperature: Option<f64>,

    /// Chamber sensor name (required for chamber heaters)
    #[arg(long)]
    pub heater_name: Option<String>,
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Poll interval in seconds (overrides config)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,

    /// Stop after this many snapshots
    #[arg(long, short = 'n')]
    pub count: Option<u64>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path in use
    Path,

    /// Display the resolved configuration (API keys redacted)
    Show,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
