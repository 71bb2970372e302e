//! Command handlers and the shared invocation context.

pub mod config_cmd;
pub mod control;
pub mod health;
pub mod presets;
pub mod printers;
pub mod status;
pub mod watch;

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use tracing::{debug, warn};

use farmdash_config::{Config, config_path, load_config_from, manager_settings, resolve_printers};
use farmdash_core::{ManagerSettings, PrinterManager};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

/// Everything a handler needs: loaded config plus resolved output settings.
pub struct Context {
    pub config_path: PathBuf,
    pub config: Config,
    pub output: OutputFormat,
    pub color: bool,
    pub quiet: bool,
    timeout: Option<u64>,
}

impl Context {
    pub fn load(global: &GlobalOpts) -> Result<Self, CliError> {
        let path = global.config.clone().unwrap_or_else(config_path);
        let config = load_config_from(&path, global.options.as_deref())?;
        debug!(path = %path.display(), printers = config.printers.len(), "config loaded");

        let output = global
            .output
            .or_else(|| parse_enum(&config.defaults.output, "defaults.output"))
            .unwrap_or(OutputFormat::Table);
        let color = global
            .color
            .or_else(|| parse_enum(&config.defaults.color, "defaults.color"))
            .unwrap_or(ColorMode::Auto);

        Ok(Self {
            config_path: path,
            output,
            color: output::should_color(color),
            quiet: global.quiet,
            timeout: global.timeout,
            config,
        })
    }

    pub fn settings(&self) -> ManagerSettings {
        let mut settings = manager_settings(&self.config.defaults);
        if let Some(secs) = self.timeout {
            settings.status_timeout = Duration::from_secs(secs.max(1));
        }
        settings
    }

    /// Build a manager over every valid configured printer.
    pub fn manager(&self) -> PrinterManager {
        self.manager_with(self.settings())
    }

    pub fn manager_with(&self, settings: ManagerSettings) -> PrinterManager {
        PrinterManager::new(resolve_printers(&self.config), settings)
    }

    pub fn print(&self, rendered: &str) {
        output::print_output(rendered, self.quiet);
    }
}

fn parse_enum<E: ValueEnum>(raw: &str, field: &str) -> Option<E> {
    E::from_str(raw, true)
        .inspect_err(|_| warn!(field, value = raw, "ignoring unknown config value"))
        .ok()
}
