//! farmdash -- command-line dashboard for Klipper and OctoPrint printer farms.

mod cli;
mod commands;
mod error;
mod output;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::commands::Context;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // stdout is reserved for command output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Config(ref args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            let mut cmd = Cli::command();
            clap_complete::generate(args.shell, &mut cmd, "farmdash", &mut std::io::stdout());
            Ok(())
        }

        command => {
            let ctx = Context::load(&cli.global)?;
            match command {
                Command::Printers => commands::printers::handle(&ctx),
                Command::Status(args) => commands::status::handle(args, &ctx).await,
                Command::Control(args) => commands::control::handle(args, &ctx).await,
                Command::Watch(args) => commands::watch::handle(args, &ctx).await,
                Command::Health => commands::health::handle(&ctx).await,
                Command::Presets => commands::presets::handle(&ctx),
                Command::Config(_) | Command::Completions(_) => Ok(()),
            }
        }
    }
}
