//! dotrun CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use dotrun::cli::{Cli, CommandDispatcher};
use dotrun::ui::{OutputMode, TerminalUI, UserInterface};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("dotrun=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dotrun=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("dotrun starting with args: {:?}", cli);

    let output_mode = if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };

    // --no-color is not exported as NO_COLOR so child processes are unaffected
    let mut ui = if cli.no_color {
        TerminalUI::with_colors(output_mode, false)
    } else {
        TerminalUI::new(output_mode)
    };

    let result =
        CommandDispatcher::from_cli(&cli).and_then(|dispatcher| dispatcher.dispatch(&cli, &mut ui));

    match result {
        Ok(result) => ExitCode::from(result.exit_code as u8),
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
