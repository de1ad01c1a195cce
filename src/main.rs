use clap::Parser;

use wallloop::cli::Cli;
use wallloop::commands;
use wallloop::ui::{self, prelude::*};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    ui::set_debug_mode(cli.debug);
    ui::init(cli.output, !cli.no_color);
    if cli.debug {
        emit(Level::Debug, "debug.enabled", "Debug mode is on", None);
    }

    if let Err(e) = commands::handle_command(cli).await {
        emit(Level::Error, "error", &format!("Error: {:#}", e), None);
        std::process::exit(1);
    }
}
