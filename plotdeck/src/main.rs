mod commands;
mod handlers;
mod output;

use clap::Parser;
use commands::Cli;
use env_logger::{Builder, Env};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(level)).init();
    handlers::handle_command(cli.command)
}
