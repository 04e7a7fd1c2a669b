//! Reseal CLI entry point.

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use reseal_core::log::{self, Verbosity};
use reseal_core::term;

mod cli;
mod ui;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    log::init(Verbosity::from_flags(cli.verbose, cli.debug));
    term::configure_color(cli.no_color);

    match cli.execute().await {
        Ok(_) => Ok(()),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}
