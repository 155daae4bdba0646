//! extconf CLI - build configurator for the Gosu native extension

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use extconf::util::diagnostic::emit;
use extconf::util::Shell;
use extconf::ConfigureError;

fn main() {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("extconf=debug")
    } else {
        EnvFilter::new("extconf=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let shell = Arc::new(Shell::from_flags(cli.quiet, cli.verbose, cli.color, false));

    if let Err(e) = run(cli, &shell) {
        match e.downcast_ref::<ConfigureError>() {
            Some(err) => emit(&err.to_diagnostic(), shell.use_color()),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli, shell: &Arc<Shell>) -> Result<()> {
    // Execute command
    match cli.command {
        Commands::Configure(args) => commands::configure::execute(args, shell),
        Commands::Flags(args) => commands::flags::execute(args),
        Commands::Doctor(args) => commands::doctor::execute(args, cli.verbose),
        Commands::Clean(args) => commands::clean::execute(args, shell),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
