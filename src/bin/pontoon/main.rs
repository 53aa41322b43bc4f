//! Pontoon CLI - engine manager for hybrid mobile app projects

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands, EnginesCommand};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("pontoon=debug")
    } else {
        EnvFilter::new("pontoon=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::Engines(args) => match args.command {
            EnginesCommand::List(args) => commands::engines::list(&cli.project, args),
            EnginesCommand::Set(args) => commands::engines::set(&cli.project, args),
            EnginesCommand::Defaults => commands::engines::defaults(),
        },
        Commands::Prepare => commands::prepare::execute(&cli.project),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
