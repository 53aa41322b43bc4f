//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Pontoon - engine manager for hybrid mobile app projects
#[derive(Parser)]
#[command(name = "pontoon")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project directory
    #[arg(long, global = true, default_value = ".")]
    pub project: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect and update the project's platform engines
    Engines(EnginesArgs),

    /// Run the platform tool's prepare step for this project
    Prepare,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct EnginesArgs {
    #[command(subcommand)]
    pub command: EnginesCommand,
}

#[derive(Subcommand)]
pub enum EnginesCommand {
    /// Show the active engines and where they came from
    List(ListArgs),

    /// Declare the engine set and reconcile installed platforms
    Set(SetArgs),

    /// Show the default engines for new projects
    Defaults,
}

#[derive(Args)]
pub struct ListArgs {
    /// Only consider the platforms.json state file
    #[arg(long)]
    pub state_only: bool,
}

#[derive(Args)]
pub struct SetArgs {
    /// Engines as id@version (catalog) or id@path (local checkout)
    #[arg(required = true, value_name = "ENGINE")]
    pub engines: Vec<String>,

    /// Compute and print the reconciliation plan without applying it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
