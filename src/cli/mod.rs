//! CLI module - argument parsing and command dispatch

pub mod args;
pub mod commands;
pub mod helpers;
pub mod output;
pub mod session;
pub mod table;

pub use args::{Cli, Commands, GlobalOpts, OutputFormat};

use miette::Result;

/// Dispatch a parsed command line
pub async fn run(cli: Cli) -> Result<()> {
    let global = &cli.global;
    match cli.command {
        Commands::Country(cmd) => commands::country::run(cmd, global).await,
        Commands::Project(cmd) => commands::project::run(cmd, global).await,
        Commands::Contractor(cmd) => commands::contractor::run(cmd, global).await,
        Commands::Claim(cmd) => commands::claim::run(cmd, global).await,
        Commands::Dashboard => commands::dashboard::run(global).await,
        Commands::Check(args) => commands::check::run(args, global).await,
        Commands::Flags => commands::flags::run(global),
        Commands::Completions(args) => commands::completions::run(args),
    }
}
