//! Command-line argument definitions

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    check::CheckArgs, claim::ClaimCommands, completions::CompletionsArgs,
    contractor::ContractorCommands, country::CountryCommands, project::ProjectCommands,
};
use crate::core::config::{BackendKind, ConfigFile};

#[derive(Parser, Debug)]
#[command(name = "claimdesk")]
#[command(author, version, about = "Manage countries, projects, contractors and claims")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Where records are kept
    #[arg(long, global = true, env = "CLAIMDESK_BACKEND")]
    pub backend: Option<BackendKind>,

    /// Base URL of the REST API (remote backend)
    #[arg(long, global = true, env = "CLAIMDESK_API_URL")]
    pub api_url: Option<String>,

    /// Directory holding the local store and short ID index
    #[arg(long, global = true, env = "CLAIMDESK_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Records requested per page from the REST API
    #[arg(long, global = true, env = "CLAIMDESK_PAGE_SIZE")]
    pub page_size: Option<u32>,

    /// Request timeout in seconds (none by default)
    #[arg(long, global = true, env = "CLAIMDESK_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(long, short = 'o', global = true, default_value = "auto")]
    pub output: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress success notifications
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

impl GlobalOpts {
    /// The flag/environment layer of the configuration
    pub fn config_overrides(&self) -> ConfigFile {
        ConfigFile {
            api_url: self.api_url.clone(),
            backend: self.backend,
            data_dir: self.data_dir.clone(),
            page_size: self.page_size,
            timeout: self.timeout,
        }
    }
}

/// Output format for list and show commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table for lists, detail view for single records
    #[default]
    Auto,
    Table,
    Yaml,
    Json,
    Csv,
    /// Full ids only, one per line
    Id,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage countries
    #[command(subcommand, visible_alias = "ctry")]
    Country(CountryCommands),

    /// Manage projects
    #[command(subcommand, visible_alias = "proj")]
    Project(ProjectCommands),

    /// Manage contractors
    #[command(subcommand, visible_alias = "ctr")]
    Contractor(ContractorCommands),

    /// Manage claims
    #[command(subcommand, visible_alias = "clm")]
    Claim(ClaimCommands),

    /// Record counts per kind
    Dashboard,

    /// Report references to records that no longer exist
    Check(CheckArgs),

    /// List the built-in country flag catalog
    Flags,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "claimdesk",
            "project",
            "list",
            "--backend",
            "remote",
            "-o",
            "json",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.global.backend, Some(BackendKind::Remote));
        assert_eq!(cli.global.output, OutputFormat::Json);
        assert_eq!(cli.global.verbose, 2);
    }
}
