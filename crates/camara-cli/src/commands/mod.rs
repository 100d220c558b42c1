//! CLI command definitions and handlers.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use camara_core::Config;

pub mod ingest;
pub mod status;

/// Câmara open data ingestion into a Neo4j graph
#[derive(Parser)]
#[command(name = "camara")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a TOML config file (defaults to ./camara.toml when present)
    #[arg(short, long, global = true, env = "CAMARA_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest deputies and link them to stored parties
    Deputies,

    /// Ingest parties and link deputies to them
    Parties,

    /// Ingest organs, link votations to them and fetch deputy memberships
    Organs,

    /// Ingest votations in a date window with their propositions and votes
    Votations(WindowArgs),

    /// Resolve each votation's subject proposition and its authors
    Propositions,

    /// Run every ingestion in dependency order
    All(WindowArgs),

    /// Show node and relationship counts
    Status,
}

/// Overrides for the votation date window.
#[derive(clap::Args, Default)]
pub struct WindowArgs {
    /// First day of the window (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day of the window (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,
}

impl WindowArgs {
    fn apply(&self, config: &mut Config) -> Result<()> {
        if let Some(start) = self.start {
            config.window.start = start;
        }
        if let Some(end) = self.end {
            config.window.end = end;
        }
        config.validate().context("Invalid votation window")
    }
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let mut config = Config::load(self.config.as_deref()).context("Failed to load configuration")?;

        match self.command {
            Commands::Deputies => ingest::execute(ingest::Run::Deputies, &config).await,
            Commands::Parties => ingest::execute(ingest::Run::Parties, &config).await,
            Commands::Organs => ingest::execute(ingest::Run::Organs, &config).await,
            Commands::Votations(window) => {
                window.apply(&mut config)?;
                ingest::execute(ingest::Run::Votations, &config).await
            }
            Commands::Propositions => ingest::execute(ingest::Run::Propositions, &config).await,
            Commands::All(window) => {
                window.apply(&mut config)?;
                ingest::execute(ingest::Run::All, &config).await
            }
            Commands::Status => status::execute(&config).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_window() {
        let cli = Cli::try_parse_from(["camara", "votations", "--start", "2025-08-01", "--end", "2025-08-31"])
            .unwrap();
        let Commands::Votations(window) = cli.command else {
            panic!("expected votations");
        };

        let mut config = Config::default();
        window.apply(&mut config).unwrap();
        assert_eq!(config.window.start, NaiveDate::from_ymd_opt(2025, 8, 1).unwrap());
        assert_eq!(config.window.end, NaiveDate::from_ymd_opt(2025, 8, 31).unwrap());
    }

    #[test]
    fn test_inverted_window_rejected() {
        let window = WindowArgs {
            start: NaiveDate::from_ymd_opt(2025, 9, 30),
            end: NaiveDate::from_ymd_opt(2025, 9, 1),
        };
        assert!(window.apply(&mut Config::default()).is_err());
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["camara", "status", "--config", "/tmp/camara.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/camara.toml")));
    }
}
