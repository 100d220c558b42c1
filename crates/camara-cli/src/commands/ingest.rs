//! Ingestion run commands.

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::info;

use camara_api::CamaraClient;
use camara_core::Config;
use camara_graph::sync::{deputies, organs, parties, propositions, votations};
use camara_graph::{run_all, GraphClient, IngestContext};

use crate::output::print_sync_result;

/// Which ingestion to run.
#[derive(Debug, Clone, Copy)]
pub enum Run {
    Deputies,
    Parties,
    Organs,
    Votations,
    Propositions,
    All,
}

impl Run {
    fn title(self) -> &'static str {
        match self {
            Run::Deputies => "Deputy ingestion",
            Run::Parties => "Party ingestion",
            Run::Organs => "Organ ingestion",
            Run::Votations => "Votation ingestion",
            Run::Propositions => "Proposition ingestion",
            Run::All => "Full ingestion",
        }
    }
}

/// Connect to both ends and run one ingestion.
pub async fn execute(run: Run, config: &Config) -> Result<()> {
    let graph = GraphClient::connect(&config.graph)
        .await
        .with_context(|| format!("Failed to connect to Neo4j at {}", config.graph.uri))?;
    let api = CamaraClient::new(&config.api).context("Failed to build API client")?;

    println!("{} {}", format!("{}...", run.title()).bold(), config.api.base_url.dimmed());
    info!(?run, api = %config.api.base_url, graph = %config.graph.uri, "Starting run");

    let ctx = IngestContext::new(&api, &graph, config);
    let result = match run {
        Run::Deputies => deputies::sync_deputies(&ctx).await?,
        Run::Parties => parties::sync_parties(&ctx).await?,
        Run::Organs => organs::sync_organs(&ctx).await?,
        Run::Votations => votations::sync_votations(&ctx).await?,
        Run::Propositions => propositions::sync_propositions(&ctx).await?,
        Run::All => run_all(&ctx).await?,
    };

    print_sync_result(run.title(), &result);
    Ok(())
}
