//! Store status command.

use anyhow::{Context, Result};

use camara_core::Config;
use camara_graph::{GraphClient, GraphStore};

use crate::output::print_counts;

pub async fn execute(config: &Config) -> Result<()> {
    let graph = GraphClient::connect(&config.graph)
        .await
        .with_context(|| format!("Failed to connect to Neo4j at {}", config.graph.uri))?;

    let counts = graph.counts().await?;
    print_counts(&config.graph.uri, &counts);
    Ok(())
}
