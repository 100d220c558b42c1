//! API to Neo4j ingestion runs, one per entity type.
//!
//! Each run follows the same linear sequence: ensure constraints, bulk
//! fetch, normalize and upsert nodes, optional per-item detail fetches that
//! write edges, then cross-linking. Recoverable API faults are handled at
//! the narrowest scope (page or item) and turned into skips; store faults
//! abort the run.

pub mod deputies;
pub mod organs;
pub mod parties;
pub mod propositions;
pub mod votations;

use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

use camara_api::{DataSource, Routes};
use camara_core::Config;

use crate::store::GraphStore;

/// Result of an ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncResult {
    pub nodes_upserted: usize,
    pub relationships_created: usize,
    pub items_skipped: usize,
}

impl SyncResult {
    fn merge(&mut self, other: &SyncResult) {
        self.nodes_upserted += other.nodes_upserted;
        self.relationships_created += other.relationships_created;
        self.items_skipped += other.items_skipped;
    }
}

/// Everything a run reads from and writes to.
pub struct IngestContext<'a> {
    pub source: &'a dyn DataSource,
    pub store: &'a dyn GraphStore,
    pub config: &'a Config,
    pub routes: Routes,
}

impl<'a> IngestContext<'a> {
    pub fn new(source: &'a dyn DataSource, store: &'a dyn GraphStore, config: &'a Config) -> Self {
        Self {
            source,
            store,
            config,
            routes: Routes::new(&config.api.base_url),
        }
    }
}

/// Run every entity type in dependency order.
pub async fn run_all(ctx: &IngestContext<'_>) -> Result<SyncResult> {
    info!("Starting full ingestion");
    let mut total = SyncResult::default();

    let deputies = deputies::sync_deputies(ctx).await.context("Failed to ingest deputies")?;
    total.merge(&deputies);

    let parties = parties::sync_parties(ctx).await.context("Failed to ingest parties")?;
    total.merge(&parties);

    let organs = organs::sync_organs(ctx).await.context("Failed to ingest organs")?;
    total.merge(&organs);

    let votations = votations::sync_votations(ctx).await.context("Failed to ingest votations")?;
    total.merge(&votations);

    let propositions = propositions::sync_propositions(ctx)
        .await
        .context("Failed to ingest propositions")?;
    total.merge(&propositions);

    info!(
        nodes = total.nodes_upserted,
        relationships = total.relationships_created,
        skipped = total.items_skipped,
        "Full ingestion complete"
    );
    Ok(total)
}

/// Fixed courtesy delay between per-item fetches.
pub(crate) async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Decode each entry as `T`, skipping the ones that do not fit.
pub(crate) fn decode_entries<T: DeserializeOwned>(entries: Vec<Value>, what: &str) -> Vec<T> {
    entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value(entry) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!(what, error = %e, "Skipping malformed entry");
                None
            }
        })
        .collect()
}
