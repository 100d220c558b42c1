//! Party ingestion.
//!
//! - (:Party) nodes from `/partidos`, keyed by `sigla`
//! - (:Deputy)-[:AFFILIATED_WITH]->(:Party) by matching `siglaPartido`

use anyhow::Result;
use tracing::info;

use camara_api::fetch_all;
use camara_api::routes::page_params;
use camara_core::Label;

use super::{IngestContext, SyncResult};
use crate::link::link_affiliations;
use crate::schema::ensure_constraints;
use crate::upsert::upsert_records;

/// Fetch every party, merge them and link deputies to them.
pub async fn sync_parties(ctx: &IngestContext<'_>) -> Result<SyncResult> {
    let mut result = SyncResult::default();
    ensure_constraints(ctx.store, &[Label::Party]).await?;

    let params = page_params(ctx.config.api.page_size);
    let records = fetch_all(ctx.source, &ctx.routes.parties(), &params).await;
    if records.is_empty() {
        info!("No party data to ingest");
        return Ok(result);
    }

    let outcome = upsert_records(ctx.store, Label::Party, records).await?;
    result.nodes_upserted += outcome.keys.len();
    result.items_skipped += outcome.rejected;

    result.relationships_created += link_affiliations(ctx.store).await?;

    info!(
        parties = result.nodes_upserted,
        new_affiliations = result.relationships_created,
        "Party ingestion complete"
    );
    Ok(result)
}
