//! Deputy ingestion.
//!
//! - (:Deputy) nodes from `/deputados`
//! - (:Deputy)-[:AFFILIATED_WITH]->(:Party), when parties are already stored

use anyhow::Result;
use tracing::info;

use camara_api::fetch_all;
use camara_api::routes::page_params;
use camara_core::Label;

use super::{IngestContext, SyncResult};
use crate::link::link_affiliations;
use crate::schema::ensure_constraints;
use crate::upsert::upsert_records;

/// Fetch every deputy, merge them and link them to their parties.
pub async fn sync_deputies(ctx: &IngestContext<'_>) -> Result<SyncResult> {
    let mut result = SyncResult::default();
    ensure_constraints(ctx.store, &[Label::Deputy]).await?;

    let params = page_params(ctx.config.api.deputies_page_size);
    let records = fetch_all(ctx.source, &ctx.routes.deputies(), &params).await;
    if records.is_empty() {
        info!("No deputy data to ingest");
        return Ok(result);
    }

    let outcome = upsert_records(ctx.store, Label::Deputy, records).await?;
    result.nodes_upserted += outcome.keys.len();
    result.items_skipped += outcome.rejected;

    result.relationships_created += link_affiliations(ctx.store).await?;

    info!(
        deputies = result.nodes_upserted,
        affiliations = result.relationships_created,
        "Deputy ingestion complete"
    );
    Ok(result)
}
