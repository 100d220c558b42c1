//! Organ ingestion and organ-centred linking.
//!
//! - (:Organ) nodes from the full `/orgaos` catalog
//! - (:Votation)-[:OCCURRED_IN]->(:Organ) from `Votation.uriOrgao`
//! - (:Deputy)-[:MEMBER_OF {title, startDate, endDate}]->(:Organ), fetched
//!   per deputy from `/deputados/{id}/orgaos`

use anyhow::Result;
use tracing::{debug, info, warn};

use camara_api::routes::page_params;
use camara_api::{fetch_all, fetch_list};
use camara_core::record::MembershipRecord;
use camara_core::{Label, NodeKey};

use super::{decode_entries, pause, IngestContext, SyncResult};
use crate::link::{link_votations_to_organs, membership_edges};
use crate::schema::ensure_constraints;
use crate::store::Relation;
use crate::upsert::upsert_records;

/// Fetch the organ catalog, then link votations and deputies to it.
pub async fn sync_organs(ctx: &IngestContext<'_>) -> Result<SyncResult> {
    let mut result = SyncResult::default();
    ensure_constraints(ctx.store, &[Label::Organ]).await?;

    let params = page_params(ctx.config.api.page_size);
    let records = fetch_all(ctx.source, &ctx.routes.organs(), &params).await;
    if records.is_empty() {
        info!("No organ data to ingest");
    } else {
        let outcome = upsert_records(ctx.store, Label::Organ, records).await?;
        result.nodes_upserted += outcome.keys.len();
        result.items_skipped += outcome.rejected;
    }

    result.relationships_created += link_votations_to_organs(ctx.store).await?;

    let memberships = link_memberships(ctx).await?;
    result.relationships_created += memberships.relationships_created;
    result.items_skipped += memberships.items_skipped;

    info!(
        organs = result.nodes_upserted,
        relationships = result.relationships_created,
        skipped = result.items_skipped,
        "Organ ingestion complete"
    );
    Ok(result)
}

/// Fetch each stored deputy's memberships and write `MEMBER_OF` edges.
pub async fn link_memberships(ctx: &IngestContext<'_>) -> Result<SyncResult> {
    let mut result = SyncResult::default();

    let deputy_ids: Vec<i64> = ctx
        .store
        .node_keys(Label::Deputy)
        .await?
        .into_iter()
        .filter_map(|key| match key {
            NodeKey::Int(id) => Some(id),
            NodeKey::Text(_) => None,
        })
        .collect();
    let total = deputy_ids.len();
    info!(total, "Linking deputies to organs");

    for (i, deputy_id) in deputy_ids.into_iter().enumerate() {
        let url = ctx.routes.deputy_organs(deputy_id);
        match fetch_list(ctx.source, &url).await {
            Ok(Some(entries)) if !entries.is_empty() => {
                let records: Vec<MembershipRecord> = decode_entries(entries, "membership");
                let edges = membership_edges(deputy_id, &records);
                let created = ctx.store.merge_edges(Relation::MemberOf, &edges).await?;
                result.relationships_created += created;
                debug!(progress = i + 1, total, deputy_id, organs = records.len(), "Linked deputy to organs");
            }
            Ok(Some(_)) => {
                debug!(progress = i + 1, total, deputy_id, "Deputy has no organ memberships");
            }
            Ok(None) => {
                debug!(progress = i + 1, total, deputy_id, "Memberships not found, skipping");
                result.items_skipped += 1;
            }
            Err(e) => {
                warn!(progress = i + 1, total, deputy_id, error = %e, "Failed to fetch memberships, skipping");
                result.items_skipped += 1;
            }
        }

        pause(ctx.config.throttle.membership_delay()).await;
    }

    Ok(result)
}
