//! Proposition resolution from votation subject URIs.
//!
//! - (:Proposition) full nodes from each `Votation.uriProposicaoObjeto`,
//!   with the status object flattened into `status_*` properties
//! - (:Votation)-[:REFERS_TO]->(:Proposition)
//! - (:Deputy)-[:AUTHOR_OF]->(:Proposition) from the authors resource

use anyhow::Result;
use tracing::{debug, info, warn};

use camara_api::{fetch_detail, fetch_list};
use camara_core::record::{AuthorRecord, PropositionRecord};
use camara_core::{Label, NodeKey};

use super::{decode_entries, pause, IngestContext, SyncResult};
use crate::link::author_edges;
use crate::schema::ensure_constraints;
use crate::store::{Edge, Relation};

/// Resolve every stored votation's subject proposition and its authors.
pub async fn sync_propositions(ctx: &IngestContext<'_>) -> Result<SyncResult> {
    let mut result = SyncResult::default();
    ensure_constraints(ctx.store, &[Label::Proposition]).await?;

    let targets = ctx
        .store
        .text_attribute(Label::Votation, "uriProposicaoObjeto")
        .await?;
    let total = targets.len();
    info!(total, "Votations with proposition links to process");

    for (i, (votation_key, uri)) in targets.into_iter().enumerate() {
        debug!(progress = i + 1, total, votation = %votation_key, "Processing votation");

        match fetch_detail(ctx.source, &uri).await {
            Ok(Some(dados)) => match serde_json::from_value::<PropositionRecord>(dados) {
                Ok(record) => {
                    let linked = ingest_proposition(ctx, votation_key, record).await?;
                    result.merge(&linked);
                }
                Err(e) => {
                    warn!(url = %uri, error = %e, "Malformed proposition, skipping");
                    result.items_skipped += 1;
                }
            },
            Ok(None) => {
                warn!(url = %uri, "Proposition not found, skipping");
                result.items_skipped += 1;
            }
            Err(e) => {
                warn!(url = %uri, error = %e, "Failed to fetch proposition, skipping");
                result.items_skipped += 1;
            }
        }

        pause(ctx.config.throttle.proposition_delay()).await;
    }

    info!(
        propositions = result.nodes_upserted,
        relationships = result.relationships_created,
        skipped = result.items_skipped,
        "Proposition ingestion complete"
    );
    Ok(result)
}

/// Merge one full proposition, link its votation and its authors.
async fn ingest_proposition(
    ctx: &IngestContext<'_>,
    votation_key: NodeKey,
    record: PropositionRecord,
) -> Result<SyncResult> {
    let mut result = SyncResult::default();
    let proposition_id = record.id;
    let authors_uri = record.authors_uri().map(str::to_string);

    let node = record.into_node();
    ctx.store.upsert_node(Label::Proposition, &node).await?;
    result.nodes_upserted += 1;

    let reference = Edge::new(votation_key, proposition_id);
    result.relationships_created += ctx.store.merge_edges(Relation::RefersTo, &[reference]).await?;

    let Some(authors_uri) = authors_uri else {
        debug!(proposition_id, "Proposition has no authors URI");
        return Ok(result);
    };

    match fetch_list(ctx.source, &authors_uri).await {
        Ok(Some(entries)) => {
            let authors: Vec<AuthorRecord> = decode_entries(entries, "author");
            let edges = author_edges(proposition_id, &authors);
            result.relationships_created += ctx.store.merge_edges(Relation::AuthorOf, &edges).await?;
            debug!(proposition_id, authors = authors.len(), "Authors linked");
        }
        Ok(None) => debug!(proposition_id, "Authors not found"),
        Err(e) => warn!(proposition_id, error = %e, "Failed to fetch authors"),
    }

    Ok(result)
}
