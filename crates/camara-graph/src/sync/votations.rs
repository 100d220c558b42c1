//! Votation ingestion for the configured date window.
//!
//! - (:Votation) nodes from `/votacoes`, enriched from `/votacoes/{id}`
//! - (:Proposition) summary nodes, created only when missing
//! - (:Votation)-[:REFERS_TO]->(:Proposition) from affected propositions
//!   and candidate subject objects
//! - (:Deputy)-[:VOTED_IN {vote, registrationDate}]->(:Votation) from
//!   `/votacoes/{id}/votos`
//! - (:Votation)-[:OCCURRED_IN]->(:Organ)

use anyhow::Result;
use tracing::{debug, info, warn};

use camara_api::routes::votation_params;
use camara_api::{fetch_all, fetch_detail, fetch_list};
use camara_core::record::{PropositionSummary, VotationDetail, VoteRecord};
use camara_core::{Label, Node, NodeKey};

use super::{decode_entries, pause, IngestContext, SyncResult};
use crate::link::{link_votations_to_organs, reference_edges, vote_edges};
use crate::schema::ensure_constraints;
use crate::store::{Edge, Relation};
use crate::upsert::upsert_records;

/// Fetch the window's votations, enrich each one, then link to organs.
pub async fn sync_votations(ctx: &IngestContext<'_>) -> Result<SyncResult> {
    let mut result = SyncResult::default();
    ensure_constraints(ctx.store, &[Label::Votation, Label::Proposition]).await?;

    let window = &ctx.config.window;
    let params = votation_params(&ctx.config.api, window);
    info!(start = %window.start, end = %window.end, "Fetching votations");

    let records = fetch_all(ctx.source, &ctx.routes.votations(), &params).await;
    if records.is_empty() {
        info!(start = %window.start, end = %window.end, "No votations found in window");
        return Ok(result);
    }

    let outcome = upsert_records(ctx.store, Label::Votation, records).await?;
    result.nodes_upserted += outcome.keys.len();
    result.items_skipped += outcome.rejected;

    let votation_ids: Vec<String> = outcome
        .keys
        .into_iter()
        .filter_map(|key| match key {
            NodeKey::Text(id) => Some(id),
            NodeKey::Int(_) => None,
        })
        .collect();

    let enriched = enrich_with_propositions(ctx, &votation_ids).await?;
    result.merge(&enriched);

    let votes = link_votes(ctx, &votation_ids).await?;
    result.merge(&votes);

    result.relationships_created += link_votations_to_organs(ctx.store).await?;

    info!(
        nodes = result.nodes_upserted,
        relationships = result.relationships_created,
        skipped = result.items_skipped,
        "Votation ingestion complete"
    );
    Ok(result)
}

/// Merge each votation's detail and link it to the propositions it touched.
pub async fn enrich_with_propositions(ctx: &IngestContext<'_>, votation_ids: &[String]) -> Result<SyncResult> {
    let mut result = SyncResult::default();
    let total = votation_ids.len();
    info!(total, "Enriching votations with proposition data");

    for (i, votation_id) in votation_ids.iter().enumerate() {
        let url = ctx.routes.votation(votation_id);
        match fetch_detail(ctx.source, &url).await {
            Ok(Some(dados)) => match serde_json::from_value::<VotationDetail>(dados) {
                Ok(detail) => {
                    ctx.store.upsert_node(Label::Votation, &detail.to_node(votation_id)).await?;

                    let propositions = detail.propositions();
                    if propositions.is_empty() {
                        debug!(progress = i + 1, total, votation_id, "Votation has no associated propositions");
                    } else {
                        let (nodes, edges) = proposition_links(votation_id, propositions);
                        result.nodes_upserted +=
                            ctx.store.create_missing_nodes(Label::Proposition, &nodes).await?;
                        result.relationships_created +=
                            ctx.store.merge_edges(Relation::RefersTo, &edges).await?;
                        debug!(progress = i + 1, total, votation_id, propositions = nodes.len(), "Votation enriched");
                    }
                }
                Err(e) => {
                    warn!(votation_id, error = %e, "Malformed votation detail, skipping");
                    result.items_skipped += 1;
                }
            },
            Ok(None) => {
                debug!(votation_id, "Votation detail not found, skipping");
                result.items_skipped += 1;
            }
            Err(e) => {
                warn!(votation_id, error = %e, "Failed to fetch votation detail, skipping");
                result.items_skipped += 1;
            }
        }

        pause(ctx.config.throttle.votation_delay()).await;
    }

    Ok(result)
}

/// Fetch each votation's individual votes and write `VOTED_IN` edges.
pub async fn link_votes(ctx: &IngestContext<'_>, votation_ids: &[String]) -> Result<SyncResult> {
    let mut result = SyncResult::default();
    let total = votation_ids.len();
    info!(total, "Linking deputies to votations");

    for (i, votation_id) in votation_ids.iter().enumerate() {
        let url = ctx.routes.votation_votes(votation_id);
        match fetch_list(ctx.source, &url).await {
            Ok(Some(entries)) if !entries.is_empty() => {
                let votes: Vec<VoteRecord> = decode_entries(entries, "vote");
                let edges = vote_edges(votation_id, &votes);
                result.relationships_created += ctx.store.merge_edges(Relation::VotedIn, &edges).await?;
                debug!(progress = i + 1, total, votation_id, votes = votes.len(), "Votes linked");
            }
            Ok(Some(_)) => {
                debug!(progress = i + 1, total, votation_id, "Votation had no individual votes registered");
            }
            Ok(None) => {
                debug!(votation_id, "Votes not found, skipping");
                result.items_skipped += 1;
            }
            Err(e) => {
                warn!(votation_id, error = %e, "Failed to fetch votes, skipping");
                result.items_skipped += 1;
            }
        }

        pause(ctx.config.throttle.votation_delay()).await;
    }

    Ok(result)
}

fn proposition_links(votation_id: &str, propositions: Vec<PropositionSummary>) -> (Vec<Node>, Vec<Edge>) {
    let edges = reference_edges(votation_id, &propositions);
    let nodes = propositions.into_iter().map(PropositionSummary::into_node).collect();
    (nodes, edges)
}
