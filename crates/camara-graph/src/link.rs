//! Cross-linking between entities that arrive from different endpoints.
//!
//! Linking runs as a separate pass after both endpoint sets are stored,
//! because the API does not deliver resources in dependency order. A
//! reference whose target is absent produces no edge and no error.

use anyhow::Result;
use tracing::info;

use camara_core::record::{AuthorRecord, MembershipRecord, PropositionSummary, VoteRecord};
use camara_core::{KeyKind, NodeKey};

use crate::store::{AttributeLink, Edge, GraphStore, Relation, UriLink};

/// Deputy → Party by `Deputy.siglaPartido = Party.sigla`.
pub const AFFILIATION: AttributeLink = AttributeLink {
    relation: Relation::AffiliatedWith,
    source_attribute: "siglaPartido",
};

/// Votation → Organ by the id at the end of `Votation.uriOrgao`.
pub const VOTATION_ORGAN: UriLink = UriLink {
    relation: Relation::OccurredIn,
    source_attribute: "uriOrgao",
};

/// Final path segment of a URI.
pub fn last_segment(uri: &str) -> &str {
    uri.rsplit('/').next().unwrap_or(uri)
}

/// Integer id at the end of a resource URI.
pub fn id_from_uri(uri: &str) -> Option<i64> {
    last_segment(uri).trim().parse().ok()
}

/// Key of the resource a URI points at, typed for the target label.
pub fn uri_key(uri: &str, kind: KeyKind) -> Option<NodeKey> {
    match kind {
        KeyKind::Integer => id_from_uri(uri).map(NodeKey::Int),
        KeyKind::Text => {
            let segment = last_segment(uri);
            (!segment.is_empty()).then(|| NodeKey::Text(segment.to_string()))
        }
    }
}

/// Link every deputy to its current party.
pub async fn link_affiliations<G: GraphStore + ?Sized>(store: &G) -> Result<usize> {
    let created = store.link_by_attribute(&AFFILIATION).await?;
    info!(created, "Linked deputies to parties");
    Ok(created)
}

/// Link every votation to the organ that hosted it.
pub async fn link_votations_to_organs<G: GraphStore + ?Sized>(store: &G) -> Result<usize> {
    let created = store.link_by_uri(&VOTATION_ORGAN).await?;
    info!(created, "Linked votations to organs");
    Ok(created)
}

/// `MEMBER_OF` edges for one deputy.
pub fn membership_edges(deputy_id: i64, memberships: &[MembershipRecord]) -> Vec<Edge> {
    memberships
        .iter()
        .map(|m| Edge::new(deputy_id, m.id_orgao).with_properties(m.edge_properties()))
        .collect()
}

/// `VOTED_IN` edges for one votation.
pub fn vote_edges(votation_id: &str, votes: &[VoteRecord]) -> Vec<Edge> {
    votes
        .iter()
        .map(|v| Edge::new(v.deputy.id, votation_id).with_properties(v.edge_properties()))
        .collect()
}

/// `REFERS_TO` edges from one votation to the propositions it touched.
pub fn reference_edges(votation_id: &str, propositions: &[PropositionSummary]) -> Vec<Edge> {
    propositions
        .iter()
        .map(|p| Edge::new(votation_id, p.id))
        .collect()
}

/// `AUTHOR_OF` edges for one proposition. Authors without a parsable URI
/// are skipped.
pub fn author_edges(proposition_id: i64, authors: &[AuthorRecord]) -> Vec<Edge> {
    authors
        .iter()
        .filter_map(|a| a.uri.as_deref().and_then(id_from_uri))
        .map(|deputy_id| Edge::new(deputy_id, proposition_id))
        .collect()
}
