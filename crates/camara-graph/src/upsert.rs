//! Bulk upsert of raw API records.

use anyhow::Result;
use serde_json::Value;
use tracing::{info, warn};

use camara_core::{ApiRecord, Label, Node, NodeKey};

use crate::store::GraphStore;

/// What a bulk upsert wrote.
#[derive(Debug, Clone, Default)]
pub struct UpsertOutcome {
    /// Keys of the written nodes, in input order.
    pub keys: Vec<NodeKey>,
    /// Records that could not be decoded as the label's shape.
    pub rejected: usize,
}

/// Decode and normalize raw records, dropping those without a usable key.
pub fn decode_nodes(label: Label, records: Vec<Value>) -> (Vec<Node>, usize) {
    let mut nodes = Vec::with_capacity(records.len());
    let mut rejected = 0;

    for record in records {
        match ApiRecord::decode(label, record) {
            Ok(record) => nodes.push(record.into_node()),
            Err(e) => {
                warn!(%label, error = %e, "Skipping malformed record");
                rejected += 1;
            }
        }
    }

    (nodes, rejected)
}

/// Normalize `records` as `label` nodes and merge them in a single batch.
pub async fn upsert_records<G>(store: &G, label: Label, records: Vec<Value>) -> Result<UpsertOutcome>
where
    G: GraphStore + ?Sized,
{
    let (nodes, rejected) = decode_nodes(label, records);
    let written = store.upsert_nodes(label, &nodes).await?;
    info!(%label, written, rejected, "Nodes upserted");

    Ok(UpsertOutcome {
        keys: nodes.into_iter().map(|node| node.key).collect(),
        rejected,
    })
}
