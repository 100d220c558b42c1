//! Neo4j schema initialization (uniqueness constraints).

use anyhow::Result;
use tracing::info;

use camara_core::Label;

use crate::store::GraphStore;

/// Cypher declaring the single uniqueness constraint of `label`.
///
/// Safe to run multiple times - uses IF NOT EXISTS.
pub fn constraint_statement(label: Label) -> String {
    let key = label.key_field();
    format!(
        "CREATE CONSTRAINT {name}_{key} IF NOT EXISTS FOR (n:{label}) REQUIRE n.{key} IS UNIQUE",
        name = label.as_str().to_lowercase(),
    )
}

/// Ensure the uniqueness constraints of `labels` exist.
pub async fn ensure_constraints<G: GraphStore + ?Sized>(store: &G, labels: &[Label]) -> Result<()> {
    for label in labels {
        store.ensure_constraint(*label).await?;
    }
    info!(count = labels.len(), "Uniqueness constraints ensured");
    Ok(())
}
