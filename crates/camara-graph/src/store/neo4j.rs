//! [`GraphStore`] over Neo4j.
//!
//! Labels and relationship types come from closed enums and are spliced
//! into the Cypher text; all values travel as parameters. Batches go out
//! as one `UNWIND` statement, so each call commits atomically.

use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use neo4rs::{BoltType, Query};
use tracing::debug;

use camara_core::{KeyKind, Label, Node, NodeKey, Properties, PropertyValue};

use super::{AttributeLink, Edge, GraphCounts, GraphStore, Relation, UriLink};
use crate::client::GraphClient;
use crate::schema::constraint_statement;

fn bolt_value(value: &PropertyValue) -> Option<BoltType> {
    match value {
        PropertyValue::Null => None,
        PropertyValue::Bool(b) => Some(BoltType::from(*b)),
        PropertyValue::Int(i) => Some(BoltType::from(*i)),
        PropertyValue::Float(f) => Some(BoltType::from(*f)),
        PropertyValue::Text(s) => Some(BoltType::from(s.as_str())),
    }
}

fn bolt_key(key: &NodeKey) -> BoltType {
    match key {
        NodeKey::Int(i) => BoltType::from(*i),
        NodeKey::Text(s) => BoltType::from(s.as_str()),
    }
}

/// Property map without nulls, so `SET x += map` never removes a property.
fn writable(properties: &Properties) -> HashMap<String, BoltType> {
    properties
        .iter()
        .filter_map(|(k, v)| bolt_value(v).map(|b| (k.clone(), b)))
        .collect()
}

fn bolt_properties(properties: &Properties) -> BoltType {
    BoltType::from(writable(properties))
}

fn node_row(node: &Node) -> HashMap<String, BoltType> {
    HashMap::from([
        ("key".to_string(), bolt_key(&node.key)),
        ("props".to_string(), bolt_properties(&node.properties)),
    ])
}

fn edge_row(edge: &Edge) -> HashMap<String, BoltType> {
    HashMap::from([
        ("from".to_string(), bolt_key(&edge.from)),
        ("to".to_string(), bolt_key(&edge.to)),
        ("props".to_string(), bolt_properties(&edge.properties)),
    ])
}

pub(crate) fn upsert_batch_cypher(label: Label) -> String {
    format!(
        "UNWIND $rows AS row
         MERGE (n:{label} {{{key}: row.key}})
         SET n += row.props",
        key = label.key_field(),
    )
}

pub(crate) fn upsert_one_cypher(label: Label) -> String {
    format!(
        "MERGE (n:{label} {{{key}: $key}})
         SET n += $props",
        key = label.key_field(),
    )
}

pub(crate) fn create_missing_cypher(label: Label) -> String {
    format!(
        "UNWIND $rows AS row
         OPTIONAL MATCH (existing:{label} {{{key}: row.key}})
         WITH row, existing IS NULL AS is_new
         MERGE (n:{label} {{{key}: row.key}})
         ON CREATE SET n += row.props
         RETURN count(CASE WHEN is_new THEN 1 END) AS created",
        key = label.key_field(),
    )
}

pub(crate) fn merge_edges_cypher(relation: Relation) -> String {
    let source = relation.source();
    let target = relation.target();
    format!(
        "UNWIND $rows AS row
         MATCH (a:{source} {{{source_key}: row.from}})
         MATCH (b:{target} {{{target_key}: row.to}})
         OPTIONAL MATCH (a)-[existing:{relation}]->(b)
         WITH a, b, row, existing IS NULL AS is_new
         MERGE (a)-[r:{relation}]->(b)
         SET r += row.props
         RETURN count(CASE WHEN is_new THEN 1 END) AS created",
        source_key = source.key_field(),
        target_key = target.key_field(),
    )
}

pub(crate) fn link_attribute_cypher(link: &AttributeLink) -> String {
    let relation = link.relation;
    let source = relation.source();
    let target = relation.target();
    format!(
        "MATCH (a:{source})
         WHERE a.{attribute} IS NOT NULL
         MATCH (b:{target} {{{target_key}: a.{attribute}}})
         OPTIONAL MATCH (a)-[existing:{relation}]->(b)
         WITH a, b, existing IS NULL AS is_new
         MERGE (a)-[:{relation}]->(b)
         RETURN count(CASE WHEN is_new THEN 1 END) AS created",
        attribute = link.source_attribute,
        target_key = target.key_field(),
    )
}

pub(crate) fn link_uri_cypher(link: &UriLink) -> String {
    let relation = link.relation;
    let source = relation.source();
    let target = relation.target();
    let segment = format!("split(a.{}, '/')[-1]", link.source_attribute);
    let target_value = match target.key_kind() {
        KeyKind::Integer => format!("toInteger({segment})"),
        KeyKind::Text => segment,
    };
    format!(
        "MATCH (a:{source})
         WHERE a.{attribute} IS NOT NULL
         WITH a, {target_value} AS target_key
         MATCH (b:{target} {{{key}: target_key}})
         OPTIONAL MATCH (a)-[existing:{relation}]->(b)
         WITH a, b, existing IS NULL AS is_new
         MERGE (a)-[:{relation}]->(b)
         RETURN count(CASE WHEN is_new THEN 1 END) AS created",
        attribute = link.source_attribute,
        key = target.key_field(),
    )
}

fn read_key(row: &neo4rs::Row, kind: KeyKind) -> Result<NodeKey> {
    let key = match kind {
        KeyKind::Integer => row.get::<i64>("key").map(NodeKey::Int),
        KeyKind::Text => row.get::<String>("key").map(NodeKey::Text),
    };
    key.map_err(|e| anyhow::anyhow!("Failed to read node key: {:?}", e))
}

#[async_trait]
impl GraphStore for GraphClient {
    async fn ensure_constraint(&self, label: Label) -> Result<()> {
        self.execute(Query::new(constraint_statement(label)))
            .await
            .with_context(|| format!("Failed to ensure constraint for :{label}"))
    }

    async fn upsert_nodes(&self, label: Label, nodes: &[Node]) -> Result<usize> {
        if nodes.is_empty() {
            return Ok(0);
        }
        let rows: Vec<HashMap<String, BoltType>> = nodes.iter().map(node_row).collect();
        let query = Query::new(upsert_batch_cypher(label)).param("rows", rows);

        self.execute(query)
            .await
            .with_context(|| format!("Failed to upsert {} :{label} nodes", nodes.len()))?;
        debug!(%label, count = nodes.len(), "Upserted node batch");
        Ok(nodes.len())
    }

    async fn upsert_node(&self, label: Label, node: &Node) -> Result<()> {
        let query = Query::new(upsert_one_cypher(label))
            .param("key", bolt_key(&node.key))
            .param("props", bolt_properties(&node.properties));

        self.execute(query)
            .await
            .with_context(|| format!("Failed to upsert :{label} {}", node.key))
    }

    async fn create_missing_nodes(&self, label: Label, nodes: &[Node]) -> Result<usize> {
        if nodes.is_empty() {
            return Ok(0);
        }
        let rows: Vec<HashMap<String, BoltType>> = nodes.iter().map(node_row).collect();
        let query = Query::new(create_missing_cypher(label)).param("rows", rows);

        self.query_count(query, "created")
            .await
            .with_context(|| format!("Failed to create missing :{label} nodes"))
    }

    async fn merge_edges(&self, relation: Relation, edges: &[Edge]) -> Result<usize> {
        if edges.is_empty() {
            return Ok(0);
        }
        let rows: Vec<HashMap<String, BoltType>> = edges.iter().map(edge_row).collect();
        let query = Query::new(merge_edges_cypher(relation)).param("rows", rows);

        self.query_count(query, "created")
            .await
            .with_context(|| format!("Failed to merge {relation} edges"))
    }

    async fn link_by_attribute(&self, link: &AttributeLink) -> Result<usize> {
        self.query_count(Query::new(link_attribute_cypher(link)), "created")
            .await
            .with_context(|| format!("Failed to link {}", link.relation))
    }

    async fn link_by_uri(&self, link: &UriLink) -> Result<usize> {
        self.query_count(Query::new(link_uri_cypher(link)), "created")
            .await
            .with_context(|| format!("Failed to link {}", link.relation))
    }

    async fn node_keys(&self, label: Label) -> Result<Vec<NodeKey>> {
        let query = Query::new(format!(
            "MATCH (n:{label}) RETURN n.{key} AS key",
            key = label.key_field()
        ));
        let kind = label.key_kind();
        self.query(query)
            .await?
            .iter()
            .map(|row| read_key(row, kind))
            .collect()
    }

    async fn text_attribute(&self, label: Label, attribute: &str) -> Result<Vec<(NodeKey, String)>> {
        let query = Query::new(format!(
            "MATCH (n:{label})
             WHERE n[$attribute] IS NOT NULL
             RETURN n.{key} AS key, toString(n[$attribute]) AS value",
            key = label.key_field()
        ))
        .param("attribute", attribute);

        let kind = label.key_kind();
        self.query(query)
            .await?
            .iter()
            .map(|row| -> Result<(NodeKey, String)> {
                let key = read_key(row, kind)?;
                let value: String = row
                    .get("value")
                    .map_err(|e| anyhow::anyhow!("Failed to read '{}': {:?}", attribute, e))?;
                Ok((key, value))
            })
            .collect()
    }

    async fn counts(&self) -> Result<GraphCounts> {
        let nodes = self
            .query_count(Query::new("MATCH (n) RETURN count(n) AS count".to_string()), "count")
            .await?;
        let relationships = self
            .query_count(
                Query::new("MATCH ()-[r]->() RETURN count(r) AS count".to_string()),
                "count",
            )
            .await?;
        Ok(GraphCounts { nodes, relationships })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::{AFFILIATION, VOTATION_ORGAN};

    fn squash(cypher: &str) -> String {
        cypher.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_upsert_cypher_uses_label_key() {
        assert_eq!(
            squash(&upsert_batch_cypher(Label::Party)),
            "UNWIND $rows AS row MERGE (n:Party {sigla: row.key}) SET n += row.props"
        );
        assert_eq!(
            squash(&upsert_one_cypher(Label::Deputy)),
            "MERGE (n:Deputy {id: $key}) SET n += $props"
        );
    }

    #[test]
    fn test_create_missing_only_sets_on_create() {
        let cypher = squash(&create_missing_cypher(Label::Proposition));
        assert!(cypher.contains("MERGE (n:Proposition {id: row.key}) ON CREATE SET n += row.props"));
    }

    #[test]
    fn test_merge_edges_cypher() {
        let cypher = squash(&merge_edges_cypher(Relation::VotedIn));
        assert!(cypher.contains("MATCH (a:Deputy {id: row.from})"));
        assert!(cypher.contains("MATCH (b:Votation {id: row.to})"));
        assert!(cypher.contains("MERGE (a)-[r:VOTED_IN]->(b) SET r += row.props"));
    }

    #[test]
    fn test_link_cypher() {
        let cypher = squash(&link_attribute_cypher(&AFFILIATION));
        assert!(cypher.contains("MATCH (b:Party {sigla: a.siglaPartido})"));
        assert!(cypher.contains("MERGE (a)-[:AFFILIATED_WITH]->(b)"));

        let cypher = squash(&link_uri_cypher(&VOTATION_ORGAN));
        assert!(cypher.contains("WITH a, toInteger(split(a.uriOrgao, '/')[-1]) AS target_key"));
        assert!(cypher.contains("MATCH (b:Organ {id: target_key})"));
    }

    #[test]
    fn test_null_properties_are_not_sent() {
        let props = Properties::from([
            ("title".to_string(), PropertyValue::from("Titular")),
            ("endDate".to_string(), PropertyValue::Null),
        ]);
        let map = writable(&props);
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("title"));
    }
}
