//! In-process [`GraphStore`] with the same merge semantics as the Neo4j one.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use anyhow::Result;
use async_trait::async_trait;

use camara_core::{Label, Node, NodeKey, Properties, PropertyValue};

use super::{AttributeLink, Edge, GraphCounts, GraphStore, Relation, UriLink};
use crate::link::uri_key;

/// Full contents of a [`MemoryGraph`], comparable across runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphSnapshot {
    pub nodes: BTreeMap<(Label, NodeKey), Properties>,
    pub edges: BTreeMap<(Relation, NodeKey, NodeKey), Properties>,
    pub constraints: BTreeSet<Label>,
}

/// A graph held in memory.
#[derive(Debug, Default)]
pub struct MemoryGraph {
    state: Mutex<GraphSnapshot>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, GraphSnapshot> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        self.lock().clone()
    }

    pub fn node(&self, label: Label, key: &NodeKey) -> Option<Properties> {
        self.lock().nodes.get(&(label, key.clone())).cloned()
    }

    pub fn node_count(&self, label: Label) -> usize {
        self.lock().nodes.keys().filter(|(l, _)| *l == label).count()
    }

    pub fn edge(&self, relation: Relation, from: &NodeKey, to: &NodeKey) -> Option<Properties> {
        self.lock()
            .edges
            .get(&(relation, from.clone(), to.clone()))
            .cloned()
    }

    pub fn has_edge(&self, relation: Relation, from: &NodeKey, to: &NodeKey) -> bool {
        self.edge(relation, from, to).is_some()
    }

    pub fn edge_count(&self, relation: Relation) -> usize {
        self.lock().edges.keys().filter(|(r, _, _)| *r == relation).count()
    }

    /// Edges of `relation` leaving `from`.
    pub fn edges_from(&self, relation: Relation, from: &NodeKey) -> Vec<NodeKey> {
        self.lock()
            .edges
            .keys()
            .filter(|(r, f, _)| *r == relation && f == from)
            .map(|(_, _, to)| to.clone())
            .collect()
    }

    pub fn has_constraint(&self, label: Label) -> bool {
        self.lock().constraints.contains(&label)
    }
}

/// `target += incoming`, skipping nulls.
fn merge_properties(target: &mut Properties, incoming: &Properties) {
    for (key, value) in incoming {
        if !value.is_null() {
            target.insert(key.clone(), value.clone());
        }
    }
}

fn merge_node(state: &mut GraphSnapshot, label: Label, node: &Node) {
    let entry = state.nodes.entry((label, node.key.clone())).or_default();
    merge_properties(entry, &node.properties);
    entry.insert(label.key_field().to_string(), PropertyValue::from(node.key.clone()));
}

/// Create or refresh one edge. Returns true when the edge is new.
fn merge_edge(state: &mut GraphSnapshot, relation: Relation, edge: &Edge) -> bool {
    let from = (relation.source(), edge.from.clone());
    let to = (relation.target(), edge.to.clone());
    if !state.nodes.contains_key(&from) || !state.nodes.contains_key(&to) {
        return false;
    }

    let key = (relation, edge.from.clone(), edge.to.clone());
    let is_new = !state.edges.contains_key(&key);
    merge_properties(state.edges.entry(key).or_default(), &edge.properties);
    is_new
}

#[async_trait]
impl GraphStore for MemoryGraph {
    async fn ensure_constraint(&self, label: Label) -> Result<()> {
        self.lock().constraints.insert(label);
        Ok(())
    }

    async fn upsert_nodes(&self, label: Label, nodes: &[Node]) -> Result<usize> {
        let mut state = self.lock();
        for node in nodes {
            merge_node(&mut state, label, node);
        }
        Ok(nodes.len())
    }

    async fn upsert_node(&self, label: Label, node: &Node) -> Result<()> {
        merge_node(&mut self.lock(), label, node);
        Ok(())
    }

    async fn create_missing_nodes(&self, label: Label, nodes: &[Node]) -> Result<usize> {
        let mut state = self.lock();
        let mut created = 0;
        for node in nodes {
            if !state.nodes.contains_key(&(label, node.key.clone())) {
                merge_node(&mut state, label, node);
                created += 1;
            }
        }
        Ok(created)
    }

    async fn merge_edges(&self, relation: Relation, edges: &[Edge]) -> Result<usize> {
        let mut state = self.lock();
        Ok(edges
            .iter()
            .filter(|edge| merge_edge(&mut state, relation, edge))
            .count())
    }

    async fn link_by_attribute(&self, link: &AttributeLink) -> Result<usize> {
        let mut state = self.lock();
        let source = link.relation.source();
        let edges: Vec<Edge> = state
            .nodes
            .iter()
            .filter(|((label, _), _)| *label == source)
            .filter_map(|((_, key), props)| {
                let target = props.get(link.source_attribute)?.as_key()?;
                Some(Edge::new(key.clone(), target))
            })
            .collect();

        Ok(edges
            .iter()
            .filter(|edge| merge_edge(&mut state, link.relation, edge))
            .count())
    }

    async fn link_by_uri(&self, link: &UriLink) -> Result<usize> {
        let mut state = self.lock();
        let source = link.relation.source();
        let kind = link.relation.target().key_kind();
        let edges: Vec<Edge> = state
            .nodes
            .iter()
            .filter(|((label, _), _)| *label == source)
            .filter_map(|((_, key), props)| {
                let uri = props.get(link.source_attribute)?.as_str()?;
                Some(Edge::new(key.clone(), uri_key(uri, kind)?))
            })
            .collect();

        Ok(edges
            .iter()
            .filter(|edge| merge_edge(&mut state, link.relation, edge))
            .count())
    }

    async fn node_keys(&self, label: Label) -> Result<Vec<NodeKey>> {
        Ok(self
            .lock()
            .nodes
            .keys()
            .filter(|(l, _)| *l == label)
            .map(|(_, key)| key.clone())
            .collect())
    }

    async fn text_attribute(&self, label: Label, attribute: &str) -> Result<Vec<(NodeKey, String)>> {
        Ok(self
            .lock()
            .nodes
            .iter()
            .filter(|((l, _), _)| *l == label)
            .filter_map(|((_, key), props)| {
                let value = props.get(attribute)?.as_str()?;
                Some((key.clone(), value.to_string()))
            })
            .collect())
    }

    async fn counts(&self) -> Result<GraphCounts> {
        let state = self.lock();
        Ok(GraphCounts {
            nodes: state.nodes.len(),
            relationships: state.edges.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deputy(id: i64, props: &[(&str, PropertyValue)]) -> Node {
        let props = props
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        Node::new("id", NodeKey::Int(id), props)
    }

    #[tokio::test]
    async fn test_upsert_merges_without_clearing() {
        let store = MemoryGraph::new();
        store
            .upsert_node(Label::Deputy, &deputy(1, &[("nome", "Ana".into()), ("siglaUf", "SP".into())]))
            .await
            .unwrap();
        store
            .upsert_nodes(
                Label::Deputy,
                &[deputy(1, &[("nome", "Ana Maria".into()), ("siglaUf", PropertyValue::Null)])],
            )
            .await
            .unwrap();

        let props = store.node(Label::Deputy, &NodeKey::Int(1)).unwrap();
        assert_eq!(props.get("nome"), Some(&PropertyValue::from("Ana Maria")));
        assert_eq!(props.get("siglaUf"), Some(&PropertyValue::from("SP")));
        assert_eq!(props.get("id"), Some(&PropertyValue::Int(1)));
        assert_eq!(store.node_count(Label::Deputy), 1);
    }

    #[tokio::test]
    async fn test_create_missing_leaves_existing_untouched() {
        let store = MemoryGraph::new();
        let full = Node::new(
            "id",
            NodeKey::Int(5),
            Properties::from([("ementa".to_string(), PropertyValue::from("completa"))]),
        );
        store.upsert_node(Label::Proposition, &full).await.unwrap();

        let summaries = vec![
            Node::new(
                "id",
                NodeKey::Int(5),
                Properties::from([("ementa".to_string(), PropertyValue::from("resumo"))]),
            ),
            Node::new("id", NodeKey::Int(6), Properties::new()),
        ];
        let created = store.create_missing_nodes(Label::Proposition, &summaries).await.unwrap();

        assert_eq!(created, 1);
        let props = store.node(Label::Proposition, &NodeKey::Int(5)).unwrap();
        assert_eq!(props.get("ementa"), Some(&PropertyValue::from("completa")));
    }

    #[tokio::test]
    async fn test_merge_edges_skips_missing_endpoints() {
        let store = MemoryGraph::new();
        store.upsert_node(Label::Deputy, &deputy(1, &[])).await.unwrap();
        store
            .upsert_node(Label::Organ, &Node::new("id", NodeKey::Int(10), Properties::new()))
            .await
            .unwrap();

        let edges = vec![
            Edge::new(1, 10).with_properties(Properties::from([(
                "title".to_string(),
                PropertyValue::from("Titular"),
            )])),
            Edge::new(1, 11),
            Edge::new(2, 10),
        ];
        assert_eq!(store.merge_edges(Relation::MemberOf, &edges).await.unwrap(), 1);
        assert_eq!(store.merge_edges(Relation::MemberOf, &edges).await.unwrap(), 0);

        let props = store
            .edge(Relation::MemberOf, &NodeKey::Int(1), &NodeKey::Int(10))
            .unwrap();
        assert_eq!(props.get("title"), Some(&PropertyValue::from("Titular")));
        assert_eq!(store.counts().await.unwrap(), GraphCounts { nodes: 2, relationships: 1 });
    }

    #[tokio::test]
    async fn test_text_attribute_skips_missing() {
        let store = MemoryGraph::new();
        store
            .upsert_nodes(
                Label::Deputy,
                &[deputy(1, &[("uri", "https://x/1".into())]), deputy(2, &[])],
            )
            .await
            .unwrap();
        let values = store.text_attribute(Label::Deputy, "uri").await.unwrap();
        assert_eq!(values, vec![(NodeKey::Int(1), "https://x/1".to_string())]);
    }
}
