//! The write surface of the property graph.
//!
//! [`GraphStore`] is implemented by the Neo4j client and by
//! [`MemoryGraph`]. Every write is an idempotent merge: nodes are located
//! by natural key, edges by `(source, type, target)`, and supplied
//! properties overwrite existing ones without clearing the rest. Null
//! property values are never written.

pub mod memory;
pub mod neo4j;

use anyhow::Result;
use async_trait::async_trait;

use camara_core::{Label, Node, NodeKey, Properties};

pub use memory::{GraphSnapshot, MemoryGraph};

/// Relationship types and the labels they connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Relation {
    AffiliatedWith,
    MemberOf,
    OccurredIn,
    RefersTo,
    AuthorOf,
    VotedIn,
}

impl Relation {
    /// The Neo4j relationship type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::AffiliatedWith => "AFFILIATED_WITH",
            Relation::MemberOf => "MEMBER_OF",
            Relation::OccurredIn => "OCCURRED_IN",
            Relation::RefersTo => "REFERS_TO",
            Relation::AuthorOf => "AUTHOR_OF",
            Relation::VotedIn => "VOTED_IN",
        }
    }

    pub fn source(&self) -> Label {
        match self {
            Relation::AffiliatedWith | Relation::MemberOf | Relation::AuthorOf | Relation::VotedIn => {
                Label::Deputy
            }
            Relation::OccurredIn | Relation::RefersTo => Label::Votation,
        }
    }

    pub fn target(&self) -> Label {
        match self {
            Relation::AffiliatedWith => Label::Party,
            Relation::MemberOf | Relation::OccurredIn => Label::Organ,
            Relation::RefersTo | Relation::AuthorOf => Label::Proposition,
            Relation::VotedIn => Label::Votation,
        }
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An edge between two nodes identified by natural key.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub from: NodeKey,
    pub to: NodeKey,
    pub properties: Properties,
}

impl Edge {
    pub fn new(from: impl Into<NodeKey>, to: impl Into<NodeKey>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            properties: Properties::new(),
        }
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }
}

/// Link source nodes to the target whose key equals `source_attribute`.
#[derive(Debug, Clone, Copy)]
pub struct AttributeLink {
    pub relation: Relation,
    pub source_attribute: &'static str,
}

/// Link source nodes to the target whose key is the last path segment of
/// the URI stored in `source_attribute`.
#[derive(Debug, Clone, Copy)]
pub struct UriLink {
    pub relation: Relation,
    pub source_attribute: &'static str,
}

/// Node and relationship counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphCounts {
    pub nodes: usize,
    pub relationships: usize,
}

/// Idempotent graph writes plus the reads that drive enrichment loops.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Declare the uniqueness constraint on `label`'s key. Safe to repeat.
    async fn ensure_constraint(&self, label: Label) -> Result<()>;

    /// Merge a batch of nodes in one transaction. Returns the batch size.
    async fn upsert_nodes(&self, label: Label, nodes: &[Node]) -> Result<usize>;

    /// Merge a single node.
    async fn upsert_node(&self, label: Label, node: &Node) -> Result<()>;

    /// Create the nodes that do not exist yet; existing nodes are untouched.
    /// Returns how many were created.
    async fn create_missing_nodes(&self, label: Label, nodes: &[Node]) -> Result<usize>;

    /// Merge edges whose endpoints both exist; the rest are skipped.
    /// Returns how many edges were newly created.
    async fn merge_edges(&self, relation: Relation, edges: &[Edge]) -> Result<usize>;

    /// Derive edges from a shared attribute value. Returns new edge count.
    async fn link_by_attribute(&self, link: &AttributeLink) -> Result<usize>;

    /// Derive edges from a URI attribute. Returns new edge count.
    async fn link_by_uri(&self, link: &UriLink) -> Result<usize>;

    /// Keys of every stored node with `label`.
    async fn node_keys(&self, label: Label) -> Result<Vec<NodeKey>>;

    /// `(key, value)` for every `label` node whose `attribute` is a string.
    async fn text_attribute(&self, label: Label, attribute: &str) -> Result<Vec<(NodeKey, String)>>;

    async fn counts(&self) -> Result<GraphCounts>;
}
