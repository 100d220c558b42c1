//! # Camara Graph
//!
//! Neo4j ingestion of the Câmara dos Deputados open-data API.
//!
//! Provides the graph store seam (Neo4j or in-memory), idempotent node
//! upserts, cross-entity linking, and the per-entity ingestion runs.

pub mod client;
pub mod link;
pub mod schema;
pub mod store;
pub mod sync;
pub mod upsert;

pub use client::GraphClient;
pub use store::{Edge, GraphCounts, GraphSnapshot, GraphStore, MemoryGraph, Relation};
pub use sync::{run_all, IngestContext, SyncResult};
