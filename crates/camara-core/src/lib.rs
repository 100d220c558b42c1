//! # Camara Core
//!
//! Shared building blocks for the camara ingestion pipeline:
//! configuration, the graph data model and the normalization of
//! upstream records into storable node properties.

pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod record;

pub use config::{ApiConfig, Config, GraphConfig, ThrottleConfig, VotationWindow};
pub use error::{ConfigError, ConfigResult};
pub use model::{KeyKind, Label, Node, NodeKey, Properties, PropertyValue};
pub use record::ApiRecord;
