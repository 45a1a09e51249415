//! # Archgraph - Architecture Resource Catalog
//!
//! Typed resource graph for cataloging architecture elements.
//!
//! Archgraph provides:
//! - Kind schemas describing resource classes (layer, icon, annotations, relation verbs)
//! - An in-memory resource graph with forward and backward relation indexes
//! - A small query language for filtering resources by kind and annotation
//! - Direct and transitive relation traversal
//! - An analysis context that runs scripts against a graph snapshot and
//!   collects structured report sections

pub mod schema;
pub mod resource;
pub mod graph;
pub mod store;
pub mod traverse;
pub mod query;
pub mod analysis;
pub mod api;
pub mod config;

// Re-exports for convenient access
pub use schema::{AnnotationDef, RelationDef, ResourceKind};
pub use resource::{Resource, ResourceKey, ResourceRecord};
pub use graph::{GraphBuilder, LoadOptions, LoadWarning, ResourceGraph, ResourceId};
pub use store::ResourceStore;
pub use traverse::Traversal;
pub use query::{QueryError, QueryExpr};
pub use analysis::{AnalysisContext, MessageLevel, Section, run_analysis};

/// Result type alias for archgraph operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for archgraph operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unknown resource kind: {0}")]
    UnknownKind(String),

    #[error("Duplicate resource kind: {0}")]
    DuplicateKind(String),

    #[error("Duplicate instance: {kind}/{name}")]
    DuplicateInstance { kind: String, name: String },

    #[error("{0} relation target(s) could not be resolved")]
    UnresolvedRelations(usize),

    #[error("Query error: {0}")]
    Query(#[from] query::QueryError),
}
