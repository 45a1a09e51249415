//! Lookup and listing boundary for hosting layers
//!
//! Plain-data views over a graph snapshot, suitable for pagination and
//! serialization by whatever API layer sits on top. Listings are sorted
//! by instance name so pages are stable across calls against the same
//! snapshot.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::graph::{ResourceGraph, ResourceId};
use crate::query::{self, QueryError};

/// Listing view of one resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceSummary {
    pub kind: String,
    pub name: String,
    pub annotations: BTreeMap<String, Value>,
}

/// One resolved outgoing relation of a resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationView {
    pub verb: String,
    pub kind: String,
    pub name: String,
}

/// Detail view: summary plus resolved relations and back-references.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceDetail {
    pub kind: String,
    pub name: String,
    pub annotations: BTreeMap<String, Value>,
    /// Outgoing relations, edge order
    pub relations: Vec<RelationView>,
    /// Incoming references, discovery order
    pub references: Vec<RelationView>,
}

fn summary(graph: &ResourceGraph, id: ResourceId) -> ResourceSummary {
    let resource = graph.resource(id);
    ResourceSummary {
        kind: resource.kind.clone(),
        name: resource.name.clone(),
        annotations: resource.annotations.clone(),
    }
}

fn sorted_summaries(graph: &ResourceGraph, mut ids: Vec<ResourceId>, limit: Option<usize>) -> Vec<ResourceSummary> {
    ids.sort_by(|a, b| graph.resource(*a).name.cmp(&graph.resource(*b).name));
    if let Some(limit) = limit {
        ids.truncate(limit);
    }
    ids.into_iter().map(|id| summary(graph, id)).collect()
}

/// List all instances of a kind, sorted by name.
///
/// Empty for an unknown kind, like the underlying store lookup.
pub fn list(graph: &ResourceGraph, kind: &str, limit: Option<usize>) -> Vec<ResourceSummary> {
    sorted_summaries(graph, graph.ids_by_kind(kind).to_vec(), limit)
}

/// Fetch one resource with its relations and back-references.
pub fn get(graph: &ResourceGraph, kind: &str, name: &str) -> Option<ResourceDetail> {
    let id = graph.lookup(kind, name)?;
    let resource = graph.resource(id);

    let relations = graph
        .edges_from(id)
        .iter()
        .map(|edge| {
            let target = graph.resource(edge.to);
            RelationView {
                verb: edge.verb.clone(),
                kind: target.kind.clone(),
                name: target.name.clone(),
            }
        })
        .collect();

    let references = graph
        .edges_to(id)
        .iter()
        .map(|edge| {
            let source = graph.resource(edge.from);
            RelationView {
                verb: edge.verb.clone(),
                kind: source.kind.clone(),
                name: source.name.clone(),
            }
        })
        .collect();

    Some(ResourceDetail {
        kind: resource.kind.clone(),
        name: resource.name.clone(),
        annotations: resource.annotations.clone(),
        relations,
        references,
    })
}

/// Evaluate a query and return matching resources, sorted by name.
pub fn search(
    graph: &ResourceGraph,
    query_text: &str,
    limit: Option<usize>,
) -> Result<Vec<ResourceSummary>, QueryError> {
    let ids = query::execute(graph, query_text)?;
    Ok(sorted_summaries(graph, ids, limit))
}
