//! Query evaluation over a graph snapshot
//!
//! Evaluation is three-valued with respect to missing annotations: a
//! comparison against an absent key is simply false, never an error. The
//! keys `name` and `kind` resolve to the instance's own fields before the
//! annotation map. Matching uses the annotation value's string form.

use crate::graph::{ResourceGraph, ResourceId};
use crate::resource::{Resource, scalar_string};

use super::parser::QueryExpr;

/// Evaluate an expression against every instance in the graph.
///
/// When the expression pins a kind at its top level, the scan narrows to
/// that kind; this changes nothing observable, only the work done.
/// Result order is unspecified.
pub fn evaluate(graph: &ResourceGraph, expr: &QueryExpr) -> Vec<ResourceId> {
    match kind_hint(expr) {
        Some(kind) => {
            tracing::debug!(kind, "narrowing query scan to one kind");
            graph
                .ids_by_kind(kind)
                .iter()
                .copied()
                .filter(|id| matches(graph.resource(*id), expr))
                .collect()
        }
        None => graph
            .ids()
            .filter(|id| matches(graph.resource(*id), expr))
            .collect(),
    }
}

/// A kind the whole expression cannot match outside of, if one is pinned.
///
/// `Kind(k)` pins `k`; a conjunction pins whatever either side pins. Any
/// other shape (disjunction, negation, comparison) pins nothing.
fn kind_hint(expr: &QueryExpr) -> Option<&str> {
    match expr {
        QueryExpr::Kind(name) => Some(name),
        QueryExpr::And(left, right) => kind_hint(left).or_else(|| kind_hint(right)),
        _ => None,
    }
}

fn matches(resource: &Resource, expr: &QueryExpr) -> bool {
    match expr {
        QueryExpr::True => true,
        QueryExpr::Kind(name) => resource.kind == *name,
        QueryExpr::Eq { key, value } => {
            lookup(resource, key).is_some_and(|actual| actual == *value)
        }
        QueryExpr::Matches { key, pattern } => {
            lookup(resource, key).is_some_and(|actual| pattern.is_match(&actual))
        }
        QueryExpr::And(left, right) => matches(resource, left) && matches(resource, right),
        QueryExpr::Or(left, right) => matches(resource, left) || matches(resource, right),
        QueryExpr::Not(inner) => !matches(resource, inner),
    }
}

/// String form of the queried key: built-in `name`/`kind`, then annotations.
fn lookup(resource: &Resource, key: &str) -> Option<String> {
    match key {
        "name" => Some(resource.name.clone()),
        "kind" => Some(resource.kind.clone()),
        _ => resource.annotation(key).map(scalar_string),
    }
}
