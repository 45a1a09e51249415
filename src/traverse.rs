//! Relation traversal - direct and transitive walks over the graph
//!
//! Direct walks return edge targets in stored order without
//! deduplication: two verbs pointing at the same resource yield it twice.
//! Transitive walks are breadth-first, visit every resource at most once
//! (cycles terminate), never include the start resource, and apply the
//! optional kind filter to the result set only - traversal itself follows
//! every verb and kind, so a filtered result may be reached through
//! non-matching intermediates.

use std::collections::{HashSet, VecDeque};

use crate::graph::{ResourceGraph, ResourceId};

/// Direction for edge traversal
#[derive(Debug, Clone, Copy)]
enum Direction {
    Outgoing,
    Incoming,
}

/// Traversal engine over one graph snapshot.
pub struct Traversal<'a> {
    graph: &'a ResourceGraph,
}

impl<'a> Traversal<'a> {
    /// Create a traversal engine bound to a graph snapshot
    pub fn new(graph: &'a ResourceGraph) -> Self {
        Self { graph }
    }

    /// Direct relation targets across all verbs, edge-declaration order
    pub fn outgoing(&self, id: ResourceId, kind: Option<&str>) -> Vec<ResourceId> {
        self.direct(id, kind, Direction::Outgoing)
    }

    /// Direct back-reference sources, index discovery order
    pub fn incoming(&self, id: ResourceId, kind: Option<&str>) -> Vec<ResourceId> {
        self.direct(id, kind, Direction::Incoming)
    }

    /// Everything reachable by following outgoing edges, breadth-first
    pub fn outgoing_transitive(&self, id: ResourceId, kind: Option<&str>) -> Vec<ResourceId> {
        self.transitive(id, kind, Direction::Outgoing)
    }

    /// Everything that reaches this resource, breadth-first
    pub fn incoming_transitive(&self, id: ResourceId, kind: Option<&str>) -> Vec<ResourceId> {
        self.transitive(id, kind, Direction::Incoming)
    }

    fn neighbors(&self, id: ResourceId, direction: Direction) -> Vec<ResourceId> {
        match direction {
            Direction::Outgoing => self.graph.edges_from(id).iter().map(|e| e.to).collect(),
            Direction::Incoming => self.graph.edges_to(id).iter().map(|e| e.from).collect(),
        }
    }

    fn matches_kind(&self, id: ResourceId, kind: Option<&str>) -> bool {
        match kind {
            Some(k) => self.graph.resource(id).kind == k,
            None => true,
        }
    }

    fn direct(&self, id: ResourceId, kind: Option<&str>, direction: Direction) -> Vec<ResourceId> {
        self.neighbors(id, direction)
            .into_iter()
            .filter(|neighbor| self.matches_kind(*neighbor, kind))
            .collect()
    }

    fn transitive(&self, start: ResourceId, kind: Option<&str>, direction: Direction) -> Vec<ResourceId> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        let mut results = Vec::new();

        // The start resource itself is never part of the result
        visited.insert(start);
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            for neighbor in self.neighbors(current, direction) {
                if visited.insert(neighbor) {
                    if self.matches_kind(neighbor, kind) {
                        results.push(neighbor);
                    }
                    queue.push_back(neighbor);
                }
            }
        }

        results
    }
}
