//! Resource Graph - in-memory snapshot of resources and their relations
//!
//! The graph owns all loaded resource instances in an arena keyed by
//! kind+name and indexes relation edges in both directions. It is built
//! once per load pass by [`GraphBuilder`] and immutable afterwards; the
//! swappable holder lives in [`crate::store`].
//!
//! Relation targets that do not resolve to a loaded instance are recorded
//! as unresolved and excluded from both edge indexes. Cross-file load
//! ordering is not guaranteed, so resolution runs once after all
//! instances of a pass are in.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::resource::{Resource, ResourceKey, ResourceRecord, scalar_string};
use crate::schema::ResourceKind;
use crate::{Error, Result};

/// Arena index of a resource within one graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ResourceId(u32);

impl ResourceId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// One resolved relation edge: source resource, verb, target resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: ResourceId,
    pub verb: String,
    pub to: ResourceId,
}

/// A declared relation whose target never resolved to a loaded instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedRelation {
    pub source: ResourceKey,
    pub verb: String,
    pub target: ResourceKey,
}

impl std::fmt::Display for UnresolvedRelation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -{}-> {}", self.source, self.verb, self.target)
    }
}

/// Non-fatal findings collected while loading and resolving a graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LoadWarning {
    /// Relation target missing after the resolution pass
    UnresolvedRelation(UnresolvedRelation),
    /// Annotation value outside the schema's allowed enum
    DisallowedValue {
        resource: ResourceKey,
        key: String,
        value: String,
    },
}

impl std::fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadWarning::UnresolvedRelation(unresolved) => {
                write!(f, "unresolved relation {}", unresolved)
            }
            LoadWarning::DisallowedValue { resource, key, value } => {
                write!(f, "{}: value {:?} not allowed for annotation {:?}", resource, value, key)
            }
        }
    }
}

/// Options for the final resolution pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Treat leftover unresolved relation targets as fatal
    pub strict_relations: bool,
}

/// Statistics about a resource graph
#[derive(Debug, Clone, Serialize)]
pub struct GraphStats {
    pub kinds: usize,
    pub resources: usize,
    pub edges: usize,
    pub unresolved: usize,
}

impl std::fmt::Display for GraphStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Resource Graph Statistics:")?;
        writeln!(f, "  Kinds: {}", self.kinds)?;
        writeln!(f, "  Resources: {}", self.resources)?;
        writeln!(f, "  Edges: {} (unresolved: {})", self.edges, self.unresolved)
    }
}

/// Immutable snapshot of resources, kinds and relation indexes.
#[derive(Debug, Default)]
pub struct ResourceGraph {
    /// Registered kind schemas by name
    kinds: BTreeMap<String, ResourceKind>,
    /// All resources, arena-indexed by [`ResourceId`]
    resources: Vec<Resource>,
    /// Identity index: kind+name → arena id
    index: HashMap<ResourceKey, ResourceId>,
    /// Resources per kind, insertion order
    by_kind: HashMap<String, Vec<ResourceId>>,
    /// Outgoing edges per resource, declaration order
    edges_from: HashMap<ResourceId, Vec<Edge>>,
    /// Incoming edges per resource, discovery order during indexing
    edges_to: HashMap<ResourceId, Vec<Edge>>,
    /// Relations whose targets never resolved
    unresolved: Vec<UnresolvedRelation>,
}

impl ResourceGraph {
    /// Create an empty graph (no kinds, no resources)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Look up a kind schema by name
    pub fn kind(&self, name: &str) -> Option<&ResourceKind> {
        self.kinds.get(name)
    }

    /// All registered kind schemas
    pub fn kinds(&self) -> impl Iterator<Item = &ResourceKind> {
        self.kinds.values()
    }

    /// Get a resource by arena id
    pub fn resource(&self, id: ResourceId) -> &Resource {
        &self.resources[id.index()]
    }

    /// Find the arena id for a kind+name pair
    pub fn lookup(&self, kind: &str, name: &str) -> Option<ResourceId> {
        self.index
            .get(&ResourceKey::new(kind, name))
            .copied()
    }

    /// All instance ids of a kind, insertion order; empty for an unknown kind
    pub fn ids_by_kind(&self, kind: &str) -> &[ResourceId] {
        self.by_kind.get(kind).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// All instances of a kind, insertion order; empty for an unknown kind
    pub fn instances_by_kind(&self, kind: &str) -> Vec<&Resource> {
        self.ids_by_kind(kind)
            .iter()
            .map(|id| self.resource(*id))
            .collect()
    }

    /// Get an instance by kind and name
    pub fn instance(&self, kind: &str, name: &str) -> Option<&Resource> {
        self.lookup(kind, name).map(|id| self.resource(id))
    }

    /// Outgoing edges from a resource, declaration order
    pub fn edges_from(&self, id: ResourceId) -> &[Edge] {
        self.edges_from.get(&id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Incoming edges to a resource, discovery order
    pub fn edges_to(&self, id: ResourceId) -> &[Edge] {
        self.edges_to.get(&id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Resolved targets of one relation verb, optionally filtered to a kind
    pub fn relations(&self, id: ResourceId, verb: &str, kind: Option<&str>) -> Vec<ResourceId> {
        self.edges_from(id)
            .iter()
            .filter(|edge| edge.verb == verb)
            .filter(|edge| match kind {
                Some(k) => self.resource(edge.to).kind == k,
                None => true,
            })
            .map(|edge| edge.to)
            .collect()
    }

    /// Back-references to a resource: (source, verb) pairs in discovery order
    pub fn references(&self, id: ResourceId) -> Vec<(ResourceId, &str)> {
        self.edges_to(id)
            .iter()
            .map(|edge| (edge.from, edge.verb.as_str()))
            .collect()
    }

    /// Relations whose targets never resolved
    pub fn unresolved(&self) -> &[UnresolvedRelation] {
        &self.unresolved
    }

    /// All resources in arena order
    pub fn all_resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    /// All resource ids in arena order
    pub fn ids(&self) -> impl Iterator<Item = ResourceId> {
        (0..self.resources.len() as u32).map(ResourceId)
    }

    /// Total number of resources
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// True when no resources are loaded
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Get statistics about the graph
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            kinds: self.kinds.len(),
            resources: self.resources.len(),
            edges: self.edges_from.values().map(|v| v.len()).sum(),
            unresolved: self.unresolved.len(),
        }
    }
}

/// Builder for one load pass: register kinds, load instances, resolve.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    kinds: BTreeMap<String, ResourceKind>,
    resources: Vec<Resource>,
    index: HashMap<ResourceKey, ResourceId>,
    by_kind: HashMap<String, Vec<ResourceId>>,
    warnings: Vec<LoadWarning>,
}

impl GraphBuilder {
    /// Create a new empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a kind schema.
    ///
    /// Fails with [`Error::DuplicateKind`] if the name is already taken.
    pub fn register_kind(&mut self, kind: ResourceKind) -> Result<()> {
        if self.kinds.contains_key(&kind.name) {
            return Err(Error::DuplicateKind(kind.name));
        }
        self.kinds.insert(kind.name.clone(), kind);
        Ok(())
    }

    /// Load one resource record.
    ///
    /// Fails with [`Error::UnknownKind`] for an unregistered kind and
    /// [`Error::DuplicateInstance`] when the kind already has an instance
    /// of that name. Relation targets are not checked here; they resolve
    /// in [`GraphBuilder::finish`].
    pub fn load_instance(&mut self, record: ResourceRecord) -> Result<ResourceId> {
        let Some(kind) = self.kinds.get(&record.kind) else {
            return Err(Error::UnknownKind(record.kind));
        };

        let key = ResourceKey::new(&record.kind, &record.name);
        if self.index.contains_key(&key) {
            return Err(Error::DuplicateInstance {
                kind: record.kind,
                name: record.name,
            });
        }

        for (annotation_key, value) in &record.annotations {
            if let Some(def) = kind.annotation(annotation_key) {
                let rendered = scalar_string(value);
                if !def.permits(&rendered) {
                    tracing::warn!(
                        resource = %key,
                        key = %annotation_key,
                        value = %rendered,
                        "annotation value outside allowed set"
                    );
                    self.warnings.push(LoadWarning::DisallowedValue {
                        resource: key.clone(),
                        key: annotation_key.clone(),
                        value: rendered,
                    });
                }
            }
        }

        let id = ResourceId(self.resources.len() as u32);
        self.by_kind.entry(record.kind.clone()).or_default().push(id);
        self.index.insert(key, id);
        self.resources.push(Resource::from_record(record));
        Ok(id)
    }

    /// Resolve declared relations and produce the finished graph.
    ///
    /// Targets still missing after the pass are reported as
    /// [`LoadWarning::UnresolvedRelation`], never raised.
    pub fn finish(self) -> (ResourceGraph, Vec<LoadWarning>) {
        let mut warnings = self.warnings;
        let mut edges_from: HashMap<ResourceId, Vec<Edge>> = HashMap::new();
        let mut edges_to: HashMap<ResourceId, Vec<Edge>> = HashMap::new();
        let mut unresolved = Vec::new();

        for (idx, resource) in self.resources.iter().enumerate() {
            let from = ResourceId(idx as u32);
            for (verb, targets_by_kind) in &resource.relations {
                for (target_kind, target_names) in targets_by_kind {
                    for target_name in target_names {
                        let target_key = ResourceKey::new(target_kind, target_name);
                        match self.index.get(&target_key) {
                            Some(&to) => {
                                let edge = Edge {
                                    from,
                                    verb: verb.clone(),
                                    to,
                                };
                                edges_from.entry(from).or_default().push(edge.clone());
                                edges_to.entry(to).or_default().push(edge);
                            }
                            None => {
                                let missing = UnresolvedRelation {
                                    source: resource.key(),
                                    verb: verb.clone(),
                                    target: target_key,
                                };
                                tracing::warn!(relation = %missing, "relation target not found");
                                unresolved.push(missing.clone());
                                warnings.push(LoadWarning::UnresolvedRelation(missing));
                            }
                        }
                    }
                }
            }
        }

        let graph = ResourceGraph {
            kinds: self.kinds,
            resources: self.resources,
            index: self.index,
            by_kind: self.by_kind,
            edges_from,
            edges_to,
            unresolved,
        };

        (graph, warnings)
    }

    /// Like [`GraphBuilder::finish`], honoring [`LoadOptions`].
    ///
    /// With `strict_relations`, leftover unresolved targets become
    /// [`Error::UnresolvedRelations`].
    pub fn finish_with(self, options: LoadOptions) -> Result<(ResourceGraph, Vec<LoadWarning>)> {
        let (graph, warnings) = self.finish();
        if options.strict_relations && !graph.unresolved.is_empty() {
            return Err(Error::UnresolvedRelations(graph.unresolved.len()));
        }
        Ok((graph, warnings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::AnnotationDef;

    fn sample_kinds(builder: &mut GraphBuilder) {
        builder
            .register_kind(
                ResourceKind::new("Component")
                    .with_annotation(AnnotationDef::new("status").with_allowed(["current", "deprecated"])),
            )
            .unwrap();
        builder.register_kind(ResourceKind::new("Requirement")).unwrap();
    }

    #[test]
    fn test_duplicate_kind_rejected() {
        let mut builder = GraphBuilder::new();
        builder.register_kind(ResourceKind::new("Component")).unwrap();
        let err = builder.register_kind(ResourceKind::new("Component")).unwrap_err();
        assert!(matches!(err, Error::DuplicateKind(name) if name == "Component"));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let mut builder = GraphBuilder::new();
        let err = builder
            .load_instance(ResourceRecord::new("Ghost", "x"))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownKind(name) if name == "Ghost"));
    }

    #[test]
    fn test_duplicate_instance_rejected() {
        let mut builder = GraphBuilder::new();
        sample_kinds(&mut builder);
        builder.load_instance(ResourceRecord::new("Component", "billing")).unwrap();
        let err = builder
            .load_instance(ResourceRecord::new("Component", "billing"))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateInstance { .. }));

        // Same name under a different kind is fine
        let mut builder = GraphBuilder::new();
        sample_kinds(&mut builder);
        builder.load_instance(ResourceRecord::new("Component", "billing")).unwrap();
        builder.load_instance(ResourceRecord::new("Requirement", "billing")).unwrap();
    }

    #[test]
    fn test_forward_reference_resolves() {
        let mut builder = GraphBuilder::new();
        sample_kinds(&mut builder);
        // Relation declared before its target is loaded
        builder
            .load_instance(
                ResourceRecord::new("Component", "billing")
                    .with_relation("realizes", "Requirement", "invoicing"),
            )
            .unwrap();
        builder.load_instance(ResourceRecord::new("Requirement", "invoicing")).unwrap();

        let (graph, warnings) = builder.finish();
        assert!(warnings.is_empty());
        assert!(graph.unresolved().is_empty());

        let billing = graph.lookup("Component", "billing").unwrap();
        let invoicing = graph.lookup("Requirement", "invoicing").unwrap();
        assert_eq!(graph.relations(billing, "realizes", None), vec![invoicing]);
        assert_eq!(graph.references(invoicing), vec![(billing, "realizes")]);
    }

    #[test]
    fn test_unresolved_target_is_warning_not_error() {
        let mut builder = GraphBuilder::new();
        sample_kinds(&mut builder);
        builder
            .load_instance(
                ResourceRecord::new("Component", "billing")
                    .with_relation("realizes", "Requirement", "missing"),
            )
            .unwrap();

        let (graph, warnings) = builder.finish();
        assert_eq!(graph.unresolved().len(), 1);
        assert_eq!(warnings.len(), 1);

        // Unresolved targets never reach either index
        let billing = graph.lookup("Component", "billing").unwrap();
        assert!(graph.relations(billing, "realizes", None).is_empty());
        assert!(graph.edges_from(billing).is_empty());
    }

    #[test]
    fn test_strict_relations_fatal() {
        let mut builder = GraphBuilder::new();
        sample_kinds(&mut builder);
        builder
            .load_instance(
                ResourceRecord::new("Component", "billing")
                    .with_relation("realizes", "Requirement", "missing"),
            )
            .unwrap();

        let err = builder
            .finish_with(LoadOptions { strict_relations: true })
            .unwrap_err();
        assert!(matches!(err, Error::UnresolvedRelations(1)));
    }

    #[test]
    fn test_disallowed_value_warning() {
        let mut builder = GraphBuilder::new();
        sample_kinds(&mut builder);
        builder
            .load_instance(ResourceRecord::new("Component", "billing").with_annotation("status", "retired"))
            .unwrap();

        let (_, warnings) = builder.finish();
        assert!(matches!(
            &warnings[0],
            LoadWarning::DisallowedValue { key, value, .. } if key == "status" && value == "retired"
        ));
    }

    #[test]
    fn test_instances_by_kind_order_and_misses() {
        let mut builder = GraphBuilder::new();
        sample_kinds(&mut builder);
        builder.load_instance(ResourceRecord::new("Component", "zeta")).unwrap();
        builder.load_instance(ResourceRecord::new("Component", "alpha")).unwrap();

        let (graph, _) = builder.finish();
        let names: Vec<_> = graph
            .instances_by_kind("Component")
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["zeta", "alpha"]); // insertion order, not sorted

        assert!(graph.instances_by_kind("Unknown").is_empty());
        assert!(graph.instance("Component", "missing").is_none());
    }

    #[test]
    fn test_relations_kind_filter() {
        let mut builder = GraphBuilder::new();
        sample_kinds(&mut builder);
        builder.register_kind(ResourceKind::new("Service")).unwrap();
        builder
            .load_instance(
                ResourceRecord::new("Component", "billing")
                    .with_relation("uses", "Requirement", "invoicing")
                    .with_relation("uses", "Service", "ledger"),
            )
            .unwrap();
        builder.load_instance(ResourceRecord::new("Requirement", "invoicing")).unwrap();
        builder.load_instance(ResourceRecord::new("Service", "ledger")).unwrap();

        let (graph, _) = builder.finish();
        let billing = graph.lookup("Component", "billing").unwrap();

        assert_eq!(graph.relations(billing, "uses", None).len(), 2);
        let only_services = graph.relations(billing, "uses", Some("Service"));
        assert_eq!(only_services.len(), 1);
        assert_eq!(graph.resource(only_services[0]).name, "ledger");
        assert!(graph.relations(billing, "unknown-verb", None).is_empty());
    }

    #[test]
    fn test_stats() {
        let mut builder = GraphBuilder::new();
        sample_kinds(&mut builder);
        builder
            .load_instance(
                ResourceRecord::new("Component", "billing")
                    .with_relation("realizes", "Requirement", "invoicing")
                    .with_relation("realizes", "Requirement", "missing"),
            )
            .unwrap();
        builder.load_instance(ResourceRecord::new("Requirement", "invoicing")).unwrap();

        let (graph, _) = builder.finish();
        let stats = graph.stats();
        assert_eq!(stats.kinds, 2);
        assert_eq!(stats.resources, 2);
        assert_eq!(stats.edges, 1);
        assert_eq!(stats.unresolved, 1);
    }
}
