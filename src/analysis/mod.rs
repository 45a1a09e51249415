//! Analysis sandbox - scripts run against one graph snapshot
//!
//! An analysis script receives an [`AnalysisContext`] and nothing else:
//! graph lookups, traversal, queries, aggregation helpers and report
//! primitives form the whole capability surface. The context borrows one
//! immutable snapshot, so a script can never mutate the store or observe
//! a reload that happens mid-run.
//!
//! Script failures propagate to the caller as-is; the sandbox performs no
//! error-to-section conversion and defines no timeout policy. Hosts that
//! want resilient reports catch at the call site.

pub mod aggregate;
pub mod report;
pub mod section;

pub use report::Report;
pub use section::{MessageLevel, Section};

use serde_json::Value;
use std::collections::BTreeMap;

use crate::graph::{ResourceGraph, ResourceId};
use crate::query::{self, QueryError};
use crate::resource::Resource;
use crate::traverse::Traversal;

/// Run a script against a graph snapshot and collect its sections.
///
/// Whatever the script raises surfaces unchanged to the caller.
pub fn run_analysis<F>(graph: &ResourceGraph, script: F) -> anyhow::Result<Vec<Section>>
where
    F: FnOnce(&mut AnalysisContext<'_>) -> anyhow::Result<()>,
{
    let mut context = AnalysisContext::new(graph);
    script(&mut context)?;
    Ok(context.into_sections())
}

/// The closed capability set exposed to analysis scripts.
pub struct AnalysisContext<'a> {
    graph: &'a ResourceGraph,
    report: Report,
}

impl<'a> AnalysisContext<'a> {
    /// Bind a fresh context to a graph snapshot
    pub fn new(graph: &'a ResourceGraph) -> Self {
        Self {
            graph,
            report: Report::new(),
        }
    }

    // --- Graph access ---

    /// All instances of a kind, load order; empty for an unknown kind
    pub fn instances(&self, kind: &str) -> Vec<&'a Resource> {
        self.graph.instances_by_kind(kind)
    }

    /// Invoke `body` once per instance of a kind
    pub fn each_instance<F>(&mut self, kind: &str, mut body: F)
    where
        F: FnMut(&mut AnalysisContext<'a>, &'a Resource),
    {
        let graph = self.graph;
        for resource in graph.instances_by_kind(kind) {
            body(self, resource);
        }
    }

    /// One instance by kind and name
    pub fn instance(&self, kind: &str, name: &str) -> Option<&'a Resource> {
        self.graph.instance(kind, name)
    }

    /// Instance name
    pub fn name(&self, resource: &Resource) -> String {
        resource.name.clone()
    }

    /// Instance kind name
    pub fn kind(&self, resource: &Resource) -> String {
        resource.kind.clone()
    }

    /// One annotation value
    pub fn annotation(&self, resource: &'a Resource, key: &str) -> Option<&'a Value> {
        resource.annotation(key)
    }

    /// The full annotation mapping, immutable
    pub fn annotations(&self, resource: &'a Resource) -> &'a BTreeMap<String, Value> {
        &resource.annotations
    }

    // --- Traversal access ---

    /// Direct relation targets, optionally filtered by kind
    pub fn outgoing(&self, resource: &Resource, kind: Option<&str>) -> Vec<&'a Resource> {
        self.walk(resource, kind, |t, id, k| t.outgoing(id, k))
    }

    /// Everything transitively reachable along outgoing edges
    pub fn outgoing_transitive(&self, resource: &Resource, kind: Option<&str>) -> Vec<&'a Resource> {
        self.walk(resource, kind, |t, id, k| t.outgoing_transitive(id, k))
    }

    /// Direct back-reference sources, optionally filtered by kind
    pub fn incoming(&self, resource: &Resource, kind: Option<&str>) -> Vec<&'a Resource> {
        self.walk(resource, kind, |t, id, k| t.incoming(id, k))
    }

    /// Everything that transitively reaches this resource
    pub fn incoming_transitive(&self, resource: &Resource, kind: Option<&str>) -> Vec<&'a Resource> {
        self.walk(resource, kind, |t, id, k| t.incoming_transitive(id, k))
    }

    fn walk<F>(&self, resource: &Resource, kind: Option<&str>, op: F) -> Vec<&'a Resource>
    where
        F: FnOnce(&Traversal<'a>, ResourceId, Option<&str>) -> Vec<ResourceId>,
    {
        let Some(id) = self.graph.lookup(&resource.kind, &resource.name) else {
            return Vec::new();
        };
        let traversal = Traversal::new(self.graph);
        op(&traversal, id, kind)
            .into_iter()
            .map(|id| self.graph.resource(id))
            .collect()
    }

    // --- Query access ---

    /// Compile and evaluate a query; results sorted by instance name.
    ///
    /// Malformed input raises [`QueryError`] to the script.
    pub fn query(&self, text: &str) -> Result<Vec<&'a Resource>, QueryError> {
        let mut results: Vec<_> = query::execute(self.graph, text)?
            .into_iter()
            .map(|id| self.graph.resource(id))
            .collect();
        results.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(results)
    }

    // --- Report building ---

    /// Append a heading
    pub fn heading(&mut self, text: impl Into<String>, level: u8) {
        self.report.heading(text, level);
    }

    /// Append a text block
    pub fn text(&mut self, content: impl Into<String>) {
        self.report.text(content);
    }

    /// Append a leveled message
    pub fn message(&mut self, level: MessageLevel, text: impl Into<String>) {
        self.report.message(level, text);
    }

    /// Append an info message
    pub fn info(&mut self, text: impl Into<String>) {
        self.report.info(text);
    }

    /// Append a warning message
    pub fn warning(&mut self, text: impl Into<String>) {
        self.report.warning(text);
    }

    /// Append an error message
    pub fn error(&mut self, text: impl Into<String>) {
        self.report.error(text);
    }

    /// Append a table; nothing for empty rows
    pub fn table(&mut self, headers: Vec<String>, rows: Vec<Vec<String>>) {
        self.report.table(headers, rows);
    }

    /// Append a list; nothing for empty items
    pub fn list(&mut self, items: Vec<String>) {
        self.report.list(items);
    }

    /// Append a code block
    pub fn code(&mut self, content: impl Into<String>, language: Option<String>) {
        self.report.code(content, language);
    }

    /// Shape-driven section emission, see [`Report::report`]
    pub fn report(&mut self, value: &Value, title: Option<&str>) {
        self.report.report(value, title);
    }

    /// Hand the collected sections to the caller
    pub fn into_sections(self) -> Vec<Section> {
        self.report.into_sections()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use crate::resource::ResourceRecord;
    use crate::schema::ResourceKind;
    use serde_json::json;

    fn sample_graph() -> ResourceGraph {
        let mut builder = GraphBuilder::new();
        builder.register_kind(ResourceKind::new("ApplicationService")).unwrap();
        builder.register_kind(ResourceKind::new("Component")).unwrap();
        builder
            .load_instance(
                ResourceRecord::new("ApplicationService", "checkout")
                    .with_annotation("cost", 10)
                    .with_relation("realized-by", "Component", "cart"),
            )
            .unwrap();
        builder
            .load_instance(
                ResourceRecord::new("ApplicationService", "billing").with_annotation("cost", 5),
            )
            .unwrap();
        builder.load_instance(ResourceRecord::new("Component", "cart")).unwrap();
        builder.finish().0
    }

    #[test]
    fn test_each_instance_visits_all() {
        let graph = sample_graph();
        let sections = run_analysis(&graph, |ctx| {
            let expected = ctx.instances("ApplicationService").len();
            let mut seen = 0;
            ctx.each_instance("ApplicationService", |ctx, resource| {
                seen += 1;
                ctx.text(resource.name.clone());
            });
            assert_eq!(seen, expected);
            Ok(())
        })
        .unwrap();
        assert_eq!(sections.len(), 2);
    }

    #[test]
    fn test_instance_miss_is_none() {
        let graph = sample_graph();
        run_analysis(&graph, |ctx| {
            assert!(ctx.instance("ApplicationService", "absent").is_none());
            assert!(ctx.annotation(ctx.instance("Component", "cart").unwrap(), "cost").is_none());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_annotations_snapshot_is_detached_from_clone_edits() {
        let graph = sample_graph();
        run_analysis(&graph, |ctx| {
            let checkout = ctx.instance("ApplicationService", "checkout").unwrap();
            let mut copy = ctx.annotations(checkout).clone();
            copy.insert("cost".into(), json!(999));
            // the graph still serves the original value
            assert_eq!(ctx.annotation(checkout, "cost"), Some(&json!(10)));
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_traversal_through_context() {
        let graph = sample_graph();
        run_analysis(&graph, |ctx| {
            let checkout = ctx.instance("ApplicationService", "checkout").unwrap();
            let targets = ctx.outgoing(checkout, None);
            assert_eq!(targets.len(), 1);
            assert_eq!(targets[0].name, "cart");

            let cart = ctx.instance("Component", "cart").unwrap();
            let sources = ctx.incoming(cart, Some("ApplicationService"));
            assert_eq!(sources.len(), 1);
            assert_eq!(sources[0].name, "checkout");
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_query_sorted_by_name() {
        let graph = sample_graph();
        run_analysis(&graph, |ctx| {
            let names: Vec<_> = ctx
                .query("ApplicationService")?
                .iter()
                .map(|r| r.name.as_str())
                .collect();
            assert_eq!(names, vec!["billing", "checkout"]);

            assert!(ctx.query("bad = ").is_err());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_script_error_propagates() {
        let graph = sample_graph();
        let result = run_analysis(&graph, |ctx| {
            ctx.heading("partial", 1);
            anyhow::bail!("script exploded")
        });
        let err = result.unwrap_err();
        assert!(err.to_string().contains("script exploded"));
    }

    #[test]
    fn test_sections_in_append_order() {
        let graph = sample_graph();
        let sections = run_analysis(&graph, |ctx| {
            ctx.heading("Costs", 1);
            let costs: Vec<Option<f64>> = ctx
                .instances("ApplicationService")
                .iter()
                .map(|r| r.annotation_number("cost"))
                .collect();
            ctx.text(format!("total: {}", aggregate::sum(costs)));
            Ok(())
        })
        .unwrap();

        assert_eq!(
            sections,
            vec![
                Section::Heading { text: "Costs".into(), level: 1 },
                Section::Text { content: "total: 15".into() },
            ]
        );
    }
}
