//! Resource instances - the cataloged elements of the graph
//!
//! A resource is one element of a given kind, identified by a name unique
//! within that kind. It carries scalar annotations (strings, numbers,
//! booleans) and declares outgoing relations as verb → target kind →
//! ordered target names. Back-references are derived by the graph, never
//! stored on the instance.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Declared outgoing relations: verb → target kind → ordered target names.
pub type RelationMap = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// Identity of a resource: kind plus name, unique per graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceKey {
    pub kind: String,
    pub name: String,
}

impl ResourceKey {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}

/// Loader input for one resource: the full boundary contract with
/// whatever parses records out of files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Kind name; must match a registered kind schema
    pub kind: String,
    /// Instance name, unique within the kind
    pub name: String,
    /// Scalar annotation values keyed by annotation key
    #[serde(default)]
    pub annotations: BTreeMap<String, Value>,
    /// Declared outgoing relations
    #[serde(default)]
    pub relations: RelationMap,
}

impl ResourceRecord {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            annotations: BTreeMap::new(),
            relations: RelationMap::new(),
        }
    }

    /// Set one annotation value
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    /// Append one relation target
    pub fn with_relation(
        mut self,
        verb: impl Into<String>,
        target_kind: impl Into<String>,
        target_name: impl Into<String>,
    ) -> Self {
        self.relations
            .entry(verb.into())
            .or_default()
            .entry(target_kind.into())
            .or_default()
            .push(target_name.into());
        self
    }
}

/// A loaded resource instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Kind name of this resource
    pub kind: String,
    /// Instance name, unique within the kind
    pub name: String,
    /// Scalar annotation values
    pub annotations: BTreeMap<String, Value>,
    /// Declared outgoing relations (resolved edges live in the graph index)
    pub relations: RelationMap,
}

impl Resource {
    pub(crate) fn from_record(record: ResourceRecord) -> Self {
        Self {
            kind: record.kind,
            name: record.name,
            annotations: record.annotations,
            relations: record.relations,
        }
    }

    /// Identity of this resource
    pub fn key(&self) -> ResourceKey {
        ResourceKey::new(&self.kind, &self.name)
    }

    /// Look up one annotation value
    pub fn annotation(&self, key: &str) -> Option<&Value> {
        self.annotations.get(key)
    }

    /// One annotation value as a number, if present and numeric
    pub fn annotation_number(&self, key: &str) -> Option<f64> {
        self.annotations.get(key).and_then(scalar_number)
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}

/// String form of a scalar annotation value.
///
/// Strings render without quotes; other scalars use their JSON form.
pub fn scalar_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Numeric form of a scalar annotation value, if it has one.
pub fn scalar_number(value: &Value) -> Option<f64> {
    value.as_f64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_builder() {
        let record = ResourceRecord::new("Component", "billing")
            .with_annotation("status", "current")
            .with_annotation("cost", 12)
            .with_relation("realizes", "Requirement", "invoicing")
            .with_relation("realizes", "Requirement", "reporting");

        assert_eq!(record.annotations.len(), 2);
        assert_eq!(
            record.relations["realizes"]["Requirement"],
            vec!["invoicing", "reporting"]
        );
    }

    #[test]
    fn test_scalar_forms() {
        assert_eq!(scalar_string(&json!("plain")), "plain");
        assert_eq!(scalar_string(&json!(42)), "42");
        assert_eq!(scalar_string(&json!(true)), "true");

        assert_eq!(scalar_number(&json!(2.5)), Some(2.5));
        assert_eq!(scalar_number(&json!("text")), None);
    }

    #[test]
    fn test_resource_accessors() {
        let resource = Resource::from_record(
            ResourceRecord::new("Component", "billing").with_annotation("cost", 12),
        );

        assert_eq!(resource.key(), ResourceKey::new("Component", "billing"));
        assert_eq!(resource.annotation_number("cost"), Some(12.0));
        assert!(resource.annotation("missing").is_none());
        assert_eq!(resource.to_string(), "Component/billing");
    }
}
