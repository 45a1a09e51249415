//! Resource kind schemas - the type definitions governing resource classes
//!
//! A kind schema names a class of resources (e.g. `ApplicationService`,
//! `Component`, `Requirement`) and declares:
//! - a layer tag and icon tag for presentation layers
//! - the annotation keys instances may carry, with optional allowed values
//! - the relation verbs instances may declare, with their target kinds

use serde::{Deserialize, Serialize};

/// Definition of one annotation key on a resource kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationDef {
    /// Annotation key path (e.g. `lifecycle/status`)
    pub key: String,
    /// Human description of the annotation
    #[serde(default)]
    pub description: Option<String>,
    /// Allowed values; unconstrained when absent
    #[serde(default)]
    pub allowed: Option<Vec<String>>,
    /// Derivation expression for computed annotations.
    ///
    /// Carried as schema metadata for authoring tools; nothing in this
    /// crate evaluates it.
    #[serde(default)]
    pub computed: Option<String>,
}

impl AnnotationDef {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            description: None,
            allowed: None,
            computed: None,
        }
    }

    /// Set the human description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Restrict the annotation to an enumerated set of values
    pub fn with_allowed(mut self, allowed: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.allowed = Some(allowed.into_iter().map(Into::into).collect());
        self
    }

    /// Check whether a value's string form is permitted by this definition
    pub fn permits(&self, value: &str) -> bool {
        match &self.allowed {
            Some(allowed) => allowed.iter().any(|a| a == value),
            None => true,
        }
    }
}

/// Definition of one relation verb on a resource kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationDef {
    /// Relation verb (e.g. `realizes`, `uses`)
    pub verb: String,
    /// Kind name of the relation's targets
    pub target_kind: String,
    /// Human description of the relation
    #[serde(default)]
    pub description: Option<String>,
}

impl RelationDef {
    pub fn new(verb: impl Into<String>, target_kind: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            target_kind: target_kind.into(),
            description: None,
        }
    }

    /// Set the human description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Schema for one resource kind.
///
/// Immutable after registration; the graph builder rejects a second
/// registration under the same kind name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceKind {
    /// Kind name, unique within a graph (e.g. `ApplicationService`)
    pub name: String,
    /// Human description of the kind
    #[serde(default)]
    pub description: Option<String>,
    /// Architecture layer tag (e.g. `application`, `technology`)
    #[serde(default)]
    pub layer: Option<String>,
    /// Icon tag for presentation layers
    #[serde(default)]
    pub icon: Option<String>,
    /// Ordered annotation definitions
    #[serde(default)]
    pub annotations: Vec<AnnotationDef>,
    /// Ordered relation definitions
    #[serde(default)]
    pub relations: Vec<RelationDef>,
}

impl ResourceKind {
    /// Create a new kind schema with no annotations or relations
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            layer: None,
            icon: None,
            annotations: Vec::new(),
            relations: Vec::new(),
        }
    }

    /// Set the human description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the layer tag
    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = Some(layer.into());
        self
    }

    /// Set the icon tag
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Append an annotation definition
    pub fn with_annotation(mut self, def: AnnotationDef) -> Self {
        self.annotations.push(def);
        self
    }

    /// Append a relation definition
    pub fn with_relation(mut self, def: RelationDef) -> Self {
        self.relations.push(def);
        self
    }

    /// Look up an annotation definition by key
    pub fn annotation(&self, key: &str) -> Option<&AnnotationDef> {
        self.annotations.iter().find(|a| a.key == key)
    }

    /// Look up a relation definition by verb
    pub fn relation(&self, verb: &str) -> Option<&RelationDef> {
        self.relations.iter().find(|r| r.verb == verb)
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
