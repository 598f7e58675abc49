//! Project, user, layer and document types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A user account; only the name matters here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub username: String,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

/// An annotation project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
}

impl Project {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

/// Structural kind of an annotation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LayerType {
    #[default]
    Span,
    Relation,
    Chain,
}

impl LayerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayerType::Span => "span",
            LayerType::Relation => "relation",
            LayerType::Chain => "chain",
        }
    }
}

/// A schema layer owning zero or more recommenders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnnotationLayer {
    pub id: i64,
    pub project_id: i64,
    /// Internal type name, e.g. `webanno.custom.Entity`
    pub name: String,
    /// Name shown to users
    pub ui_name: String,
    #[serde(default)]
    pub layer_type: LayerType,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl AnnotationLayer {
    /// Create an enabled span layer.
    pub fn new(id: i64, project_id: i64, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id,
            project_id,
            ui_name: name.clone(),
            name,
            layer_type: LayerType::Span,
            enabled: true,
        }
    }

    pub fn with_type(mut self, layer_type: LayerType) -> Self {
        self.layer_type = layer_type;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Reference to a source document of a project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentRef {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
}

impl DocumentRef {
    pub fn new(id: i64, project_id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            project_id,
            name: name.into(),
        }
    }
}

/// A single annotation inside a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub layer_id: i64,
    pub begin: usize,
    pub end: usize,
    #[serde(default)]
    pub features: BTreeMap<String, String>,
}

impl Annotation {
    pub fn new(layer_id: i64, begin: usize, end: usize) -> Self {
        Self {
            layer_id,
            begin,
            end,
            features: BTreeMap::new(),
        }
    }

    pub fn with_feature(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.features.insert(name.into(), value.into());
        self
    }

    pub fn feature(&self, name: &str) -> Option<&str> {
        self.features.get(name).map(String::as_str)
    }
}

/// Read-only view of a document's text and one user's annotations on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedDocument {
    pub document: DocumentRef,
    /// Owner of the annotations
    pub user: String,
    pub text: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl AnnotatedDocument {
    /// Annotations of one layer, in document order.
    pub fn annotations_on(&self, layer_id: i64) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter().filter(move |a| a.layer_id == layer_id)
    }

    /// Text covered by an annotation, if the offsets are in range.
    pub fn covered_text(&self, annotation: &Annotation) -> Option<&str> {
        self.text.get(annotation.begin..annotation.end)
    }
}
