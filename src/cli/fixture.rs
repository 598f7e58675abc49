//! Project fixtures for dry-run selections.
//!
//! A fixture describes one project in YAML:
//!
//! ```yaml
//! project: { id: 1, name: demo }
//! user: alice
//! layers:
//!   - { id: 1, name: webanno.custom.Entity, ui-name: Named entity }
//! recommenders:
//!   - id: 1
//!     name: ner
//!     tool: replay
//!     layer: 1
//!     feature: value
//!     threshold: 0.5
//!     recorded:
//!       - { gold: PER, predicted: PER }
//! documents:
//!   - id: 1
//!     name: doc1.txt
//!     text: Alice met Bob
//!     annotations:
//!       - { layer_id: 1, begin: 0, end: 5, features: { value: PER } }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use eyre::{Context, Result, bail};
use recsel::domain::{
    AnnotatedDocument, Annotation, AnnotationLayer, DocumentRef, LabelPair, LayerType, Project, Recommender,
};
use recsel::service::{InMemoryDocumentSource, InMemoryRecommenderRepository};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LayerSpec {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub ui_name: Option<String>,
    #[serde(default)]
    pub layer_type: LayerType,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RecommenderSpec {
    pub id: i64,
    pub name: String,
    #[serde(default = "default_tool")]
    pub tool: String,
    pub layer: i64,
    pub feature: String,
    #[serde(default)]
    pub threshold: f64,
    #[serde(default)]
    pub always_selected: bool,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Held-out predictions replayed by the `replay` tool
    #[serde(default)]
    pub recorded: Vec<LabelPair>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentSpec {
    pub id: i64,
    pub name: String,
    /// Annotator; defaults to the fixture user
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

/// A project with its schema, recommenders and corpus.
#[derive(Debug, Clone, Deserialize)]
pub struct Fixture {
    pub project: Project,
    pub user: String,
    #[serde(default)]
    pub layers: Vec<LayerSpec>,
    #[serde(default)]
    pub recommenders: Vec<RecommenderSpec>,
    #[serde(default)]
    pub documents: Vec<DocumentSpec>,
}

fn default_true() -> bool {
    true
}

fn default_tool() -> String {
    "replay".to_string()
}

impl Fixture {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).context(format!("Failed to read fixture {}", path.display()))?;
        Self::parse(&content).context(format!("Invalid fixture {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let fixture: Fixture = serde_yaml::from_str(content).context("Failed to parse fixture YAML")?;
        fixture.validate()?;
        Ok(fixture)
    }

    fn validate(&self) -> Result<()> {
        for recommender in &self.recommenders {
            if !self.layers.iter().any(|l| l.id == recommender.layer) {
                bail!(
                    "Recommender [{}] refers to unknown layer {}",
                    recommender.name,
                    recommender.layer
                );
            }
        }
        Ok(())
    }

    pub fn layers(&self) -> Vec<AnnotationLayer> {
        self.layers
            .iter()
            .map(|spec| {
                let mut layer = AnnotationLayer::new(spec.id, self.project.id, spec.name.clone()).with_type(spec.layer_type);
                if let Some(ui_name) = &spec.ui_name {
                    layer.ui_name = ui_name.clone();
                }
                layer.enabled = spec.enabled;
                layer
            })
            .collect()
    }

    pub fn recommenders(&self) -> Vec<Recommender> {
        let layers = self.layers();
        self.recommenders
            .iter()
            .filter_map(|spec| {
                let layer = layers.iter().find(|l| l.id == spec.layer)?.clone();
                let mut recommender = Recommender::new(spec.id, spec.name.clone(), spec.tool.clone(), layer, spec.feature.clone())
                    .with_threshold(spec.threshold);
                recommender.always_selected = spec.always_selected;
                recommender.enabled = spec.enabled;
                Some(recommender)
            })
            .collect()
    }

    /// Recorded held-out predictions per recommender id
    pub fn recordings(&self) -> HashMap<i64, Vec<LabelPair>> {
        self.recommenders
            .iter()
            .filter(|spec| !spec.recorded.is_empty())
            .map(|spec| (spec.id, spec.recorded.clone()))
            .collect()
    }

    pub fn repository(&self) -> InMemoryRecommenderRepository {
        let repository = InMemoryRecommenderRepository::new();
        for layer in self.layers() {
            repository.add_layer(layer);
        }
        for recommender in self.recommenders() {
            repository.add_recommender(recommender);
        }
        repository
    }

    pub fn document_source(&self) -> InMemoryDocumentSource {
        let source = InMemoryDocumentSource::new();
        for spec in &self.documents {
            source.add_annotated(AnnotatedDocument {
                document: DocumentRef::new(spec.id, self.project.id, spec.name.clone()),
                user: spec.user.clone().unwrap_or_else(|| self.user.clone()),
                text: spec.text.clone(),
                annotations: spec.annotations.clone(),
            });
        }
        source
    }
}
