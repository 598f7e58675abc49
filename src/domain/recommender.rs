//! Recommender configuration.

use serde::{Deserialize, Serialize};

use super::project::AnnotationLayer;

/// A configured instance of a pluggable suggestion tool bound to one layer/feature.
///
/// Administrators may change a recommender at any time, so a copy held by a
/// long-running task can be stale; re-fetch it before acting on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommender {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    /// Tool kind, resolved against the factory registry
    pub tool: String,
    pub layer: AnnotationLayer,
    /// Name of the feature the recommender predicts
    pub feature: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Activate without evaluating
    #[serde(default)]
    pub always_selected: bool,
    /// Minimum F1 score required for activation; `<= 0` makes evaluation optional
    #[serde(default)]
    pub threshold: f64,
    /// Tool-specific settings
    #[serde(default)]
    pub traits: serde_json::Value,
}

fn default_true() -> bool {
    true
}

impl Recommender {
    /// Create an enabled recommender with a zero threshold.
    pub fn new(
        id: i64,
        name: impl Into<String>,
        tool: impl Into<String>,
        layer: AnnotationLayer,
        feature: impl Into<String>,
    ) -> Self {
        Self {
            id,
            project_id: layer.project_id,
            name: name.into(),
            tool: tool.into(),
            layer,
            feature: feature.into(),
            enabled: true,
            always_selected: false,
            threshold: 0.0,
            traits: serde_json::Value::Null,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn always_selected(mut self) -> Self {
        self.always_selected = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Whether a skipped evaluation should still activate this recommender.
    pub fn evaluation_is_optional(&self) -> bool {
        self.threshold <= 0.0
    }
}
