//! Registry of recommender factories keyed by tool id.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::Recommender;

use super::traits::RecommendationEngineFactory;

/// Maps a tool identifier to the factory that builds it.
#[derive(Clone, Default)]
pub struct FactoryRegistry {
    factories: HashMap<String, Arc<dyn RecommendationEngineFactory>>,
}

impl std::fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryRegistry").field("tools", &self.tools()).finish()
    }
}

impl FactoryRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory, replacing any factory with the same id
    pub fn register(&mut self, factory: Arc<dyn RecommendationEngineFactory>) {
        let id = factory.id().to_string();
        if self.factories.insert(id.clone(), factory).is_some() {
            tracing::warn!(tool = %id, "Replacing previously registered recommender factory");
        }
    }

    /// Builder-style registration
    pub fn with_factory(mut self, factory: Arc<dyn RecommendationEngineFactory>) -> Self {
        self.register(factory);
        self
    }

    /// Get a factory by tool id
    pub fn get(&self, tool: &str) -> Option<Arc<dyn RecommendationEngineFactory>> {
        self.factories.get(tool).cloned()
    }

    /// Factory for a recommender's declared tool
    pub fn factory_for(&self, recommender: &Recommender) -> Option<Arc<dyn RecommendationEngineFactory>> {
        self.get(&recommender.tool)
    }

    /// Check if a tool is registered
    pub fn contains(&self, tool: &str) -> bool {
        self.factories.contains_key(tool)
    }

    /// Registered tool ids, sorted
    pub fn tools(&self) -> Vec<&str> {
        let mut tools: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        tools.sort_unstable();
        tools
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AnnotationLayer;
    use crate::engine::RecommendationEngine;
    use crate::error::{RecselError, Result};

    struct NamedFactory(&'static str);

    impl RecommendationEngineFactory for NamedFactory {
        fn id(&self) -> &str {
            self.0
        }

        fn accepts(&self, _layer: &AnnotationLayer, _feature: &str) -> bool {
            true
        }

        fn build(&self, recommender: &Recommender) -> Result<Box<dyn RecommendationEngine>> {
            Err(RecselError::plugin(&recommender.name, "not buildable in tests"))
        }
    }

    #[test]
    fn test_empty_registry() {
        let registry = FactoryRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get("anything").is_none());
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = FactoryRegistry::new()
            .with_factory(Arc::new(NamedFactory("opennlp-ner")))
            .with_factory(Arc::new(NamedFactory("string-matcher")));

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("opennlp-ner"));
        assert_eq!(registry.get("string-matcher").unwrap().id(), "string-matcher");
        assert_eq!(registry.tools(), vec!["opennlp-ner", "string-matcher"]);
    }

    #[test]
    fn test_factory_for_recommender() {
        let registry = FactoryRegistry::new().with_factory(Arc::new(NamedFactory("string-matcher")));
        let layer = AnnotationLayer::new(3, 7, "ne");
        let known = Recommender::new(1, "a", "string-matcher", layer.clone(), "value");
        let unknown = Recommender::new(2, "b", "crf", layer, "value");

        assert!(registry.factory_for(&known).is_some());
        assert!(registry.factory_for(&unknown).is_none());
    }

    #[test]
    fn test_register_replaces_same_id() {
        let mut registry = FactoryRegistry::new();
        registry.register(Arc::new(NamedFactory("x")));
        registry.register(Arc::new(NamedFactory("x")));
        assert_eq!(registry.len(), 1);
    }
}
