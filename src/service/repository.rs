//! Recommender configuration lookup.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::{AnnotationLayer, Project, Recommender};
use crate::error::Result;

/// Source of the project schema and recommender configuration.
#[async_trait]
pub trait RecommenderRepository: Send + Sync {
    /// Annotation layers of a project, enabled or not.
    async fn list_annotation_layers(&self, project: &Project) -> Result<Vec<AnnotationLayer>>;

    /// Recommenders configured on a layer, in declaration order.
    async fn list_recommenders(&self, layer: &AnnotationLayer) -> Result<Vec<Recommender>>;

    /// Current configuration of one recommender; `None` once it was deleted.
    async fn get_recommender(&self, id: i64) -> Result<Option<Recommender>>;
}

#[derive(Debug, Default)]
struct Schema {
    layers: Vec<AnnotationLayer>,
    recommenders: Vec<Recommender>,
}

/// Repository backed by vectors in memory, keeping insertion order.
#[derive(Debug, Default)]
pub struct InMemoryRecommenderRepository {
    schema: Mutex<Schema>,
}

impl InMemoryRecommenderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn schema(&self) -> MutexGuard<'_, Schema> {
        self.schema.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_layer(&self, layer: AnnotationLayer) {
        self.schema().layers.push(layer);
    }

    /// Add a recommender, replacing an existing one with the same id in place.
    pub fn add_recommender(&self, recommender: Recommender) {
        let mut schema = self.schema();
        match schema.recommenders.iter_mut().find(|r| r.id == recommender.id) {
            Some(existing) => *existing = recommender,
            None => schema.recommenders.push(recommender),
        }
    }

    pub fn remove_recommender(&self, id: i64) -> Option<Recommender> {
        let mut schema = self.schema();
        let position = schema.recommenders.iter().position(|r| r.id == id)?;
        Some(schema.recommenders.remove(position))
    }

    pub fn with_layer(self, layer: AnnotationLayer) -> Self {
        self.add_layer(layer);
        self
    }

    pub fn with_recommender(self, recommender: Recommender) -> Self {
        self.add_recommender(recommender);
        self
    }
}

#[async_trait]
impl RecommenderRepository for InMemoryRecommenderRepository {
    async fn list_annotation_layers(&self, project: &Project) -> Result<Vec<AnnotationLayer>> {
        Ok(self
            .schema()
            .layers
            .iter()
            .filter(|layer| layer.project_id == project.id)
            .cloned()
            .collect())
    }

    async fn list_recommenders(&self, layer: &AnnotationLayer) -> Result<Vec<Recommender>> {
        Ok(self
            .schema()
            .recommenders
            .iter()
            .filter(|r| r.layer.id == layer.id)
            .cloned()
            .collect())
    }

    async fn get_recommender(&self, id: i64) -> Result<Option<Recommender>> {
        Ok(self.schema().recommenders.iter().find(|r| r.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(id: i64) -> AnnotationLayer {
        AnnotationLayer::new(id, 1, format!("layer{id}"))
    }

    fn recommender(id: i64, layer_id: i64) -> Recommender {
        Recommender::new(id, format!("rec{id}"), "replay", layer(layer_id), "value")
    }

    #[tokio::test]
    async fn test_lists_in_declaration_order() {
        let repo = InMemoryRecommenderRepository::new()
            .with_layer(layer(1))
            .with_layer(layer(2))
            .with_recommender(recommender(30, 1))
            .with_recommender(recommender(10, 1))
            .with_recommender(recommender(20, 2));

        let layers = repo.list_annotation_layers(&Project::new(1, "p")).await.unwrap();
        assert_eq!(layers.len(), 2);

        let ids: Vec<i64> = repo
            .list_recommenders(&layer(1))
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![30, 10]);
    }

    #[tokio::test]
    async fn test_other_project_layers_hidden() {
        let repo = InMemoryRecommenderRepository::new().with_layer(layer(1));
        assert!(repo.list_annotation_layers(&Project::new(2, "q")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_after_remove_is_none() {
        let repo = InMemoryRecommenderRepository::new().with_recommender(recommender(5, 1));
        assert!(repo.get_recommender(5).await.unwrap().is_some());
        assert!(repo.remove_recommender(5).is_some());
        assert!(repo.get_recommender(5).await.unwrap().is_none());
        assert!(repo.remove_recommender(5).is_none());
    }

    #[tokio::test]
    async fn test_add_replaces_same_id() {
        let repo = InMemoryRecommenderRepository::new().with_recommender(recommender(5, 1));
        repo.add_recommender(recommender(5, 1).disabled());
        let stored = repo.get_recommender(5).await.unwrap().unwrap();
        assert!(!stored.enabled);
        assert_eq!(repo.list_recommenders(&layer(1)).await.unwrap().len(), 1);
    }
}
