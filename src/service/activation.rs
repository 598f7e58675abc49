//! Persisted activation decisions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::{AnnotationLayer, EvaluatedRecommender, Project, Recommender, User};

#[derive(Debug)]
struct LayerDecisions {
    project_id: i64,
    evaluated: Arc<Vec<EvaluatedRecommender>>,
}

/// Last evaluated recommender list per (user, layer).
///
/// A list is only ever replaced as a whole, so readers see either the
/// previous selection run's list for a layer or the new one.
#[derive(Debug, Default)]
pub struct ActiveRecommenders {
    decisions: Mutex<HashMap<(String, i64), LayerDecisions>>,
}

impl ActiveRecommenders {
    pub fn new() -> Self {
        Self::default()
    }

    fn decisions(&self) -> MutexGuard<'_, HashMap<(String, i64), LayerDecisions>> {
        self.decisions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the evaluated list of a layer.
    pub fn set_evaluated_recommenders(&self, user: &User, layer: &AnnotationLayer, evaluated: Vec<EvaluatedRecommender>) {
        let active = evaluated.iter().filter(|e| e.is_active()).count();
        tracing::debug!(
            user = %user.username,
            layer = %layer.ui_name,
            evaluated = evaluated.len(),
            active,
            "Persisting evaluated recommenders"
        );
        self.decisions().insert(
            (user.username.clone(), layer.id),
            LayerDecisions {
                project_id: layer.project_id,
                evaluated: Arc::new(evaluated),
            },
        );
    }

    /// Evaluated list of a layer; empty if no selection has run for it yet.
    pub fn evaluated_recommenders(&self, user: &User, layer: &AnnotationLayer) -> Arc<Vec<EvaluatedRecommender>> {
        self.decisions()
            .get(&(user.username.clone(), layer.id))
            .map(|d| Arc::clone(&d.evaluated))
            .unwrap_or_default()
    }

    /// Recommenders of a layer that are currently active.
    pub fn active_recommenders(&self, user: &User, layer: &AnnotationLayer) -> Vec<Recommender> {
        self.evaluated_recommenders(user, layer)
            .iter()
            .filter(|e| e.is_active())
            .map(|e| e.recommender().clone())
            .collect()
    }

    /// Whether any layer of `project` has an active recommender for `user`.
    pub fn has_active_recommenders(&self, user: &User, project: &Project) -> bool {
        self.decisions().iter().any(|((username, _), decisions)| {
            username == &user.username
                && decisions.project_id == project.id
                && decisions.evaluated.iter().any(EvaluatedRecommender::is_active)
        })
    }

    /// Forget every decision made for `user`.
    pub fn clear(&self, user: &User) {
        self.decisions().retain(|(username, _), _| username != &user.username);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(id: i64, project_id: i64) -> AnnotationLayer {
        AnnotationLayer::new(id, project_id, format!("layer{id}"))
    }

    fn rec(id: i64, layer: &AnnotationLayer) -> Recommender {
        Recommender::new(id, format!("rec{id}"), "replay", layer.clone(), "value")
    }

    #[test]
    fn test_set_replaces_whole_list() {
        let store = ActiveRecommenders::new();
        let alice = User::new("alice");
        let l = layer(1, 1);

        store.set_evaluated_recommenders(
            &alice,
            &l,
            vec![
                EvaluatedRecommender::make_active_without_evaluation(rec(1, &l), "always"),
                EvaluatedRecommender::make_inactive_without_evaluation(rec(2, &l), "invalid"),
            ],
        );
        assert_eq!(store.evaluated_recommenders(&alice, &l).len(), 2);
        assert_eq!(store.active_recommenders(&alice, &l).len(), 1);

        store.set_evaluated_recommenders(
            &alice,
            &l,
            vec![EvaluatedRecommender::make_inactive_without_evaluation(rec(1, &l), "gone")],
        );
        assert_eq!(store.evaluated_recommenders(&alice, &l).len(), 1);
        assert!(store.active_recommenders(&alice, &l).is_empty());
    }

    #[test]
    fn test_has_active_is_scoped() {
        let store = ActiveRecommenders::new();
        let alice = User::new("alice");
        let bob = User::new("bob");
        let l = layer(1, 1);
        store.set_evaluated_recommenders(
            &alice,
            &l,
            vec![EvaluatedRecommender::make_active_without_evaluation(rec(1, &l), "always")],
        );

        assert!(store.has_active_recommenders(&alice, &Project::new(1, "p")));
        assert!(!store.has_active_recommenders(&alice, &Project::new(2, "q")));
        assert!(!store.has_active_recommenders(&bob, &Project::new(1, "p")));
    }

    #[test]
    fn test_clear_and_missing() {
        let store = ActiveRecommenders::new();
        let alice = User::new("alice");
        let l = layer(1, 1);
        assert!(store.evaluated_recommenders(&alice, &l).is_empty());

        store.set_evaluated_recommenders(
            &alice,
            &l,
            vec![EvaluatedRecommender::make_active_without_evaluation(rec(1, &l), "always")],
        );
        store.clear(&alice);
        assert!(!store.has_active_recommenders(&alice, &Project::new(1, "p")));
    }
}
