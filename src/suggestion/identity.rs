//! Composite index key for suggestions.

use super::types::{Offset, Suggestion};

/// Where in the document a suggestion sits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SuggestionPosition {
    Span(Offset),
    Relation { source: Offset, target: Offset },
}

/// Key under which a prediction store indexes a suggestion.
///
/// Two suggestions with the same key describe the same logical suggestion, so a
/// later one replaces an earlier one. The suggestion id is deliberately not part
/// of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExtendedId {
    pub recommender_id: i64,
    pub layer_id: i64,
    pub document_name: String,
    pub feature: String,
    pub position: SuggestionPosition,
    pub label: Option<String>,
}

impl ExtendedId {
    pub fn recommender_id(&self) -> i64 {
        self.recommender_id
    }

    pub fn layer_id(&self) -> i64 {
        self.layer_id
    }
}

/// Id of a rendered suggestion as handed back by the editor: the recommender
/// that produced it and the suggestion id within the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Vid {
    pub recommender_id: i64,
    pub suggestion_id: i32,
}

impl Vid {
    pub fn new(recommender_id: i64, suggestion_id: i32) -> Self {
        Self {
            recommender_id,
            suggestion_id,
        }
    }

    /// Whether `suggestion` is the one this id refers to
    pub fn matches(&self, suggestion: &Suggestion) -> bool {
        suggestion.id() == self.suggestion_id && suggestion.recommender_id() == self.recommender_id
    }
}

impl From<&Suggestion> for ExtendedId {
    fn from(suggestion: &Suggestion) -> Self {
        let core = suggestion.core();
        let position = match suggestion {
            Suggestion::Span(s) => SuggestionPosition::Span(s.position),
            Suggestion::Relation(r) => SuggestionPosition::Relation {
                source: r.source,
                target: r.target,
            },
        };
        Self {
            recommender_id: core.recommender_id,
            layer_id: core.layer_id,
            document_name: core.document_name.clone(),
            feature: core.feature.clone(),
            position,
            label: core.label.clone(),
        }
    }
}
