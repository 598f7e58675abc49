//! Grouping of suggestions that sit at the same position.

use std::collections::HashMap;

use super::identity::SuggestionPosition;
use super::types::Suggestion;

/// All suggestions for one feature at one position, e.g. alternative labels
/// proposed by several recommenders for the same token.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionGroup {
    pub layer_id: i64,
    pub feature: String,
    pub position: SuggestionPosition,
    pub suggestions: Vec<Suggestion>,
}

impl SuggestionGroup {
    /// Group suggestions by (layer, feature, position), keeping the order in
    /// which each group is first encountered.
    pub fn group(suggestions: Vec<Suggestion>) -> Vec<SuggestionGroup> {
        let mut groups: Vec<SuggestionGroup> = Vec::new();
        let mut slots: HashMap<(i64, String, SuggestionPosition), usize> = HashMap::new();

        for suggestion in suggestions {
            let position = position_of(&suggestion);
            let key = (suggestion.layer_id(), suggestion.feature().to_string(), position.clone());
            match slots.get(&key) {
                Some(&slot) => groups[slot].suggestions.push(suggestion),
                None => {
                    slots.insert(key, groups.len());
                    groups.push(SuggestionGroup {
                        layer_id: suggestion.layer_id(),
                        feature: suggestion.feature().to_string(),
                        position,
                        suggestions: vec![suggestion],
                    });
                }
            }
        }

        groups
    }

    /// Highest-scoring suggestion of the group
    pub fn best(&self) -> Option<&Suggestion> {
        self.suggestions
            .iter()
            .max_by(|a, b| a.core().score.total_cmp(&b.core().score))
    }

    pub fn len(&self) -> usize {
        self.suggestions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }
}

fn position_of(suggestion: &Suggestion) -> SuggestionPosition {
    match suggestion {
        Suggestion::Span(s) => SuggestionPosition::Span(s.position),
        Suggestion::Relation(r) => SuggestionPosition::Relation {
            source: r.source,
            target: r.target,
        },
    }
}
