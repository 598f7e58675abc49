//! Suggestion variants.

use serde::{Deserialize, Serialize};

/// Id of a suggestion that has not been assigned one yet.
pub const NEW_ID: i32 = -1;

/// Character range in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Offset {
    pub begin: usize,
    pub end: usize,
}

impl Offset {
    pub fn new(begin: usize, end: usize) -> Self {
        Self { begin, end }
    }
}

/// Fields shared by every suggestion variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionCore {
    /// [`NEW_ID`] until a prediction store assigns one
    pub id: i32,
    pub recommender_id: i64,
    pub recommender_name: String,
    pub layer_id: i64,
    pub feature: String,
    pub document_name: String,
    pub label: Option<String>,
    pub score: f64,
    /// Prediction generations this suggestion has survived; 0 means new
    pub age: u32,
}

impl SuggestionCore {
    /// Core of a fresh, unassigned suggestion.
    pub fn new(
        recommender_id: i64,
        recommender_name: impl Into<String>,
        layer_id: i64,
        feature: impl Into<String>,
        document_name: impl Into<String>,
    ) -> Self {
        Self {
            id: NEW_ID,
            recommender_id,
            recommender_name: recommender_name.into(),
            layer_id,
            feature: feature.into(),
            document_name: document_name.into(),
            label: None,
            score: 0.0,
            age: 0,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }
}

/// Suggested span annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanSuggestion {
    pub core: SuggestionCore,
    pub position: Offset,
    pub covered_text: String,
}

/// Suggested relation between two spans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationSuggestion {
    pub core: SuggestionCore,
    pub source: Offset,
    pub target: Offset,
}

/// Runtime type of a suggestion, used to filter queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuggestionType {
    Span,
    Relation,
}

/// One candidate annotation proposed by a recommender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Suggestion {
    Span(SpanSuggestion),
    Relation(RelationSuggestion),
}

impl Suggestion {
    pub fn span(core: SuggestionCore, begin: usize, end: usize, covered_text: impl Into<String>) -> Self {
        Suggestion::Span(SpanSuggestion {
            core,
            position: Offset::new(begin, end),
            covered_text: covered_text.into(),
        })
    }

    pub fn relation(core: SuggestionCore, source: Offset, target: Offset) -> Self {
        Suggestion::Relation(RelationSuggestion { core, source, target })
    }

    pub fn core(&self) -> &SuggestionCore {
        match self {
            Suggestion::Span(s) => &s.core,
            Suggestion::Relation(r) => &r.core,
        }
    }

    fn core_mut(&mut self) -> &mut SuggestionCore {
        match self {
            Suggestion::Span(s) => &mut s.core,
            Suggestion::Relation(r) => &mut r.core,
        }
    }

    pub fn suggestion_type(&self) -> SuggestionType {
        match self {
            Suggestion::Span(_) => SuggestionType::Span,
            Suggestion::Relation(_) => SuggestionType::Relation,
        }
    }

    pub fn id(&self) -> i32 {
        self.core().id
    }

    pub fn is_new(&self) -> bool {
        self.id() == NEW_ID
    }

    pub fn recommender_id(&self) -> i64 {
        self.core().recommender_id
    }

    pub fn layer_id(&self) -> i64 {
        self.core().layer_id
    }

    pub fn feature(&self) -> &str {
        &self.core().feature
    }

    pub fn document_name(&self) -> &str {
        &self.core().document_name
    }

    pub fn age(&self) -> u32 {
        self.core().age
    }

    /// Begin of the text window the suggestion is rendered in
    pub fn window_begin(&self) -> usize {
        match self {
            Suggestion::Span(s) => s.position.begin,
            Suggestion::Relation(r) => r.source.begin.min(r.target.begin),
        }
    }

    /// End of the text window the suggestion is rendered in
    pub fn window_end(&self) -> usize {
        match self {
            Suggestion::Span(s) => s.position.end,
            Suggestion::Relation(r) => r.source.end.max(r.target.end),
        }
    }

    /// Copy of this suggestion carrying `id`.
    pub fn assign_id(&self, id: i32) -> Self {
        let mut copy = self.clone();
        copy.core_mut().id = id;
        copy
    }

    /// Copy of this suggestion with its age bumped by one generation.
    pub fn aged(&self) -> Self {
        let mut copy = self.clone();
        let core = copy.core_mut();
        core.age = core.age.saturating_add(1);
        copy
    }

    pub fn as_span(&self) -> Option<&SpanSuggestion> {
        match self {
            Suggestion::Span(s) => Some(s),
            Suggestion::Relation(_) => None,
        }
    }
}
