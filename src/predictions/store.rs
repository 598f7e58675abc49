//! One generation of predictions for a (session owner, data owner, project) triple.
//!
//! The store keeps three independent pieces of state, each behind its own lock:
//! - the suggestion index, keyed per document by [`ExtendedId`], plus the id counter
//! - the set of documents a prediction run has completed on
//! - the log of messages produced while computing this generation
//!
//! No operation holds more than one of these locks at a time.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::{DocumentRef, LogMessage, Project, User};
use crate::error::{RecselError, Result};
use crate::suggestion::{ExtendedId, SpanSuggestion, Suggestion, SuggestionGroup, SuggestionType, Vid};

#[derive(Debug, Default)]
struct PredictionIndex {
    documents: HashMap<String, HashMap<ExtendedId, Suggestion>>,
    next_id: i32,
    new_suggestion_count: usize,
}

impl PredictionIndex {
    fn allocate_id(&mut self) -> Result<i32> {
        let id = self.next_id;
        self.next_id = id.checked_add(1).ok_or(RecselError::IdSpaceExhausted)?;
        Ok(id)
    }
}

/// Predictions computed for one user's view of one project.
#[derive(Debug)]
pub struct Predictions {
    generation: u32,
    project: Project,
    session_owner: User,
    data_owner: String,
    index: Mutex<PredictionIndex>,
    seen_documents: Mutex<HashSet<String>>,
    log: Mutex<Vec<LogMessage>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Predictions {
    /// First generation: empty index, ids start at 0.
    pub fn new(session_owner: User, data_owner: impl Into<String>, project: Project) -> Self {
        Self {
            generation: 1,
            project,
            session_owner,
            data_owner: data_owner.into(),
            index: Mutex::new(PredictionIndex::default()),
            seen_documents: Mutex::new(HashSet::new()),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Next generation after `predecessor`.
    ///
    /// Owners and project carry over and the id counter continues where the
    /// predecessor stopped, so ids are never handed out twice across generations.
    /// Index, seen documents and log start empty.
    pub fn from_predecessor(predecessor: &Predictions) -> Self {
        let next_id = lock(&predecessor.index).next_id;
        Self {
            generation: predecessor.generation.saturating_add(1),
            project: predecessor.project.clone(),
            session_owner: predecessor.session_owner.clone(),
            data_owner: predecessor.data_owner.clone(),
            index: Mutex::new(PredictionIndex {
                next_id,
                ..PredictionIndex::default()
            }),
            seen_documents: Mutex::new(HashSet::new()),
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn session_owner(&self) -> &User {
        &self.session_owner
    }

    pub fn data_owner(&self) -> &str {
        &self.data_owner
    }

    /// Id the next new suggestion will receive
    pub fn next_id(&self) -> i32 {
        lock(&self.index).next_id
    }

    /// Insert suggestions into the index.
    ///
    /// Suggestions without an id get the next one from the counter. A suggestion
    /// replaces any stored one with the same [`ExtendedId`]. Returns the stored
    /// copies, which carry the assigned ids.
    ///
    /// Fails with [`RecselError::IdSpaceExhausted`] when the counter cannot
    /// advance; suggestions preceding the failing one stay stored.
    pub fn put_predictions(&self, suggestions: impl IntoIterator<Item = Suggestion>) -> Result<Vec<Suggestion>> {
        let mut index = lock(&self.index);
        let mut stored = Vec::new();

        for suggestion in suggestions {
            let suggestion = if suggestion.is_new() {
                let id = index.allocate_id()?;
                suggestion.assign_id(id)
            } else {
                suggestion
            };

            if suggestion.age() == 0 {
                index.new_suggestion_count += 1;
            }

            let key = ExtendedId::from(&suggestion);
            index
                .documents
                .entry(suggestion.document_name().to_string())
                .or_default()
                .insert(key, suggestion.clone());
            stored.push(suggestion);
        }

        tracing::debug!(
            generation = self.generation,
            stored = stored.len(),
            next_id = index.next_id,
            "Stored predictions"
        );
        Ok(stored)
    }

    /// Every stored suggestion of `document_name` matching `filter`, unordered.
    fn select<F>(&self, document_name: &str, filter: F) -> Vec<(ExtendedId, Suggestion)>
    where
        F: Fn(&ExtendedId, &Suggestion) -> bool,
    {
        let index = lock(&self.index);
        index
            .documents
            .get(document_name)
            .map(|suggestions| {
                suggestions
                    .iter()
                    .filter(|(key, suggestion)| filter(key, suggestion))
                    .map(|(key, suggestion)| (key.clone(), suggestion.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Suggestions of one type on one layer of a document, restricted to a
    /// window and sorted by window begin.
    ///
    /// `window_begin` and `window_end` are inclusive bounds on the suggestion's
    /// own window; `None` leaves that side unbounded.
    pub fn flattened_predictions(
        &self,
        suggestion_type: SuggestionType,
        document_name: &str,
        layer_id: i64,
        window_begin: Option<usize>,
        window_end: Option<usize>,
    ) -> Vec<Suggestion> {
        let mut found = self.select(document_name, |key, suggestion| {
            key.layer_id() == layer_id
                && suggestion.suggestion_type() == suggestion_type
                && window_begin.is_none_or(|begin| suggestion.window_begin() >= begin)
                && window_end.is_none_or(|end| suggestion.window_end() <= end)
        });
        found.sort_by(|(a_key, a), (b_key, b)| {
            a.window_begin()
                .cmp(&b.window_begin())
                .then_with(|| a_key.cmp(b_key))
        });
        found.into_iter().map(|(_, suggestion)| suggestion).collect()
    }

    /// Window query grouped by position.
    pub fn grouped_predictions(
        &self,
        suggestion_type: SuggestionType,
        document_name: &str,
        layer_id: i64,
        window_begin: Option<usize>,
        window_end: Option<usize>,
    ) -> Vec<SuggestionGroup> {
        SuggestionGroup::group(self.flattened_predictions(
            suggestion_type,
            document_name,
            layer_id,
            window_begin,
            window_end,
        ))
    }

    /// Grouped predictions for every listed document that has any.
    pub fn predictions_for_whole_project(
        &self,
        suggestion_type: SuggestionType,
        layer_id: i64,
        documents: &[DocumentRef],
    ) -> HashMap<String, Vec<SuggestionGroup>> {
        documents
            .iter()
            .filter_map(|document| {
                let groups = self.grouped_predictions(suggestion_type, &document.name, layer_id, None, None);
                (!groups.is_empty()).then(|| (document.name.clone(), groups))
            })
            .collect()
    }

    /// Look up a suggestion by the id the editor rendered it with.
    pub fn prediction_by_vid(&self, document_name: &str, vid: Vid) -> Option<Suggestion> {
        self.select(document_name, |_, suggestion| vid.matches(suggestion))
            .into_iter()
            .map(|(_, suggestion)| suggestion)
            .next()
    }

    /// Other span suggestions at the same position and feature as `suggestion`,
    /// the suggestion itself included.
    pub fn alternative_suggestions(&self, suggestion: &SpanSuggestion) -> Vec<SpanSuggestion> {
        self.predictions_by_token_and_feature(
            &suggestion.core.document_name,
            suggestion.core.layer_id,
            suggestion.position.begin,
            suggestion.position.end,
            &suggestion.core.feature,
        )
    }

    /// Span suggestions covering exactly `[begin, end)` for one feature.
    pub fn predictions_by_token_and_feature(
        &self,
        document_name: &str,
        layer_id: i64,
        begin: usize,
        end: usize,
        feature: &str,
    ) -> Vec<SpanSuggestion> {
        let mut found: Vec<SpanSuggestion> = self
            .select(document_name, |key, _| key.layer_id() == layer_id && key.feature == feature)
            .into_iter()
            .filter_map(|(_, suggestion)| match suggestion {
                Suggestion::Span(span) if span.position.begin == begin && span.position.end == end => Some(span),
                _ => None,
            })
            .collect();
        found.sort_by(|a, b| a.core.id.cmp(&b.core.id));
        found
    }

    pub fn predictions_by_recommender_and_document(&self, recommender_id: i64, document_name: &str) -> Vec<Suggestion> {
        let mut found: Vec<Suggestion> = self
            .select(document_name, |key, _| key.recommender_id() == recommender_id)
            .into_iter()
            .map(|(_, suggestion)| suggestion)
            .collect();
        found.sort_by_key(|suggestion| suggestion.id());
        found
    }

    pub fn predictions_by_document(&self, document_name: &str) -> Vec<Suggestion> {
        let mut found: Vec<Suggestion> = self
            .select(document_name, |_, _| true)
            .into_iter()
            .map(|(_, suggestion)| suggestion)
            .collect();
        found.sort_by_key(|suggestion| suggestion.id());
        found
    }

    /// Drop every suggestion produced by `recommender_id`, returning how many went.
    pub fn remove_predictions(&self, recommender_id: i64) -> usize {
        let mut index = lock(&self.index);
        let mut removed = 0;
        for suggestions in index.documents.values_mut() {
            let before = suggestions.len();
            suggestions.retain(|key, _| key.recommender_id() != recommender_id);
            removed += before - suggestions.len();
        }
        index.documents.retain(|_, suggestions| !suggestions.is_empty());
        tracing::debug!(recommender_id, removed, "Removed predictions");
        removed
    }

    pub fn mark_document_as_prediction_completed(&self, document_name: impl Into<String>) {
        lock(&self.seen_documents).insert(document_name.into());
    }

    pub fn has_run_prediction_on_document(&self, document_name: &str) -> bool {
        lock(&self.seen_documents).contains(document_name)
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.index).documents.values().all(HashMap::is_empty)
    }

    /// Number of stored suggestions across all documents
    pub fn size(&self) -> usize {
        lock(&self.index).documents.values().map(HashMap::len).sum()
    }

    pub fn has_new_suggestions(&self) -> bool {
        self.new_suggestion_count() > 0
    }

    /// Age-0 suggestions put into this generation
    pub fn new_suggestion_count(&self) -> usize {
        lock(&self.index).new_suggestion_count
    }

    pub fn log(&self, message: LogMessage) {
        lock(&self.log).push(message);
    }

    /// Prepend `messages` ahead of this generation's own log.
    pub fn inherit_log(&self, messages: Vec<LogMessage>) {
        let mut log = lock(&self.log);
        let own = std::mem::replace(&mut *log, messages);
        log.extend(own);
    }

    pub fn log_messages(&self) -> Vec<LogMessage> {
        lock(&self.log).clone()
    }
}
