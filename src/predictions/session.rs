//! Active and incoming prediction generations per session.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::{Project, User};

use super::store::Predictions;

/// Identifies whose predictions a generation holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub session_owner: String,
    pub data_owner: String,
    pub project_id: i64,
}

impl SessionKey {
    pub fn new(session_owner: &User, data_owner: impl Into<String>, project: &Project) -> Self {
        Self {
            session_owner: session_owner.username.clone(),
            data_owner: data_owner.into(),
            project_id: project.id,
        }
    }
}

#[derive(Debug, Default)]
struct Slot {
    active: Option<Arc<Predictions>>,
    incoming: Option<Arc<Predictions>>,
}

/// Holds the generation shown to the user (active) and the one being
/// computed in the background (incoming) for each session.
#[derive(Debug, Default)]
pub struct PredictionSessions {
    slots: Mutex<HashMap<SessionKey, Slot>>,
}

impl PredictionSessions {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<SessionKey, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn active(&self, key: &SessionKey) -> Option<Arc<Predictions>> {
        self.slots().get(key).and_then(|slot| slot.active.clone())
    }

    pub fn incoming(&self, key: &SessionKey) -> Option<Arc<Predictions>> {
        self.slots().get(key).and_then(|slot| slot.incoming.clone())
    }

    /// Start a new incoming generation for the session and return it.
    ///
    /// The new generation succeeds the newest existing one, a pending incoming
    /// generation taking precedence over the active one, so suggestion ids keep
    /// increasing even when a computation is replaced before it was switched in.
    pub fn incoming_for(&self, session_owner: &User, data_owner: &str, project: &Project) -> Arc<Predictions> {
        let key = SessionKey::new(session_owner, data_owner, project);
        let mut slots = self.slots();
        let slot = slots.entry(key).or_default();

        let predictions = match slot.incoming.as_ref().or(slot.active.as_ref()) {
            Some(predecessor) => Predictions::from_predecessor(predecessor),
            None => Predictions::new(session_owner.clone(), data_owner, project.clone()),
        };
        let predictions = Arc::new(predictions);
        slot.incoming = Some(Arc::clone(&predictions));

        tracing::debug!(
            user = %session_owner.username,
            data_owner,
            project = project.id,
            generation = predictions.generation(),
            "Started incoming predictions"
        );
        predictions
    }

    /// Promote the incoming generation to active.
    ///
    /// The outgoing generation's log is prepended to the new one. Returns false
    /// when there was nothing to switch to.
    pub fn switch(&self, key: &SessionKey) -> bool {
        // Lock order: sessions map, then a store's log. Stores never take this lock.
        let mut slots = self.slots();
        let Some(slot) = slots.get_mut(key) else {
            return false;
        };
        let Some(incoming) = slot.incoming.take() else {
            return false;
        };

        if let Some(previous) = slot.active.as_ref() {
            incoming.inherit_log(previous.log_messages());
        }
        tracing::info!(
            user = %key.session_owner,
            project = key.project_id,
            generation = incoming.generation(),
            suggestions = incoming.size(),
            "Switched to new predictions"
        );
        slot.active = Some(incoming);
        true
    }

    /// Forget all generations of one session.
    pub fn clear_session(&self, key: &SessionKey) {
        self.slots().remove(key);
    }

    /// Forget all generations owned by `session_owner`.
    pub fn clear(&self, session_owner: &User) {
        self.slots().retain(|key, _| key.session_owner != session_owner.username);
    }
}
