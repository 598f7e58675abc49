//! Who and what a task runs for.

use crate::domain::{DocumentRef, Project, User};
use crate::error::{RecselError, Result};

/// Session a recommendation task belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskContext {
    /// User whose recommendation session this is
    pub session_owner: Option<User>,
    pub project: Project,
    /// What caused the task to be scheduled
    pub trigger: String,
    /// Document open in the editor, if any
    pub current_document: Option<DocumentRef>,
    /// User whose annotations are shown; differs from the session owner when
    /// a manager views someone else's work or a curator curates
    pub data_owner: String,
}

impl TaskContext {
    /// Context where the session owner also owns the data.
    pub fn new(session_owner: User, project: Project, trigger: impl Into<String>) -> Self {
        Self {
            data_owner: session_owner.username.clone(),
            session_owner: Some(session_owner),
            project,
            trigger: trigger.into(),
            current_document: None,
        }
    }

    /// Context of a task not tied to any user session.
    pub fn unattended(project: Project, trigger: impl Into<String>) -> Self {
        Self {
            session_owner: None,
            project,
            trigger: trigger.into(),
            current_document: None,
            data_owner: String::new(),
        }
    }

    pub fn with_current_document(mut self, document: DocumentRef) -> Self {
        self.current_document = Some(document);
        self
    }

    pub fn with_data_owner(mut self, data_owner: impl Into<String>) -> Self {
        self.data_owner = data_owner.into();
        self
    }

    /// Same session, new trigger
    pub fn retrigger(&self, trigger: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            ..self.clone()
        }
    }

    /// Session owner, or `InvalidArgument` if the task has none.
    pub fn session_owner(&self) -> Result<&User> {
        self.session_owner
            .as_ref()
            .ok_or_else(|| RecselError::InvalidArgument("Task requires a session owner".to_string()))
    }
}
