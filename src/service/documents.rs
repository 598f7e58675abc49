//! Read access to project documents.

use std::collections::HashMap;
use std::io;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::{AnnotatedDocument, DocumentRef, Project};
use crate::error::Result;

/// Whether a stored document may be migrated to the current schema on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpgradeMode {
    NoUpgrade,
    #[default]
    AutoUpgrade,
    ForceUpgrade,
}

/// How the caller intends to use the document it reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessMode {
    #[default]
    SharedReadOnly,
    Exclusive,
}

/// Storage of source documents and per-user annotations.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn list_documents(&self, project: &Project) -> Result<Vec<DocumentRef>>;

    /// Read one user's annotated view of a document.
    async fn read_annotated_document(
        &self,
        document: &DocumentRef,
        user: &str,
        upgrade: UpgradeMode,
        access: AccessMode,
    ) -> Result<AnnotatedDocument>;
}

#[derive(Debug, Default)]
struct Corpus {
    documents: Vec<DocumentRef>,
    annotated: HashMap<(i64, String), AnnotatedDocument>,
}

/// Document source held entirely in memory.
///
/// Reading a document the user has no annotations for fails with `NotFound`.
#[derive(Debug, Default)]
pub struct InMemoryDocumentSource {
    corpus: Mutex<Corpus>,
}

impl InMemoryDocumentSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn corpus(&self) -> MutexGuard<'_, Corpus> {
        self.corpus.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a document without any annotations.
    pub fn add_document(&self, document: DocumentRef) {
        let mut corpus = self.corpus();
        if !corpus.documents.iter().any(|d| d.id == document.id) {
            corpus.documents.push(document);
        }
    }

    /// Register an annotated document, adding its reference when new.
    pub fn add_annotated(&self, annotated: AnnotatedDocument) {
        self.add_document(annotated.document.clone());
        let key = (annotated.document.id, annotated.user.clone());
        self.corpus().annotated.insert(key, annotated);
    }

    pub fn with_annotated(self, annotated: AnnotatedDocument) -> Self {
        self.add_annotated(annotated);
        self
    }
}

#[async_trait]
impl DocumentSource for InMemoryDocumentSource {
    async fn list_documents(&self, project: &Project) -> Result<Vec<DocumentRef>> {
        Ok(self
            .corpus()
            .documents
            .iter()
            .filter(|d| d.project_id == project.id)
            .cloned()
            .collect())
    }

    async fn read_annotated_document(
        &self,
        document: &DocumentRef,
        user: &str,
        _upgrade: UpgradeMode,
        _access: AccessMode,
    ) -> Result<AnnotatedDocument> {
        self.corpus()
            .annotated
            .get(&(document.id, user.to_string()))
            .cloned()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("No annotations of [{user}] on document [{}]", document.name),
                )
                .into()
            })
    }
}
