//! Corpus read on first use.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Mutex;

use crate::domain::{AnnotatedDocument, Project};
use crate::error::Result;
use crate::service::{AccessMode, DocumentSource, UpgradeMode};

/// Reads a project's annotated documents the first time they are needed and
/// hands out the same corpus for the rest of the task.
///
/// Documents that fail to read are left out. A failure to list the documents
/// is returned and not remembered, so the next call tries again.
pub struct CorpusLoader {
    documents: Arc<dyn DocumentSource>,
    project: Project,
    data_owner: String,
    corpus: Mutex<Option<Arc<Vec<AnnotatedDocument>>>>,
    loads: AtomicUsize,
}

impl CorpusLoader {
    pub fn new(documents: Arc<dyn DocumentSource>, project: Project, data_owner: impl Into<String>) -> Self {
        Self {
            documents,
            project,
            data_owner: data_owner.into(),
            corpus: Mutex::new(None),
            loads: AtomicUsize::new(0),
        }
    }

    /// The corpus, reading it on the first call.
    pub async fn get(&self) -> Result<Arc<Vec<AnnotatedDocument>>> {
        let mut corpus = self.corpus.lock().await;
        if let Some(loaded) = corpus.as_ref() {
            return Ok(Arc::clone(loaded));
        }

        let loaded = Arc::new(self.read_all().await?);
        *corpus = Some(Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Whether the corpus has been read
    pub async fn is_loaded(&self) -> bool {
        self.corpus.lock().await.is_some()
    }

    /// Times the corpus was read from the document source
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    async fn read_all(&self) -> Result<Vec<AnnotatedDocument>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let refs = self.documents.list_documents(&self.project).await?;

        let mut corpus = Vec::with_capacity(refs.len());
        for document in &refs {
            match self
                .documents
                .read_annotated_document(document, &self.data_owner, UpgradeMode::AutoUpgrade, AccessMode::SharedReadOnly)
                .await
            {
                Ok(annotated) => corpus.push(annotated),
                Err(e) => {
                    tracing::error!(
                        document = %document.name,
                        user = %self.data_owner,
                        error = %e,
                        "Cannot read annotated document"
                    );
                }
            }
        }

        tracing::debug!(
            project = self.project.id,
            user = %self.data_owner,
            read = corpus.len(),
            listed = refs.len(),
            "Loaded evaluation corpus"
        );
        Ok(corpus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DocumentRef;
    use crate::error::RecselError;
    use crate::service::InMemoryDocumentSource;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicBool;

    fn annotated(id: i64, user: &str) -> AnnotatedDocument {
        AnnotatedDocument {
            document: DocumentRef::new(id, 1, format!("doc{id}")),
            user: user.to_string(),
            text: String::new(),
            annotations: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_reads_once() {
        let source = Arc::new(
            InMemoryDocumentSource::new()
                .with_annotated(annotated(1, "alice"))
                .with_annotated(annotated(2, "alice")),
        );
        let loader = CorpusLoader::new(source, Project::new(1, "p"), "alice");
        assert!(!loader.is_loaded().await);

        let first = loader.get().await.unwrap();
        let second = loader.get().await.unwrap();
        assert_eq!(first.len(), 2);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loader.load_count(), 1);
    }

    #[tokio::test]
    async fn test_unreadable_documents_are_skipped() {
        let source = InMemoryDocumentSource::new()
            .with_annotated(annotated(1, "alice"))
            .with_annotated(annotated(2, "bob"));
        let loader = CorpusLoader::new(Arc::new(source), Project::new(1, "p"), "alice");
        let corpus = loader.get().await.unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus[0].document.id, 1);
    }

    struct FlakyListing {
        failed_once: AtomicBool,
    }

    #[async_trait]
    impl DocumentSource for FlakyListing {
        async fn list_documents(&self, _project: &Project) -> Result<Vec<DocumentRef>> {
            if self.failed_once.swap(true, Ordering::SeqCst) {
                Ok(vec![DocumentRef::new(1, 1, "doc1")])
            } else {
                Err(RecselError::Io(std::io::Error::other("storage offline")))
            }
        }

        async fn read_annotated_document(
            &self,
            document: &DocumentRef,
            user: &str,
            _upgrade: UpgradeMode,
            _access: AccessMode,
        ) -> Result<AnnotatedDocument> {
            Ok(annotated(document.id, user))
        }
    }

    #[tokio::test]
    async fn test_listing_failure_is_retried() {
        let loader = CorpusLoader::new(
            Arc::new(FlakyListing {
                failed_once: AtomicBool::new(false),
            }),
            Project::new(1, "p"),
            "alice",
        );
        assert!(loader.get().await.is_err());
        assert!(!loader.is_loaded().await);
        assert_eq!(loader.get().await.unwrap().len(), 1);
        assert_eq!(loader.load_count(), 2);
    }
}
