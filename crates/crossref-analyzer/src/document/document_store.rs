use std::sync::Arc;

use dashmap::DashMap;
use tower_lsp::lsp_types::Url;
use tracing::debug;

use crate::document::{Document, DocumentError, TextSource};

/// All resident documents of the workspace, keyed by URI.
///
/// Uses `DashMap` internally so that all operations are safe to call
/// concurrently from any async task without external synchronisation.
/// Documents that are not resident are parsed on demand from the
/// [`TextSource`].
pub struct WorkspaceDocuments {
    documents: DashMap<Url, Arc<Document>>,
    source: Arc<dyn TextSource>,
}

impl WorkspaceDocuments {
    pub fn new(source: Arc<dyn TextSource>) -> Self {
        Self {
            documents: DashMap::new(),
            source,
        }
    }

    pub fn source(&self) -> &Arc<dyn TextSource> {
        &self.source
    }

    pub fn has_document(
        &self,
        uri: &Url,
    ) -> bool {
        self.documents.contains_key(uri)
    }

    pub fn get(
        &self,
        uri: &Url,
    ) -> Option<Arc<Document>> {
        self.documents.get(uri).map(|entry| Arc::clone(entry.value()))
    }

    /// Return the resident document, or read and parse it.
    ///
    /// A document loaded this way starts out `Parsed`; it is picked up by the
    /// next build like any other.
    pub fn get_or_create_document(
        &self,
        uri: &Url,
    ) -> Result<Arc<Document>, DocumentError> {
        if let Some(document) = self.get(uri) {
            return Ok(document);
        }

        // Read and parse without holding a shard lock.
        let text = self.source.read(uri)?;
        let document = Arc::new(Document::new(uri.clone(), &text, 0));
        let document = Arc::clone(self.documents.entry(uri.clone()).or_insert(document).value());
        debug!("[workspace] loaded {uri} on demand");
        Ok(document)
    }

    /// Insert or replace a document. Replacing does not unlink the old one.
    pub fn add(
        &self,
        document: Arc<Document>,
    ) {
        self.documents.insert(document.uri().clone(), document);
    }

    pub fn remove(
        &self,
        uri: &Url,
    ) -> Option<Arc<Document>> {
        self.documents.remove(uri).map(|(_, document)| document)
    }

    /// All resident documents, ordered by URI.
    pub fn all(&self) -> Vec<Arc<Document>> {
        let mut documents: Vec<_> = self.documents.iter().map(|entry| Arc::clone(entry.value())).collect();
        documents.sort_by(|a, b| a.uri().as_str().cmp(b.uri().as_str()));
        documents
    }

    pub fn uris(&self) -> Vec<Url> {
        self.all().into_iter().map(|document| document.uri().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl std::fmt::Debug for WorkspaceDocuments {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("WorkspaceDocuments").field("documents", &self.documents.len()).finish()
    }
}

#[cfg(test)]
#[path = "../../tests/src/document/document_store_tests.rs"]
mod tests;
