//! Drives documents through their processing states and keeps linking
//! consistent across edits, deletions and evictions.

use std::{
    collections::HashSet,
    sync::{Arc, PoisonError, RwLock},
};

use tokio::sync::Mutex;
use tower_lsp::lsp_types::Url;
use tracing::{debug, info};

use crate::{
    config::LinkingSettings,
    document::{Document, DocumentState, TextSource, WorkspaceDocuments},
    linker::{CancellationToken, LinkAbort, Linker},
    scope::{DefaultReflection, DefaultScopeProvider, IndexManager, Reflection, compute_exports, compute_local_scopes},
    validation,
};

/// New text for one document.
#[derive(Debug, Clone)]
pub struct TextUpdate {
    pub uri: Url,
    pub text: String,
    pub version: i32,
}

/// Runs the build phases over the workspace.
///
/// Every phase is applied to all documents of a build before the next one
/// starts, so no document is linked before every document's exports and
/// scopes exist. Builds are serialized; a cancelled build leaves each
/// document in the last state it completed and the next build resumes
/// from there.
pub struct DocumentBuilder {
    workspace: Arc<WorkspaceDocuments>,
    index: Arc<IndexManager>,
    linker: Arc<Linker>,
    build_lock: Mutex<()>,
    settings: RwLock<LinkingSettings>,
}

impl DocumentBuilder {
    /// A builder with the default scope provider and reflection.
    pub fn new(source: Arc<dyn TextSource>) -> Self {
        let workspace = Arc::new(WorkspaceDocuments::new(source));
        let index = Arc::new(IndexManager::new());
        let reflection: Arc<dyn Reflection> = Arc::new(DefaultReflection);
        let scope_provider = Arc::new(DefaultScopeProvider::new(
            Arc::clone(&workspace),
            Arc::clone(&index),
            Arc::clone(&reflection),
        ));
        let linker = Arc::new(Linker::new(Arc::clone(&workspace), scope_provider, reflection));
        Self::with_parts(index, linker)
    }

    /// A builder around an existing linker; documents are taken from the
    /// linker's workspace.
    pub fn with_parts(
        index: Arc<IndexManager>,
        linker: Arc<Linker>,
    ) -> Self {
        Self {
            workspace: Arc::clone(linker.workspace()),
            index,
            linker,
            build_lock: Mutex::new(()),
            settings: RwLock::new(LinkingSettings::default()),
        }
    }

    pub fn workspace(&self) -> &Arc<WorkspaceDocuments> {
        &self.workspace
    }

    pub fn index(&self) -> &Arc<IndexManager> {
        &self.index
    }

    pub fn linker(&self) -> &Arc<Linker> {
        &self.linker
    }

    pub fn set_settings(
        &self,
        settings: LinkingSettings,
    ) {
        self.linker.set_yield_interval(settings.yield_interval);
        *self.settings.write().unwrap_or_else(PoisonError::into_inner) = settings;
    }

    pub fn settings(&self) -> LinkingSettings {
        self.settings.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Add a document without building it.
    pub fn add_document(
        &self,
        uri: Url,
        text: &str,
        version: i32,
    ) -> Arc<Document> {
        let document = Arc::new(Document::new(uri, text, version));
        self.workspace.add(Arc::clone(&document));
        document
    }

    /// Build every resident document that is not yet validated.
    pub async fn build_workspace(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<Arc<Document>>, LinkAbort> {
        let _guard = self.build_lock.lock().await;
        let pending = self.pending_documents();
        self.run_phases(&pending, cancel).await
    }

    /// Build `documents` up to `Validated`. Returns the documents validated
    /// by this call.
    pub async fn build(
        &self,
        documents: &[Arc<Document>],
        cancel: &CancellationToken,
    ) -> Result<Vec<Arc<Document>>, LinkAbort> {
        let _guard = self.build_lock.lock().await;
        self.run_phases(documents, cancel).await
    }

    /// Apply edits and deletions, invalidate whatever depends on them, and
    /// rebuild.
    ///
    /// Documents that referenced a changed or deleted document, documents
    /// with cached linking errors, and documents not linked yet are
    /// unlinked and relinked. Everything else keeps its cached links.
    pub async fn update(
        &self,
        changed: Vec<TextUpdate>,
        deleted: Vec<Url>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Arc<Document>>, LinkAbort> {
        let _guard = self.build_lock.lock().await;

        let changed_count = changed.len();
        let touched: HashSet<Url> =
            changed.iter().map(|update| update.uri.clone()).chain(deleted.iter().cloned()).collect();

        for uri in &deleted {
            if let Some(document) = self.workspace.get(uri) {
                self.linker.unlink(&document);
                self.workspace.remove(uri);
            }
            self.index.remove(uri);
            debug!("[build] removed {uri}");
        }

        for update in changed {
            match self.workspace.get(&update.uri) {
                Some(document) => {
                    self.linker.unlink(&document);
                    document.set_content(&update.text, update.version);
                },
                None => {
                    self.workspace.add(Arc::new(Document::new(update.uri.clone(), &update.text, update.version)));
                },
            }
        }

        let mut relinked = 0usize;
        for document in self.workspace.all() {
            if touched.contains(document.uri()) {
                continue;
            }
            let stale = document.state() < DocumentState::Linked
                || self.index.is_affected(document.uri(), &touched)
                || !document.linking_errors().is_empty();
            if stale {
                self.linker.unlink(&document);
                document.reset_to(DocumentState::ScopesComputed);
                relinked += 1;
            }
        }
        debug!("[build] {changed_count} changed, {} deleted, {relinked} dependants to relink", deleted.len());

        let pending = self.pending_documents();
        self.run_phases(&pending, cancel).await
    }

    /// Drop a document from memory while keeping its exports visible.
    ///
    /// References to it from other documents are unlinked so that the next
    /// access loads it again from the text source.
    pub async fn evict(
        &self,
        uri: &Url,
    ) {
        let _guard = self.build_lock.lock().await;

        let evicted: HashSet<Url> = std::iter::once(uri.clone()).collect();
        for document in self.workspace.all() {
            if document.uri() != uri && self.index.is_affected(document.uri(), &evicted) {
                self.linker.unlink(&document);
                document.reset_to(DocumentState::ScopesComputed);
            }
        }

        if let Some(document) = self.workspace.get(uri) {
            self.linker.unlink(&document);
            self.workspace.remove(uri);
        }
        self.index.detach(uri);
        debug!("[build] evicted {uri}");
    }

    fn pending_documents(&self) -> Vec<Arc<Document>> {
        self.workspace.all().into_iter().filter(|document| document.state() < DocumentState::Validated).collect()
    }

    async fn run_phases(
        &self,
        documents: &[Arc<Document>],
        cancel: &CancellationToken,
    ) -> Result<Vec<Arc<Document>>, LinkAbort> {
        for document in documents.iter().filter(|d| d.state() < DocumentState::Indexed) {
            check_cancelled(cancel)?;
            self.index.update_exports(document.uri(), compute_exports(document));
            document.set_state(DocumentState::Indexed);
        }

        for document in documents.iter().filter(|d| d.state() < DocumentState::ScopesComputed) {
            check_cancelled(cancel)?;
            document.set_local_scopes(compute_local_scopes(document));
            document.set_state(DocumentState::ScopesComputed);
        }

        for document in documents.iter().filter(|d| d.state() < DocumentState::Linked) {
            self.linker.link(document, cancel).await?;
            self.index.update_references(document);
            document.set_state(DocumentState::Linked);
        }

        let settings = self.settings();
        let mut validated = Vec::new();
        for document in documents.iter().filter(|d| d.state() < DocumentState::Validated) {
            check_cancelled(cancel)?;
            document.set_diagnostics(validation::validate(document, &settings));
            document.set_state(DocumentState::Validated);
            validated.push(Arc::clone(document));
        }

        if !validated.is_empty() {
            info!("[build] validated {} document(s)", validated.len());
        }
        Ok(validated)
    }
}

fn check_cancelled(cancel: &CancellationToken) -> Result<(), LinkAbort> {
    if cancel.is_cancelled() {
        return Err(LinkAbort::Cancelled);
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/src/builder/builder_tests.rs"]
mod tests;
