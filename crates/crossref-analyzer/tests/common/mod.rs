#![allow(dead_code)]

use std::sync::Arc;

use crossref_analyzer::{
    Document, DocumentBuilder, DocumentState, Linker, OverlayTextSource, Reference, WorkspaceDocuments,
    scope::{DefaultReflection, DefaultScopeProvider, IndexManager, ScopeProvider, compute_exports, compute_local_scopes},
    tree::TARGET,
};
use tower_lsp::lsp_types::{Position, Url};

pub fn uri(name: &str) -> Url {
    Url::parse(&format!("file:///workspace/{name}.xref")).expect("valid test uri")
}

/// Documents with a linker over them, without the builder driving states.
pub struct Fixture {
    pub overlays: Arc<OverlayTextSource>,
    pub workspace: Arc<WorkspaceDocuments>,
    pub index: Arc<IndexManager>,
    pub linker: Arc<Linker>,
}

impl Fixture {
    /// Every document is resident and readable from the text source.
    pub fn new(documents: &[(&str, &str)]) -> Self {
        Self::with_provider(documents, |provider| provider)
    }

    /// Like [`Fixture::new`], with the default scope provider wrapped by
    /// `wrap`.
    pub fn with_provider(
        documents: &[(&str, &str)],
        wrap: impl FnOnce(Arc<dyn ScopeProvider>) -> Arc<dyn ScopeProvider>,
    ) -> Self {
        let overlays = Arc::new(OverlayTextSource::new());
        let workspace = Arc::new(WorkspaceDocuments::new(overlays.clone()));
        let index = Arc::new(IndexManager::new());
        let reflection = Arc::new(DefaultReflection);
        let provider: Arc<dyn ScopeProvider> =
            Arc::new(DefaultScopeProvider::new(Arc::clone(&workspace), Arc::clone(&index), reflection.clone()));
        let linker = Arc::new(Linker::new(Arc::clone(&workspace), wrap(provider), reflection));

        for (name, text) in documents {
            overlays.set(uri(name), text.to_string());
            workspace.add(Arc::new(Document::new(uri(name), text, 1)));
        }

        Self {
            overlays,
            workspace,
            index,
            linker,
        }
    }

    pub fn document(
        &self,
        name: &str,
    ) -> Arc<Document> {
        self.workspace.get(&uri(name)).expect("document is resident")
    }

    /// Index exports and compute local scopes of every resident document.
    pub fn prepare(&self) {
        for document in self.workspace.all() {
            self.prepare_document(&document);
        }
    }

    pub fn prepare_document(
        &self,
        document: &Document,
    ) {
        self.index.update_exports(document.uri(), compute_exports(document));
        document.set_local_scopes(compute_local_scopes(document));
        document.set_state(DocumentState::ScopesComputed);
    }

    pub fn builder(&self) -> DocumentBuilder {
        DocumentBuilder::with_parts(Arc::clone(&self.index), Arc::clone(&self.linker))
    }
}

/// The `target` reference of the `nth` statement of `document`.
pub fn uses_target(
    document: &Document,
    nth: usize,
) -> Arc<Reference> {
    let root = document.root();
    let statement = root.children().get(nth).expect("statement exists");
    Arc::clone(statement.reference(TARGET).expect("statement is a uses"))
}

pub fn position_of(
    source: &str,
    needle: &str,
) -> Position {
    position_of_nth(source, needle, 0)
}

pub fn position_of_nth(
    source: &str,
    needle: &str,
    nth: usize,
) -> Position {
    assert!(!needle.is_empty(), "needle must not be empty");
    let mut from = 0usize;
    let mut current = 0usize;

    loop {
        let Some(idx) = source[from..].find(needle) else {
            panic!("needle not found: {needle}");
        };
        let absolute = from + idx;
        if current == nth {
            let before = &source[..absolute];
            let line = before.as_bytes().iter().filter(|&&b| b == b'\n').count() as u32;
            let col = before
                .rsplit_once('\n')
                .map(|(_, tail)| tail.chars().count() as u32)
                .unwrap_or_else(|| before.chars().count() as u32);
            return Position::new(line, col);
        }
        current += 1;
        from = absolute + needle.len();
    }
}
