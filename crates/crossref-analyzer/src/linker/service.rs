use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use rowan::TextRange;

use crate::{
    document::WorkspaceDocuments,
    linker::{ContainerRef, Reference, build_reference},
    scope::{Reflection, ScopeProvider},
};

pub const DEFAULT_YIELD_INTERVAL: usize = 64;

/// Resolves reference cells against the workspace.
///
/// Owns no trees: documents belong to [`WorkspaceDocuments`], which the
/// linker only borrows nodes from. Cheap to share behind an `Arc`.
pub struct Linker {
    pub(crate) workspace: Arc<WorkspaceDocuments>,
    pub(crate) scope_provider: Arc<dyn ScopeProvider>,
    pub(crate) reflection: Arc<dyn Reflection>,
    yield_interval: AtomicUsize,
}

impl Linker {
    pub fn new(
        workspace: Arc<WorkspaceDocuments>,
        scope_provider: Arc<dyn ScopeProvider>,
        reflection: Arc<dyn Reflection>,
    ) -> Self {
        Self {
            workspace,
            scope_provider,
            reflection,
            yield_interval: AtomicUsize::new(DEFAULT_YIELD_INTERVAL),
        }
    }

    pub fn workspace(&self) -> &Arc<WorkspaceDocuments> {
        &self.workspace
    }

    /// Number of nodes `link` visits between cooperative yields.
    pub fn set_yield_interval(
        &self,
        nodes: usize,
    ) {
        self.yield_interval.store(nodes.max(1), Ordering::Relaxed);
    }

    pub(crate) fn yield_interval(&self) -> usize {
        self.yield_interval.load(Ordering::Relaxed)
    }

    /// Factory for reference cells, see [`build_reference`].
    pub fn build_reference(
        &self,
        container: ContainerRef<'_>,
        property: &'static str,
        range: Option<TextRange>,
        text: impl Into<String>,
    ) -> Arc<Reference> {
        build_reference(container, property, range, text)
    }
}
