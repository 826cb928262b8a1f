use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use rowan::TextRange;
use tower_lsp::lsp_types::Url;

use crate::{
    linker::{DeclarationDescriptor, Linker, LinkingError},
    tree::{AstNode, NodeKind, NodePath},
};

/// One symbolic reference occurrence in a document tree.
///
/// `document` + `container` + `property` identify the site; every property
/// holds at most one reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSite {
    pub document: Url,
    pub container: NodePath,
    pub container_kind: NodeKind,
    pub property: &'static str,
    /// Raw reference text as written, e.g. `b.Foo`.
    pub text: String,
    pub range: Option<TextRange>,
}

/// The node a reference is being built for. The node itself does not exist
/// yet while its children and references are assembled.
#[derive(Debug, Clone, Copy)]
pub struct ContainerRef<'a> {
    pub document: &'a Url,
    pub path: &'a NodePath,
    pub kind: NodeKind,
}

/// Build the reference cell for one site. Never resolves anything.
pub fn build_reference(
    container: ContainerRef<'_>,
    property: &'static str,
    range: Option<TextRange>,
    text: impl Into<String>,
) -> Arc<Reference> {
    Arc::new(Reference::new(ReferenceSite {
        document: container.document.clone(),
        container: container.path.clone(),
        container_kind: container.kind,
        property,
        text: text.into(),
        range,
    }))
}

/// Cached resolution state of a reference cell.
#[derive(Clone)]
pub enum ReferenceState {
    /// No attempt yet, or reset by unlink.
    Unresolved,
    /// An attempt was made while the workspace was not ready; retried on the
    /// next access.
    Pending,
    Resolved(Arc<AstNode>),
    Failed(LinkingError),
}

impl ReferenceState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReferenceState::Resolved(_) | ReferenceState::Failed(_))
    }
}

impl fmt::Debug for ReferenceState {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            ReferenceState::Unresolved => f.write_str("Unresolved"),
            ReferenceState::Pending => f.write_str("Pending"),
            ReferenceState::Resolved(node) => write!(f, "Resolved({})", node.path()),
            ReferenceState::Failed(error) => write!(f, "Failed({})", error.kind.as_str()),
        }
    }
}

/// Outcome of [`Reference::resolve`].
#[derive(Debug, Clone)]
pub enum Resolution {
    Resolved(Arc<AstNode>),
    Failed(LinkingError),
    /// The workspace was not processed far enough; nothing was cached.
    NotYetResolvable,
}

impl Resolution {
    pub fn node(&self) -> Option<&Arc<AstNode>> {
        match self {
            Resolution::Resolved(node) => Some(node),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&LinkingError> {
        match self {
            Resolution::Failed(error) => Some(error),
            _ => None,
        }
    }
}

struct ReferenceCache {
    state: ReferenceState,
    descriptor: Option<DeclarationDescriptor>,
    /// Bumped by every reset so attempts started earlier cannot write back.
    generation: u64,
    /// Whether the owning document's reference list holds this cell.
    registered: bool,
}

/// What a resolution attempt saw when it started.
pub(crate) struct CacheSnapshot {
    pub(crate) state: ReferenceState,
    pub(crate) descriptor: Option<DeclarationDescriptor>,
    pub(crate) generation: u64,
}

/// The lazily resolved, cached target of one [`ReferenceSite`].
///
/// Resolution is explicit: call [`Reference::resolve`]. It may query scopes
/// and load other documents, and it may update this cell's cache. The
/// inspectors (`descriptor`, `error`, `node`, `state`) never trigger work.
pub struct Reference {
    site: ReferenceSite,
    cache: Mutex<ReferenceCache>,
}

impl Reference {
    pub(crate) fn new(site: ReferenceSite) -> Self {
        Self {
            site,
            cache: Mutex::new(ReferenceCache {
                state: ReferenceState::Unresolved,
                descriptor: None,
                generation: 0,
                registered: false,
            }),
        }
    }

    pub fn site(&self) -> &ReferenceSite {
        &self.site
    }

    pub fn text(&self) -> &str {
        &self.site.text
    }

    /// Resolve on first access, or return the cached terminal outcome.
    ///
    /// A `NotYetResolvable` outcome is not cached, so the next call tries
    /// again. Never panics on collaborator failure: faults come back as
    /// [`Resolution::Failed`].
    pub fn resolve(
        self: &Arc<Self>,
        linker: &Linker,
    ) -> Resolution {
        linker.resolve_reference(self)
    }

    pub fn state(&self) -> ReferenceState {
        self.lock().state.clone()
    }

    pub fn descriptor(&self) -> Option<DeclarationDescriptor> {
        self.lock().descriptor.clone()
    }

    pub fn error(&self) -> Option<LinkingError> {
        match &self.lock().state {
            ReferenceState::Failed(error) => Some(error.clone()),
            _ => None,
        }
    }

    pub fn node(&self) -> Option<Arc<AstNode>> {
        match &self.lock().state {
            ReferenceState::Resolved(node) => Some(Arc::clone(node)),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.lock().state, ReferenceState::Resolved(_))
    }

    pub fn is_terminal(&self) -> bool {
        self.lock().state.is_terminal()
    }

    pub(crate) fn snapshot(&self) -> CacheSnapshot {
        let cache = self.lock();
        CacheSnapshot {
            state: cache.state.clone(),
            descriptor: cache.descriptor.clone(),
            generation: cache.generation,
        }
    }

    /// Record a terminal outcome computed by an attempt that started at
    /// `generation`, and return the outcome the cell now holds.
    ///
    /// The first terminal write wins. A write from an attempt that raced with
    /// a reset is dropped and its own outcome is handed back uncached.
    pub(crate) fn store_terminal(
        &self,
        generation: u64,
        descriptor: Option<DeclarationDescriptor>,
        state: ReferenceState,
    ) -> ReferenceState {
        debug_assert!(state.is_terminal());
        let mut cache = self.lock();
        if cache.generation != generation {
            return state;
        }
        if cache.state.is_terminal() {
            return cache.state.clone();
        }
        if descriptor.is_some() {
            cache.descriptor = descriptor;
        }
        cache.state = state.clone();
        state
    }

    pub(crate) fn mark_pending(
        &self,
        generation: u64,
    ) {
        let mut cache = self.lock();
        if cache.generation == generation && !cache.state.is_terminal() {
            cache.state = ReferenceState::Pending;
        }
    }

    /// Mark as held by the owning document's reference list. Returns `true`
    /// only for the call that changed the flag, and never for an attempt
    /// that raced with a reset.
    pub(crate) fn register(
        &self,
        generation: u64,
    ) -> bool {
        let mut cache = self.lock();
        if cache.generation != generation {
            return false;
        }
        !std::mem::replace(&mut cache.registered, true)
    }

    /// Forget everything cached. Used by unlink.
    pub(crate) fn reset(&self) {
        let mut cache = self.lock();
        cache.state = ReferenceState::Unresolved;
        cache.descriptor = None;
        cache.registered = false;
        cache.generation = cache.generation.wrapping_add(1);
    }

    fn lock(&self) -> MutexGuard<'_, ReferenceCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Reference {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Reference")
            .field("text", &self.site.text)
            .field("property", &self.site.property)
            .field("container", &self.site.container.to_string())
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/src/linker/reference_tests.rs"]
mod tests;
