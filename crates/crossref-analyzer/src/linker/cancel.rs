use std::{
    fmt::{Display, Formatter},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use tower_lsp::lsp_types::Url;

use crate::document::DocumentState;

/// Cooperative cancellation flag shared between a running build and
/// whoever may want to stop it.
///
/// Checked by [`crate::linker::Linker::link`] between nodes, never inside
/// one. Cancelling does not undo resolutions already cached.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Why a link pass stopped before finishing. Neither case is a linking
/// error: no reference was classified as failed because of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkAbort {
    Cancelled,
    /// The document has not reached `ScopesComputed`.
    NotReady {
        document: Url,
        state: DocumentState,
    },
}

impl Display for LinkAbort {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::Cancelled => f.write_str("linking was cancelled"),
            Self::NotReady {
                document,
                state,
            } => {
                write!(f, "cannot link {document} in state {state:?}; scopes must be computed first")
            },
        }
    }
}

impl std::error::Error for LinkAbort {}
