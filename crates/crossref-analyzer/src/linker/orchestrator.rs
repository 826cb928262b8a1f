use std::sync::Arc;

use tracing::debug;

use crate::{
    document::{Document, DocumentState},
    linker::{
        CancellationToken, LinkAbort, Linker, LinkingErrorKind, Reference, ReferenceState,
        candidate::settle,
    },
};

/// Classification of a document's references after a link pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkReport {
    pub references: usize,
    pub resolved: usize,
    pub name_not_found: usize,
    pub target_unloadable: usize,
    pub internal_fault: usize,
}

impl LinkReport {
    fn record(
        &mut self,
        reference: &Reference,
    ) {
        self.references += 1;
        match reference.state() {
            ReferenceState::Resolved(_) => self.resolved += 1,
            ReferenceState::Failed(error) => match error.kind {
                LinkingErrorKind::NameNotFound => self.name_not_found += 1,
                LinkingErrorKind::TargetUnloadable => self.target_unloadable += 1,
                LinkingErrorKind::InternalFault => self.internal_fault += 1,
            },
            ReferenceState::Unresolved | ReferenceState::Pending => {},
        }
    }

    pub fn failed(&self) -> usize {
        self.name_not_found + self.target_unloadable + self.internal_fault
    }
}

impl Linker {
    /// Resolve every reference of `document` in pre-order and collect them
    /// in the document's reference list.
    ///
    /// Cells that already hold a terminal outcome are kept as they are, so
    /// linking twice yields the same classifications. `cancel` is checked
    /// before each node; on cancellation the outcomes cached so far stay
    /// valid and a later `link` picks up where this one stopped.
    pub async fn link(
        &self,
        document: &Document,
        cancel: &CancellationToken,
    ) -> Result<LinkReport, LinkAbort> {
        let state = document.state();
        if state < DocumentState::ScopesComputed {
            return Err(LinkAbort::NotReady {
                document: document.uri().clone(),
                state,
            });
        }

        let yield_interval = self.yield_interval();
        let mut report = LinkReport::default();

        for (visited, node) in document.root().preorder().enumerate() {
            if cancel.is_cancelled() {
                debug!("[link] cancelled in {} after {visited} nodes", document.uri());
                return Err(LinkAbort::Cancelled);
            }
            if visited > 0 && visited % yield_interval == 0 {
                tokio::task::yield_now().await;
            }

            for reference in node.references() {
                self.link_reference(document, reference);
                report.record(reference);
            }
        }

        debug!(
            "[link] {}: {} references, {} resolved, {} failed",
            document.uri(),
            report.references,
            report.resolved,
            report.failed()
        );
        Ok(report)
    }

    /// Eager resolution of one site through the candidate path. Target
    /// documents that are not resident are loaded, so an unloadable target
    /// is cached as a failure like any other.
    fn link_reference(
        &self,
        document: &Document,
        reference: &Arc<Reference>,
    ) {
        let snapshot = reference.snapshot();
        if !snapshot.state.is_terminal() {
            let site = reference.site();
            let (descriptor, state) = settle(site, self.attempt(site, snapshot.descriptor));
            reference.store_terminal(snapshot.generation, descriptor, state);
        }
        document.register_reference(reference, snapshot.generation);
    }

    /// Drop every cached resolution of `document` and empty its reference
    /// list. Idempotent; leaves the document state untouched.
    ///
    /// Must run before the document's tree is rebuilt and before the
    /// document leaves the workspace, so no cell keeps nodes of other
    /// documents alive past their lifetime.
    pub fn unlink(
        &self,
        document: &Document,
    ) {
        let mut cleared = 0usize;
        for node in document.root().preorder() {
            for reference in node.references() {
                reference.reset();
                cleared += 1;
            }
        }
        for reference in document.take_references() {
            reference.reset();
        }
        debug!("[unlink] {}: reset {cleared} references", document.uri());
    }
}
