use std::{
    any::Any,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
};

use tracing::{debug, warn};

use crate::{
    linker::{
        DeclarationDescriptor, Linker, LinkingError, Reference, ReferenceSite, ReferenceState, Resolution, guard,
    },
    tree::{AstNode, locate},
};

/// Why no descriptor came back from the scope.
pub(crate) enum CandidateError {
    NotFound(LinkingError),
    /// The scope provider itself failed.
    Fault(String),
}

/// Result of one resolution attempt, before anything is cached.
pub(crate) enum Attempt {
    Found(DeclarationDescriptor, Arc<AstNode>),
    Unloadable(DeclarationDescriptor, String),
    NotFound(LinkingError),
    Fault(String),
}

impl Linker {
    /// Look up the declaration a site names in its current scope.
    ///
    /// Pure query: never reads or writes any reference cell. Collaborator
    /// failures come back as [`crate::linker::LinkingErrorKind::InternalFault`].
    pub fn get_candidate(
        &self,
        site: &ReferenceSite,
    ) -> Result<DeclarationDescriptor, LinkingError> {
        match catch_unwind(AssertUnwindSafe(|| self.query_candidate(site))) {
            Ok(Ok(descriptor)) => Ok(descriptor),
            Ok(Err(CandidateError::NotFound(error))) => Err(error),
            Ok(Err(CandidateError::Fault(cause))) => Err(LinkingError::internal_fault(site, &cause)),
            Err(payload) => Err(LinkingError::internal_fault(site, &panic_message(payload))),
        }
    }

    pub(crate) fn query_candidate(
        &self,
        site: &ReferenceSite,
    ) -> Result<DeclarationDescriptor, CandidateError> {
        let scope = self.scope_provider.get_scope(site).map_err(|error| CandidateError::Fault(error.to_string()))?;
        scope.get_element(&site.text).ok_or_else(|| {
            let expected = self.reflection.reference_type(site);
            CandidateError::NotFound(LinkingError::name_not_found(site, expected.as_str()))
        })
    }

    /// Materialize the node a descriptor names.
    ///
    /// Uses the resident pointer when there is one, otherwise loads the
    /// owning document (parsing it on demand) and walks the node path.
    pub(crate) fn load_node(
        &self,
        descriptor: &DeclarationDescriptor,
    ) -> Result<Arc<AstNode>, String> {
        if let Some(node) = &descriptor.node {
            return Ok(Arc::clone(node));
        }

        let document =
            self.workspace.get_or_create_document(&descriptor.document).map_err(|error| error.to_string())?;
        let root = document.root();
        let node = locate(&root, &descriptor.path).ok_or_else(|| format!("no node at {}", descriptor.path))?;

        let name_matches = node.name().is_some_and(|name| {
            descriptor.name == name || descriptor.name.strip_suffix(name).is_some_and(|prefix| prefix.ends_with('.'))
        });
        if node.kind() != descriptor.kind || !name_matches {
            return Err(format!(
                "node at {} is {} {:?}, expected {} '{}'",
                descriptor.path,
                node.kind(),
                node.name(),
                descriptor.kind,
                descriptor.name
            ));
        }
        Ok(node)
    }

    /// One attempt at steps "query, then load". A target document that is
    /// not resident is loaded here.
    pub(crate) fn attempt(
        &self,
        site: &ReferenceSite,
        cached: Option<DeclarationDescriptor>,
    ) -> Attempt {
        let run = || {
            let descriptor = match cached {
                Some(descriptor) => descriptor,
                None => match self.query_candidate(site) {
                    Ok(descriptor) => descriptor,
                    Err(CandidateError::NotFound(error)) => return Attempt::NotFound(error),
                    Err(CandidateError::Fault(cause)) => return Attempt::Fault(cause),
                },
            };

            match self.load_node(&descriptor) {
                Ok(node) => Attempt::Found(descriptor, node),
                Err(reason) => Attempt::Unloadable(descriptor, reason),
            }
        };

        catch_unwind(AssertUnwindSafe(run)).unwrap_or_else(|payload| Attempt::Fault(panic_message(payload)))
    }

    /// The lazy accessor behind [`Reference::resolve`].
    pub(crate) fn resolve_reference(
        &self,
        reference: &Arc<Reference>,
    ) -> Resolution {
        let snapshot = reference.snapshot();
        match snapshot.state {
            ReferenceState::Resolved(node) => return Resolution::Resolved(node),
            ReferenceState::Failed(error) => return Resolution::Failed(error),
            ReferenceState::Unresolved | ReferenceState::Pending => {},
        }

        let site = reference.site();
        let attempt = self.attempt(site, snapshot.descriptor);

        if let Attempt::NotFound(_) = &attempt {
            let owner_state = self.workspace.get(&site.document).map(|document| document.state());
            if !guard::failure_is_final(owner_state, site) {
                reference.mark_pending(snapshot.generation);
                return Resolution::NotYetResolvable;
            }
        }

        let (descriptor, state) = settle(site, attempt);
        let state = reference.store_terminal(snapshot.generation, descriptor, state);

        if let Some(document) = self.workspace.get(&site.document) {
            document.register_reference(reference, snapshot.generation);
        }

        match state {
            ReferenceState::Resolved(node) => Resolution::Resolved(node),
            ReferenceState::Failed(error) => Resolution::Failed(error),
            ReferenceState::Unresolved | ReferenceState::Pending => Resolution::NotYetResolvable,
        }
    }
}

/// Turn an attempt into the terminal state to cache, with the descriptor to
/// remember alongside it.
pub(crate) fn settle(
    site: &ReferenceSite,
    attempt: Attempt,
) -> (Option<DeclarationDescriptor>, ReferenceState) {
    match attempt {
        Attempt::Found(descriptor, node) => (Some(descriptor), ReferenceState::Resolved(node)),
        Attempt::Unloadable(descriptor, reason) => {
            debug!("[link] '{}' found in {} but not loadable: {reason}", site.text, descriptor.document);
            let error = LinkingError::target_unloadable(site, descriptor.clone(), &reason);
            (Some(descriptor), ReferenceState::Failed(error))
        },
        Attempt::NotFound(error) => (None, ReferenceState::Failed(error)),
        Attempt::Fault(cause) => {
            warn!("[link] resolving '{}' in {} failed: {cause}", site.text, site.document);
            (None, ReferenceState::Failed(LinkingError::internal_fault(site, &cause)))
        },
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "unknown panic".to_string()
}
