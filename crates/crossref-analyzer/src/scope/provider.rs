use std::{
    fmt::{Display, Formatter},
    sync::Arc,
};

use tower_lsp::lsp_types::Url;

use crate::{
    document::WorkspaceDocuments,
    linker::ReferenceSite,
    scope::{GlobalScope, IndexManager, Reflection, Scope, StreamScope},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    /// The site's document is not in the workspace.
    UnknownDocument(Url),
}

impl Display for ScopeError {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::UnknownDocument(uri) => write!(f, "no document {uri} in the workspace"),
        }
    }
}

impl std::error::Error for ScopeError {}

/// Computes the scope a reference site resolves in.
pub trait ScopeProvider: Send + Sync {
    fn get_scope(
        &self,
        site: &ReferenceSite,
    ) -> Result<Box<dyn Scope>, ScopeError>;
}

/// Local scopes of the site's enclosing containers, innermost first, over
/// the global scope of all exported declarations.
///
/// Only elements of the kind the reference expects are visible. Before a
/// document's local scopes are computed it sees the global scope only.
pub struct DefaultScopeProvider {
    workspace: Arc<WorkspaceDocuments>,
    index: Arc<IndexManager>,
    reflection: Arc<dyn Reflection>,
}

impl DefaultScopeProvider {
    pub fn new(
        workspace: Arc<WorkspaceDocuments>,
        index: Arc<IndexManager>,
        reflection: Arc<dyn Reflection>,
    ) -> Self {
        Self {
            workspace,
            index,
            reflection,
        }
    }
}

impl ScopeProvider for DefaultScopeProvider {
    fn get_scope(
        &self,
        site: &ReferenceSite,
    ) -> Result<Box<dyn Scope>, ScopeError> {
        let document = self
            .workspace
            .get(&site.document)
            .ok_or_else(|| ScopeError::UnknownDocument(site.document.clone()))?;
        let expected = self.reflection.reference_type(site);

        let mut scope: Box<dyn Scope> = Box::new(GlobalScope::new(self.index.export_table(expected)));

        let Some(local_scopes) = document.local_scopes() else {
            return Ok(scope);
        };
        // Outermost container first, so the innermost ends up on top.
        for path in site.container.ancestors().iter().rev() {
            let Some(elements) = local_scopes.get(path) else {
                continue;
            };
            let visible: Vec<_> = elements.iter().filter(|element| element.kind == expected).cloned().collect();
            if !visible.is_empty() {
                scope = Box::new(StreamScope::new(visible, Some(scope)));
            }
        }
        Ok(scope)
    }
}

#[cfg(test)]
#[path = "../../tests/src/scope/provider_tests.rs"]
mod tests;
