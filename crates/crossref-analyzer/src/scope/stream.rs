use std::sync::Arc;

use crate::{linker::DeclarationDescriptor, scope::ExportTable};

/// Names visible at one point of a document.
pub trait Scope: Send + Sync {
    /// The first visible element named `name`, inner scopes first.
    fn get_element(
        &self,
        name: &str,
    ) -> Option<DeclarationDescriptor>;

    /// Every visible element, inner scopes first. Shadowed names appear
    /// more than once.
    fn elements(&self) -> Vec<DeclarationDescriptor>;
}

/// A list of elements with an optional enclosing scope to fall back to.
pub struct StreamScope {
    elements: Vec<DeclarationDescriptor>,
    outer: Option<Box<dyn Scope>>,
}

impl StreamScope {
    pub fn new(
        elements: Vec<DeclarationDescriptor>,
        outer: Option<Box<dyn Scope>>,
    ) -> Self {
        Self {
            elements,
            outer,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), None)
    }
}

impl Scope for StreamScope {
    fn get_element(
        &self,
        name: &str,
    ) -> Option<DeclarationDescriptor> {
        self.elements
            .iter()
            .find(|element| element.name == name)
            .cloned()
            .or_else(|| self.outer.as_ref().and_then(|outer| outer.get_element(name)))
    }

    fn elements(&self) -> Vec<DeclarationDescriptor> {
        let mut out = self.elements.clone();
        if let Some(outer) = &self.outer {
            out.extend(outer.elements());
        }
        out
    }
}

/// The workspace's exported elements of one kind. Outermost scope of every
/// site.
pub struct GlobalScope {
    table: Arc<ExportTable>,
}

impl GlobalScope {
    pub fn new(table: Arc<ExportTable>) -> Self {
        Self {
            table,
        }
    }
}

impl Scope for GlobalScope {
    fn get_element(
        &self,
        name: &str,
    ) -> Option<DeclarationDescriptor> {
        self.table.get(name).cloned()
    }

    fn elements(&self) -> Vec<DeclarationDescriptor> {
        self.table.elements().to_vec()
    }
}

#[cfg(test)]
#[path = "../../tests/src/scope/stream_tests.rs"]
mod tests;
