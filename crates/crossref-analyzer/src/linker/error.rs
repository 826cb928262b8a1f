use std::fmt::{Display, Formatter};

use crate::linker::{DeclarationDescriptor, ReferenceSite};

/// Terminal classification of a failed resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkingErrorKind {
    /// No declaration with the referenced name is in scope.
    NameNotFound,
    /// A declaration was found but its node could not be materialized.
    TargetUnloadable,
    /// Resolution failed unexpectedly; the message keeps the original cause.
    InternalFault,
}

impl LinkingErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LinkingErrorKind::NameNotFound => "name-not-found",
            LinkingErrorKind::TargetUnloadable => "target-unloadable",
            LinkingErrorKind::InternalFault => "internal-fault",
        }
    }
}

/// A reportable, cached failure to resolve one reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkingError {
    pub kind: LinkingErrorKind,
    pub site: ReferenceSite,
    pub message: String,
    /// Best-guess target that was found but could not be loaded.
    pub target: Option<DeclarationDescriptor>,
}

impl LinkingError {
    pub(crate) fn name_not_found(
        site: &ReferenceSite,
        expected: &str,
    ) -> Self {
        Self {
            kind: LinkingErrorKind::NameNotFound,
            message: format!("Could not resolve reference to {expected} named '{}'.", site.text),
            site: site.clone(),
            target: None,
        }
    }

    pub(crate) fn target_unloadable(
        site: &ReferenceSite,
        target: DeclarationDescriptor,
        reason: &str,
    ) -> Self {
        Self {
            kind: LinkingErrorKind::TargetUnloadable,
            message: format!(
                "Could not load '{}' referenced as '{}' from {}: {reason}",
                target.name, site.text, target.document
            ),
            site: site.clone(),
            target: Some(target),
        }
    }

    pub(crate) fn internal_fault(
        site: &ReferenceSite,
        cause: &str,
    ) -> Self {
        Self {
            kind: LinkingErrorKind::InternalFault,
            message: format!("An error occurred while resolving reference to '{}': {cause}", site.text),
            site: site.clone(),
            target: None,
        }
    }
}

impl Display for LinkingError {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for LinkingError {}
