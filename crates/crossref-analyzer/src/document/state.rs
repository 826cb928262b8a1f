use std::fmt;

use serde::{Deserialize, Serialize};

/// Processing stage of a document, in the order the builder advances it.
///
/// Only ever moves forward during a build; [`crate::linker::Linker::unlink`]
/// plus a rebuild or an explicit reset moves it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum DocumentState {
    Parsed = 0,
    Indexed = 1,
    ScopesComputed = 2,
    Linked = 3,
    Validated = 4,
}

impl DocumentState {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Parsed,
            1 => Self::Indexed,
            2 => Self::ScopesComputed,
            3 => Self::Linked,
            _ => Self::Validated,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Parsed => "parsed",
            Self::Indexed => "indexed",
            Self::ScopesComputed => "scopes-computed",
            Self::Linked => "linked",
            Self::Validated => "validated",
        }
    }
}

impl fmt::Display for DocumentState {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
