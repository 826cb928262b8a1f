//! Cross-reference linking: lazy reference cells, candidate resolution and
//! the link/unlink lifecycle.

mod cancel;
mod candidate;
mod descriptor;
mod error;
mod guard;
mod orchestrator;
mod reference;
mod service;

pub use cancel::{CancellationToken, LinkAbort};
pub use descriptor::DeclarationDescriptor;
pub use error::{LinkingError, LinkingErrorKind};
pub use orchestrator::LinkReport;
pub use reference::{ContainerRef, Reference, ReferenceSite, ReferenceState, Resolution, build_reference};
pub use service::{DEFAULT_YIELD_INTERVAL, Linker};
