pub mod builder;
pub mod config;
pub mod document;
pub mod linker;
pub mod scope;
pub mod server;
pub mod syntax;
pub mod tree;
pub mod validation;

pub use builder::{DocumentBuilder, TextUpdate};
pub use document::{Document, DocumentState, OverlayTextSource, TextSource, WorkspaceDocuments};
pub use linker::{
    CancellationToken, DeclarationDescriptor, LinkAbort, LinkReport, Linker, LinkingError, LinkingErrorKind,
    Reference, ReferenceSite, ReferenceState, Resolution,
};
pub use server::CrossrefLanguageServer;
