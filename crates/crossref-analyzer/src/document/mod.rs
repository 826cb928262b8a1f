pub(crate) mod document_store;
pub(crate) mod source;
pub(crate) mod state;
pub(crate) mod text_document;

pub use document_store::WorkspaceDocuments;
pub use source::{DocumentError, OverlayTextSource, TextSource};
pub use state::DocumentState;
pub use text_document::{Document, DocumentContent};
