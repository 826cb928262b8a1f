use std::{
    fmt::{Display, Formatter},
    io::ErrorKind,
};

use dashmap::DashMap;
use tower_lsp::lsp_types::Url;

/// Why a document's text could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    NotFound(Url),
    /// The URI does not name a local file.
    NotAFile(Url),
    Read {
        uri: Url,
        reason: String,
    },
}

impl Display for DocumentError {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::NotFound(uri) => write!(f, "document {uri} does not exist"),
            Self::NotAFile(uri) => write!(f, "{uri} is not a file URI"),
            Self::Read {
                uri,
                reason,
            } => write!(f, "failed to read {uri}: {reason}"),
        }
    }
}

impl std::error::Error for DocumentError {}

/// Where document text comes from when a document is loaded on demand.
pub trait TextSource: Send + Sync {
    fn read(
        &self,
        uri: &Url,
    ) -> Result<String, DocumentError>;
}

/// Editor buffers layered over the file system.
///
/// Text set for a URI shadows the file on disk until removed; everything
/// else is read from disk.
#[derive(Debug, Default)]
pub struct OverlayTextSource {
    overlays: DashMap<Url, String>,
}

impl OverlayTextSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(
        &self,
        uri: Url,
        text: String,
    ) {
        self.overlays.insert(uri, text);
    }

    pub fn remove(
        &self,
        uri: &Url,
    ) {
        self.overlays.remove(uri);
    }

    pub fn contains(
        &self,
        uri: &Url,
    ) -> bool {
        self.overlays.contains_key(uri)
    }
}

impl TextSource for OverlayTextSource {
    fn read(
        &self,
        uri: &Url,
    ) -> Result<String, DocumentError> {
        if let Some(text) = self.overlays.get(uri) {
            return Ok(text.value().clone());
        }

        let path = uri.to_file_path().map_err(|()| DocumentError::NotAFile(uri.clone()))?;
        std::fs::read_to_string(&path).map_err(|error| match error.kind() {
            ErrorKind::NotFound => DocumentError::NotFound(uri.clone()),
            _ => DocumentError::Read {
                uri: uri.clone(),
                reason: error.to_string(),
            },
        })
    }
}
