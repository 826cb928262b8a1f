use std::{
    path::Path,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError, RwLock,
        atomic::{AtomicU8, Ordering},
    },
};

use once_cell::sync::OnceCell;
use rowan::{TextRange, TextSize};
use tower_lsp::lsp_types::{Diagnostic, Position, Range, Url};

use crate::{
    document::DocumentState,
    linker::{LinkingError, Reference},
    scope::LocalScopes,
    syntax::SyntaxTree,
    tree::{self, AstNode, NodeKind, locate},
};

/// Everything derived from one version of a document's text.
///
/// Replaced as a whole on every edit, so readers holding an `Arc` keep a
/// consistent view while the document moves on.
pub struct DocumentContent {
    pub version: i32,
    line_offsets: Vec<usize>,
    syntax: SyntaxTree,
    root: Arc<AstNode>,
    local_scopes: OnceCell<Arc<LocalScopes>>,
}

impl DocumentContent {
    fn new(
        uri: &Url,
        text: &str,
        version: i32,
    ) -> Self {
        let syntax = SyntaxTree::parse(text);
        let root = tree::build(uri, &syntax);
        Self {
            version,
            line_offsets: compute_line_offsets(text),
            syntax,
            root,
            local_scopes: OnceCell::new(),
        }
    }

    pub fn text(&self) -> &str {
        self.syntax.source()
    }

    pub fn syntax(&self) -> &SyntaxTree {
        &self.syntax
    }

    pub fn root(&self) -> &Arc<AstNode> {
        &self.root
    }
}

/// One workspace document: its text, semantic tree, processing state and
/// the reference cells linking has touched.
pub struct Document {
    uri: Url,
    module_name: String,
    state: AtomicU8,
    content: RwLock<Arc<DocumentContent>>,
    /// Cells registered by link passes or lazy resolution, each at most once.
    references: Mutex<Vec<Arc<Reference>>>,
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl Document {
    pub fn new(
        uri: Url,
        text: &str,
        version: i32,
    ) -> Self {
        let content = DocumentContent::new(&uri, text, version);
        let module_name = module_name_of(&uri);
        Self {
            uri,
            module_name,
            state: AtomicU8::new(DocumentState::Parsed as u8),
            content: RwLock::new(Arc::new(content)),
            references: Mutex::new(Vec::new()),
            diagnostics: Mutex::new(Vec::new()),
        }
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// Qualifier of exported names: the file stem, e.g. `b` for `b.xref`.
    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn state(&self) -> DocumentState {
        DocumentState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn set_state(
        &self,
        state: DocumentState,
    ) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Move the state back to at most `state`; never moves it forward.
    pub fn reset_to(
        &self,
        state: DocumentState,
    ) {
        self.state.fetch_min(state as u8, Ordering::AcqRel);
    }

    pub fn content(&self) -> Arc<DocumentContent> {
        Arc::clone(&self.content.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn root(&self) -> Arc<AstNode> {
        Arc::clone(self.content().root())
    }

    pub fn version(&self) -> i32 {
        self.content().version
    }

    pub fn text(&self) -> String {
        self.content().text().to_string()
    }

    /// Replace the text and rebuild the tree. The document goes back to
    /// `Parsed`; the caller unlinks it first.
    pub fn set_content(
        &self,
        text: &str,
        version: i32,
    ) {
        let content = Arc::new(DocumentContent::new(&self.uri, text, version));
        *self.content.write().unwrap_or_else(PoisonError::into_inner) = content;
        self.references_lock().clear();
        self.set_state(DocumentState::Parsed);
    }

    pub fn local_scopes(&self) -> Option<Arc<LocalScopes>> {
        self.content().local_scopes.get().cloned()
    }

    /// Store the local scopes of the current content. A second call for the
    /// same content keeps the first value.
    pub fn set_local_scopes(
        &self,
        scopes: LocalScopes,
    ) {
        let _ = self.content().local_scopes.set(Arc::new(scopes));
    }

    // ── reference registry ──────────────────────────────────────────────

    /// Add a cell to the reference list unless it is already there.
    ///
    /// Cells that do not belong to the current tree are ignored, as is a
    /// registration from an attempt that started before the cell was reset.
    pub(crate) fn register_reference(
        &self,
        reference: &Arc<Reference>,
        generation: u64,
    ) {
        let site = reference.site();
        if site.document != self.uri {
            return;
        }
        let owned = locate(&self.root(), &site.container)
            .and_then(|node| node.reference(site.property).map(|held| Arc::ptr_eq(held, reference)))
            .unwrap_or(false);
        if owned && reference.register(generation) {
            self.references_lock().push(Arc::clone(reference));
        }
    }

    pub fn references(&self) -> Vec<Arc<Reference>> {
        self.references_lock().clone()
    }

    pub(crate) fn take_references(&self) -> Vec<Arc<Reference>> {
        std::mem::take(&mut *self.references_lock())
    }

    /// Cached linking failures of registered references, in list order.
    pub fn linking_errors(&self) -> Vec<LinkingError> {
        self.references_lock().iter().filter_map(|reference| reference.error()).collect()
    }

    /// The reference whose text range contains `offset`.
    pub fn reference_at(
        &self,
        offset: usize,
    ) -> Option<Arc<Reference>> {
        let offset = TextSize::try_from(offset).ok()?;
        self.root().preorder().find_map(|node| {
            node.references()
                .iter()
                .find(|reference| reference.site().range.is_some_and(|range| range.contains_inclusive(offset)))
                .cloned()
        })
    }

    /// The declaration whose name token contains `offset`.
    pub fn declaration_at(
        &self,
        offset: usize,
    ) -> Option<Arc<AstNode>> {
        let offset = TextSize::try_from(offset).ok()?;
        self.root().preorder().find(|node| {
            node.kind() == NodeKind::Declaration && node.name_range().contains_inclusive(offset)
        })
    }

    // ── diagnostics ─────────────────────────────────────────────────────

    pub fn set_diagnostics(
        &self,
        diagnostics: Vec<Diagnostic>,
    ) {
        *self.diagnostics.lock().unwrap_or_else(PoisonError::into_inner) = diagnostics;
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    // ── positions ───────────────────────────────────────────────────────

    /// Convert an LSP `Position` (line/character, 0-based) to a byte offset.
    pub fn offset_of(
        &self,
        pos: Position,
    ) -> Option<usize> {
        let content = self.content();
        let text = content.text();
        let line = pos.line as usize;
        let line_start = *content.line_offsets.get(line)?;
        let line_end = content.line_offsets.get(line + 1).copied().unwrap_or(text.len());

        // LSP character offsets are UTF-16 code-unit counts.
        let mut utf16_offset: u32 = 0;
        let mut byte_offset = line_start;
        for ch in text[line_start..line_end].chars() {
            if utf16_offset >= pos.character {
                break;
            }
            utf16_offset += ch.len_utf16() as u32;
            byte_offset += ch.len_utf8();
        }
        Some(byte_offset)
    }

    /// Convert a byte offset to an LSP `Position`.
    pub fn position_of(
        &self,
        offset: usize,
    ) -> Position {
        position_in(&self.content(), offset)
    }

    pub fn range_of(
        &self,
        range: TextRange,
    ) -> Range {
        let content = self.content();
        Range {
            start: position_in(&content, range.start().into()),
            end: position_in(&content, range.end().into()),
        }
    }

    fn references_lock(&self) -> MutexGuard<'_, Vec<Arc<Reference>>> {
        self.references.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Document {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("uri", &self.uri.as_str())
            .field("state", &self.state())
            .field("version", &self.version())
            .finish()
    }
}

fn position_in(
    content: &DocumentContent,
    offset: usize,
) -> Position {
    let text = content.text();
    // Ranges of a replaced tree may fall inside a multi-byte character.
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    let line = match content.line_offsets.binary_search(&offset) {
        Ok(exact) => exact,
        Err(ins) => ins.saturating_sub(1),
    };
    let line_start = content.line_offsets[line];
    let character = text[line_start..offset].chars().map(|c| c.len_utf16() as u32).sum::<u32>();
    Position {
        line: line as u32,
        character,
    }
}

fn compute_line_offsets(text: &str) -> Vec<usize> {
    let mut offsets = vec![0usize];
    for (i, byte) in text.bytes().enumerate() {
        if byte == b'\n' {
            offsets.push(i + 1);
        }
    }
    offsets
}

fn module_name_of(uri: &Url) -> String {
    Path::new(uri.path())
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
#[path = "../../tests/src/document/text_document_tests.rs"]
mod tests;
