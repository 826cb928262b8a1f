use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::{Range, Url};

use crate::{
    document::Document,
    linker::DeclarationDescriptor,
    tree::{NodeKind, NodePath},
};

/// A reference from one document to a declaration, as recorded after
/// linking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceDescription {
    pub source_uri: Url,
    pub source_path: NodePath,
    pub property: String,
    pub source_range: Range,
    pub target_uri: Url,
    pub target_path: NodePath,
}

/// Exported elements of one kind across the workspace, ordered by document,
/// with the first element of each name indexed for lookup.
#[derive(Debug, Default)]
pub struct ExportTable {
    elements: Vec<DeclarationDescriptor>,
    by_name: HashMap<String, usize>,
}

impl ExportTable {
    fn new(elements: Vec<DeclarationDescriptor>) -> Self {
        let mut by_name = HashMap::with_capacity(elements.len());
        for (position, element) in elements.iter().enumerate() {
            by_name.entry(element.name.clone()).or_insert(position);
        }
        Self {
            elements,
            by_name,
        }
    }

    pub fn get(
        &self,
        name: &str,
    ) -> Option<&DeclarationDescriptor> {
        self.by_name.get(name).map(|&position| &self.elements[position])
    }

    pub fn elements(&self) -> &[DeclarationDescriptor] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Export tables built since the last change to the exports.
#[derive(Debug, Default)]
struct ExportTables {
    revision: u64,
    by_kind: HashMap<NodeKind, Arc<ExportTable>>,
}

/// Workspace-wide index of exported declarations and linked references.
///
/// Exports feed the global scope; reference descriptions answer "who uses
/// this" and decide which documents a change affects.
#[derive(Debug, Default)]
pub struct IndexManager {
    exports: DashMap<Url, Vec<DeclarationDescriptor>>,
    references: DashMap<Url, Vec<ReferenceDescription>>,
    tables: Mutex<ExportTables>,
}

impl IndexManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_exports(
        &self,
        uri: &Url,
        exports: Vec<DeclarationDescriptor>,
    ) {
        self.exports.insert(uri.clone(), exports);
        self.invalidate_tables();
    }

    pub fn exports_of(
        &self,
        uri: &Url,
    ) -> Vec<DeclarationDescriptor> {
        self.exports.get(uri).map(|entry| entry.value().clone()).unwrap_or_default()
    }

    /// Exported elements of `kind` across the workspace, ordered by document.
    ///
    /// Built once per change to the exports and shared until the next one.
    pub fn export_table(
        &self,
        kind: NodeKind,
    ) -> Arc<ExportTable> {
        let revision = {
            let tables = self.tables_lock();
            if let Some(table) = tables.by_kind.get(&kind) {
                return Arc::clone(table);
            }
            tables.revision
        };

        let mut entries: Vec<_> = self
            .exports
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        entries.sort_by(|(a, _), (b, _)| a.as_str().cmp(b.as_str()));
        let table = Arc::new(ExportTable::new(
            entries
                .into_iter()
                .flat_map(|(_, exports)| exports)
                .filter(|descriptor| descriptor.kind == kind)
                .collect(),
        ));

        // Exports changed while building: hand the table out uncached.
        let mut tables = self.tables_lock();
        if tables.revision == revision {
            tables.by_kind.insert(kind, Arc::clone(&table));
        }
        table
    }

    /// Keep a document's exports but drop their resident node pointers, so
    /// the index no longer holds the document's tree alive.
    pub fn detach(
        &self,
        uri: &Url,
    ) {
        if let Some(mut exports) = self.exports.get_mut(uri) {
            for descriptor in exports.iter_mut() {
                descriptor.node = None;
            }
        }
        self.references.remove(uri);
        self.invalidate_tables();
    }

    /// Forget a document entirely.
    pub fn remove(
        &self,
        uri: &Url,
    ) {
        self.exports.remove(uri);
        self.references.remove(uri);
        self.invalidate_tables();
    }

    /// Record the references of a linked document that point at a known
    /// declaration, resolved or not yet loaded.
    pub fn update_references(
        &self,
        document: &Document,
    ) {
        let descriptions = document
            .references()
            .iter()
            .filter_map(|reference| {
                let target = reference.descriptor()?;
                let site = reference.site();
                let source_range = site.range.map(|range| document.range_of(range)).unwrap_or_default();
                Some(ReferenceDescription {
                    source_uri: site.document.clone(),
                    source_path: site.container.clone(),
                    property: site.property.to_string(),
                    source_range,
                    target_uri: target.document,
                    target_path: target.path,
                })
            })
            .collect();
        self.references.insert(document.uri().clone(), descriptions);
    }

    pub fn references_of(
        &self,
        uri: &Url,
    ) -> Vec<ReferenceDescription> {
        self.references.get(uri).map(|entry| entry.value().clone()).unwrap_or_default()
    }

    /// Every recorded reference to the declaration at `target_path` in
    /// `target_uri`, ordered by source document.
    pub fn find_references(
        &self,
        target_uri: &Url,
        target_path: &NodePath,
    ) -> Vec<ReferenceDescription> {
        let mut found: Vec<_> = self
            .references
            .iter()
            .flat_map(|entry| entry.value().clone())
            .filter(|description| &description.target_uri == target_uri && &description.target_path == target_path)
            .collect();
        found.sort_by(|a, b| {
            a.source_uri
                .as_str()
                .cmp(b.source_uri.as_str())
                .then_with(|| a.source_range.start.line.cmp(&b.source_range.start.line))
                .then_with(|| a.source_range.start.character.cmp(&b.source_range.start.character))
        });
        found
    }

    /// Whether `uri` holds a recorded reference into any of `changed`.
    pub fn is_affected(
        &self,
        uri: &Url,
        changed: &HashSet<Url>,
    ) -> bool {
        self.references
            .get(uri)
            .is_some_and(|entry| entry.value().iter().any(|description| changed.contains(&description.target_uri)))
    }

    fn invalidate_tables(&self) {
        let mut tables = self.tables_lock();
        tables.revision = tables.revision.wrapping_add(1);
        tables.by_kind.clear();
    }

    fn tables_lock(&self) -> MutexGuard<'_, ExportTables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "../../tests/src/scope/index_tests.rs"]
mod tests;
