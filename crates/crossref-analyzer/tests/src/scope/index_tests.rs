use std::sync::Arc;

use super::*;
use crate::{
    document::{DocumentState, OverlayTextSource, WorkspaceDocuments},
    linker::{CancellationToken, Linker},
    scope::{DefaultReflection, DefaultScopeProvider, compute_exports, compute_local_scopes},
};

fn uri(name: &str) -> Url {
    Url::parse(&format!("file:///workspace/{name}.xref")).unwrap()
}

#[test]
fn export_table_is_ordered_by_document_and_filtered_by_kind() {
    let index = IndexManager::new();
    for (name, text) in [("c", "declares Z;"), ("a", "declares Y;\ndeclares X;")] {
        let document = Document::new(uri(name), text, 1);
        index.update_exports(document.uri(), compute_exports(&document));
    }

    let table = index.export_table(NodeKind::Declaration);
    let names: Vec<_> = table.elements().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["a.Y", "a.X", "c.Z"]);
    assert_eq!(table.get("c.Z").map(|e| e.document.clone()), Some(uri("c")));
    assert!(table.get("Z").is_none());
    assert!(index.export_table(NodeKind::Member).is_empty());
}

#[test]
fn export_table_is_shared_until_exports_change() {
    let index = IndexManager::new();
    let document = Document::new(uri("b"), "declares Foo;", 1);
    index.update_exports(document.uri(), compute_exports(&document));

    let first = index.export_table(NodeKind::Declaration);
    assert!(Arc::ptr_eq(&first, &index.export_table(NodeKind::Declaration)));
    assert!(first.get("b.Foo").unwrap().node.is_some());

    index.detach(document.uri());
    let detached = index.export_table(NodeKind::Declaration);
    assert!(!Arc::ptr_eq(&first, &detached));
    assert!(detached.get("b.Foo").unwrap().node.is_none());

    let other = Document::new(uri("c"), "declares Bar;", 1);
    index.update_exports(other.uri(), compute_exports(&other));
    assert_eq!(index.export_table(NodeKind::Declaration).len(), 2);

    index.remove(other.uri());
    index.remove(document.uri());
    assert!(index.export_table(NodeKind::Declaration).is_empty());
}

#[test]
fn detach_keeps_exports_without_nodes() {
    let index = IndexManager::new();
    let document = Document::new(uri("b"), "declares Foo;", 1);
    index.update_exports(document.uri(), compute_exports(&document));

    index.detach(document.uri());
    let exports = index.exports_of(document.uri());
    assert_eq!(exports.len(), 1);
    assert!(exports[0].node.is_none());

    index.remove(document.uri());
    assert!(index.exports_of(document.uri()).is_empty());
}

#[tokio::test]
async fn records_linked_references_for_lookup() {
    let overlays = Arc::new(OverlayTextSource::new());
    let workspace = Arc::new(WorkspaceDocuments::new(overlays));
    let index = Arc::new(IndexManager::new());
    let reflection = Arc::new(DefaultReflection);
    let scopes = Arc::new(DefaultScopeProvider::new(Arc::clone(&workspace), Arc::clone(&index), reflection.clone()));
    let linker = Linker::new(Arc::clone(&workspace), scopes, reflection);

    let a = Arc::new(Document::new(uri("a"), "uses b.Foo;\nuses b.Missing;", 1));
    let b = Arc::new(Document::new(uri("b"), "declares Foo;", 1));
    for document in [&a, &b] {
        workspace.add(Arc::clone(document));
        index.update_exports(document.uri(), compute_exports(document));
        document.set_local_scopes(compute_local_scopes(document));
        document.set_state(DocumentState::ScopesComputed);
    }

    linker.link(&a, &CancellationToken::new()).await.unwrap();
    index.update_references(&a);

    let found = index.find_references(&uri("b"), &"/statements@0".parse().unwrap());
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].source_uri, uri("a"));
    assert_eq!(found[0].property, "target");
    assert_eq!(found[0].source_range.start.character, 5);

    let changed = [uri("b")].into_iter().collect();
    assert!(index.is_affected(&uri("a"), &changed));
    assert!(!index.is_affected(&uri("b"), &changed));
}
