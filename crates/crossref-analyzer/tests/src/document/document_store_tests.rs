use super::*;
use crate::document::{DocumentState, OverlayTextSource};

fn uri(name: &str) -> Url {
    Url::parse(&format!("file:///workspace/{name}.xref")).unwrap()
}

fn store_with_overlay(entries: &[(&str, &str)]) -> WorkspaceDocuments {
    let overlays = Arc::new(OverlayTextSource::new());
    for (name, text) in entries {
        overlays.set(uri(name), text.to_string());
    }
    WorkspaceDocuments::new(overlays)
}

#[test]
fn loads_documents_on_demand() {
    let store = store_with_overlay(&[("b", "declares Foo;")]);
    assert!(!store.has_document(&uri("b")));

    let document = store.get_or_create_document(&uri("b")).unwrap();
    assert_eq!(document.state(), DocumentState::Parsed);
    assert_eq!(document.root().children()[0].name(), Some("Foo"));
    assert!(store.has_document(&uri("b")));

    let again = store.get_or_create_document(&uri("b")).unwrap();
    assert!(Arc::ptr_eq(&document, &again));
}

#[test]
fn missing_document_is_an_error() {
    let store = store_with_overlay(&[]);
    let error = store.get_or_create_document(&Url::parse("file:///definitely/not/here.xref").unwrap()).unwrap_err();
    assert!(matches!(error, DocumentError::NotFound(_)));
    assert!(store.is_empty());
}

#[test]
fn non_file_uri_is_an_error() {
    let store = store_with_overlay(&[]);
    let error = store.get_or_create_document(&Url::parse("untitled:Untitled-1").unwrap()).unwrap_err();
    assert!(matches!(error, DocumentError::NotAFile(_)));
}

#[test]
fn all_is_ordered_by_uri() {
    let store = store_with_overlay(&[]);
    for name in ["c", "a", "b"] {
        store.add(Arc::new(Document::new(uri(name), "", 1)));
    }
    let names: Vec<_> = store.all().iter().map(|d| d.module_name().to_string()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);

    assert!(store.remove(&uri("b")).is_some());
    assert_eq!(store.len(), 2);
}
