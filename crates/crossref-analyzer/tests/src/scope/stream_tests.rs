use tower_lsp::lsp_types::Url;

use super::*;
use crate::tree::{NodeKind, NodePath};

fn element(
    name: &str,
    index: usize,
) -> DeclarationDescriptor {
    DeclarationDescriptor::new(
        Url::parse("file:///workspace/a.xref").unwrap(),
        NodePath::root().child("statements", index),
        name,
        NodeKind::Declaration,
    )
}

#[test]
fn inner_elements_shadow_outer() {
    let outer = StreamScope::new(vec![element("Foo", 0), element("Bar", 1)], None);
    let inner = StreamScope::new(vec![element("Foo", 2)], Some(Box::new(outer)));

    assert_eq!(inner.get_element("Foo").unwrap().path.to_string(), "/statements@2");
    assert_eq!(inner.get_element("Bar").unwrap().path.to_string(), "/statements@1");
    assert!(inner.get_element("Baz").is_none());
}

#[test]
fn elements_lists_inner_first() {
    let outer = StreamScope::new(vec![element("Foo", 0)], None);
    let inner = StreamScope::new(vec![element("Foo", 2)], Some(Box::new(outer)));
    let paths: Vec<_> = inner.elements().iter().map(|e| e.path.to_string()).collect();
    assert_eq!(paths, vec!["/statements@2", "/statements@0"]);
    assert!(StreamScope::empty().elements().is_empty());
}
