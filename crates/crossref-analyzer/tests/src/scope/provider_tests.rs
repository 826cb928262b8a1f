use super::*;
use crate::{
    document::{Document, DocumentState, OverlayTextSource},
    scope::{DefaultReflection, compute_exports, compute_local_scopes},
    tree::{MEMBERS, NodePath, TYPE, locate},
};

fn uri(name: &str) -> Url {
    Url::parse(&format!("file:///workspace/{name}.xref")).unwrap()
}

struct Fixture {
    workspace: Arc<WorkspaceDocuments>,
    provider: DefaultScopeProvider,
}

fn fixture(documents: &[(&str, &str)]) -> Fixture {
    let workspace = Arc::new(WorkspaceDocuments::new(Arc::new(OverlayTextSource::new())));
    let index = Arc::new(IndexManager::new());
    for (name, text) in documents {
        let document = Arc::new(Document::new(uri(name), text, 1));
        index.update_exports(document.uri(), compute_exports(&document));
        document.set_local_scopes(compute_local_scopes(&document));
        document.set_state(DocumentState::ScopesComputed);
        workspace.add(document);
    }
    let provider = DefaultScopeProvider::new(Arc::clone(&workspace), index, Arc::new(DefaultReflection));
    Fixture {
        workspace,
        provider,
    }
}

fn member_type_site(
    fixture: &Fixture,
    name: &str,
) -> ReferenceSite {
    let root = fixture.workspace.get(&uri(name)).unwrap().root();
    let member = locate(&root, &NodePath::root().child("statements", 0).child(MEMBERS, 0)).unwrap();
    member.reference(TYPE).unwrap().site().clone()
}

#[test]
fn local_names_shadow_global_and_members_are_not_types() {
    let fixture = fixture(&[("a", "declares Foo { value: Bar; }\ndeclares Bar;"), ("b", "declares Bar;")]);
    let site = member_type_site(&fixture, "a");
    let scope = fixture.provider.get_scope(&site).unwrap();

    let local = scope.get_element("Bar").unwrap();
    assert_eq!(local.document, uri("a"));
    assert_eq!(local.path.to_string(), "/statements@1");

    assert_eq!(scope.get_element("b.Bar").unwrap().document, uri("b"));
    assert!(scope.get_element("value").is_none());
}

#[test]
fn scope_without_local_scopes_is_global_only() {
    let fixture = fixture(&[("a", "declares Foo { value: Bar; }\ndeclares Bar;")]);
    let document = fixture.workspace.get(&uri("a")).unwrap();
    document.set_content("declares Foo { value: Bar; }\ndeclares Bar;", 2);

    let site = member_type_site(&fixture, "a");
    let scope = fixture.provider.get_scope(&site).unwrap();
    assert!(scope.get_element("Bar").is_none());
    assert!(scope.get_element("a.Bar").is_some());
}

#[test]
fn unknown_document_is_an_error() {
    let fixture = fixture(&[("a", "declares Foo { value: Bar; }")]);
    let mut site = member_type_site(&fixture, "a");
    site.document = uri("gone");

    let error = fixture.provider.get_scope(&site).err().unwrap();
    assert_eq!(error, ScopeError::UnknownDocument(uri("gone")));
}
