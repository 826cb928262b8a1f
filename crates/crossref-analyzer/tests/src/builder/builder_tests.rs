use super::*;
use crate::{
    document::OverlayTextSource,
    linker::{LinkingErrorKind, Reference},
    tree::TARGET,
};

fn uri(name: &str) -> Url {
    Url::parse(&format!("file:///workspace/{name}.xref")).unwrap()
}

/// A builder whose documents are also readable from its text source, so
/// evicted documents can be loaded again.
fn builder(documents: &[(&str, &str)]) -> DocumentBuilder {
    let overlays = Arc::new(OverlayTextSource::new());
    for (name, text) in documents {
        overlays.set(uri(name), text.to_string());
    }
    let builder = DocumentBuilder::new(overlays);
    for (name, text) in documents {
        builder.add_document(uri(name), text, 1);
    }
    builder
}

fn uses_target(
    builder: &DocumentBuilder,
    name: &str,
) -> Arc<Reference> {
    let document = builder.workspace().get(&uri(name)).unwrap();
    Arc::clone(document.root().children()[0].reference(TARGET).unwrap())
}

#[tokio::test]
async fn build_takes_every_document_to_validated() {
    let builder = builder(&[("a", "uses b.Foo;"), ("b", "declares Foo;")]);

    let validated = builder.build_workspace(&CancellationToken::new()).await.unwrap();
    let uris: Vec<_> = validated.iter().map(|document| document.uri().clone()).collect();
    assert_eq!(uris, vec![uri("a"), uri("b")]);
    assert!(builder.workspace().all().iter().all(|document| document.state() == DocumentState::Validated));

    let target = uses_target(&builder, "a").node().unwrap();
    let b = builder.workspace().get(&uri("b")).unwrap();
    assert!(Arc::ptr_eq(&target, &b.root().children()[0]));

    // Nothing left to do.
    assert!(builder.build_workspace(&CancellationToken::new()).await.unwrap().is_empty());
}

#[tokio::test]
async fn changing_a_target_relinks_its_dependants() {
    let builder = builder(&[("a", "uses b.Foo;"), ("b", "declares Foo;"), ("c", "declares Baz;\nuses Baz;")]);
    builder.build_workspace(&CancellationToken::new()).await.unwrap();
    let c_link = builder.workspace().get(&uri("c")).unwrap().root().children()[1].reference(TARGET).unwrap().node();

    let validated = builder
        .update(
            vec![TextUpdate {
                uri: uri("b"),
                text: "declares Bar;".to_string(),
                version: 2,
            }],
            Vec::new(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let uris: Vec<_> = validated.iter().map(|document| document.uri().clone()).collect();
    assert_eq!(uris, vec![uri("a"), uri("b")]);

    let error = uses_target(&builder, "a").error().unwrap();
    assert_eq!(error.kind, LinkingErrorKind::NameNotFound);
    let a = builder.workspace().get(&uri("a")).unwrap();
    assert_eq!(a.diagnostics().len(), 1);

    // Unrelated documents keep their cached links.
    let c = builder.workspace().get(&uri("c")).unwrap();
    assert_eq!(c.state(), DocumentState::Validated);
    let c_link_after = c.root().children()[1].reference(TARGET).unwrap().node();
    assert!(Arc::ptr_eq(&c_link.unwrap(), &c_link_after.unwrap()));
}

#[tokio::test]
async fn fixing_a_target_clears_the_error() {
    let builder = builder(&[("a", "uses b.Foo;"), ("b", "declares Bar;")]);
    builder.build_workspace(&CancellationToken::new()).await.unwrap();
    assert!(uses_target(&builder, "a").error().is_some());

    builder
        .update(
            vec![TextUpdate {
                uri: uri("b"),
                text: "declares Foo;".to_string(),
                version: 2,
            }],
            Vec::new(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(uses_target(&builder, "a").is_resolved());
    assert!(builder.workspace().get(&uri("a")).unwrap().diagnostics().is_empty());
}

#[tokio::test]
async fn deleting_a_target_fails_its_dependants() {
    let builder = builder(&[("a", "uses b.Foo;"), ("b", "declares Foo;")]);
    builder.build_workspace(&CancellationToken::new()).await.unwrap();

    builder.update(Vec::new(), vec![uri("b")], &CancellationToken::new()).await.unwrap();

    assert!(!builder.workspace().has_document(&uri("b")));
    assert!(builder.index().exports_of(&uri("b")).is_empty());
    let error = uses_target(&builder, "a").error().unwrap();
    assert_eq!(error.kind, LinkingErrorKind::NameNotFound);
}

#[tokio::test]
async fn evicted_target_is_loaded_again_by_the_next_build() {
    let builder = builder(&[("a", "uses b.Foo;"), ("b", "declares Foo;")]);
    builder.build_workspace(&CancellationToken::new()).await.unwrap();

    builder.evict(&uri("b")).await;
    assert!(!builder.workspace().has_document(&uri("b")));
    let a = builder.workspace().get(&uri("a")).unwrap();
    assert_eq!(a.state(), DocumentState::ScopesComputed);
    assert!(a.references().is_empty());

    let validated = builder.build_workspace(&CancellationToken::new()).await.unwrap();
    assert_eq!(validated.len(), 1);
    let reference = uses_target(&builder, "a");
    assert_eq!(reference.node().and_then(|node| node.name().map(str::to_owned)).as_deref(), Some("Foo"));
    assert!(builder.workspace().has_document(&uri("b")));

    let validated = builder.build_workspace(&CancellationToken::new()).await.unwrap();
    assert_eq!(validated.len(), 1);
    assert_eq!(validated[0].uri(), &uri("b"));
}

#[tokio::test]
async fn cancelled_build_resumes_where_it_stopped() {
    let builder = builder(&[("a", "uses b.Foo;"), ("b", "declares Foo;")]);

    let cancel = CancellationToken::new();
    cancel.cancel();
    assert_eq!(builder.build_workspace(&cancel).await.unwrap_err(), LinkAbort::Cancelled);
    assert!(builder.workspace().all().iter().all(|document| document.state() == DocumentState::Parsed));

    let validated = builder.build_workspace(&CancellationToken::new()).await.unwrap();
    assert_eq!(validated.len(), 2);
    assert!(uses_target(&builder, "a").is_resolved());
}

#[tokio::test]
async fn settings_control_unresolved_reporting() {
    let builder = builder(&[("a", "uses Missing;")]);
    builder.set_settings(LinkingSettings {
        report_unresolved: false,
        ..LinkingSettings::default()
    });

    builder.build_workspace(&CancellationToken::new()).await.unwrap();
    let a = builder.workspace().get(&uri("a")).unwrap();
    assert!(a.diagnostics().is_empty());
    assert_eq!(a.linking_errors().len(), 1);
}

#[tokio::test]
async fn build_of_a_subset_leaves_other_documents_alone() {
    let builder = builder(&[("a", "declares Foo;\nuses Foo;"), ("b", "declares Bar;")]);
    let a = builder.workspace().get(&uri("a")).unwrap();

    let validated = builder.build(std::slice::from_ref(&a), &CancellationToken::new()).await.unwrap();
    assert_eq!(validated.len(), 1);
    assert_eq!(a.state(), DocumentState::Validated);
    assert!(a.root().children()[1].reference(TARGET).unwrap().is_resolved());
    assert_eq!(builder.workspace().get(&uri("b")).unwrap().state(), DocumentState::Parsed);
}
