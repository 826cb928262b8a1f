use super::*;
use crate::{document::OverlayTextSource, linker::CancellationToken};

fn uri(name: &str) -> Url {
    Url::parse(&format!("file:///workspace/{name}.xref")).unwrap()
}

async fn built(documents: &[(&str, &str)]) -> DocumentBuilder {
    let overlays = Arc::new(OverlayTextSource::new());
    for (name, text) in documents {
        overlays.set(uri(name), text.to_string());
    }
    let builder = DocumentBuilder::new(overlays);
    for (name, text) in documents {
        builder.add_document(uri(name), text, 1);
    }
    builder.build_workspace(&CancellationToken::new()).await.unwrap();
    builder
}

fn on_target() -> Position {
    Position {
        line: 0,
        character: 7,
    }
}

#[tokio::test]
async fn definition_points_at_the_declaration_name() {
    let builder = built(&[("a", "uses b.Foo;"), ("b", "\ndeclares Foo;")]).await;

    let location = definition(&builder, &uri("a"), on_target()).unwrap();
    assert_eq!(location.uri, uri("b"));
    assert_eq!(
        location.range.start,
        Position {
            line: 1,
            character: 9
        }
    );
    assert_eq!(
        location.range.end,
        Position {
            line: 1,
            character: 12
        }
    );
}

#[tokio::test]
async fn definition_into_a_replaced_tree_is_empty() {
    let builder = built(&[("a", "uses b.Foo;"), ("b", "declares Foo;")]).await;
    let a = builder.workspace().get(&uri("a")).unwrap();
    assert_eq!(a.references().len(), 1);

    // New text of b is in place while a still holds the old node.
    builder.workspace().get(&uri("b")).unwrap().set_content("declares éFoo;", 2);
    assert!(a.references()[0].is_resolved());

    assert_eq!(definition(&builder, &uri("a"), on_target()), None);
}

#[tokio::test]
async fn definition_outside_a_reference_is_empty() {
    let builder = built(&[("a", "uses b.Foo;"), ("b", "declares Foo;")]).await;
    let position = Position {
        line: 0,
        character: 1,
    };
    assert_eq!(definition(&builder, &uri("a"), position), None);
    assert_eq!(definition(&builder, &uri("missing"), on_target()), None);
}
