use std::sync::Arc;

use tower_lsp::lsp_types::Url;

use super::*;
use crate::{
    config::UnresolvedSeverity,
    document::{DocumentState, OverlayTextSource, WorkspaceDocuments},
    linker::{CancellationToken, Linker},
    scope::{DefaultReflection, DefaultScopeProvider, IndexManager, compute_exports, compute_local_scopes},
};

async fn linked(text: &str) -> Arc<Document> {
    let workspace = Arc::new(WorkspaceDocuments::new(Arc::new(OverlayTextSource::new())));
    let index = Arc::new(IndexManager::new());
    let reflection = Arc::new(DefaultReflection);
    let scopes = Arc::new(DefaultScopeProvider::new(Arc::clone(&workspace), Arc::clone(&index), reflection.clone()));
    let linker = Linker::new(Arc::clone(&workspace), scopes, reflection);

    let document = Arc::new(Document::new(Url::parse("file:///workspace/a.xref").unwrap(), text, 1));
    workspace.add(Arc::clone(&document));
    index.update_exports(document.uri(), compute_exports(&document));
    document.set_local_scopes(compute_local_scopes(&document));
    document.set_state(DocumentState::ScopesComputed);
    linker.link(&document, &CancellationToken::new()).await.unwrap();
    document
}

#[tokio::test]
async fn reports_syntax_then_linking_errors() {
    let document = linked("uses Unknown;\ndeclares Foo { value: Foo }").await;
    let diagnostics = validate(&document, &LinkingSettings::default());

    let codes: Vec<_> = diagnostics
        .iter()
        .map(|d| match &d.code {
            Some(NumberOrString::String(code)) => code.as_str(),
            _ => "",
        })
        .collect();
    assert_eq!(codes, vec![SYNTAX_ERROR_CODE, LINKING_ERROR_CODE]);

    let linking = &diagnostics[1];
    assert!(linking.message.contains("Unknown"), "{}", linking.message);
    assert_eq!(linking.severity, Some(DiagnosticSeverity::ERROR));
    assert_eq!(linking.range.start.character, 5);
    assert_eq!(linking.source.as_deref(), Some(DIAGNOSTIC_SOURCE));
    assert_eq!(linking.data, Some(serde_json::json!({ "kind": "name-not-found" })));
}

#[tokio::test]
async fn unresolved_reporting_follows_settings() {
    let document = linked("uses Unknown;").await;

    let mut settings = LinkingSettings {
        unresolved_severity: UnresolvedSeverity::Warning,
        ..LinkingSettings::default()
    };
    let diagnostics = validate(&document, &settings);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity, Some(DiagnosticSeverity::WARNING));

    settings.report_unresolved = false;
    assert!(validate(&document, &settings).is_empty());
}

#[tokio::test]
async fn clean_document_has_no_diagnostics() {
    let document = linked("declares Foo;\ndeclares Bar { value: Foo; }").await;
    assert!(validate(&document, &LinkingSettings::default()).is_empty());
}
