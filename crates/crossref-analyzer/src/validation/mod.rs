//! Diagnostics for a linked document: syntax errors plus cached linking
//! errors.

use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, NumberOrString};

use crate::{config::LinkingSettings, document::Document, linker::LinkingError};

pub const DIAGNOSTIC_SOURCE: &str = "crossref-analyzer";
pub const SYNTAX_ERROR_CODE: &str = "syntax-error";
pub const LINKING_ERROR_CODE: &str = "linking-error";

/// Collect the diagnostics of `document`, syntax errors first.
///
/// Linking errors come from the document's reference list, so only
/// references a link pass or a lazy access has classified are reported.
pub fn validate(
    document: &Document,
    settings: &LinkingSettings,
) -> Vec<Diagnostic> {
    let content = document.content();
    let mut diagnostics: Vec<Diagnostic> = content
        .syntax()
        .errors()
        .iter()
        .map(|error| Diagnostic {
            range: document.range_of(error.range),
            severity: Some(DiagnosticSeverity::ERROR),
            code: Some(NumberOrString::String(SYNTAX_ERROR_CODE.to_string())),
            source: Some(DIAGNOSTIC_SOURCE.to_string()),
            message: error.message.clone(),
            ..Default::default()
        })
        .collect();

    if settings.report_unresolved {
        let severity = settings.unresolved_severity.to_lsp();
        diagnostics.extend(document.linking_errors().iter().map(|error| linking_diagnostic(document, error, severity)));
    }
    diagnostics
}

fn linking_diagnostic(
    document: &Document,
    error: &LinkingError,
    severity: DiagnosticSeverity,
) -> Diagnostic {
    let range = error.site.range.map(|range| document.range_of(range)).unwrap_or_default();
    Diagnostic {
        range,
        severity: Some(severity),
        code: Some(NumberOrString::String(LINKING_ERROR_CODE.to_string())),
        source: Some(DIAGNOSTIC_SOURCE.to_string()),
        message: error.message.clone(),
        data: Some(serde_json::json!({ "kind": error.kind.as_str() })),
        ..Default::default()
    }
}

#[cfg(test)]
#[path = "../../tests/src/validation/validation_tests.rs"]
mod tests;
