use tracing::warn;

use crate::{document::DocumentState, linker::ReferenceSite};

/// Decide whether a failed candidate lookup may be cached as final.
///
/// Below `ScopesComputed` the failure may only mean the workspace has not
/// caught up yet, so it must not be cached. Reaching this point in that
/// state usually means the surrounding orchestration resolved a reference
/// too early; that is reported as a developer-facing event, not to users.
/// `None` means the owning document is not in the workspace any more.
pub(crate) fn failure_is_final(
    state: Option<DocumentState>,
    site: &ReferenceSite,
) -> bool {
    match state {
        Some(state) if state >= DocumentState::ScopesComputed => true,
        state => {
            warn!(
                target: "crossref_analyzer::consistency",
                document = %site.document,
                container = %site.container,
                property = site.property,
                text = %site.text,
                state = ?state,
                "reference resolved before its document reached ScopesComputed; failure not cached"
            );
            false
        },
    }
}
