use std::sync::Arc;

use tower_lsp::lsp_types::{Location, Position, Url};
use tracing::debug;

use crate::{builder::DocumentBuilder, linker::Resolution, tree::locate};

/// Where the reference under `position` in `uri` points, if it resolves to
/// a node of the target document's current tree.
pub(crate) fn definition(
    builder: &DocumentBuilder,
    uri: &Url,
    position: Position,
) -> Option<Location> {
    let workspace = builder.workspace();
    let document = workspace.get(uri)?;
    let reference = document.offset_of(position).and_then(|offset| document.reference_at(offset))?;

    let node = match reference.resolve(builder.linker()) {
        Resolution::Resolved(node) => node,
        Resolution::Failed(error) => {
            debug!("goto-def: {error}");
            return None;
        },
        Resolution::NotYetResolvable => {
            debug!("goto-def: '{}' not resolvable yet", reference.text());
            return None;
        },
    };

    let target = reference.descriptor().and_then(|descriptor| workspace.get(&descriptor.document))?;
    // A rebuild may have replaced the target's tree before unlinking this
    // document; the cached node's range no longer fits the current text.
    if !locate(&target.root(), node.path()).is_some_and(|current| Arc::ptr_eq(&current, &node)) {
        debug!("goto-def: '{}' points into a replaced tree", reference.text());
        return None;
    }
    debug!("goto-def: '{}' -> {}{}", reference.text(), target.uri(), node.path());

    Some(Location {
        uri: target.uri().clone(),
        range: target.range_of(node.name_range()),
    })
}

#[cfg(test)]
#[path = "../../tests/src/server/navigation_tests.rs"]
mod tests;
