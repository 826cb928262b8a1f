use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use tower_lsp::lsp_types::Url;
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

use crate::{builder::TextUpdate, config::IndexingSettings, server::state::BackgroundHandle};

impl BackgroundHandle {
    /// Load every document under the workspace roots and build them.
    pub(crate) async fn index_workspace(&self) {
        let settings = self.settings.read().await.clone();
        if !settings.indexing.enable {
            info!("Skipping workspace scan because crossref-analyzer.indexing.enable=false");
            return;
        }

        let files = discover_files(&self.workspace_roots, &settings.indexing);
        if files.is_empty() {
            info!("No documents found in workspace");
            return;
        }
        info!("Indexing {} document(s) in workspace…", files.len());

        let workspace = self.builder.workspace();
        let mut changes = Vec::with_capacity(files.len());
        for path in files {
            let Ok(uri) = Url::from_file_path(&path) else {
                continue;
            };
            // Open documents already carry the editor's text.
            if workspace.has_document(&uri) {
                continue;
            }
            match workspace.source().read(&uri) {
                Ok(text) => changes.push(TextUpdate {
                    uri,
                    text,
                    version: 0,
                }),
                Err(error) => debug!("Skipping {}: {error}", path.display()),
            }
        }

        self.rebuild(changes, Vec::new()).await;
        info!("Workspace index complete: {} document(s)", workspace.len());
    }
}

/// Files under `roots` with a document extension, excluding configured
/// paths, hidden directories and oversized files.
pub(crate) fn discover_files(
    roots: &[PathBuf],
    settings: &IndexingSettings,
) -> Vec<PathBuf> {
    let excluded_prefixes = exclude_prefixes(roots, &settings.exclude_paths);
    let max_file_size = settings.max_file_size_bytes();
    let mut files = Vec::new();
    let mut seen = HashSet::new();

    for root in roots {
        for entry in WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|entry| should_descend(entry, &excluded_prefixes))
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() || !settings.matches_extension(entry.path()) {
                continue;
            }

            if let Ok(metadata) = entry.metadata()
                && metadata.len() > max_file_size
            {
                debug!("Skipping large document ({} bytes): {}", metadata.len(), entry.path().display());
                continue;
            }

            if seen.insert(entry.path().to_path_buf()) {
                files.push(entry.path().to_path_buf());
            }
        }
    }

    files.sort();
    files
}

fn should_descend(
    entry: &DirEntry,
    excluded_prefixes: &[PathBuf],
) -> bool {
    if excluded_prefixes.iter().any(|prefix| entry.path().starts_with(prefix)) {
        return false;
    }
    if !entry.file_type().is_dir() || entry.depth() == 0 {
        return true;
    }
    let Some(name) = entry.file_name().to_str() else {
        return false;
    };
    !name.starts_with('.') && !matches!(name, "target" | "node_modules" | "out" | "build")
}

fn exclude_prefixes(
    roots: &[PathBuf],
    exclude_paths: &[String],
) -> Vec<PathBuf> {
    let mut prefixes = Vec::new();
    for raw in exclude_paths {
        let path = Path::new(raw);
        if path.is_absolute() {
            prefixes.push(path.to_path_buf());
        } else {
            prefixes.extend(roots.iter().map(|root| root.join(path)));
        }
    }
    prefixes
}

#[cfg(test)]
#[path = "../../tests/src/server/workspace_scan_tests.rs"]
mod tests;
