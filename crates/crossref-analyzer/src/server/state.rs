use std::{
    panic::AssertUnwindSafe,
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
};

use dashmap::DashMap;
use futures::FutureExt;
use tokio::sync::RwLock;
use tower_lsp::{
    Client,
    lsp_types::{MessageType, Url, WorkspaceFolder},
};
use tracing::{debug, warn};

use crate::{
    builder::{DocumentBuilder, TextUpdate},
    config::ServerSettings,
    document::{Document, DocumentState, OverlayTextSource},
    linker::{CancellationToken, LinkAbort},
};

const CLIENT_NOTIFICATION_PREFIX: &str = "crossref-analyzer:";

/// The crossref-analyzer backend that implements the Language Server Protocol.
pub struct CrossrefLanguageServer {
    /// The LSP client handle, used to send notifications (e.g. diagnostics) back.
    pub(crate) client: Client,

    /// Editor buffers; shadow files on disk for on-demand loads.
    pub(crate) overlays: Arc<OverlayTextSource>,

    /// Owns the workspace documents, the index and the linker.
    pub(crate) builder: Arc<DocumentBuilder>,

    /// Workspace root folders, populated during `initialize`.
    pub(crate) workspace_roots: RwLock<Vec<WorkspaceFolder>>,

    /// Client versions of open documents, for publishing diagnostics.
    pub(crate) open_versions: Arc<DashMap<Url, i32>>,

    /// Token of the build in flight. Replaced (and the old one cancelled)
    /// whenever a newer edit arrives.
    pub(crate) build_cancel: Arc<Mutex<CancellationToken>>,

    /// Runtime server settings updated from LSP configuration.
    pub(crate) settings: Arc<RwLock<ServerSettings>>,
}

impl CrossrefLanguageServer {
    /// Create a new `CrossrefLanguageServer` wired to the given LSP client.
    pub fn new(client: Client) -> Self {
        let overlays = Arc::new(OverlayTextSource::new());
        let builder = Arc::new(DocumentBuilder::new(overlays.clone()));

        Self {
            client,
            overlays,
            builder,
            workspace_roots: RwLock::new(Vec::new()),
            open_versions: Arc::new(DashMap::new()),
            build_cancel: Arc::new(Mutex::new(CancellationToken::new())),
            settings: Arc::new(RwLock::new(ServerSettings::default())),
        }
    }

    pub(crate) async fn settings_snapshot(&self) -> ServerSettings {
        self.settings.read().await.clone()
    }

    pub(crate) async fn apply_settings(
        &self,
        settings: ServerSettings,
    ) {
        self.builder.set_settings(settings.linking.clone());
        *self.settings.write().await = settings;
    }

    pub(crate) async fn clone_for_background(&self) -> BackgroundHandle {
        let workspace_roots = self
            .workspace_roots
            .read()
            .await
            .iter()
            .filter_map(|f| f.uri.to_file_path().ok())
            .collect();
        BackgroundHandle {
            client: self.client.clone(),
            builder: self.builder.clone(),
            workspace_roots,
            open_versions: self.open_versions.clone(),
            build_cancel: self.build_cancel.clone(),
            settings: self.settings.clone(),
        }
    }
}

/// Minimal handle used by background tasks that need the builder and the
/// client without holding references to the full server state.
pub(crate) struct BackgroundHandle {
    pub(crate) client: Client,
    pub(crate) builder: Arc<DocumentBuilder>,
    pub(crate) workspace_roots: Vec<PathBuf>,
    pub(crate) open_versions: Arc<DashMap<Url, i32>>,
    pub(crate) build_cancel: Arc<Mutex<CancellationToken>>,
    pub(crate) settings: Arc<RwLock<ServerSettings>>,
}

impl BackgroundHandle {
    /// Cancel the build in flight and hand out the token for the next one.
    pub(crate) fn next_build_token(&self) -> CancellationToken {
        let mut current = self.build_cancel.lock().unwrap_or_else(PoisonError::into_inner);
        current.cancel();
        *current = CancellationToken::new();
        current.clone()
    }

    /// Apply changes, rebuild, and publish diagnostics of every document the
    /// build validated.
    pub(crate) async fn rebuild(
        &self,
        changed: Vec<TextUpdate>,
        deleted: Vec<Url>,
    ) {
        let cancel = self.next_build_token();
        match self.builder.update(changed, deleted, &cancel).await {
            Ok(validated) => {
                self.publish(&validated).await;
                self.summarize(&validated).await;
            },
            Err(LinkAbort::Cancelled) => debug!("[build] superseded by a newer change"),
            Err(abort) => warn!("[build] stopped: {abort}"),
        }
    }

    /// Re-run validation only, e.g. after the diagnostic settings changed.
    pub(crate) async fn revalidate(&self) {
        let cancel = self.next_build_token();
        for document in self.builder.workspace().all() {
            document.reset_to(DocumentState::Linked);
        }
        match self.builder.build_workspace(&cancel).await {
            Ok(validated) => self.publish(&validated).await,
            Err(LinkAbort::Cancelled) => debug!("[build] revalidation superseded"),
            Err(abort) => warn!("[build] revalidation stopped: {abort}"),
        }
    }

    async fn summarize(
        &self,
        validated: &[Arc<Document>],
    ) {
        let settings = self.settings.read().await.clone();
        if !settings.logging.build_summary || validated.is_empty() {
            return;
        }
        let errors: usize = validated.iter().map(|document| document.linking_errors().len()).sum();
        let message = format!("Validated {} document(s), {errors} unresolved reference(s)", validated.len());
        log_to_client(&self.client, &settings, MessageType::INFO, message).await;
    }

    pub(crate) async fn publish(
        &self,
        documents: &[Arc<Document>],
    ) {
        for document in documents {
            let version = self.open_versions.get(document.uri()).map(|entry| *entry.value());
            self.client.publish_diagnostics(document.uri().clone(), document.diagnostics(), version).await;
        }
    }
}

/// Mirror `message` to the client's log if the configured level lets it
/// through. A client that went away is ignored.
pub(crate) async fn log_to_client(
    client: &Client,
    settings: &ServerSettings,
    kind: MessageType,
    message: impl AsRef<str>,
) {
    if !settings.logging.client_level.mirrors(kind) {
        return;
    }
    let message = format!("{CLIENT_NOTIFICATION_PREFIX} {}", message.as_ref());
    let _ = AssertUnwindSafe(client.log_message(kind, message)).catch_unwind().await;
}
