use std::{panic::AssertUnwindSafe, sync::PoisonError};

use futures::FutureExt;
use tower_lsp::{LanguageServer, jsonrpc::Result, lsp_types::*};
use tracing::{debug, info};

use crate::{
    builder::TextUpdate,
    config::ServerSettings,
    document::{DocumentError, TextSource},
    server::{
        navigation,
        state::{CrossrefLanguageServer, log_to_client},
    },
};

#[tower_lsp::async_trait]
impl LanguageServer for CrossrefLanguageServer {
    async fn initialize(
        &self,
        params: InitializeParams,
    ) -> Result<InitializeResult> {
        info!("Initializing crossref-analyzer...");

        let initial_settings = ServerSettings::from_lsp_payload(params.initialization_options.as_ref());
        self.apply_settings(initial_settings).await;

        if let Some(folders) = params.workspace_folders {
            *self.workspace_roots.write().await = folders;
        } else if let Some(root) = params.root_uri {
            *self.workspace_roots.write().await = vec![WorkspaceFolder {
                uri: root,
                name: "root".to_string(),
            }];
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
                definition_provider: Some(OneOf::Left(true)),
                references_provider: Some(OneOf::Left(true)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "crossref-analyzer".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(
        &self,
        _: InitializedParams,
    ) {
        info!("crossref-analyzer initialized");

        let settings = self.settings_snapshot().await;
        if !settings.indexing.enable {
            info!("Skipping workspace scan because crossref-analyzer.indexing.enable=false");
            return;
        }

        let handle = self.clone_for_background().await;
        tokio::spawn(async move {
            handle.index_workspace().await;
        });
    }

    async fn did_change_configuration(
        &self,
        params: DidChangeConfigurationParams,
    ) {
        let current = self.settings_snapshot().await;
        let merged = current.merged_with_payload(&params.settings);
        if merged == current {
            return;
        }

        let linking_changed = merged.linking != current.linking;
        let indexing_changed = merged.indexing != current.indexing && merged.indexing.enable;
        self.apply_settings(merged).await;
        info!("Applied updated crossref-analyzer settings");

        if linking_changed || indexing_changed {
            let handle = self.clone_for_background().await;
            tokio::spawn(async move {
                if indexing_changed {
                    handle.index_workspace().await;
                }
                if linking_changed {
                    handle.revalidate().await;
                }
            });
        }
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Shutting down crossref-analyzer");
        self.build_cancel.lock().unwrap_or_else(PoisonError::into_inner).cancel();
        Ok(())
    }

    async fn did_open(
        &self,
        params: DidOpenTextDocumentParams,
    ) {
        let uri = params.text_document.uri;
        let text = params.text_document.text;
        let version = params.text_document.version;
        let filename = short_name(&uri);
        let settings = self.settings_snapshot().await;

        info!("Opened {filename} (v{version}, {} bytes)", text.len());
        log_to_client(&self.client, &settings, MessageType::INFO, format!("Opened {filename}")).await;

        self.overlays.set(uri.clone(), text.clone());
        self.open_versions.insert(uri.clone(), version);

        let handle = self.clone_for_background().await;
        tokio::spawn(async move {
            handle
                .rebuild(
                    vec![TextUpdate {
                        uri,
                        text,
                        version,
                    }],
                    Vec::new(),
                )
                .await;
        });
    }

    async fn did_change(
        &self,
        params: DidChangeTextDocumentParams,
    ) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        // Full sync: the last change carries the whole text.
        let Some(change) = params.content_changes.into_iter().last() else {
            return;
        };
        debug!("Changed {} (v{version})", short_name(&uri));

        self.overlays.set(uri.clone(), change.text.clone());
        self.open_versions.insert(uri.clone(), version);

        let handle = self.clone_for_background().await;
        tokio::spawn(async move {
            handle
                .rebuild(
                    vec![TextUpdate {
                        uri,
                        text: change.text,
                        version,
                    }],
                    Vec::new(),
                )
                .await;
        });
    }

    async fn did_close(
        &self,
        params: DidCloseTextDocumentParams,
    ) {
        let uri = params.text_document.uri;
        info!("Closed {}", short_name(&uri));

        self.overlays.remove(&uri);
        self.open_versions.remove(&uri);

        let _ = AssertUnwindSafe(self.client.publish_diagnostics(uri.clone(), Vec::new(), None))
            .catch_unwind()
            .await;

        // Fall back to the file on disk, or drop the document if there is none.
        let (changed, deleted) = match self.overlays.read(&uri) {
            Ok(text) => (
                vec![TextUpdate {
                    uri,
                    text,
                    version: 0,
                }],
                Vec::new(),
            ),
            Err(DocumentError::NotFound(_) | DocumentError::NotAFile(_)) => (Vec::new(), vec![uri]),
            Err(error) => {
                debug!("Keeping closed document: {error}");
                return;
            },
        };

        let handle = self.clone_for_background().await;
        tokio::spawn(async move {
            handle.rebuild(changed, deleted).await;
        });
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        Ok(navigation::definition(&self.builder, &uri, position).map(GotoDefinitionResponse::Scalar))
    }

    async fn references(
        &self,
        params: ReferenceParams,
    ) -> Result<Option<Vec<Location>>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        let Some(document) = self.builder.workspace().get(&uri) else {
            return Ok(None);
        };
        let Some(declaration) = document.offset_of(position).and_then(|offset| document.declaration_at(offset))
        else {
            return Ok(None);
        };

        let mut locations = Vec::new();
        if params.context.include_declaration {
            locations.push(Location {
                uri: uri.clone(),
                range: document.range_of(declaration.name_range()),
            });
        }
        locations.extend(
            self.builder
                .index()
                .find_references(&uri, declaration.path())
                .into_iter()
                .map(|description| Location {
                    uri: description.source_uri,
                    range: description.source_range,
                }),
        );
        Ok(Some(locations))
    }
}

fn short_name(uri: &Url) -> String {
    uri.path().rsplit('/').next().unwrap_or(uri.path()).to_owned()
}
