//! LSP Backend implementation for nfscope
//!
//! Keeps the text of open documents and answers completion and hover
//! requests through the [`ProviderRegistry`].

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use nfscope_core::config::{load_defaults, load_for_workspace};
use nfscope_core::{NfscopeConfig, Workspace};
use tokio::sync::RwLock;
use tower_lsp::jsonrpc::{Error, Result};
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};
use tracing::{error, info, warn};

use crate::context::CursorContext;
use crate::error::ProviderResult;
use crate::indexes::Indexes;
use crate::providers::ProviderRegistry;

pub const FETCH_CONDA_COMMAND: &str = "nfscope.fetchCondaIndex";
pub const FETCH_CONTAINERS_COMMAND: &str = "nfscope.fetchContainerIndex";

/// Document state stored for each open file
#[derive(Debug, Clone)]
pub struct DocumentState {
    pub content: String,
    pub version: i32,
}

impl DocumentState {
    pub fn new(content: String, version: i32) -> Self {
        Self { content, version }
    }

    pub fn update(&mut self, content: String, version: i32) {
        self.content = content;
        self.version = version;
    }
}

/// Everything fixed once the client has told us the workspace root
struct Session {
    root: Option<PathBuf>,
    config: NfscopeConfig,
    indexes: Arc<Indexes>,
    registry: Arc<ProviderRegistry>,
}

impl Session {
    fn new(root: Option<PathBuf>) -> std::result::Result<Self, String> {
        let config = match &root {
            Some(root) => load_for_workspace(root).or_else(|err| {
                warn!(error = %err, "workspace config rejected, using defaults");
                load_defaults()
            }),
            None => load_defaults(),
        }
        .map_err(|err| format!("failed to load configuration: {err}"))?;

        let scratch = std::env::temp_dir();
        let cache_dir = config
            .cache
            .resolve_dir(root.as_deref().unwrap_or(scratch.as_path()));
        info!(cache = %cache_dir.display(), "index cache directory");

        let indexes = Arc::new(Indexes::new(&cache_dir, config.indexes.clone()));
        let registry = Arc::new(ProviderRegistry::new(Arc::clone(&indexes)));
        Ok(Self {
            root,
            config,
            indexes,
            registry,
        })
    }

    /// The workspace a document belongs to. Without a workspace root the
    /// document's own directory is used.
    fn workspace_for(&self, path: Option<&PathBuf>) -> Workspace {
        let root = self
            .root
            .clone()
            .or_else(|| path.and_then(|p| p.parent()).map(|p| p.to_path_buf()))
            .unwrap_or_else(std::env::temp_dir);
        Workspace::new(root, self.config.workspace.clone())
    }
}

/// The nfscope Language Server backend
pub struct NfscopeBackend {
    client: Client,
    documents: Arc<RwLock<HashMap<Url, DocumentState>>>,
    session: Arc<RwLock<Option<Session>>>,
}

impl NfscopeBackend {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            documents: Arc::new(RwLock::new(HashMap::new())),
            session: Arc::new(RwLock::new(None)),
        }
    }

    /// Snapshot the document and run `f` against it off the async runtime.
    async fn with_context<T, F>(&self, uri: &Url, position: Position, f: F) -> Option<T>
    where
        T: Send + 'static,
        F: FnOnce(&ProviderRegistry, &CursorContext) -> ProviderResult<T> + Send + 'static,
    {
        let content = self.documents.read().await.get(uri)?.content.clone();
        let path = uri.to_file_path().ok();

        let (ctx, registry) = {
            let session = self.session.read().await;
            let session = session.as_ref()?;
            let workspace = session.workspace_for(path.as_ref());
            (
                CursorContext::new(content, path, position, workspace),
                Arc::clone(&session.registry),
            )
        };

        match tokio::task::spawn_blocking(move || f(&registry, &ctx)).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(err)) => {
                warn!(uri = %uri, error = %err, "request failed");
                self.client
                    .show_message(MessageType::WARNING, format!("nfscope: {err}"))
                    .await;
                None
            }
            Err(err) => {
                error!(uri = %uri, error = %err, "provider task panicked");
                None
            }
        }
    }
}

fn workspace_root(params: &InitializeParams) -> Option<PathBuf> {
    #[allow(deprecated)]
    let root_uri = params.root_uri.as_ref();
    root_uri
        .or_else(|| {
            params
                .workspace_folders
                .as_ref()
                .and_then(|folders| folders.first())
                .map(|folder| &folder.uri)
        })
        .and_then(|uri| uri.to_file_path().ok())
}

#[tower_lsp::async_trait]
impl LanguageServer for NfscopeBackend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let root = workspace_root(&params);
        let session = Session::new(root).map_err(|message| {
            error!(%message, "initialize failed");
            Error {
                message: message.into(),
                ..Error::internal_error()
            }
        })?;
        info!(
            root = ?session.root,
            providers = ?session.registry.ids().collect::<Vec<_>>(),
            "session ready"
        );
        *self.session.write().await = Some(session);

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::FULL),
                        will_save: None,
                        will_save_wait_until: None,
                        save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                            include_text: Some(true),
                        })),
                    },
                )),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec![
                        ".".to_string(),
                        " ".to_string(),
                        "'".to_string(),
                    ]),
                    resolve_provider: Some(false),
                    work_done_progress_options: Default::default(),
                    all_commit_characters: None,
                    completion_item: None,
                }),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: vec![
                        FETCH_CONDA_COMMAND.to_string(),
                        FETCH_CONTAINERS_COMMAND.to_string(),
                    ],
                    work_done_progress_options: Default::default(),
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "nfscope-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "nfscope language server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let doc = DocumentState::new(params.text_document.text, params.text_document.version);
        self.documents.write().await.insert(uri, doc);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;

        // FULL sync: the last change carries the whole text
        if let Some(change) = params.content_changes.into_iter().last() {
            let mut docs = self.documents.write().await;
            match docs.get_mut(&uri) {
                Some(doc) => doc.update(change.text, version),
                None => {
                    docs.insert(uri, DocumentState::new(change.text, version));
                }
            }
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.documents
            .write()
            .await
            .remove(&params.text_document.uri);
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        if let Some(text) = params.text {
            let mut docs = self.documents.write().await;
            if let Some(doc) = docs.get_mut(&params.text_document.uri) {
                let version = doc.version;
                doc.update(text, version);
            }
        }
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        let items = self
            .with_context(&uri, position, |registry, ctx| registry.complete(ctx))
            .await
            .unwrap_or_default();
        if items.is_empty() {
            return Ok(None);
        }
        Ok(Some(CompletionResponse::Array(items)))
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        Ok(self
            .with_context(&uri, position, |registry, ctx| registry.hover(ctx))
            .await
            .flatten())
    }

    async fn execute_command(
        &self,
        params: ExecuteCommandParams,
    ) -> Result<Option<serde_json::Value>> {
        let indexes = {
            let session = self.session.read().await;
            let Some(session) = session.as_ref() else {
                return Ok(None);
            };
            Arc::clone(&session.indexes)
        };

        let (started, what) = match params.command.as_str() {
            FETCH_CONDA_COMMAND => (indexes.fetch_conda(), "conda package"),
            FETCH_CONTAINERS_COMMAND => (indexes.fetch_containers(), "container image"),
            other => {
                return Err(Error::invalid_params(format!("unknown command {other}")));
            }
        };

        let message = if started {
            format!("Fetching the {what} index in the background")
        } else {
            format!("The {what} index is already being fetched")
        };
        self.client.show_message(MessageType::INFO, message).await;
        Ok(Some(serde_json::Value::Bool(started)))
    }
}
