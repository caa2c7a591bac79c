
//! This is the ca65 language server.
//! Cargo will compile this to a standalone executable.
//!
//! The ca65kit library crate provides all of the analysis.
//! The server activity is all in this directory: requests, notifications,
//! and responses each have a handler module, this file owns the loop.

use lsp_types as lsp;
use lsp::notification::Notification;
use lsp::request::Request;
use lsp_server;
use serde_json;
use std::error::Error;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool,Ordering};
use std::time::{Duration,Instant};
use ca65kit::lang::ca65::analysis::Analyzer;
use ca65kit::lang::pathbuf_from_uri;

mod notification;
mod request;
mod response;

// JSON-RPC error codes; are they defined somewhere else?
// -32768 through -32000 are reserved
mod rpc_error {
    pub const PARSE_ERROR: i32 = -32700;
}

/// how long a document must be quiet before diagnostics run
const DIAG_DEBOUNCE: Duration = Duration::from_millis(300);

struct Tools {
    analyzer: Analyzer,
    roots: Vec<std::path::PathBuf>,
    /// last edited uri and when, for the diagnostic debounce
    pending_diag: Option<(String,Instant)>,
    /// raised to cancel an in-flight external diagnostic run
    abort: Arc<AtomicBool>
}

impl Tools {
    pub fn new() -> Self {
        Self {
            analyzer: Analyzer::new(),
            roots: Vec::new(),
            pending_diag: None,
            abort: Arc::new(AtomicBool::new(false))
        }
    }
}

/// Send log messages to the client.
fn logger(connection: &lsp_server::Connection, message: &str) {
    let note = lsp_server::Notification::new(
        lsp::notification::LogMessage::METHOD.to_string(),
        lsp::LogMessageParams {
            typ: lsp::MessageType::LOG,
            message: message.to_string()
        }
    );
    match connection.sender.send(lsp_server::Message::Notification(note)) {
        Err(_) => {}, // nowhere to send log, what can we do about it?
        Ok(()) => {}
    }
}

/// request the root configuration item
fn request_configuration(connection: &lsp_server::Connection) -> Result<(),Box<dyn Error>> {
    let req = lsp_server::Request::new(
        lsp_server::RequestId::from("ca65-pull-config".to_string()),
        lsp::request::WorkspaceConfiguration::METHOD.to_string(),
        lsp::ConfigurationParams { items: vec![
            lsp::ConfigurationItem {
                scope_uri: None,
                section: Some("ca65".to_string())
            }
        ]}
    );
    match connection.sender.send(req.into()) {
        Ok(()) => Ok(()),
        Err(e) => Err(Box::new(e))
    }
}

fn request_inlay_refresh(connection: &lsp_server::Connection) {
    let req = lsp_server::Request::new::<Option<usize>>(
        lsp_server::RequestId::from("ca65-refresh-inlays".to_string()),
        lsp::request::InlayHintRefreshRequest::METHOD.to_string(),
        None
    );
    if let Err(_) = connection.sender.send(req.into()) {
        logger(connection,"could not request inlay refresh");
    }
}

/// Diagnostics are never requested by the client.
/// This server pushes them up after the debounce window closes.
fn push_diagnostics(connection: &lsp_server::Connection, uri: lsp::Uri, version: Option<i32>, diagnostics: Vec<lsp::Diagnostic>) {
    let note = lsp_server::Notification::new(
        "textDocument/publishDiagnostics".to_string(),
        lsp::PublishDiagnosticsParams {
            uri,
            diagnostics,
            version
        }
    );
    match connection.sender.send(lsp_server::Message::Notification(note)) {
        Err(_) => logger(connection,"could not push diagnostics"),
        Ok(()) => {}
    }
}

/// Clear and repopulate diagnostics for the whole closure of the edited
/// file so stale hints never linger in sibling includes.
fn run_diagnostics(connection: &lsp_server::Connection, tools: &mut Tools, edited: &str) {
    let closure = tools.analyzer.graph.translation_unit(edited);
    for uri in &closure {
        if tools.abort.load(Ordering::Relaxed) {
            return;
        }
        let diags = tools.analyzer.unused_symbols(uri,&[]);
        if let Ok(parsed) = ca65kit::lang::normalize_client_uri_str(uri) {
            push_diagnostics(connection,parsed,None,diags);
        }
    }
}

fn main() -> Result<(), Box<dyn Error + Sync + Send>> {
    ca65kit::lang::server::parse_args();

    let mut tools = Tools::new();
    let (connection, io_threads) = lsp_server::Connection::stdio();

    logger(&connection,"start initializing connection");
    let (id,params) = connection.initialize_start()?;
    let params: lsp::InitializeParams = serde_json::from_value(params)?;

    let result = lsp::InitializeResult {
        capabilities: lsp::ServerCapabilities {
            text_document_sync: Some(lsp::TextDocumentSyncCapability::Options(
                lsp::TextDocumentSyncOptions {
                    open_close: Some(true),
                    change: Some(lsp::TextDocumentSyncKind::FULL),
                    will_save: None,
                    will_save_wait_until: None,
                    save: Some(lsp::TextDocumentSyncSaveOptions::SaveOptions(
                        lsp::SaveOptions {
                            include_text: Some(true)
                        }
                    ))
                }
            )),
            definition_provider: Some(lsp::OneOf::Left(true)),
            references_provider: Some(lsp::OneOf::Left(true)),
            hover_provider: Some(lsp::HoverProviderCapability::Simple(true)),
            completion_provider: Some(lsp::CompletionOptions {
                resolve_provider: Some(false),
                trigger_characters: Some([".",":","@","\""].iter().map(|trig| trig.to_string()).collect()),
                ..lsp::CompletionOptions::default()
            }),
            document_symbol_provider: Some(lsp::OneOf::Left(true)),
            workspace_symbol_provider: Some(lsp::OneOf::Left(true)),
            rename_provider: Some(lsp::OneOf::Left(true)),
            folding_range_provider: Some(lsp::FoldingRangeProviderCapability::Simple(true)),
            document_link_provider: Some(lsp::DocumentLinkOptions {
                resolve_provider: Some(false),
                work_done_progress_options: lsp::WorkDoneProgressOptions {
                    work_done_progress: None
                }
            }),
            document_highlight_provider: Some(lsp::OneOf::Left(true)),
            inlay_hint_provider: Some(lsp::OneOf::Left(true)),
            call_hierarchy_provider: Some(lsp::CallHierarchyServerCapability::Simple(true)),
            execute_command_provider: Some(lsp::ExecuteCommandOptions {
                commands: [
                    "ca65.dumpSymbolTables",
                    "ca65.dumpIncludesGraph",
                    "ca65.dumpExportsMap",
                    "ca65.dumpPerformanceStats",
                ].iter().map(|x| x.to_string()).collect::<Vec<String>>(),
                work_done_progress_options: lsp::WorkDoneProgressOptions {
                    work_done_progress: None
                }
            }),
            ..lsp::ServerCapabilities::default()
        },
        server_info: Some(lsp::ServerInfo {
            name: "ca65".to_string(),
            version: Some(env!("CARGO_PKG_VERSION").to_string())
        })
    };
    connection.initialize_finish(id, serde_json::to_value(result)?)?;
    logger(&connection,"connection initialized");

    // registrations
    let mut registrations: Vec<lsp::Registration> = Vec::new();
    if let Some(workspace) = params.capabilities.workspace {
        if let Some(config) = workspace.configuration {
            if config {
                registrations.push(lsp::Registration {
                    id: "pull-config".to_string(),
                    method: lsp::notification::DidChangeConfiguration::METHOD.to_string(),
                    register_options: None
                });
            }
        }
    }
    let req = lsp_server::Request::new(
        lsp_server::RequestId::from("ca65-reg-config".to_string()),
        lsp::request::RegisterCapability::METHOD.to_string(),
        lsp::RegistrationParams { registrations });
    if let Err(_) = connection.sender.send(req.into()) {
        logger(&connection,"could not register change configuration capability");
    }

    // starting configuration
    match request_configuration(&connection) {
        Ok(()) => {},
        Err(_) => logger(&connection,"could not request starting configuration")
    }

    // initial workspace scan; queries block on this gate
    if let Some(folders) = params.workspace_folders {
        tools.roots = folders.iter()
            .filter_map(|f| pathbuf_from_uri(&f.uri).ok())
            .collect();
    }
    if let Err(e) = tools.analyzer.init_workspace(tools.roots.clone(),Vec::new()) {
        logger(&connection,&format!("initial workspace scan failed: {}",e));
    }

    // main loop
    loop {

        // fire debounced diagnostics once the document has settled
        if let Some((uri,when)) = tools.pending_diag.clone() {
            if when.elapsed() >= DIAG_DEBOUNCE {
                tools.pending_diag = None;
                tools.abort = Arc::new(AtomicBool::new(false));
                run_diagnostics(&connection,&mut tools,&uri);
            }
        }

        // handle messages from the client
        if let Ok(msg) = connection.receiver.recv_timeout(Duration::from_millis(100)) {
            match msg {
                lsp_server::Message::Notification(note) => {
                    notification::handle_notification(&connection,note,&mut tools);
                },
                lsp_server::Message::Request(req) => {
                    if request::handle_request(&connection,req,&mut tools) {
                        break;
                    }
                },
                lsp_server::Message::Response(resp) => {
                    response::handle_response(&connection,resp,&mut tools);
                }
            }
        }
    }

    io_threads.join()?;
    Ok(())
}
