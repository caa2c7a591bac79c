//! Handle incoming notifications: document sync, watched files, config.

use lsp_types as lsp;
use lsp::notification::Notification;
use std::sync::atomic::Ordering;
use std::time::Instant;
use ca65kit::lang::normalize_client_uri;
use super::{logger,request_configuration,request_inlay_refresh};

/// An edit arrived: abort any in-flight diagnostic run, reintegrate the
/// document, and restart the debounce clock.
fn reanalyze(tools: &mut super::Tools, uri: &lsp::Uri, text: String, version: Option<i32>) {
    tools.abort.store(true,Ordering::Relaxed);
    let key = uri.to_string();
    tools.analyzer.update_document(&key,text,version);
    tools.pending_diag = Some((key,Instant::now()));
}

pub fn handle_notification(connection: &lsp_server::Connection, note: lsp_server::Notification, tools: &mut super::Tools) {
    match note.method.as_str() {
        lsp::notification::DidOpenTextDocument::METHOD => {
            if let Ok(params) = serde_json::from_value::<lsp::DidOpenTextDocumentParams>(note.params) {
                let uri = normalize_client_uri(params.text_document.uri);
                reanalyze(tools,&uri,params.text_document.text,Some(params.text_document.version));
            }
        },
        lsp::notification::DidChangeTextDocument::METHOD => {
            if let Ok(params) = serde_json::from_value::<lsp::DidChangeTextDocumentParams>(note.params) {
                let uri = normalize_client_uri(params.text_document.uri);
                // sync is FULL, the last change carries the whole document
                if let Some(change) = params.content_changes.into_iter().last() {
                    reanalyze(tools,&uri,change.text,Some(params.text_document.version));
                }
            }
        },
        lsp::notification::DidSaveTextDocument::METHOD => {
            if let Ok(params) = serde_json::from_value::<lsp::DidSaveTextDocumentParams>(note.params) {
                let uri = normalize_client_uri(params.text_document.uri);
                if let Some(text) = params.text {
                    reanalyze(tools,&uri,text,None);
                }
            }
        },
        lsp::notification::DidCloseTextDocument::METHOD => {
            // the buffered copy stays, the file is still in the workspace
        },
        lsp::notification::DidChangeWatchedFiles::METHOD => {
            if let Ok(params) = serde_json::from_value::<lsp::DidChangeWatchedFilesParams>(note.params) {
                for event in params.changes {
                    let uri = normalize_client_uri(event.uri);
                    let key = uri.to_string();
                    match event.typ {
                        lsp::FileChangeType::DELETED => {
                            tools.abort.store(true,Ordering::Relaxed);
                            tools.analyzer.remove_document(&key);
                            super::push_diagnostics(connection,uri,None,Vec::new());
                        },
                        _ => {
                            if let Ok(path) = ca65kit::lang::pathbuf_from_uri(&uri) {
                                if let Ok(text) = std::fs::read_to_string(&path) {
                                    reanalyze(tools,&uri,text,None);
                                }
                            }
                        }
                    }
                }
            }
        },
        lsp::notification::DidChangeConfiguration::METHOD => {
            // pull the fresh configuration, then refresh what depends on it
            tools.analyzer.clear_doc_settings();
            if let Err(_) = request_configuration(connection) {
                logger(connection,"could not re-request configuration");
            }
            request_inlay_refresh(connection);
            if let Some((uri,_)) = tools.pending_diag.clone() {
                tools.pending_diag = Some((uri,Instant::now()));
            }
        },
        lsp::notification::Exit::METHOD => {},
        _ => {
            logger(connection,&format!("unhandled notification: {}",note.method));
        }
    }
}
