//! Provide our response to incoming requests

use lsp_types as lsp;
use lsp::request::Request;
use lsp_server::{Connection,RequestId};
use serde_json;
use std::collections::HashMap;
use std::str::FromStr;
use ca65kit::lang::ca65::Entity;
use ca65kit::lang::normalize_client_uri;
use super::logger;
use super::rpc_error::PARSE_ERROR;

fn def_response(req_id: RequestId, meth: &str) -> lsp_server::Response {
    let mess = req_id.to_string();
    lsp_server::Response::new_err(req_id,PARSE_ERROR,format!("request {} ({}) not understood",mess,meth))
}

fn ok_or_parse_err<T: serde::Serialize>(req_id: RequestId, meth: &str, result: T) -> lsp_server::Response {
    match serde_json::to_value(result) {
        Ok(value) => lsp_server::Response::new_ok(req_id,value),
        Err(_) => lsp_server::Response::new_err(req_id,PARSE_ERROR,format!("{} failed while serializing",meth))
    }
}

/// entities cross the wire inside call hierarchy items
fn entity_to_value(entity: &Entity) -> serde_json::Value {
    let (kind,uri,idx) = match entity {
        Entity::Symbol { uri, idx } => ("symbol",uri,idx),
        Entity::Scope { uri, idx } => ("scope",uri,idx),
        Entity::Macro { uri, idx } => ("macro",uri,idx),
        Entity::Import { uri, idx } => ("import",uri,idx)
    };
    serde_json::json!({"kind": kind, "uri": uri, "idx": idx})
}

fn entity_from_value(value: &serde_json::Value) -> Option<Entity> {
    let kind = value.get("kind")?.as_str()?;
    let uri = value.get("uri")?.as_str()?.to_string();
    let idx = value.get("idx")?.as_u64()? as usize;
    match kind {
        "symbol" => Some(Entity::Symbol { uri, idx }),
        "scope" => Some(Entity::Scope { uri, idx }),
        "macro" => Some(Entity::Macro { uri, idx }),
        "import" => Some(Entity::Import { uri, idx }),
        _ => None
    }
}

fn hierarchy_item(tools: &super::Tools, entity: &Entity) -> Option<lsp::CallHierarchyItem> {
    let (name,kind,selection,range) = tools.analyzer.entity_display(entity)?;
    let uri = lsp::Uri::from_str(entity.uri()).ok()?;
    Some(lsp::CallHierarchyItem {
        name,
        kind,
        tags: None,
        detail: None,
        uri,
        range,
        selection_range: selection,
        data: Some(entity_to_value(entity))
    })
}

/// returns true if there was a shutdown request
pub fn handle_request(
    connection: &Connection,
    req: lsp_server::Request,
    tools: &mut super::Tools) -> bool {

    let mut resp = def_response(req.id.clone(),&req.method);

    match req.method.as_str() {
        lsp::request::GotoDefinition::METHOD => {
            if let Ok(params) = serde_json::from_value::<lsp::GotoDefinitionParams>(req.params) {
                let uri = normalize_client_uri(params.text_document_position_params.text_document.uri);
                let pos = params.text_document_position_params.position;
                let locs = tools.analyzer.goto_definition(&uri.to_string(),&pos);
                resp = ok_or_parse_err(req.id,&req.method,locs);
            }
        },
        lsp::request::References::METHOD => {
            if let Ok(params) = serde_json::from_value::<lsp::ReferenceParams>(req.params) {
                let uri = normalize_client_uri(params.text_document_position.text_document.uri);
                let pos = params.text_document_position.position;
                let locs = tools.analyzer.references(&uri.to_string(),&pos);
                resp = ok_or_parse_err(req.id,&req.method,locs);
            }
        },
        lsp::request::Rename::METHOD => {
            if let Ok(params) = serde_json::from_value::<lsp::RenameParams>(req.params) {
                let uri = normalize_client_uri(params.text_document_position.text_document.uri);
                let pos = params.text_document_position.position;
                let edits = tools.analyzer.rename(&uri.to_string(),&pos,&params.new_name);
                let mut changes: HashMap<lsp::Uri,Vec<lsp::TextEdit>> = HashMap::new();
                for (file,file_edits) in edits {
                    if let Ok(file_uri) = lsp::Uri::from_str(&file) {
                        changes.insert(file_uri,file_edits);
                    }
                }
                resp = ok_or_parse_err(req.id,&req.method,lsp::WorkspaceEdit::new(changes));
            }
        },
        lsp::request::HoverRequest::METHOD => {
            if let Ok(params) = serde_json::from_value::<lsp::HoverParams>(req.params) {
                let uri = normalize_client_uri(params.text_document_position_params.text_document.uri);
                let pos = params.text_document_position_params.position;
                resp = match tools.analyzer.hover(&uri.to_string(),&pos) {
                    Some(hover) => ok_or_parse_err(req.id,&req.method,hover),
                    None => lsp_server::Response::new_ok(req.id,serde_json::Value::Null)
                };
            }
        },
        lsp::request::Completion::METHOD => {
            if let Ok(params) = serde_json::from_value::<lsp::CompletionParams>(req.params) {
                let uri = normalize_client_uri(params.text_document_position.text_document.uri);
                let pos = params.text_document_position.position;
                let items = tools.analyzer.completions(&uri.to_string(),&pos);
                resp = ok_or_parse_err(req.id,&req.method,lsp::CompletionResponse::Array(items));
            }
        },
        lsp::request::DocumentSymbolRequest::METHOD => {
            if let Ok(params) = serde_json::from_value::<lsp::DocumentSymbolParams>(req.params) {
                let uri = normalize_client_uri(params.text_document.uri);
                let symbols = tools.analyzer.document_symbols(&uri.to_string());
                resp = ok_or_parse_err(req.id,&req.method,symbols);
            }
        },
        lsp::request::WorkspaceSymbolRequest::METHOD => {
            if let Ok(params) = serde_json::from_value::<lsp::WorkspaceSymbolParams>(req.params) {
                let symbols = tools.analyzer.workspace_symbols(&params.query);
                resp = ok_or_parse_err(req.id,&req.method,symbols);
            }
        },
        lsp::request::FoldingRangeRequest::METHOD => {
            if let Ok(params) = serde_json::from_value::<lsp::FoldingRangeParams>(req.params) {
                let uri = normalize_client_uri(params.text_document.uri);
                let folds = tools.analyzer.folding_ranges(&uri.to_string());
                resp = ok_or_parse_err(req.id,&req.method,folds);
            }
        },
        lsp::request::DocumentLinkRequest::METHOD => {
            if let Ok(params) = serde_json::from_value::<lsp::DocumentLinkParams>(req.params) {
                let uri = normalize_client_uri(params.text_document.uri);
                let links = tools.analyzer.document_links(&uri.to_string());
                resp = ok_or_parse_err(req.id,&req.method,links);
            }
        },
        lsp::request::DocumentHighlightRequest::METHOD => {
            if let Ok(params) = serde_json::from_value::<lsp::DocumentHighlightParams>(req.params) {
                let uri = normalize_client_uri(params.text_document_position_params.text_document.uri);
                let pos = params.text_document_position_params.position;
                let marks = tools.analyzer.document_highlights(&uri.to_string(),&pos);
                resp = ok_or_parse_err(req.id,&req.method,marks);
            }
        },
        lsp::request::InlayHintRequest::METHOD => {
            if let Ok(params) = serde_json::from_value::<lsp::InlayHintParams>(req.params) {
                let uri = normalize_client_uri(params.text_document.uri);
                let hints = tools.analyzer.inlay_hints(&uri.to_string(),&params.range);
                resp = ok_or_parse_err(req.id,&req.method,hints);
            }
        },
        lsp::request::CallHierarchyPrepare::METHOD => {
            if let Ok(params) = serde_json::from_value::<lsp::CallHierarchyPrepareParams>(req.params) {
                let uri = normalize_client_uri(params.text_document_position_params.text_document.uri);
                let pos = params.text_document_position_params.position;
                resp = match tools.analyzer.prepare_call_hierarchy(&uri.to_string(),&pos) {
                    Some(entity) => match hierarchy_item(tools,&entity) {
                        Some(item) => ok_or_parse_err(req.id,&req.method,vec![item]),
                        None => lsp_server::Response::new_ok(req.id,serde_json::Value::Null)
                    },
                    None => lsp_server::Response::new_ok(req.id,serde_json::Value::Null)
                };
            }
        },
        lsp::request::CallHierarchyIncomingCalls::METHOD => {
            if let Ok(params) = serde_json::from_value::<lsp::CallHierarchyIncomingCallsParams>(req.params) {
                let target = params.item.data.as_ref().and_then(entity_from_value);
                if let Some(target) = target {
                    let mut calls = Vec::new();
                    for (caller,sites) in tools.analyzer.incoming_calls(&target) {
                        if let Some(from) = hierarchy_item(tools,&caller) {
                            calls.push(lsp::CallHierarchyIncomingCall { from, from_ranges: sites });
                        }
                    }
                    resp = ok_or_parse_err(req.id,&req.method,calls);
                }
            }
        },
        lsp::request::CallHierarchyOutgoingCalls::METHOD => {
            if let Ok(params) = serde_json::from_value::<lsp::CallHierarchyOutgoingCallsParams>(req.params) {
                let source = params.item.data.as_ref().and_then(entity_from_value);
                if let Some(source) = source {
                    let mut calls = Vec::new();
                    for (callee,sites) in tools.analyzer.outgoing_calls(&source) {
                        if let Some(to) = hierarchy_item(tools,&callee) {
                            calls.push(lsp::CallHierarchyOutgoingCall { to, from_ranges: sites });
                        }
                    }
                    resp = ok_or_parse_err(req.id,&req.method,calls);
                }
            }
        },
        lsp::request::ExecuteCommand::METHOD => {
            if let Ok(params) = serde_json::from_value::<lsp::ExecuteCommandParams>(req.params) {
                let report = match params.command.as_str() {
                    "ca65.dumpSymbolTables" => Some(tools.analyzer.dump_symbol_tables()),
                    "ca65.dumpIncludesGraph" => Some(tools.analyzer.dump_includes_graph()),
                    "ca65.dumpExportsMap" => Some(tools.analyzer.dump_exports_map()),
                    "ca65.dumpPerformanceStats" => Some(tools.analyzer.dump_performance_stats()),
                    _ => {
                        logger(connection,&format!("unhandled command {}",params.command));
                        None
                    }
                };
                if let Some(report) = report {
                    resp = ok_or_parse_err(req.id,&params.command,report);
                }
            }
        },
        lsp::request::Shutdown::METHOD => {
            logger(connection,"shutdown request");
            resp = lsp_server::Response::new_ok(req.id.clone(),());
            connection.sender.send(resp.into()).expect("failed to respond to shutdown request");
            connection.receiver.recv_timeout(std::time::Duration::from_secs(30)).expect("failure while pausing");
            return true;
        },
        _ => {
            logger(connection,&format!("unhandled request: {}",req.method))
        }
    }
    if let Err(_) = connection.sender.send(lsp_server::Message::Response(resp)) {
        logger(connection,&format!("could not send response to {}",req.method));
    }
    false
}
