//! Handle incoming responses to our requests

use lsp_server;
use ca65kit::lang::ca65::settings;
use super::logger;

/// parse the response to the configuration request
fn parse_configuration(resp: lsp_server::Response) -> Option<settings::Settings> {
    if let Some(result) = resp.result {
        if let Some(ary) = result.as_array() {
            // this loop always exits in the first iteration, we only requested 1 item
            for item in ary {
                return settings::parse(&item.to_string()).ok();
            }
        }
    }
    None
}

pub fn handle_response(connection: &lsp_server::Connection, resp: lsp_server::Response, tools: &mut super::Tools) {
    match resp.id.to_string().as_str() {
        "\"ca65-pull-config\"" => {
            match parse_configuration(resp) {
                Some(config) => {
                    tools.analyzer.set_config(config);
                    // extension or include dir changes alter the workspace shape
                    if let Err(_) = tools.analyzer.init_workspace(tools.roots.clone(),Vec::new()) {
                        logger(connection,"failed to rescan workspace after user changed settings");
                    }
                },
                None => logger(connection,"could not parse config")
            }
        },
        "\"ca65-reg-config\"" => {
            logger(connection,"registration response was received");
        },
        "\"ca65-refresh-inlays\"" => {},
        s => {
            logger(connection,&format!("unhandled response: {}",s))
        }
    }
}
