//! Inlay hints.
//!
//! Two kinds: ordinal labels `L<n>` on anonymous label sites, and
//! ` from <path>` annotations on imports that resolve into another file.
//! Both are gated by per-document settings.

use std::time::Instant;
use lsp_types as lsp;
use super::analysis::Analyzer;
use crate::lang::{range_contains_pos,relative_path};

impl Analyzer {
    pub fn inlay_hints(&mut self, uri: &str, range: &lsp::Range) -> Vec<lsp::InlayHint> {
        if !self.ready() {
            return Vec::new();
        }
        let t = Instant::now();
        let config = self.get_settings(uri);
        let mut ans = Vec::new();
        if config.anonymous_label_index_hints {
            if let Some(sym) = self.get_symbols(uri) {
                for (ordinal,spans) in &sym.anons.refs {
                    if *ordinal >= sym.anons.defs.len() {
                        continue;
                    }
                    for span in spans {
                        if !range_contains_pos(range,&span.start) {
                            continue;
                        }
                        ans.push(lsp::InlayHint {
                            position: span.start,
                            label: lsp::InlayHintLabel::String(format!("L{}",ordinal + 1)),
                            kind: None,
                            text_edits: None,
                            tooltip: None,
                            padding_left: None,
                            padding_right: Some(true),
                            data: None
                        });
                    }
                }
            }
        }
        // without implicit imports there is no hop to a foreign export,
        // so there is no origin to annotate
        if config.import_from_hints && config.implicit_imports {
            let imports = match self.get_symbols(uri) {
                Some(sym) => sym.imports.clone(),
                None => Vec::new()
            };
            for import in imports {
                if !range_contains_pos(range,&import.rng.start) {
                    continue;
                }
                let resolved = self.resolver.resolve_export(&import.name,&self.stbl,&self.graph,&self.exports);
                if let Some(entity) = resolved {
                    if entity.uri() != uri {
                        ans.push(lsp::InlayHint {
                            position: import.rng.end,
                            label: lsp::InlayHintLabel::String(format!(" from {}",relative_path(uri,entity.uri()))),
                            kind: None,
                            text_edits: None,
                            tooltip: None,
                            padding_left: None,
                            padding_right: None,
                            data: None
                        });
                    }
                }
            }
        }
        self.perf.add("inlay hints",t.elapsed());
        ans
    }
}
