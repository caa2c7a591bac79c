//! Unused symbol hints and the external diagnostic runner contract.
//!
//! Real assembler diagnostics come from spawning the configured
//! executable, which is the server's business; the contract lives here so
//! the core can hand over root files, the translation unit closure, and
//! the unused symbol hints it computes itself.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Instant;
use lsp_types as lsp;
use super::{Entity,is_synthetic};
use super::analysis::Analyzer;
use super::settings::Settings;
use crate::lang::server::basic_diag;
use crate::DYNERR;

/// Runs the external assembler over the root files of an edit and maps
/// its output back to workspace diagnostics.  Implementations must not
/// emit anything once the abort flag is raised.
pub trait DiagnosticRunner {
    fn run(&mut self, roots: &[String], config: &Settings, abort: Arc<AtomicBool>)
        -> Result<HashMap<String,Vec<lsp::Diagnostic>>,DYNERR>;
}

impl Analyzer {
    /// Hint diagnostics for entities of `uri` with no reference beyond
    /// their own definition anywhere in the translation unit closure.
    /// `existing` suppresses hints on lines that already carry a
    /// diagnostic.
    pub fn unused_symbols(&mut self, uri: &str, existing: &[lsp::Diagnostic]) -> Vec<lsp::Diagnostic> {
        if !self.ready() || !self.get_settings(uri).enable_unused_symbol_diagnostics {
            return Vec::new();
        }
        let t = Instant::now();
        let mut counts: HashMap<Entity,usize> = HashMap::new();
        for file in self.graph.translation_unit(uri) {
            let refs = match self.get_symbols(&file) {
                Some(sym) => sym.refs.clone(),
                None => continue
            };
            for r in refs {
                if let Some(entity) = self.resolve_ref(&file,&r) {
                    if entity.uri() == uri {
                        *counts.entry(entity).or_insert(0) += 1;
                    }
                }
            }
        }
        let entities = match self.get_symbols(uri) {
            Some(sym) => sym.defined_entities(),
            None => Vec::new()
        };
        let mut ans = Vec::new();
        for entity in entities {
            let name = match entity.name(&self.stbl) {
                Some(n) => n,
                None => continue
            };
            if is_synthetic(&name) {
                continue;
            }
            let rng = match entity.range(&self.stbl) {
                Some(r) => r,
                None => continue
            };
            if existing.iter().any(|d| d.range.start.line == rng.start.line) {
                continue;
            }
            if counts.get(&entity).copied().unwrap_or(0) <= 1 {
                let mut diag = basic_diag(rng,&format!("{} is never used",name),lsp::DiagnosticSeverity::HINT);
                diag.source = Some("ca65kit".to_string());
                diag.tags = Some(vec![lsp::DiagnosticTag::UNNECESSARY]);
                ans.push(diag);
            }
        }
        self.perf.add("unused symbols",t.elapsed());
        ans
    }
}
