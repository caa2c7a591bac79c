//! Orchestrator.
//!
//! `Analyzer` owns every piece of process wide state: the buffered
//! workspace, the per-file symbol tables, the includes graph, the exports
//! map, the memoized resolver, the per-document settings cache, and the
//! performance monitor.  Query adapters in the sibling modules are
//! methods on this value and gate on `ready()`, which only opens after
//! the two pass initialization completes.

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;
use lsp_types as lsp;
use super::{Symbols,Entity,Reference};
use super::scanner::Scanner;
use super::includes::IncludesGraph;
use super::exports::ExportsMap;
use super::resolver::Resolver;
use super::workspace::{Workspace,DEFAULT_EXTENSIONS};
use super::settings::{self,Settings};
use crate::lang::Document;
use crate::lang::server::PerfMonitor;
use crate::STDRESULT;

const MAX_FILES: usize = 2000;

pub struct Analyzer {
    config: Settings,
    doc_settings: HashMap<String,Settings>,
    scanner: Scanner,
    pub ws: Workspace,
    pub stbl: HashMap<String,Symbols>,
    pub graph: IncludesGraph,
    pub exports: ExportsMap,
    pub resolver: Resolver,
    pub perf: PerfMonitor,
    ready: bool
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            config: Settings::new(),
            doc_settings: HashMap::new(),
            scanner: Scanner::new(),
            ws: Workspace::new(),
            stbl: HashMap::new(),
            graph: IncludesGraph::new(),
            exports: ExportsMap::new(),
            resolver: Resolver::new(),
            perf: PerfMonitor::new(),
            ready: false
        }
    }
    pub fn set_config(&mut self, config: Settings) {
        self.config = config;
    }
    pub fn get_settings(&self, uri: &str) -> Settings {
        match self.doc_settings.get(uri) {
            Some(s) => s.clone(),
            None => self.config.clone()
        }
    }
    pub fn update_doc_settings(&mut self, uri: &str, json: &str) {
        if let Ok(parsed) = settings::parse(json) {
            self.doc_settings.insert(uri.to_string(),parsed);
            self.resolver.invalidate_all();
        }
    }
    /// Configuration changed: forget cached per-document settings and all
    /// memoized resolutions (include dirs may have moved).
    pub fn clear_doc_settings(&mut self) {
        self.doc_settings = HashMap::new();
        self.resolver.invalidate_all();
    }
    /// The initialization gate.  Query adapters return empty results
    /// until this opens.
    pub fn ready(&self) -> bool {
        self.ready
    }
    fn extensions(&self) -> Vec<String> {
        let mut ans = DEFAULT_EXTENSIONS.iter().map(|x| x.to_string()).collect::<Vec<String>>();
        for ext in &self.config.additional_extensions {
            ans.push(ext.to_string());
        }
        ans
    }
    /// Enumerate and scan the workspace.  First pass registers an empty
    /// table per file; second pass scans and integrates each file.  Only
    /// after the second pass does the gate open, since the first query
    /// may need complete include and export state.
    pub fn init_workspace(&mut self, roots: Vec<PathBuf>, volatile_docs: Vec<Document>) -> STDRESULT {
        let t = Instant::now();
        self.ready = false;
        self.stbl = HashMap::new();
        self.graph = IncludesGraph::new();
        self.exports = ExportsMap::new();
        self.ws.set_roots(roots);
        self.ws.gather(&self.extensions(),MAX_FILES)?;
        for doc in volatile_docs {
            self.ws.update_doc(doc);
        }
        let uris = self.ws.docs.keys().cloned().collect::<Vec<String>>();
        for uri in &uris {
            self.stbl.insert(uri.to_string(),Symbols::new(uri));
        }
        for uri in &uris {
            self.scan_and_integrate(uri);
        }
        self.resolver.invalidate_all();
        self.ready = true;
        self.perf.add("init",t.elapsed());
        log::info!("workspace initialized with {} files",uris.len());
        Ok(())
    }
    /// Scan one buffered document and replace its table, includes graph
    /// edges, and exports atomically.
    fn scan_and_integrate(&mut self, uri: &str) {
        let text = match self.ws.docs.get(uri) {
            Some(doc) => doc.text.clone(),
            None => return
        };
        let mut sym = self.scanner.scan(uri,&text);
        let doc_settings = self.get_settings(uri);
        let mut edges = Vec::new();
        for inc in &mut sym.includes {
            let dirs = match inc.binary {
                true => &doc_settings.bin_include_dirs,
                false => &doc_settings.include_dirs
            };
            inc.uri = self.ws.resolve_include(uri,&inc.path,dirs);
            if let Some(target) = &inc.uri {
                // only known sources become graph edges
                if !inc.binary && self.ws.docs.contains_key(target) {
                    edges.push(target.clone());
                }
            }
        }
        self.graph.update_includes(uri,edges);
        let new_exports = sym.exports.iter().enumerate()
            .map(|(idx,e)| (e.name.clone(),idx)).collect::<Vec<(String,usize)>>();
        self.exports.update_exports(uri,new_exports);
        self.stbl.insert(uri.to_string(),sym);
    }
    fn export_names(&self, uri: &str) -> Vec<String> {
        let mut ans = match self.stbl.get(uri) {
            Some(sym) => sym.exports.iter().map(|e| e.name.clone()).collect(),
            None => Vec::new()
        };
        ans.sort();
        ans
    }
    /// Handle a content change: rescan, reintegrate, and invalidate the
    /// union of the pre and post edit closures.  Returns that union so
    /// the server can refresh diagnostics consistently.
    pub fn update_document(&mut self, uri: &str, text: String, version: Option<i32>) -> Vec<String> {
        let t = Instant::now();
        let pre = self.graph.translation_unit(uri);
        let old_exports = self.export_names(uri);
        if let Ok(lsp_uri) = lsp::Uri::from_str(uri) {
            let mut doc = Document::new(lsp_uri,text);
            doc.version = version;
            self.ws.update_doc(doc);
        }
        if !self.stbl.contains_key(uri) {
            self.stbl.insert(uri.to_string(),Symbols::new(uri));
        }
        self.scan_and_integrate(uri);
        let mut closure = pre;
        for file in self.graph.translation_unit(uri) {
            if !closure.contains(&file) {
                closure.push(file);
            }
        }
        for file in &closure {
            self.resolver.invalidate(file);
        }
        if old_exports != self.export_names(uri) {
            // a changed export surface can affect resolutions anywhere
            self.resolver.invalidate_all();
        }
        self.perf.add("update",t.elapsed());
        closure
    }
    /// Handle a watched file deletion.
    pub fn remove_document(&mut self, uri: &str) -> Vec<String> {
        let closure = self.graph.translation_unit(uri);
        for file in &closure {
            self.resolver.invalidate(file);
        }
        if !self.export_names(uri).is_empty() {
            self.resolver.invalidate_all();
        }
        self.stbl.remove(uri);
        self.graph.remove_file(uri);
        self.exports.remove_file(uri);
        self.ws.remove_doc(uri);
        closure
    }
    pub fn get_symbols(&self, uri: &str) -> Option<&Symbols> {
        self.stbl.get(uri)
    }
    pub fn symbol_map(&self) -> &HashMap<String,Symbols> {
        &self.stbl
    }
    pub fn doc_text(&self, uri: &str) -> Option<&str> {
        self.ws.docs.get(uri).map(|d| d.text.as_str())
    }
    /// Resolve one reference of a file, memoized.
    pub fn resolve_ref(&mut self, uri: &str, r: &Reference) -> Option<Entity> {
        let implicit = self.get_settings(uri).implicit_imports;
        self.resolver.resolve(uri,r,&self.stbl,&self.graph,&self.exports,implicit)
    }
    /// Root files to hand to the external diagnostic runner for an edit.
    pub fn diagnostic_roots(&self, uri: &str) -> Vec<String> {
        self.graph.roots_of(uri)
    }
    pub fn dump_symbol_tables(&self) -> String {
        let mut ans = String::new();
        let mut uris = self.stbl.keys().collect::<Vec<&String>>();
        uris.sort();
        for uri in uris {
            let sym = &self.stbl[uri];
            ans += &format!("{}\n",uri);
            ans += &format!("  {} scopes, {} symbols, {} macros, {} imports, {} exports, {} refs\n",
                sym.scopes.len(),sym.symbols.len(),sym.macros.len(),
                sym.imports.len(),sym.exports.len(),sym.refs.len());
            for scope in &sym.scopes[1..] {
                ans += &format!("  {} {} [{}..{}]\n",scope.kind,scope.name,
                    scope.full.start.line,scope.full.end.line);
            }
            for s in &sym.symbols {
                ans += &format!("  {} {} @ {}\n",s.kind,s.name,s.rng.start.line);
            }
            for m in &sym.macros {
                ans += &format!("  {} {} @ {}\n",m.kind,m.name,m.rng.start.line);
            }
        }
        ans
    }
    pub fn dump_includes_graph(&self) -> String {
        self.graph.dump()
    }
    pub fn dump_exports_map(&self) -> String {
        self.exports.dump()
    }
    pub fn dump_performance_stats(&self) -> String {
        self.perf.report()
    }
}
