//! Resolver.
//!
//! Maps a reference to an entity.  The local walk tries every file of the
//! reference's translation unit with the scoped lookup; an import found
//! along the way is remembered while the walk keeps hunting for a
//! concrete definition.  Imports then go through the workspace exports
//! map, resolving each export inside its own translation unit.  Results
//! are memoized per file and dropped when the orchestrator invalidates a
//! closure.

use std::collections::HashMap;
use super::{Symbols,Entity,LocalEntity,Reference,RefContext,ScopeKind};
use super::includes::IncludesGraph;
use super::exports::ExportsMap;

pub struct Resolver {
    /// uri -> reference start position -> result
    local_cache: HashMap<String,HashMap<(u32,u32),Option<Entity>>>,
    /// export's uri -> export name -> result
    export_cache: HashMap<String,HashMap<String,Option<Entity>>>
}

impl Resolver {
    pub fn new() -> Self {
        Self {
            local_cache: HashMap::new(),
            export_cache: HashMap::new()
        }
    }
    pub fn invalidate(&mut self, uri: &str) {
        self.local_cache.remove(uri);
        self.export_cache.remove(uri);
    }
    pub fn invalidate_all(&mut self) {
        self.local_cache = HashMap::new();
        self.export_cache = HashMap::new();
    }
    /// Resolve a reference from file `uri`.  Unresolved references return
    /// None, never an error.
    pub fn resolve(&mut self, uri: &str, r: &Reference, stbl: &HashMap<String,Symbols>,
        graph: &IncludesGraph, exports: &ExportsMap, implicit_imports: bool) -> Option<Entity> {

        let key = (r.rng.start.line,r.rng.start.character);
        if let Some(cached) = self.local_cache.get(uri).and_then(|m| m.get(&key)) {
            return cached.clone();
        }
        let ans = self.resolve_uncached(uri,r,stbl,graph,exports,implicit_imports);
        self.local_cache.entry(uri.to_string()).or_insert(HashMap::new()).insert(key,ans.clone());
        ans
    }
    fn resolve_uncached(&mut self, uri: &str, r: &Reference, stbl: &HashMap<String,Symbols>,
        graph: &IncludesGraph, exports: &ExportsMap, implicit_imports: bool) -> Option<Entity> {

        // macros live in a flat per-file namespace, first hit wins
        if r.ctx == RefContext::Macro {
            for file in graph.translation_unit(uri) {
                if let Some(table) = stbl.get(&file) {
                    if let Some(idx) = table.find_macro(&r.name) {
                        return Some(Entity::Macro { uri: file, idx });
                    }
                }
            }
            return None;
        }

        // translation-unit local walk
        let mut first_import: Option<Entity> = None;
        for file in graph.translation_unit(uri) {
            let table = match stbl.get(&file) {
                Some(t) => t,
                None => continue
            };
            let start = match file == uri {
                true => r.scope,
                false => 0
            };
            if let Some(found) = table.lookup(&r.name,&r.qualifiers,r.ctx,start,true) {
                match found {
                    LocalEntity::Import(idx) => {
                        if first_import.is_none() {
                            first_import = Some(Entity::Import { uri: file.clone(), idx });
                        }
                    },
                    concrete => return Some(Entity::from_local(&file,concrete))
                }
            }
        }

        // workspace export lookup for the import we ran into; with implicit
        // imports disabled the declaration itself is the answer
        if let Some(import) = first_import {
            if implicit_imports {
                if let Some(found) = self.resolve_export(&r.name,stbl,graph,exports) {
                    return Some(found);
                }
            }
            return Some(import);
        }

        // implicit import: unqualified symbol reference at file root
        if implicit_imports && r.ctx == RefContext::Symbol && r.scope == 0 && r.qualifiers.is_empty() {
            return self.resolve_export(&r.name,stbl,graph,exports);
        }
        None
    }
    /// Resolve a workspace export to the entity it names, searching within
    /// the export's own translation unit from its enclosing scope.
    /// Imports are excluded here, an export must land on a definition.
    pub fn resolve_export(&mut self, name: &str, stbl: &HashMap<String,Symbols>,
        graph: &IncludesGraph, exports: &ExportsMap) -> Option<Entity> {

        for entry in exports.get(name) {
            if let Some(cached) = self.export_cache.get(&entry.uri).and_then(|m| m.get(name)) {
                match cached {
                    Some(found) => return Some(found.clone()),
                    None => continue
                }
            }
            let ans = Self::resolve_one_export(name,&entry.uri,entry.idx,stbl,graph);
            self.export_cache.entry(entry.uri.clone()).or_insert(HashMap::new()).insert(name.to_string(),ans.clone());
            if ans.is_some() {
                return ans;
            }
        }
        None
    }
    fn resolve_one_export(name: &str, export_uri: &str, export_idx: usize,
        stbl: &HashMap<String,Symbols>, graph: &IncludesGraph) -> Option<Entity> {

        let home = stbl.get(export_uri)?;
        let export = home.exports.get(export_idx)?;
        for file in graph.translation_unit(export_uri) {
            let table = match stbl.get(&file) {
                Some(t) => t,
                None => continue
            };
            let start = match file == export_uri {
                true => export.scope,
                false => 0
            };
            match table.lookup(name,&[],RefContext::Symbol,start,false) {
                Some(LocalEntity::Symbol(idx)) => {
                    return Some(Entity::Symbol { uri: file, idx });
                },
                Some(LocalEntity::Scope(idx)) if table.scopes[idx].kind == ScopeKind::Proc => {
                    return Some(Entity::Scope { uri: file, idx });
                },
                _ => {}
            }
        }
        None
    }
}
