//! Call hierarchy.
//!
//! Only references produced under a `jsr`/`jmp` carry a calling entity,
//! everything else is invisible here.  Incoming calls group the callers
//! of the target; outgoing calls enumerate what the selected entity
//! calls, grouped by resolved target.

use std::collections::HashMap;
use std::time::Instant;
use lsp_types as lsp;
use super::{Entity,Caller,ScopeKind};
use super::analysis::Analyzer;

impl Analyzer {
    /// Accept a symbol or a proc scope under the cursor as a hierarchy item.
    pub fn prepare_call_hierarchy(&mut self, uri: &str, pos: &lsp::Position) -> Option<Entity> {
        if !self.ready() {
            return None;
        }
        match self.entity_at(uri,pos)? {
            Entity::Symbol { uri, idx } => Some(Entity::Symbol { uri, idx }),
            Entity::Scope { uri, idx } => {
                let is_proc = self.get_symbols(&uri)
                    .and_then(|sym| sym.scopes.get(idx))
                    .map(|s| s.kind == ScopeKind::Proc)
                    .unwrap_or(false);
                match is_proc {
                    true => Some(Entity::Scope { uri, idx }),
                    false => None
                }
            },
            _ => None
        }
    }
    fn caller_entity(uri: &str, caller: Caller) -> Entity {
        match caller {
            Caller::Symbol(idx) => Entity::Symbol { uri: uri.to_string(), idx },
            Caller::Scope(idx) => Entity::Scope { uri: uri.to_string(), idx }
        }
    }
    /// Callers of the target with their call site spans.
    pub fn incoming_calls(&mut self, target: &Entity) -> Vec<(Entity,Vec<lsp::Range>)> {
        if !self.ready() {
            return Vec::new();
        }
        let t = Instant::now();
        let mut groups: HashMap<Entity,Vec<lsp::Range>> = HashMap::new();
        let files = self.symbol_map().keys().cloned().collect::<Vec<String>>();
        for file in files {
            let refs = match self.get_symbols(&file) {
                Some(sym) => sym.refs.clone(),
                None => continue
            };
            for r in refs {
                let caller = match r.caller {
                    Some(c) => c,
                    None => continue
                };
                if self.resolve_ref(&file,&r).as_ref() == Some(target) {
                    groups.entry(Self::caller_entity(&file,caller)).or_insert(Vec::new()).push(r.rng);
                }
            }
        }
        self.perf.add("incoming calls",t.elapsed());
        groups.into_iter().collect()
    }
    /// Targets called from within the selected entity.
    pub fn outgoing_calls(&mut self, source: &Entity) -> Vec<(Entity,Vec<lsp::Range>)> {
        if !self.ready() {
            return Vec::new();
        }
        let t = Instant::now();
        let wanted = match source {
            Entity::Symbol { idx, .. } => Caller::Symbol(*idx),
            Entity::Scope { idx, .. } => Caller::Scope(*idx),
            _ => return Vec::new()
        };
        let file = source.uri().to_string();
        let refs = match self.get_symbols(&file) {
            Some(sym) => sym.refs.clone(),
            None => return Vec::new()
        };
        let mut groups: HashMap<Entity,Vec<lsp::Range>> = HashMap::new();
        for r in refs {
            if r.caller != Some(wanted) {
                continue;
            }
            if let Some(target) = self.resolve_ref(&file,&r) {
                groups.entry(target).or_insert(Vec::new()).push(r.rng);
            }
        }
        self.perf.add("outgoing calls",t.elapsed());
        groups.into_iter().collect()
    }
}
