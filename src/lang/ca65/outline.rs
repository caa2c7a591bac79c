//! Document symbols, workspace symbols, folding ranges, document links.
//!
//! All of these are read only walks of the scope tree, no resolution.

use lsp_types as lsp;
use std::str::FromStr;
use super::{Symbols,Entity,SymbolKind,ScopeKind,MacroKind,is_synthetic};
use super::analysis::Analyzer;

pub fn symbol_lsp_kind(kind: SymbolKind) -> lsp::SymbolKind {
    match kind {
        SymbolKind::Label => lsp::SymbolKind::FUNCTION,
        SymbolKind::ResLabel => lsp::SymbolKind::VARIABLE,
        SymbolKind::DataLabel => lsp::SymbolKind::VARIABLE,
        SymbolKind::StringLabel => lsp::SymbolKind::STRING,
        SymbolKind::Constant => lsp::SymbolKind::CONSTANT,
        SymbolKind::Variable => lsp::SymbolKind::VARIABLE,
        SymbolKind::StructMember => lsp::SymbolKind::FIELD,
        SymbolKind::EnumMember => lsp::SymbolKind::ENUM_MEMBER
    }
}

pub fn scope_lsp_kind(kind: ScopeKind) -> lsp::SymbolKind {
    match kind {
        ScopeKind::Scope => lsp::SymbolKind::NAMESPACE,
        ScopeKind::Proc => lsp::SymbolKind::FUNCTION,
        ScopeKind::Struct => lsp::SymbolKind::STRUCT,
        ScopeKind::Union => lsp::SymbolKind::STRUCT,
        ScopeKind::Enum => lsp::SymbolKind::ENUM
    }
}

#[allow(deprecated)]
fn create_symbol(name: String, detail: Option<String>, kind: lsp::SymbolKind, rng: &lsp::Range, full: &lsp::Range, children: Option<Vec<lsp::DocumentSymbol>>) -> lsp::DocumentSymbol {
    lsp::DocumentSymbol {
        name,
        detail,
        kind,
        range: *full,
        selection_range: *rng,
        tags: None,
        children,
        deprecated: None
    }
}

fn scope_display_name(sym: &Symbols, idx: usize) -> String {
    match is_synthetic(&sym.scopes[idx].name) {
        true => format!("({})",sym.scopes[idx].kind),
        false => sym.scopes[idx].name.clone()
    }
}

fn walk_scope(sym: &Symbols, idx: usize) -> Vec<lsp::DocumentSymbol> {
    let mut ans = Vec::new();
    for child in &sym.scopes[idx].children {
        let scope = &sym.scopes[*child];
        ans.push(create_symbol(
            scope_display_name(sym,*child),
            Some(scope.kind.to_string()),
            scope_lsp_kind(scope.kind),
            &scope.rng,
            &scope.full,
            Some(walk_scope(sym,*child))
        ));
    }
    for s in &sym.scopes[idx].symbols {
        let symbol = &sym.symbols[*s];
        ans.push(create_symbol(
            symbol.name.clone(),
            Some(symbol.kind.to_string()),
            symbol_lsp_kind(symbol.kind),
            &symbol.rng,
            &symbol.rng,
            None
        ));
    }
    ans
}

impl Analyzer {
    pub fn document_symbols(&self, uri: &str) -> Vec<lsp::DocumentSymbol> {
        if !self.ready() {
            return Vec::new();
        }
        let sym = match self.get_symbols(uri) {
            Some(s) => s,
            None => return Vec::new()
        };
        let mut ans = walk_scope(sym,0);
        for mac in &sym.macros {
            ans.push(create_symbol(
                mac.name.clone(),
                Some(mac.kind.to_string()),
                lsp::SymbolKind::FUNCTION,
                &mac.rng,
                &mac.full,
                None
            ));
        }
        ans
    }
    /// Flat workspace wide symbol search, case insensitive substring match.
    #[allow(deprecated)]
    pub fn workspace_symbols(&self, query: &str) -> Vec<lsp::SymbolInformation> {
        if !self.ready() {
            return Vec::new();
        }
        let needle = query.to_lowercase();
        let mut ans = Vec::new();
        for (uri,sym) in self.symbol_map() {
            let lsp_uri = match lsp::Uri::from_str(uri) {
                Ok(u) => u,
                Err(_) => continue
            };
            for entity in sym.defined_entities() {
                let (name,kind,rng,container) = match &entity {
                    Entity::Symbol { idx, .. } => {
                        let s = &sym.symbols[*idx];
                        (s.name.clone(),symbol_lsp_kind(s.kind),s.rng,sym.scope_stack(&super::LocalEntity::Symbol(*idx)).join("::"))
                    },
                    Entity::Scope { idx, .. } => {
                        let s = &sym.scopes[*idx];
                        (s.name.clone(),scope_lsp_kind(s.kind),s.rng,sym.scope_stack(&super::LocalEntity::Scope(*idx)).join("::"))
                    },
                    Entity::Macro { idx, .. } => {
                        let m = &sym.macros[*idx];
                        (m.name.clone(),lsp::SymbolKind::FUNCTION,m.rng,String::new())
                    },
                    Entity::Import { .. } => continue
                };
                if is_synthetic(&name) || !name.to_lowercase().contains(&needle) {
                    continue;
                }
                ans.push(lsp::SymbolInformation {
                    name,
                    kind,
                    tags: None,
                    deprecated: None,
                    location: lsp::Location::new(lsp_uri.clone(),rng),
                    container_name: match container.is_empty() {
                        true => None,
                        false => Some(container)
                    }
                });
            }
        }
        ans
    }
    /// Folding over the scope tree and macro bodies.  When smart folding
    /// is off the client falls back to its own indentation folding.
    pub fn folding_ranges(&self, uri: &str) -> Vec<lsp::FoldingRange> {
        if !self.ready() || !self.get_settings(uri).smart_folding {
            return Vec::new();
        }
        let sym = match self.get_symbols(uri) {
            Some(s) => s,
            None => return Vec::new()
        };
        let mut ans = Vec::new();
        let mut push = |full: &lsp::Range| {
            if full.end.line > full.start.line {
                ans.push(lsp::FoldingRange {
                    start_line: full.start.line,
                    end_line: full.end.line,
                    start_character: None,
                    end_character: None,
                    kind: None,
                    collapsed_text: None
                });
            }
        };
        for scope in &sym.scopes[1..] {
            push(&scope.full);
        }
        for mac in &sym.macros {
            if mac.kind == MacroKind::Macro {
                push(&mac.full);
            }
        }
        ans
    }
    /// Include and incbin arguments that resolved to a file.
    pub fn document_links(&self, uri: &str) -> Vec<lsp::DocumentLink> {
        if !self.ready() {
            return Vec::new();
        }
        let sym = match self.get_symbols(uri) {
            Some(s) => s,
            None => return Vec::new()
        };
        let mut ans = Vec::new();
        for inc in &sym.includes {
            if let Some(target) = &inc.uri {
                if let Ok(target_uri) = lsp::Uri::from_str(target) {
                    ans.push(lsp::DocumentLink {
                        range: inc.rng,
                        target: Some(target_uri),
                        tooltip: None,
                        data: None
                    });
                }
            }
        }
        ans
    }
    /// Name, kind, and spans for client facing hierarchy items.
    pub fn entity_display(&self, entity: &Entity) -> Option<(String,lsp::SymbolKind,lsp::Range,lsp::Range)> {
        let sym = self.get_symbols(entity.uri())?;
        match entity {
            Entity::Symbol { idx, .. } => {
                let s = sym.symbols.get(*idx)?;
                Some((s.name.clone(),symbol_lsp_kind(s.kind),s.rng,s.rng))
            },
            Entity::Scope { idx, .. } => {
                let s = sym.scopes.get(*idx)?;
                Some((scope_display_name(sym,*idx),scope_lsp_kind(s.kind),s.rng,s.full))
            },
            Entity::Macro { idx, .. } => {
                let m = sym.macros.get(*idx)?;
                Some((m.name.clone(),lsp::SymbolKind::FUNCTION,m.rng,m.full))
            },
            Entity::Import { idx, .. } => {
                let i = sym.imports.get(*idx)?;
                Some((i.name.clone(),lsp::SymbolKind::INTERFACE,i.rng,i.rng))
            }
        }
    }
}
