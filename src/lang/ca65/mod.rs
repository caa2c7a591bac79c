//! # ca65 analysis
//!
//! This module is the analysis core behind the language server.
//! Sources are processed one line at a time by a hand written lexer and
//! argument parser, there is no full expression grammar.  The scanner
//! builds a per-file symbol table (`Symbols`) holding a scope tree,
//! macros, imports, exports, references, and anonymous label records.
//!
//! Files are joined into translation units by the includes graph: a
//! translation unit of `F` is the union of everything reachable from the
//! root files (files nobody includes) that transitively include `F`.
//! The resolver walks a reference outward through its scope chain, then
//! through the translation unit, then through the workspace exports map,
//! memoizing results per file until an edit invalidates them.
//!
//! Everything here is synchronous; the server executable owns all
//! protocol framing and scheduling.  Positions and ranges are
//! `lsp_types` structures with columns measured in bytes.

use std::collections::HashMap;
use std::fmt;
use lsp_types as lsp;

pub mod lexer;
pub mod parser;
pub mod handbook;
pub mod scanner;
pub mod includes;
pub mod exports;
pub mod resolver;
pub mod locals;
pub mod workspace;
pub mod settings;
pub mod analysis;
pub mod navigate;
pub mod hierarchy;
pub mod outline;
pub mod hints;
pub mod completions;
pub mod hovers;
pub mod diagnostics;

#[cfg(test)]
mod tests;

/// Synthetic segment recorded after an `.include`, when the segment can no
/// longer be known without expanding the include.  Consumers should treat
/// this as an opaque marker.
pub const OPAQUE_SEGMENT: &str = "?";

#[derive(Clone,Copy,PartialEq,Eq,Hash,Debug)]
pub enum SymbolKind {
    Label,
    ResLabel,
    DataLabel,
    StringLabel,
    Constant,
    Variable,
    StructMember,
    EnumMember
}

#[derive(Clone,Copy,PartialEq,Eq,Hash,Debug)]
pub enum MacroKind {
    Macro,
    Define
}

#[derive(Clone,Copy,PartialEq,Eq,Hash,Debug)]
pub enum ImportKind {
    Import,
    Global
}

#[derive(Clone,Copy,PartialEq,Eq,Hash,Debug)]
pub enum ExportKind {
    Export,
    Global
}

#[derive(Clone,Copy,PartialEq,Eq,Hash,Debug)]
pub enum ScopeKind {
    Scope,
    Proc,
    Struct,
    Union,
    Enum
}

/// How a name is being used at a reference site.
#[derive(Clone,Copy,PartialEq,Eq,Hash,Debug)]
pub enum RefContext {
    Symbol,
    Scope,
    Macro,
    Sizeof
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Label => write!(f,"label"),
            Self::ResLabel => write!(f,"reserve label"),
            Self::DataLabel => write!(f,"data label"),
            Self::StringLabel => write!(f,"string label"),
            Self::Constant => write!(f,"constant"),
            Self::Variable => write!(f,"variable"),
            Self::StructMember => write!(f,"struct member"),
            Self::EnumMember => write!(f,"enum member")
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scope => write!(f,"scope"),
            Self::Proc => write!(f,"proc"),
            Self::Struct => write!(f,"struct"),
            Self::Union => write!(f,"union"),
            Self::Enum => write!(f,"enum")
        }
    }
}

impl fmt::Display for MacroKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Macro => write!(f,"macro"),
            Self::Define => write!(f,"define")
        }
    }
}

/// A named value defined in a scope.
#[derive(Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// span of the defining name token
    pub rng: lsp::Range,
    /// handle of the owning scope
    pub scope: usize,
    pub segment: Option<String>
}

/// A named expansion template.  Macro bodies are opaque to the analyzer,
/// symbols produced by expansion are not modeled.
#[derive(Clone)]
pub struct Macro {
    pub name: String,
    pub kind: MacroKind,
    /// span of the defining name token
    pub rng: lsp::Range,
    /// span from the opening directive through the closing one
    pub full: lsp::Range
}

/// Declaration that a name originates elsewhere.  A `global` may instead
/// resolve to a local definition, this is decided by the resolver.
#[derive(Clone)]
pub struct Import {
    pub name: String,
    pub kind: ImportKind,
    pub rng: lsp::Range,
    pub scope: usize,
    pub addr_size: Option<String>
}

/// Declaration that a local name is visible workspace wide.
#[derive(Clone)]
pub struct Export {
    pub name: String,
    pub kind: ExportKind,
    pub rng: lsp::Range,
    pub scope: usize
}

/// A lexical container.  Scope 0 of every file is the root, named empty.
#[derive(Clone)]
pub struct Scope {
    pub name: String,
    pub kind: ScopeKind,
    /// span of the name token (or the directive when anonymous)
    pub rng: lsp::Range,
    /// span from the opening directive through the closing one
    pub full: lsp::Range,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub symbols: Vec<usize>,
    pub imports: Vec<usize>,
    pub segment: Option<String>
}

/// The entity that contains a `jsr`/`jmp`, used by call hierarchy.
#[derive(Clone,Copy,PartialEq,Eq,Hash,Debug)]
pub enum Caller {
    Symbol(usize),
    Scope(usize)
}

/// A use site of a name.
#[derive(Clone)]
pub struct Reference {
    pub name: String,
    /// scope names preceding the base name, a leading empty string anchors
    /// the walk at the file root
    pub qualifiers: Vec<String>,
    pub ctx: RefContext,
    pub rng: lsp::Range,
    /// handle of the enclosing scope
    pub scope: usize,
    pub caller: Option<Caller>
}

/// Definition lines and reference spans for the `:` labels of one file.
#[derive(Clone)]
pub struct AnonymousLabels {
    /// line of each definition, in order
    pub defs: Vec<u32>,
    /// ordinal index to reference spans
    pub refs: HashMap<usize,Vec<lsp::Range>>
}

impl AnonymousLabels {
    pub fn new() -> Self {
        Self { defs: Vec::new(), refs: HashMap::new() }
    }
    pub fn add_def(&mut self, line: u32) -> usize {
        self.defs.push(line);
        self.defs.len() - 1
    }
    pub fn add_ref(&mut self, ordinal: usize, rng: lsp::Range) {
        self.refs.entry(ordinal).or_insert(Vec::new()).push(rng);
    }
    /// index of the last definition at or before `line`
    pub fn last_at_or_before(&self, line: u32) -> Option<usize> {
        match self.defs.partition_point(|l| *l <= line) {
            0 => None,
            n => Some(n-1)
        }
    }
}

/// One `.include` or `.incbin` argument.
#[derive(Clone)]
pub struct IncludeRecord {
    /// path text as written, without quotes
    pub path: String,
    /// span of the path argument
    pub rng: lsp::Range,
    /// resolved target, filled in by the orchestrator
    pub uri: Option<String>,
    pub binary: bool
}

/// File local entity handle, promoted to `Entity` once the file is known.
#[derive(Clone,Copy,PartialEq,Eq,Hash,Debug)]
pub enum LocalEntity {
    Symbol(usize),
    Scope(usize),
    Import(usize)
}

/// What a reference resolved to, anywhere in the workspace.
#[derive(Clone,PartialEq,Eq,Hash,Debug)]
pub enum Entity {
    Symbol { uri: String, idx: usize },
    Scope { uri: String, idx: usize },
    Macro { uri: String, idx: usize },
    Import { uri: String, idx: usize }
}

impl Entity {
    pub fn from_local(uri: &str, loc: LocalEntity) -> Self {
        match loc {
            LocalEntity::Symbol(idx) => Self::Symbol { uri: uri.to_string(), idx },
            LocalEntity::Scope(idx) => Self::Scope { uri: uri.to_string(), idx },
            LocalEntity::Import(idx) => Self::Import { uri: uri.to_string(), idx }
        }
    }
    pub fn uri(&self) -> &str {
        match self {
            Self::Symbol { uri, .. } => uri,
            Self::Scope { uri, .. } => uri,
            Self::Macro { uri, .. } => uri,
            Self::Import { uri, .. } => uri
        }
    }
    pub fn name(&self, stbl: &HashMap<String,Symbols>) -> Option<String> {
        let table = stbl.get(self.uri())?;
        match self {
            Self::Symbol { idx, .. } => table.symbols.get(*idx).map(|s| s.name.clone()),
            Self::Scope { idx, .. } => table.scopes.get(*idx).map(|s| s.name.clone()),
            Self::Macro { idx, .. } => table.macros.get(*idx).map(|m| m.name.clone()),
            Self::Import { idx, .. } => table.imports.get(*idx).map(|i| i.name.clone())
        }
    }
    /// span of the defining name token
    pub fn range(&self, stbl: &HashMap<String,Symbols>) -> Option<lsp::Range> {
        let table = stbl.get(self.uri())?;
        match self {
            Self::Symbol { idx, .. } => table.symbols.get(*idx).map(|s| s.rng),
            Self::Scope { idx, .. } => table.scopes.get(*idx).map(|s| s.rng),
            Self::Macro { idx, .. } => table.macros.get(*idx).map(|m| m.rng),
            Self::Import { idx, .. } => table.imports.get(*idx).map(|i| i.rng)
        }
    }
}

/// Name for an anonymous scope, keyed to the line that opened it.
pub fn synthetic_name(kind: ScopeKind, line: u32) -> String {
    format!("<{}@{}>",kind,line)
}

/// Synthetic names never participate in workspace queries or diagnostics.
pub fn is_synthetic(name: &str) -> bool {
    name.is_empty() || name.starts_with("<")
}

/// The symbol table of one file.  Scopes, symbols, imports, exports,
/// macros, and references live in arenas indexed by handles; scope 0 is
/// the file root.  The whole table is rebuilt when the file is rescanned.
#[derive(Clone)]
pub struct Symbols {
    pub uri: String,
    pub scopes: Vec<Scope>,
    pub symbols: Vec<Symbol>,
    pub imports: Vec<Import>,
    pub exports: Vec<Export>,
    pub macros: Vec<Macro>,
    pub refs: Vec<Reference>,
    pub anons: AnonymousLabels,
    pub includes: Vec<IncludeRecord>
}

impl Symbols {
    pub fn new(uri: &str) -> Self {
        let root = Scope {
            name: String::new(),
            kind: ScopeKind::Scope,
            rng: lsp::Range::default(),
            full: lsp::Range::default(),
            parent: None,
            children: Vec::new(),
            symbols: Vec::new(),
            imports: Vec::new(),
            segment: None
        };
        Self {
            uri: uri.to_string(),
            scopes: vec![root],
            symbols: Vec::new(),
            imports: Vec::new(),
            exports: Vec::new(),
            macros: Vec::new(),
            refs: Vec::new(),
            anons: AnonymousLabels::new(),
            includes: Vec::new()
        }
    }
    pub fn add_scope(&mut self, mut scope: Scope) -> usize {
        let idx = self.scopes.len();
        if let Some(parent) = scope.parent {
            self.scopes[parent].children.push(idx);
        } else {
            scope.parent = Some(0);
            self.scopes[0].children.push(idx);
        }
        self.scopes.push(scope);
        idx
    }
    pub fn add_symbol(&mut self, sym: Symbol) -> usize {
        let idx = self.symbols.len();
        self.scopes[sym.scope].symbols.push(idx);
        self.symbols.push(sym);
        idx
    }
    pub fn add_import(&mut self, import: Import) -> usize {
        let idx = self.imports.len();
        self.scopes[import.scope].imports.push(idx);
        self.imports.push(import);
        idx
    }
    pub fn add_export(&mut self, export: Export) -> usize {
        let idx = self.exports.len();
        self.exports.push(export);
        idx
    }
    /// Macro declarations are idempotent, the first definition wins.
    /// Returns the handle and whether a new macro was created.
    pub fn add_macro(&mut self, mac: Macro) -> (usize,bool) {
        for (idx,old) in self.macros.iter().enumerate() {
            if old.name == mac.name {
                return (idx,false);
            }
        }
        self.macros.push(mac);
        (self.macros.len()-1,true)
    }
    pub fn find_macro(&self, name: &str) -> Option<usize> {
        self.macros.iter().position(|m| m.name == name)
    }
    /// first child scope with the given name, by insertion order
    fn child_scope(&self, scope: usize, name: &str) -> Option<usize> {
        for child in &self.scopes[scope].children {
            if self.scopes[*child].name == name {
                return Some(*child);
            }
        }
        None
    }
    fn scope_symbol(&self, scope: usize, name: &str) -> Option<usize> {
        for sym in &self.scopes[scope].symbols {
            if self.symbols[*sym].name == name {
                return Some(*sym);
            }
        }
        None
    }
    fn scope_import(&self, scope: usize, name: &str) -> Option<usize> {
        for imp in &self.scopes[scope].imports {
            if self.imports[*imp].name == name {
                return Some(*imp);
            }
        }
        None
    }
    /// Search one base scope: descend through the qualifier chain, then
    /// look for a child scope, a symbol, and optionally an import.
    fn search_at(&self, base: usize, qualifiers: &[String], name: &str, ctx: RefContext, allow_imports: bool) -> Option<LocalEntity> {
        let mut scope = base;
        for q in qualifiers {
            match self.child_scope(scope,q) {
                Some(child) => scope = child,
                None => return None
            }
        }
        if let Some(child) = self.child_scope(scope,name) {
            // procs double as labels, so a symbol context still finds them
            if ctx == RefContext::Scope || ctx == RefContext::Sizeof || self.scopes[child].kind == ScopeKind::Proc {
                return Some(LocalEntity::Scope(child));
            }
        }
        if let Some(sym) = self.scope_symbol(scope,name) {
            return Some(LocalEntity::Symbol(sym));
        }
        if allow_imports {
            if let Some(imp) = self.scope_import(scope,name) {
                return Some(LocalEntity::Import(imp));
            }
        }
        None
    }
    /// Find a definition or import by walking outward from `start`.
    /// A leading empty qualifier is consumed when the walk reaches the
    /// file root, anchoring the rest of the chain there.
    pub fn lookup(&self, name: &str, qualifiers: &[String], ctx: RefContext, start: usize, allow_imports: bool) -> Option<LocalEntity> {
        let mut base = Some(start);
        while let Some(b) = base {
            let at_root = self.scopes[b].parent.is_none();
            let quals = match at_root && qualifiers.first().map(|q| q.is_empty()) == Some(true) {
                true => &qualifiers[1..],
                false => qualifiers
            };
            if let Some(found) = self.search_at(b,quals,name,ctx,allow_imports) {
                return Some(found);
            }
            base = self.scopes[b].parent;
        }
        None
    }
    /// the innermost scope whose span contains the position
    pub fn scope_at(&self, pos: &lsp::Position) -> usize {
        let mut best = 0;
        let mut best_depth = 0;
        for (idx,scope) in self.scopes.iter().enumerate() {
            if idx == 0 || !super::range_contains_pos(&scope.full,pos) {
                continue;
            }
            let mut depth = 0;
            let mut walk = scope.parent;
            while let Some(p) = walk {
                depth += 1;
                walk = self.scopes[p].parent;
            }
            if depth >= best_depth {
                best = idx;
                best_depth = depth;
            }
        }
        best
    }
    pub fn reference_at(&self, pos: &lsp::Position) -> Option<&Reference> {
        self.refs.iter().find(|r| super::range_contains_pos(&r.rng,pos))
    }
    /// names of the scopes containing an entity, root excluded, outermost first
    pub fn scope_stack(&self, loc: &LocalEntity) -> Vec<String> {
        let mut owner = match loc {
            LocalEntity::Symbol(idx) => Some(self.symbols[*idx].scope),
            LocalEntity::Scope(idx) => self.scopes[*idx].parent,
            LocalEntity::Import(idx) => Some(self.imports[*idx].scope)
        };
        let mut ans = Vec::new();
        while let Some(s) = owner {
            if self.scopes[s].parent.is_some() {
                ans.push(self.scopes[s].name.clone());
            }
            owner = self.scopes[s].parent;
        }
        ans.reverse();
        ans
    }
    pub fn entity_name(&self, loc: &LocalEntity) -> &str {
        match loc {
            LocalEntity::Symbol(idx) => &self.symbols[*idx].name,
            LocalEntity::Scope(idx) => &self.scopes[*idx].name,
            LocalEntity::Import(idx) => &self.imports[*idx].name
        }
    }
    /// Shortest qualifier chain that gets from `from_scope` back to the
    /// entity, rendered as a `::` joined name.  Falls back to the fully
    /// qualified name, root anchored if a shorter chain found something
    /// else along the way.
    pub fn shortest_name(&self, target: &LocalEntity, from_scope: usize) -> String {
        let stack = self.scope_stack(target);
        let name = self.entity_name(target).to_string();
        let ctx = match target {
            LocalEntity::Scope(idx) if self.scopes[*idx].kind != ScopeKind::Proc => RefContext::Scope,
            _ => RefContext::Symbol
        };
        let mut conflict = false;
        for take in 0..=stack.len() {
            let quals = stack[stack.len()-take..].to_vec();
            match self.lookup(&name,&quals,ctx,from_scope,true) {
                Some(found) if found == *target => {
                    let mut ans = quals.join("::");
                    if !ans.is_empty() {
                        ans += "::";
                    }
                    return ans + &name;
                },
                Some(_) => conflict = true,
                None => {}
            }
        }
        let full = match stack.is_empty() {
            true => name,
            false => [stack.join("::"),name].join("::")
        };
        match conflict {
            true => ["::",&full].concat(),
            false => full
        }
    }
    /// every defined entity of the file: symbols, scopes (root excluded), macros
    pub fn defined_entities(&self) -> Vec<Entity> {
        let mut ans = Vec::new();
        for idx in 0..self.symbols.len() {
            ans.push(Entity::Symbol { uri: self.uri.clone(), idx });
        }
        for idx in 1..self.scopes.len() {
            ans.push(Entity::Scope { uri: self.uri.clone(), idx });
        }
        for idx in 0..self.macros.len() {
            ans.push(Entity::Macro { uri: self.uri.clone(), idx });
        }
        ans
    }
}
