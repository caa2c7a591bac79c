//! Completions.
//!
//! Command position offers mnemonics, control commands, and visible
//! macros.  Operand position offers everything visible in the current
//! translation unit, cheap locals of the enclosing boundary window, and
//! the pseudo functions and variables.  Sources outside the translation
//! unit surface as auto-include items, and exported names that are not
//! yet visible surface as auto-import items, each carrying the text edit
//! that splices the directive into the include block.

use std::collections::HashSet;
use std::time::Instant;
use lsp_types as lsp;
use super::{SymbolKind,ScopeKind,is_synthetic};
use super::analysis::Analyzer;
use super::handbook::{mnemonics,controls};
use super::{lexer,locals};
use crate::lang::relative_path;

const RCH: &str = "unreachable was reached";

fn completion_kind(kind: SymbolKind) -> lsp::CompletionItemKind {
    match kind {
        SymbolKind::Label => lsp::CompletionItemKind::FUNCTION,
        SymbolKind::ResLabel | SymbolKind::DataLabel => lsp::CompletionItemKind::VARIABLE,
        SymbolKind::StringLabel => lsp::CompletionItemKind::TEXT,
        SymbolKind::Constant => lsp::CompletionItemKind::CONSTANT,
        SymbolKind::Variable => lsp::CompletionItemKind::VARIABLE,
        SymbolKind::StructMember => lsp::CompletionItemKind::FIELD,
        SymbolKind::EnumMember => lsp::CompletionItemKind::ENUM_MEMBER
    }
}

fn scope_completion_kind(kind: ScopeKind) -> lsp::CompletionItemKind {
    match kind {
        ScopeKind::Scope => lsp::CompletionItemKind::MODULE,
        ScopeKind::Proc => lsp::CompletionItemKind::FUNCTION,
        ScopeKind::Struct | ScopeKind::Union => lsp::CompletionItemKind::STRUCT,
        ScopeKind::Enum => lsp::CompletionItemKind::ENUM
    }
}

fn simple(label: &str, kind: lsp::CompletionItemKind, detail: Option<String>) -> lsp::CompletionItem {
    lsp::CompletionItem {
        label: label.to_string(),
        kind: Some(kind),
        detail,
        ..Default::default()
    }
}

/// Where new `.include` and `.import` lines should be spliced: the lines
/// of the existing include block, and the line following the leading
/// comment block when there is none.
fn include_block(text: &str) -> (Vec<(u32,String)>,u32) {
    let mut includes = Vec::new();
    let mut after_comments = 0;
    let mut in_leading_comments = true;
    for (row,line) in text.lines().enumerate() {
        let trimmed = line.trim_start();
        if in_leading_comments {
            if trimmed.is_empty() || trimmed.starts_with(";") {
                after_comments = row as u32 + 1;
                continue;
            }
            in_leading_comments = false;
        }
        let lexed = lexer::lex(line);
        if let (Some(cmd),Some(args)) = (&lexed.command,&lexed.args) {
            if cmd.text.to_lowercase() == ".include" {
                let path = args.text.trim_matches(|c| c == '"' || c == ' ');
                includes.push((row as u32,path.to_string()));
            }
        }
    }
    (includes,after_comments)
}

fn insert_edit(line: u32, text: String) -> lsp::TextEdit {
    let pos = lsp::Position::new(line,0);
    lsp::TextEdit::new(lsp::Range::new(pos,pos),text)
}

impl Analyzer {
    /// Names visible from `uri`: the union over its translation unit of
    /// defined entities and imports.
    fn visible_items(&self, uri: &str) -> Vec<lsp::CompletionItem> {
        let mut ans = Vec::new();
        let mut seen = HashSet::new();
        for file in self.graph.translation_unit(uri) {
            let sym = match self.stbl.get(&file) {
                Some(s) => s,
                None => continue
            };
            for s in &sym.symbols {
                if !is_synthetic(&s.name) && seen.insert(s.name.clone()) {
                    ans.push(simple(&s.name,completion_kind(s.kind),Some(s.kind.to_string())));
                }
            }
            for scope in &sym.scopes[1..] {
                if !is_synthetic(&scope.name) && seen.insert(scope.name.clone()) {
                    ans.push(simple(&scope.name,scope_completion_kind(scope.kind),Some(scope.kind.to_string())));
                }
            }
            for imp in &sym.imports {
                if seen.insert(imp.name.clone()) {
                    ans.push(simple(&imp.name,lsp::CompletionItemKind::INTERFACE,Some("import".to_string())));
                }
            }
        }
        ans
    }
    fn visible_names(&self, uri: &str) -> HashSet<String> {
        let mut ans = HashSet::new();
        for file in self.graph.translation_unit(uri) {
            if let Some(sym) = self.stbl.get(&file) {
                for s in &sym.symbols {
                    ans.insert(s.name.clone());
                }
                for scope in &sym.scopes[1..] {
                    ans.insert(scope.name.clone());
                }
                for imp in &sym.imports {
                    ans.insert(imp.name.clone());
                }
            }
        }
        ans
    }
    fn macro_items(&self, uri: &str) -> Vec<lsp::CompletionItem> {
        let mut ans = Vec::new();
        let mut seen = HashSet::new();
        for file in self.graph.translation_unit(uri) {
            if let Some(sym) = self.stbl.get(&file) {
                for mac in &sym.macros {
                    if seen.insert(mac.name.clone()) {
                        ans.push(simple(&mac.name,lsp::CompletionItemKind::FUNCTION,Some(mac.kind.to_string())));
                    }
                }
            }
        }
        ans
    }
    /// Auto-include: offer sources outside the translation unit whose
    /// extension is allowed, with the edit that adds the include line in
    /// lexical order.
    fn auto_include_items(&self, uri: &str) -> Vec<lsp::CompletionItem> {
        let config = self.get_settings(uri);
        let text = match self.doc_text(uri) {
            Some(t) => t,
            None => return Vec::new()
        };
        let (block,after_comments) = include_block(text);
        let tu: HashSet<String> = self.graph.translation_unit(uri).into_iter().collect();
        let mut ans = Vec::new();
        for candidate in self.ws.docs.keys() {
            if tu.contains(candidate) || candidate == uri {
                continue;
            }
            let rel = relative_path(uri,candidate);
            let lower = rel.to_lowercase();
            if !config.auto_include_extensions.iter().any(|e| lower.ends_with(&e.to_lowercase())) {
                continue;
            }
            let insert_line = match block.iter().find(|(_,path)| path.as_str() > rel.as_str()) {
                Some((line,_)) => *line,
                None => match block.last() {
                    Some((line,_)) => line + 1,
                    None => after_comments
                }
            };
            let name = rel.split("/").last().unwrap_or(&rel).to_string();
            ans.push(lsp::CompletionItem {
                label: name,
                kind: Some(lsp::CompletionItemKind::FILE),
                detail: Some(format!("auto include {}",rel)),
                additional_text_edits: Some(vec![insert_edit(insert_line,format!(".include \"{}\"\n",rel))]),
                ..Default::default()
            });
        }
        ans
    }
    /// Auto-import: exported names not otherwise visible, with the edit
    /// that adds the import just below the include block.
    fn auto_import_items(&self, uri: &str) -> Vec<lsp::CompletionItem> {
        let text = match self.doc_text(uri) {
            Some(t) => t,
            None => return Vec::new()
        };
        let (block,after_comments) = include_block(text);
        let import_line = match block.last() {
            Some((line,_)) => line + 1,
            None => after_comments
        };
        let visible = self.visible_names(uri);
        let mut ans = Vec::new();
        for name in self.exports.names() {
            if visible.contains(name) {
                continue;
            }
            if self.exports.get(name).iter().all(|e| e.uri == uri) {
                continue;
            }
            ans.push(lsp::CompletionItem {
                label: name.clone(),
                kind: Some(lsp::CompletionItemKind::REFERENCE),
                detail: Some("auto import".to_string()),
                additional_text_edits: Some(vec![insert_edit(import_line,format!(".import {}\n",name))]),
                ..Default::default()
            });
        }
        ans
    }
    pub fn completions(&mut self, uri: &str, pos: &lsp::Position) -> Vec<lsp::CompletionItem> {
        if !self.ready() {
            return Vec::new();
        }
        let t = Instant::now();
        let line = match self.doc_text(uri).and_then(|t| t.lines().nth(pos.line as usize)) {
            Some(l) => l.to_string(),
            None => return Vec::new()
        };
        let col = (pos.character as usize).min(line.len());
        let prefix = &line[..col];
        let command_ctx = regex::Regex::new(r"^\s*(?:[A-Za-z_@][A-Za-z0-9_]*:)?\s*\.?[A-Za-z0-9_]*$").expect(RCH);
        let mut ans = Vec::new();
        if command_ctx.is_match(prefix) {
            for op in mnemonics::MNEMONICS {
                ans.push(simple(op,lsp::CompletionItemKind::KEYWORD,None));
            }
            for psop in controls::CONTROL_COMMANDS {
                ans.push(simple(psop,lsp::CompletionItemKind::KEYWORD,None));
            }
            ans.append(&mut self.macro_items(uri));
        } else {
            ans.append(&mut self.visible_items(uri));
            if let (Some(text),Some(sym)) = (self.doc_text(uri),self.get_symbols(uri)) {
                for cheap in locals::cheap_labels(text,sym,pos.line) {
                    ans.push(simple(&cheap,lsp::CompletionItemKind::VARIABLE,Some("cheap local".to_string())));
                }
            }
            for func in controls::PSEUDO_FUNCTIONS {
                ans.push(simple(func,lsp::CompletionItemKind::FUNCTION,None));
            }
            for var in controls::PSEUDO_VARIABLES {
                ans.push(simple(var,lsp::CompletionItemKind::VALUE,None));
            }
            ans.append(&mut self.auto_include_items(uri));
            ans.append(&mut self.auto_import_items(uri));
        }
        self.perf.add("completions",t.elapsed());
        ans
    }
}
