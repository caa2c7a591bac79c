//! Anonymous and cheap local label resolution.
//!
//! Anonymous labels are resolved by ordinal arithmetic over the sorted
//! definition lines of a file.  Cheap locals (`@name`) never enter the
//! symbol table; their effective scope is the window between two boundary
//! lines, where a boundary is a non-cheap label definition or a
//! `.proc`/`.struct`/`.union` opener.

use lsp_types as lsp;
use super::{Symbols,SymbolKind,ScopeKind};
use super::lexer;
use crate::lang::line_range;

/// Resolve an anonymous reference token (`:-`, `:++`, `:<`, ...) sitting
/// on `line` to a definition ordinal.  Out of range yields None.
pub fn resolve_anon(sym: &Symbols, token: &str, line: u32) -> Option<usize> {
    let tok = token.trim_start_matches(":");
    let plus = tok.chars().filter(|c| *c == '+' || *c == '>').count() as isize;
    let minus = tok.chars().filter(|c| *c == '-' || *c == '<').count() as isize;
    if plus + minus == 0 {
        return None;
    }
    let last = match sym.anons.last_at_or_before(line) {
        Some(i) => i as isize,
        None => -1
    };
    let mut target = last + plus - minus;
    if minus > 0 {
        // the first `-` is the label immediately previous
        target += 1;
    }
    if target >= 0 && (target as usize) < sym.anons.defs.len() {
        return Some(target as usize);
    }
    None
}

/// span of an anonymous definition, preferring the recorded self reference
pub fn anon_def_range(sym: &Symbols, ordinal: usize) -> Option<lsp::Range> {
    let line = *sym.anons.defs.get(ordinal)?;
    if let Some(spans) = sym.anons.refs.get(&ordinal) {
        if let Some(rng) = spans.iter().find(|r| r.start.line == line) {
            return Some(*rng);
        }
    }
    Some(line_range(line as isize,0,1))
}

/// Boundary lines of a file, sorted: non-cheap label definitions and
/// proc/struct/union openers.
fn boundaries(sym: &Symbols) -> Vec<u32> {
    let mut ans = Vec::new();
    for s in &sym.symbols {
        match s.kind {
            SymbolKind::Label | SymbolKind::ResLabel | SymbolKind::DataLabel | SymbolKind::StringLabel => {
                ans.push(s.rng.start.line);
            },
            _ => {}
        }
    }
    for scope in &sym.scopes {
        if matches!(scope.kind,ScopeKind::Proc | ScopeKind::Struct | ScopeKind::Union) {
            ans.push(scope.full.start.line);
        }
    }
    ans.sort();
    ans.dedup();
    ans
}

/// Half open line window enclosing `line` between boundaries.
fn window(sym: &Symbols, line: u32) -> (u32,u32) {
    let b = boundaries(sym);
    let beg = b.iter().rev().find(|l| **l <= line).copied().unwrap_or(0);
    let end = b.iter().find(|l| **l > line).copied().unwrap_or(u32::MAX);
    (beg,end)
}

/// Find the definition of a cheap local by scanning forward from the
/// boundary preceding the reference.
pub fn resolve_cheap(text: &str, sym: &Symbols, name: &str, ref_line: u32) -> Option<lsp::Range> {
    let (beg,end) = window(sym,ref_line);
    for (row,line) in text.lines().enumerate() {
        let row = row as u32;
        if row < beg {
            continue;
        }
        if row >= end {
            break;
        }
        if let Some(label) = lexer::lex(line).label {
            if label.text == name {
                return Some(line_range(row as isize,label.offset,label.offset + label.text.len()));
            }
        }
    }
    None
}

/// Cheap labels defined in the window around `line`, for completions.
pub fn cheap_labels(text: &str, sym: &Symbols, line: u32) -> Vec<String> {
    let (beg,end) = window(sym,line);
    let mut ans = Vec::new();
    for (row,line) in text.lines().enumerate() {
        let row = row as u32;
        if row < beg {
            continue;
        }
        if row >= end {
            break;
        }
        if let Some(label) = lexer::lex(line).label {
            if label.text.starts_with("@") && !ans.contains(&label.text) {
                ans.push(label.text);
            }
        }
    }
    ans
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'@'
}

/// Every occurrence of a cheap local name in its boundary window,
/// definition included.
pub fn cheap_refs(text: &str, sym: &Symbols, name: &str, ref_line: u32) -> Vec<lsp::Range> {
    let (beg,end) = window(sym,ref_line);
    let mut ans = Vec::new();
    for (row,line) in text.lines().enumerate() {
        let row = row as u32;
        if row < beg {
            continue;
        }
        if row >= end {
            break;
        }
        let code = match line.find(";") {
            Some(idx) => &line[..idx],
            None => line
        };
        let mut search = 0;
        while let Some(rel) = code[search..].find(name) {
            let at = search + rel;
            let before_ok = at == 0 || !is_ident_char(code.as_bytes()[at-1]);
            let after = at + name.len();
            let after_ok = after >= code.len() || !is_ident_char(code.as_bytes()[after]);
            if before_ok && after_ok {
                ans.push(line_range(row as isize,at,after));
            }
            search = at + name.len();
        }
    }
    ans
}
