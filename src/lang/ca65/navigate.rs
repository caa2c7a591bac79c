//! Definition, references, rename, and document highlight queries.
//!
//! These are uniform reference scans: a definition records a reference to
//! itself, so "find references" is exactly "every reference whose
//! resolution equals the target".  Cheap locals and anonymous labels are
//! handled by their own resolution paths.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Instant;
use lsp_types as lsp;
use super::Entity;
use super::analysis::Analyzer;
use super::locals;
use crate::lang::range_contains_pos;

pub fn location(uri: &str, rng: lsp::Range) -> Option<lsp::Location> {
    match lsp::Uri::from_str(uri) {
        Ok(u) => Some(lsp::Location::new(u,rng)),
        Err(_) => None
    }
}

fn is_word_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'@'
}

/// identifier-like word under the cursor, with its start column
pub fn word_at(line: &str, col: usize) -> Option<(String,usize)> {
    let bytes = line.as_bytes();
    if col > bytes.len() {
        return None;
    }
    let mut beg = col.min(bytes.len());
    while beg > 0 && is_word_char(bytes[beg-1]) {
        beg -= 1;
    }
    let mut end = beg;
    while end < bytes.len() && is_word_char(bytes[end]) {
        end += 1;
    }
    match end > beg {
        true => Some((line[beg..end].to_string(),beg)),
        false => None
    }
}

impl Analyzer {
    fn line_of(&self, uri: &str, row: u32) -> Option<String> {
        self.doc_text(uri)?.lines().nth(row as usize).map(|l| l.to_string())
    }
    /// the cheap local name under the cursor, if any
    fn cheap_at(&self, uri: &str, pos: &lsp::Position) -> Option<String> {
        let line = self.line_of(uri,pos.line)?;
        let (word,_) = word_at(&line,pos.character as usize)?;
        match word.starts_with("@") {
            true => Some(word),
            false => None
        }
    }
    /// the anonymous label ordinal whose reference span covers the cursor
    fn anon_at(&self, uri: &str, pos: &lsp::Position) -> Option<usize> {
        let sym = self.get_symbols(uri)?;
        for (ordinal,spans) in &sym.anons.refs {
            if spans.iter().any(|s| range_contains_pos(s,pos)) {
                return Some(*ordinal);
            }
        }
        None
    }
    /// Resolve whatever the cursor is on to an entity.
    pub fn entity_at(&mut self, uri: &str, pos: &lsp::Position) -> Option<Entity> {
        let r = self.get_symbols(uri)?.reference_at(pos)?.clone();
        self.resolve_ref(uri,&r)
    }
    pub fn goto_definition(&mut self, uri: &str, pos: &lsp::Position) -> Vec<lsp::Location> {
        if !self.ready() {
            return Vec::new();
        }
        let t = Instant::now();
        let mut ans = Vec::new();
        if let Some(name) = self.cheap_at(uri,pos) {
            if let (Some(text),Some(sym)) = (self.doc_text(uri),self.get_symbols(uri)) {
                if let Some(rng) = locals::resolve_cheap(text,sym,&name,pos.line) {
                    ans.extend(location(uri,rng));
                }
            }
        } else if let Some(entity) = self.entity_at(uri,pos) {
            if let Some(rng) = entity.range(self.symbol_map()) {
                ans.extend(location(entity.uri(),rng));
            }
        } else if let Some(ordinal) = self.anon_at(uri,pos) {
            if let Some(sym) = self.get_symbols(uri) {
                if ordinal < sym.anons.defs.len() {
                    if let Some(rng) = locals::anon_def_range(sym,ordinal) {
                        ans.extend(location(uri,rng));
                    }
                }
            }
        }
        self.perf.add("definition",t.elapsed());
        ans
    }
    /// Every reference whose resolution equals the target, across all files.
    fn matching_refs(&mut self, target: &Entity) -> Vec<(String,lsp::Range)> {
        let mut ans = Vec::new();
        let files = self.symbol_map().keys().cloned().collect::<Vec<String>>();
        for file in files {
            let refs = match self.get_symbols(&file) {
                Some(sym) => sym.refs.clone(),
                None => continue
            };
            for r in refs {
                if self.resolve_ref(&file,&r).as_ref() == Some(target) {
                    ans.push((file.clone(),r.rng));
                }
            }
        }
        ans
    }
    /// Reference spans for whatever is under the cursor, including the
    /// cheap-local and anonymous fallbacks (those stay within the file).
    fn reference_spans(&mut self, uri: &str, pos: &lsp::Position) -> Vec<(String,lsp::Range)> {
        if let Some(name) = self.cheap_at(uri,pos) {
            if let (Some(text),Some(sym)) = (self.doc_text(uri),self.get_symbols(uri)) {
                return locals::cheap_refs(text,sym,&name,pos.line).into_iter()
                    .map(|rng| (uri.to_string(),rng)).collect();
            }
            return Vec::new();
        }
        if let Some(entity) = self.entity_at(uri,pos) {
            return self.matching_refs(&entity);
        }
        if let Some(ordinal) = self.anon_at(uri,pos) {
            if let Some(sym) = self.get_symbols(uri) {
                if ordinal < sym.anons.defs.len() {
                    if let Some(spans) = sym.anons.refs.get(&ordinal) {
                        return spans.iter().map(|rng| (uri.to_string(),*rng)).collect();
                    }
                }
            }
        }
        Vec::new()
    }
    pub fn references(&mut self, uri: &str, pos: &lsp::Position) -> Vec<lsp::Location> {
        if !self.ready() {
            return Vec::new();
        }
        let t = Instant::now();
        let ans = self.reference_spans(uri,pos).into_iter()
            .filter_map(|(file,rng)| location(&file,rng)).collect();
        self.perf.add("references",t.elapsed());
        ans
    }
    /// Text edits replacing each reference span with the new name.
    pub fn rename(&mut self, uri: &str, pos: &lsp::Position, new_name: &str) -> HashMap<String,Vec<lsp::TextEdit>> {
        let mut ans: HashMap<String,Vec<lsp::TextEdit>> = HashMap::new();
        if !self.ready() {
            return ans;
        }
        let t = Instant::now();
        for (file,rng) in self.reference_spans(uri,pos) {
            ans.entry(file).or_insert(Vec::new()).push(lsp::TextEdit::new(rng,new_name.to_string()));
        }
        self.perf.add("rename",t.elapsed());
        ans
    }
    pub fn document_highlights(&mut self, uri: &str, pos: &lsp::Position) -> Vec<lsp::DocumentHighlight> {
        if !self.ready() {
            return Vec::new();
        }
        self.reference_spans(uri,pos).into_iter()
            .filter(|(file,_)| file == uri)
            .map(|(_,rng)| lsp::DocumentHighlight { range: rng, kind: Some(lsp::DocumentHighlightKind::TEXT) })
            .collect()
    }
}
