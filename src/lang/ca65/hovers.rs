//! Hover.
//!
//! Reconstructs a code block around the entity's definition, prefixed by
//! its segment and enclosing scopes, and pulls in the contiguous comment
//! block sitting above the definition.  A single blank line gap is
//! allowed, and an `.export`/`.global` declaration between the comments
//! and the definition does not break the block.

use std::time::Instant;
use lsp_types as lsp;
use super::{Entity,ScopeKind};
use super::analysis::Analyzer;

fn new_section(hov: &mut String, sec: &str) {
    if hov.len() > 0 && sec.len() > 0 {
        *hov += "\n\n---\n\n"
    }
    *hov += sec;
}

fn scope_keyword(kind: ScopeKind) -> &'static str {
    match kind {
        ScopeKind::Scope => ".scope",
        ScopeKind::Proc => ".proc",
        ScopeKind::Struct => ".struct",
        ScopeKind::Union => ".union",
        ScopeKind::Enum => ".enum"
    }
}

impl Analyzer {
    /// segment tag and enclosing scope prefix lines for the code block
    fn hover_prefix(&self, entity: &Entity) -> Vec<String> {
        let sym = match self.get_symbols(entity.uri()) {
            Some(s) => s,
            None => return Vec::new()
        };
        let mut ans = Vec::new();
        let (segment,mut walk) = match entity {
            Entity::Symbol { idx, .. } => {
                let s = &sym.symbols[*idx];
                (s.segment.clone(),Some(s.scope))
            },
            Entity::Scope { idx, .. } => {
                let s = &sym.scopes[*idx];
                (s.segment.clone(),s.parent)
            },
            _ => (None,None)
        };
        if let Some(seg) = segment {
            ans.push(format!(".segment \"{}\"",seg));
        }
        let mut scopes = Vec::new();
        while let Some(idx) = walk {
            if sym.scopes[idx].parent.is_some() {
                scopes.push(format!("{} {}",scope_keyword(sym.scopes[idx].kind),sym.scopes[idx].name));
            }
            walk = sym.scopes[idx].parent;
        }
        scopes.reverse();
        ans.append(&mut scopes);
        ans
    }
    /// Contiguous comment block above `line`, allowing one blank line and
    /// skipping across export/global declarations.
    fn comment_block(&self, uri: &str, line: u32) -> Vec<String> {
        let text = match self.doc_text(uri) {
            Some(t) => t,
            None => return Vec::new()
        };
        let lines = text.lines().collect::<Vec<&str>>();
        let mut ans = Vec::new();
        let mut row = line as isize - 1;
        let mut gap_allowance = 1;
        while row >= 0 {
            let trimmed = lines[row as usize].trim();
            let lower = trimmed.to_lowercase();
            if trimmed.starts_with(";") {
                let mut body = trimmed.trim_start_matches(";").to_string();
                if body.starts_with(" ") {
                    body = body[1..].to_string();
                }
                ans.push(body);
                gap_allowance = 1;
            } else if lower.starts_with(".export") || lower.starts_with(".global") {
                // declarations do not break the block
            } else if trimmed.is_empty() && gap_allowance > 0 {
                gap_allowance -= 1;
            } else {
                break;
            }
            row -= 1;
        }
        ans.reverse();
        ans
    }
    pub fn hover(&mut self, uri: &str, pos: &lsp::Position) -> Option<lsp::Hover> {
        if !self.ready() {
            return None;
        }
        let t = Instant::now();
        let sel_rng = self.get_symbols(uri)?.reference_at(pos)?.rng;
        let entity = self.entity_at(uri,pos)?;
        let def_rng = entity.range(self.symbol_map())?;
        let mut code = self.hover_prefix(&entity);
        let (beg,end) = match &entity {
            Entity::Macro { idx, .. } => {
                let mac = &self.get_symbols(entity.uri())?.macros[*idx];
                (mac.full.start.line,mac.full.end.line)
            },
            _ => (def_rng.start.line,def_rng.end.line)
        };
        let text = self.doc_text(entity.uri())?;
        for (row,line) in text.lines().enumerate() {
            if row as u32 >= beg && row as u32 <= end {
                code.push(line.to_string());
            }
        }
        let mut value = String::new();
        new_section(&mut value,&["```\n",&code.join("\n"),"\n```"].concat());
        let comments = self.comment_block(entity.uri(),beg);
        if !comments.is_empty() {
            new_section(&mut value,&comments.join("\n\n"));
        }
        self.perf.add("hover",t.elapsed());
        Some(lsp::Hover {
            contents: lsp::HoverContents::Markup(lsp::MarkupContent {
                kind: lsp::MarkupKind::Markdown,
                value
            }),
            range: Some(sel_rng)
        })
    }
}
