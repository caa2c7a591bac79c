//! Tests of the ca65 analysis core.
//!
//! Most tests build an analyzer over in-memory documents; only the
//! workspace tests touch the file system.

use std::str::FromStr;
use lsp_types as lsp;
use crate::lang::Document;
use super::analysis::Analyzer;

mod lexer_test;
mod parser_test;
mod scanner_test;
mod includes_test;
mod locals_test;
mod queries_test;
mod workspace_test;

pub fn uri(name: &str) -> String {
    format!("file:///ws/{}",name)
}

pub fn pos(line: u32, character: u32) -> lsp::Position {
    lsp::Position::new(line,character)
}

/// analyzer over volatile documents, no file system involved
pub fn build(files: &[(&str,&str)]) -> Analyzer {
    let mut analyzer = Analyzer::new();
    let mut docs = Vec::new();
    for (name,text) in files {
        let u = lsp::Uri::from_str(&uri(name)).expect("bad test uri");
        docs.push(Document::new(u,text.to_string()));
    }
    analyzer.init_workspace(Vec::new(),docs).expect("workspace init failed");
    analyzer
}
