//! # ca65kit
//!
//! Analysis engine and language server for ca65 assembly source
//! (the macro assembler of the cc65 suite, targeting the 6502 family).
//!
//! The library builds a per-file symbol table for every source in a
//! workspace, stitches files into translation units through include and
//! export/import relationships, and answers semantic queries over the
//! result: definitions, references, rename, hover, completion, call
//! hierarchy, outline, folding, inlay hints, and unused-symbol hints.
//!
//! The language server compiles to a separate executable, its entry point
//! is in `src/bin/server-ca65`.  The server owns all protocol framing;
//! everything in the library is synchronous and protocol-agnostic apart
//! from using `lsp_types` structures to describe positions and results.

pub mod lang;

/// Any error all the way up the stack
pub type DYNERR = Box<dyn std::error::Error>;
/// Result with error that could be anything all the way up the stack
pub type STDRESULT = Result<(),Box<dyn std::error::Error>>;
