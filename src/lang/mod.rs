//! # Language Module
//!
//! Shared pieces used by the analyzer and the language server.
//! The document type, URI helpers, and JSON settings helpers live here,
//! language specific operations are in the submodules.

use std::str::FromStr;
use std::path::{Path,PathBuf};
use lsp_types as lsp;
use thiserror::Error;

pub mod server;
pub mod ca65;

#[derive(Error,Debug)]
pub enum Error {
    #[error("Syntax error")]
    Syntax,
    #[error("Bad URL")]
    BadUrl,
    #[error("Out of range")]
    OutOfRange,
}

/// A workspace document buffered in memory.
/// The `version` is whatever the client last told us, if anything.
#[derive(Clone)]
pub struct Document {
    pub uri: lsp::Uri,
    pub text: String,
    pub version: Option<i32>
}

impl Document {
    pub fn new(uri: lsp::Uri, text: String) -> Self {
        Self { uri, text, version: None }
    }
    pub fn from_file_path(path: &Path) -> Result<Self,crate::DYNERR> {
        let uri = uri_from_file_path(path)?;
        let text = std::fs::read_to_string(path)?;
        Ok(Self { uri, text, version: None })
    }
}

fn percent_decode(s: &str) -> String {
    let mut ans = String::new();
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let Ok(code) = u8::from_str_radix(&s[i+1..i+3],16) {
                ans.push(code as char);
                i += 3;
                continue;
            }
        }
        ans.push(bytes[i] as char);
        i += 1;
    }
    ans
}

fn percent_encode(s: &str) -> String {
    let mut ans = String::new();
    for ch in s.chars() {
        match ch {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '.' | '_' | '~' | '/' | ':' => ans.push(ch),
            _ => {
                let mut buf = [0u8;4];
                for b in ch.encode_utf8(&mut buf).as_bytes() {
                    ans += &format!("%{:02X}",b);
                }
            }
        }
    }
    ans
}

/// Extract a file system path from a file URI.
/// Only the `file` scheme is accepted.
pub fn pathbuf_from_uri(uri: &lsp::Uri) -> Result<PathBuf,crate::DYNERR> {
    let s = uri.as_str();
    if let Some(rest) = s.strip_prefix("file://") {
        let host_end = rest.find('/').unwrap_or(0);
        return Ok(PathBuf::from(percent_decode(&rest[host_end..])));
    }
    Err(Box::new(Error::BadUrl))
}

/// Build a file URI from an absolute path.
pub fn uri_from_file_path(path: &Path) -> Result<lsp::Uri,crate::DYNERR> {
    let s = path.to_str().ok_or(Error::BadUrl)?;
    let encoded = match s.starts_with("/") {
        true => ["file://",&percent_encode(s)].concat(),
        false => ["file:///",&percent_encode(&s.replace("\\","/"))].concat()
    };
    match lsp::Uri::from_str(&encoded) {
        Ok(uri) => Ok(uri),
        Err(_) => Err(Box::new(Error::BadUrl))
    }
}

/// Clients are not consistent about percent encoding and drive letter case.
/// Round trip file URIs through a path so they can be used as map keys.
pub fn normalize_client_uri(uri: lsp::Uri) -> lsp::Uri {
    if let Ok(path) = pathbuf_from_uri(&uri) {
        if let Ok(normalized) = uri_from_file_path(&path) {
            return normalized;
        }
    }
    uri
}

pub fn normalize_client_uri_str(s: &str) -> Result<lsp::Uri,crate::DYNERR> {
    match lsp::Uri::from_str(s) {
        Ok(uri) => Ok(normalize_client_uri(uri)),
        Err(_) => Err(Box::new(Error::BadUrl))
    }
}

pub fn range_contains_pos(rng: &lsp::Range, pos: &lsp::Position) -> bool {
    if pos.line < rng.start.line || pos.line > rng.end.line {
        return false;
    }
    if pos.line == rng.start.line && pos.character < rng.start.character {
        return false;
    }
    if pos.line == rng.end.line && pos.character > rng.end.character {
        return false;
    }
    true
}

/// range within a single line, columns are byte offsets
pub fn line_range(line: isize, beg: usize, end: usize) -> lsp::Range {
    lsp::Range::new(
        lsp::Position::new(line as u32,beg as u32),
        lsp::Position::new(line as u32,end as u32)
    )
}

/// Path of `distant` relative to the directory containing `near`, for display.
/// If there is no common prefix the whole path of `distant` is kept.
pub fn relative_path(near: &str, distant: &str) -> String {
    let near_parts = near.split("/").collect::<Vec<&str>>();
    let distant_parts = distant.split("/").collect::<Vec<&str>>();
    if near_parts.len() < 2 {
        return distant.to_string();
    }
    let mut common = 0;
    while common + 1 < near_parts.len() && common + 1 < distant_parts.len()
        && near_parts[common] == distant_parts[common] {
        common += 1;
    }
    if common == 0 {
        return distant.to_string();
    }
    let mut ans = "../".repeat(near_parts.len() - 1 - common);
    ans += &distant_parts[common..].join("/");
    ans
}

pub fn update_json_bool(obj: &serde_json::Value, key: &str, target: &mut bool) {
    if let Some(val) = obj.get(key) {
        if let Some(b) = val.as_bool() {
            *target = b;
        }
    }
}

pub fn update_json_i64(obj: &serde_json::Value, key: &str, target: &mut i64) {
    if let Some(val) = obj.get(key) {
        if let Some(i) = val.as_i64() {
            *target = i;
        }
    }
}

pub fn update_json_string(obj: &serde_json::Value, key: &str, target: &mut String) {
    if let Some(val) = obj.get(key) {
        if let Some(s) = val.as_str() {
            *target = s.to_string();
        }
    }
}

pub fn update_json_string_vec(obj: &serde_json::Value, key: &str, target: &mut Vec<String>) {
    if let Some(val) = obj.get(key) {
        if let Some(ary) = val.as_array() {
            let mut ans = Vec::new();
            for item in ary {
                if let Some(s) = item.as_str() {
                    ans.push(s.to_string());
                }
            }
            *target = ans;
        }
    }
}
