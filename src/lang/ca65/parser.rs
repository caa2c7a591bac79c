//! Argument parser.
//!
//! Consumes the args item produced by the lexer and emits qualified name
//! groups with byte offsets, plus a specialized form for import and
//! export argument lists.  String literals, character literals, and hex
//! numbers are blanked first so their contents are never mistaken for
//! names.

use super::RefContext;
use super::lexer;

/// One identifier token with its byte offset in the raw line.
#[derive(Clone,PartialEq,Debug)]
pub struct NameToken {
    pub name: String,
    pub offset: usize
}

/// A maximal run of identifier tokens separated by `::`.  The context
/// applies to the last token, preceding tokens are scope qualifiers.
#[derive(Clone,Debug)]
pub struct NameGroup {
    pub tokens: Vec<NameToken>,
    /// a leading `::` anchored the group at the file root
    pub leading_empty: bool,
    pub ctx: RefContext
}

/// One item of an `.import`/`.export`/`.global` argument list.
#[derive(Clone,PartialEq,Debug)]
pub struct ImportExportItem {
    pub name: String,
    pub offset: usize,
    /// `: zeropage` style address size specifier
    pub addr_size: Option<String>,
    /// inline value expression with its byte offset
    pub value: Option<(String,usize)>
}

fn is_ident_start(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_' || ch == b'@'
}

fn is_ident_char(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || ch == b'_'
}

/// Blank string literals, character literals, and hex numbers in place.
fn mask_literals(bytes: &mut Vec<u8>) {
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                bytes[i] = b' ';
                i += 1;
                while i < bytes.len() && bytes[i] != b'"' {
                    bytes[i] = b' ';
                    i += 1;
                }
                if i < bytes.len() {
                    bytes[i] = b' ';
                }
            },
            b'\'' => {
                bytes[i] = b' ';
                if i + 1 < bytes.len() {
                    bytes[i+1] = b' ';
                    if i + 2 < bytes.len() && bytes[i+2] == b'\'' {
                        bytes[i+2] = b' ';
                        i += 2;
                    } else {
                        i += 1;
                    }
                }
            },
            b'$' => {
                bytes[i] = b' ';
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_hexdigit() {
                    bytes[i] = b' ';
                    i += 1;
                }
                continue;
            },
            _ => {}
        }
        i += 1;
    }
}

/// Scan masked text for name groups.  `base` is the byte offset of the
/// text within the raw line, `last_ctx` is assigned to the final token of
/// each group.
fn scan_groups(bytes: &[u8], base: usize, last_ctx: RefContext) -> Vec<NameGroup> {
    let mut ans: Vec<NameGroup> = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let mut leading_empty = false;
        if bytes[i] == b':' && i + 2 < bytes.len() && bytes[i+1] == b':' && is_ident_start(bytes[i+2]) {
            leading_empty = true;
            i += 2;
        } else if bytes[i] == b'.' {
            // pseudo-op or pseudo-function name, not a symbol
            i += 1;
            while i < bytes.len() && is_ident_char(bytes[i]) {
                i += 1;
            }
            continue;
        } else if bytes[i].is_ascii_digit() {
            while i < bytes.len() && bytes[i].is_ascii_alphanumeric() {
                i += 1;
            }
            continue;
        } else if !is_ident_start(bytes[i]) {
            i += 1;
            continue;
        }
        let mut tokens = Vec::new();
        loop {
            let beg = i;
            i += 1;
            while i < bytes.len() && is_ident_char(bytes[i]) {
                i += 1;
            }
            tokens.push(NameToken {
                name: String::from_utf8_lossy(&bytes[beg..i]).to_string(),
                offset: base + beg
            });
            if i + 2 < bytes.len() && bytes[i] == b':' && bytes[i+1] == b':' && is_ident_start(bytes[i+2]) {
                i += 2;
            } else {
                break;
            }
        }
        ans.push(NameGroup { tokens, leading_empty, ctx: last_ctx });
    }
    ans
}

fn find_subslice(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if haystack.len() < needle.len() || from > haystack.len() - needle.len() {
        return None;
    }
    (from..=haystack.len()-needle.len()).find(|i| haystack[*i..i+needle.len()].eq_ignore_ascii_case(needle))
}

/// Produce all name groups of an args string.  `.sizeof(...)` expressions
/// are pulled out first and their groups tagged with the sizeof context.
pub fn parse_args(args: &str, offset: usize) -> Vec<NameGroup> {
    let mut bytes = args.as_bytes().to_vec();
    mask_literals(&mut bytes);
    let mut ans = Vec::new();
    let mut search = 0;
    while let Some(beg) = find_subslice(&bytes,b".sizeof",search) {
        let mut i = beg + ".sizeof".len();
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] != b'(' {
            search = i;
            continue;
        }
        let open = i;
        let mut depth = 1;
        i += 1;
        while i < bytes.len() && depth > 0 {
            match bytes[i] {
                b'(' => depth += 1,
                b')' => depth -= 1,
                _ => {}
            }
            i += 1;
        }
        let close = i;
        ans.append(&mut scan_groups(&bytes[open+1..close],offset + open + 1,RefContext::Sizeof));
        for b in bytes[beg..close].iter_mut() {
            *b = b' ';
        }
        search = close;
    }
    ans.append(&mut scan_groups(&bytes,offset,RefContext::Symbol));
    ans
}

/// Split an import/export argument list on top level commas and parse
/// each item as identifier, optional `:addrspec`, optional `=`/`:=` value.
pub fn parse_import_export(args: &str, offset: usize) -> Vec<ImportExportItem> {
    let mut ans = Vec::new();
    let bytes = args.as_bytes();
    let mut beg = 0;
    let mut depth = 0;
    let mut pieces = Vec::new();
    for (i,b) in bytes.iter().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => depth -= 1,
            b',' if depth == 0 => {
                pieces.push((beg,i));
                beg = i + 1;
            },
            _ => {}
        }
    }
    pieces.push((beg,bytes.len()));
    for (piece_beg,piece_end) in pieces {
        let piece = &args[piece_beg..piece_end];
        let name_rel = match piece.find(|c: char| !c.is_whitespace()) {
            Some(r) => r,
            None => continue
        };
        let name_end = piece[name_rel..].find(|c: char| !is_ident_char(c as u8))
            .map(|e| name_rel + e).unwrap_or(piece.len());
        let name = &piece[name_rel..name_end];
        if !lexer::is_identifier(name) {
            continue;
        }
        let mut item = ImportExportItem {
            name: name.to_string(),
            offset: offset + piece_beg + name_rel,
            addr_size: None,
            value: None
        };
        let skip_ws = |cur: usize| {
            let mut c = cur;
            while c < piece.len() && piece.as_bytes()[c].is_ascii_whitespace() {
                c += 1;
            }
            c
        };
        let mut cur = skip_ws(name_end);
        if piece[cur..].starts_with(":") && !piece[cur..].starts_with(":=") {
            cur = skip_ws(cur + 1);
            let spec_end = piece[cur..].find(|c: char| !is_ident_char(c as u8))
                .map(|e| cur + e).unwrap_or(piece.len());
            if spec_end > cur {
                item.addr_size = Some(piece[cur..spec_end].to_string());
            }
            cur = skip_ws(spec_end);
        }
        if piece[cur..].starts_with(":=") {
            cur += 2;
        } else if piece[cur..].starts_with("=") {
            cur += 1;
        } else {
            cur = piece.len();
        }
        if cur < piece.len() {
            let val_beg = skip_ws(cur);
            let val = piece[val_beg..].trim_end();
            if !val.is_empty() {
                item.value = Some((val.to_string(),offset + piece_beg + val_beg));
            }
        }
        ans.push(item);
    }
    ans
}
