//! Line lexer.
//!
//! Splits a raw line into up to four items, each carrying its byte offset
//! in the original line: label, command, args, comment.  There is no
//! expression grammar here, the args item is handed to the argument
//! parser as raw text.

/// One lexed item with its byte offset in the raw line.
#[derive(Clone,PartialEq,Debug)]
pub struct LineItem {
    pub text: String,
    pub offset: usize
}

#[derive(Clone,Default,Debug)]
pub struct LexedLine {
    pub label: Option<LineItem>,
    pub command: Option<LineItem>,
    pub args: Option<LineItem>,
    pub comment: Option<LineItem>
}

fn is_ident_start(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_' || ch == b'@'
}

fn is_ident_char(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || ch == b'_'
}

/// identifier-like word, possibly with a cheap-local `@` prefix
pub fn is_identifier(txt: &str) -> bool {
    let bytes = txt.as_bytes();
    if bytes.is_empty() || !is_ident_start(bytes[0]) {
        return false;
    }
    bytes[1..].iter().all(|b| is_ident_char(*b))
}

/// Find the first `;` outside of string and character literals.
/// A character literal may be written `'c` or `'c'`.
fn comment_start(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut i = 0;
    let mut in_string = false;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => in_string = !in_string,
            b'\'' if !in_string => {
                // skip the literal character and an optional closing quote
                i += 1;
                if i < bytes.len() {
                    i += 1;
                    if i < bytes.len() && bytes[i] == b'\'' {
                        i += 1;
                    }
                }
                continue;
            },
            b';' if !in_string => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

/// Find the colon ending a label, if any.  Only the first colon outside of
/// literals is considered; it does not end a label when immediately
/// followed by `:`, `<`, `>`, `+`, or `-` (those belong to anonymous label
/// constructs), or when the text before it is not a single word.
fn label_colon(code: &str) -> Option<usize> {
    let bytes = code.as_bytes();
    let mut i = 0;
    let mut in_string = false;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => in_string = !in_string,
            b'\'' if !in_string => {
                i += 1;
                if i < bytes.len() {
                    i += 1;
                    if i < bytes.len() && bytes[i] == b'\'' {
                        i += 1;
                    }
                }
                continue;
            },
            b':' if !in_string => {
                if let Some(next) = bytes.get(i+1) {
                    if [b':',b'<',b'>',b'+',b'-'].contains(next) {
                        return None;
                    }
                }
                return Some(i);
            },
            _ => {}
        }
        i += 1;
    }
    None
}

/// Lex one raw line.  Never fails; items that are not present are None.
pub fn lex(line: &str) -> LexedLine {
    let mut ans = LexedLine::default();
    let code_end = match comment_start(line) {
        Some(beg) => {
            ans.comment = Some(LineItem { text: line[beg..].trim_end().to_string(), offset: beg });
            beg
        },
        None => line.len()
    };
    let code = &line[..code_end];
    let mut cursor = 0;
    if let Some(colon) = label_colon(code) {
        let candidate = code[..colon].trim_start();
        let offset = colon - candidate.len();
        if candidate.is_empty() || is_identifier(candidate) {
            ans.label = Some(LineItem { text: candidate.to_string(), offset });
            cursor = colon + 1;
        }
    }
    let rest = &code[cursor..];
    let cmd_rel = match rest.find(|c: char| !c.is_whitespace()) {
        Some(beg) => beg,
        None => return ans
    };
    let cmd_end_rel = rest[cmd_rel..].find(char::is_whitespace).map(|e| cmd_rel + e).unwrap_or(rest.len());
    ans.command = Some(LineItem {
        text: rest[cmd_rel..cmd_end_rel].to_string(),
        offset: cursor + cmd_rel
    });
    let arg_text = rest[cmd_end_rel..].trim_end();
    if let Some(beg) = rest[cmd_end_rel..].find(|c: char| !c.is_whitespace()) {
        if !arg_text.trim_start().is_empty() {
            ans.args = Some(LineItem {
                text: arg_text.trim_start().to_string(),
                offset: cursor + cmd_end_rel + beg
            });
        }
    }
    ans
}
