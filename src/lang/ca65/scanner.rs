//! Document scanner.
//!
//! Single forward pass over the lines of one file, producing its symbol
//! table.  The scanner maintains the current scope, macro, segment, and
//! label refinement state, and dispatches each line to the first matching
//! handler: macro body, struct/union body, enum body, constant
//! assignment, variable assignment, generic line.
//!
//! The scanner never touches the file system.  Include directives are
//! recorded with their raw path text, resolution against the search path
//! happens in the orchestrator.

use lsp_types as lsp;
use super::{Symbols,Symbol,Scope,Import,Export,Macro,Reference,IncludeRecord,Caller};
use super::{SymbolKind,MacroKind,ImportKind,ExportKind,ScopeKind,RefContext};
use super::lexer::{self,LineItem};
use super::parser::{self,NameGroup};
use super::handbook::mnemonics;
use crate::lang::line_range;

const RCH: &str = "unreachable was reached";

const DATA_DIRECTIVES: [&str;9] = [".addr",".align",".bankbytes",".byt",".byte",".dbyt",".dword",".faraddr",".word"];
const RES_DIRECTIVES: [&str;2] = [".res",".tag"];
const STRING_DIRECTIVES: [&str;1] = [".asciiz"];
/// registers never treated as symbol references
const REGISTERS: [&str;4] = ["a","x","y","s"];

struct State {
    scope: usize,
    in_macro: Option<usize>,
    seg: String,
    curr_label: Option<usize>,
    pending_kind: bool
}

pub struct Scanner {
    anon_re: regex::Regex,
    const_re: regex::Regex,
    var_re: regex::Regex,
    string_re: regex::Regex
}

impl Scanner {
    pub fn new() -> Self {
        Self {
            anon_re: regex::Regex::new(r":[-+<>]+").expect(RCH),
            const_re: regex::Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*:?=\s*(\S.*)$").expect(RCH),
            var_re: regex::Regex::new(r"(?i)^\s*([A-Za-z_][A-Za-z0-9_]*)\s+\.set\s+(\S.*)$").expect(RCH),
            string_re: regex::Regex::new(r#""([^"]*)""#).expect(RCH)
        }
    }

    /// Scan the whole document into a fresh symbol table.
    pub fn scan(&self, uri: &str, text: &str) -> Symbols {
        let mut sym = Symbols::new(uri);
        let mut state = State {
            scope: 0,
            in_macro: None,
            seg: "CODE".to_string(),
            curr_label: None,
            pending_kind: false
        };
        let mut row: u32 = 0;
        let mut last_len = 0;
        for line in text.lines() {
            let lexed = lexer::lex(line);
            let code = match &lexed.comment {
                Some(item) => &line[..item.offset],
                None => line
            };
            self.scan_anon_refs(&mut sym,code,row);
            if state.in_macro.is_some() {
                self.macro_line(&mut sym,&mut state,&lexed,row);
            } else if matches!(sym.scopes[state.scope].kind,ScopeKind::Struct | ScopeKind::Union) && state.scope != 0 {
                self.struct_line(&mut sym,&mut state,&lexed,row);
            } else if sym.scopes[state.scope].kind == ScopeKind::Enum && state.scope != 0 {
                self.enum_line(&mut sym,&mut state,&lexed,code,row);
            } else if let Some(caps) = self.const_re.captures(code) {
                self.assignment(&mut sym,&state,code,&caps,SymbolKind::Constant,row);
            } else if let Some(caps) = self.var_re.captures(code) {
                self.assignment(&mut sym,&state,code,&caps,SymbolKind::Variable,row);
            } else {
                self.generic_line(&mut sym,&mut state,&lexed,row);
            }
            last_len = line.len();
            row += 1;
        }
        let eof = match row {
            0 => lsp::Position::new(0,0),
            n => lsp::Position::new(n-1,last_len as u32)
        };
        // close anything left open, extending end spans to EOF
        while state.scope != 0 {
            sym.scopes[state.scope].full.end = eof;
            state.scope = sym.scopes[state.scope].parent.unwrap_or(0);
        }
        if let Some(mac) = state.in_macro {
            sym.macros[mac].full.end = eof;
        }
        sym.scopes[0].full = lsp::Range::new(lsp::Position::new(0,0),eof);
        log::trace!("scanned {}: {} scopes, {} symbols, {} refs",uri,sym.scopes.len(),sym.symbols.len(),sym.refs.len());
        sym
    }

    /// Record `:[-+<>]+` references relative to the current ordinal.
    /// The first `-`/`<` is the label immediately previous.
    fn scan_anon_refs(&self, sym: &mut Symbols, code: &str, row: u32) {
        for m in self.anon_re.find_iter(code) {
            let tok = &m.as_str()[1..];
            let plus = tok.chars().filter(|c| *c == '+' || *c == '>').count() as isize;
            let minus = tok.chars().filter(|c| *c == '-' || *c == '<').count() as isize;
            let last = sym.anons.defs.len() as isize - 1;
            let mut target = last + plus - minus;
            if minus > 0 {
                target += 1;
            }
            if target >= 0 {
                sym.anons.add_ref(target as usize,line_range(row as isize,m.start(),m.end()));
            }
        }
    }

    fn item_range(item: &LineItem, row: u32) -> lsp::Range {
        line_range(row as isize,item.offset,item.offset + item.text.len())
    }

    /// Turn name groups into reference records.  The calling entity, if
    /// any, is attached to the final token of each group.
    fn add_groups(&self, sym: &mut Symbols, groups: Vec<NameGroup>, scope: usize, row: u32, caller: Option<Caller>) {
        for group in groups {
            let count = group.tokens.len();
            if count == 1 && group.ctx == RefContext::Symbol
                && REGISTERS.contains(&group.tokens[0].name.to_lowercase().as_str()) {
                continue;
            }
            for (i,tok) in group.tokens.iter().enumerate() {
                let ctx = match i + 1 == count {
                    true => group.ctx,
                    false => RefContext::Scope
                };
                let mut qualifiers: Vec<String> = match group.leading_empty {
                    true => vec![String::new()],
                    false => Vec::new()
                };
                for prev in &group.tokens[..i] {
                    qualifiers.push(prev.name.clone());
                }
                sym.refs.push(Reference {
                    name: tok.name.clone(),
                    qualifiers,
                    ctx,
                    rng: line_range(row as isize,tok.offset,tok.offset + tok.name.len()),
                    scope,
                    caller: match i + 1 == count {
                        true => caller,
                        false => None
                    }
                });
            }
        }
    }

    fn add_arg_refs(&self, sym: &mut Symbols, args: &Option<LineItem>, scope: usize, row: u32, caller: Option<Caller>) {
        if let Some(item) = args {
            let groups = parser::parse_args(&item.text,item.offset);
            self.add_groups(sym,groups,scope,row,caller);
        }
    }

    /// definition sites record a reference to themselves so that
    /// references, rename, and usage counts are uniform reference scans
    fn add_self_ref(&self, sym: &mut Symbols, name: &str, ctx: RefContext, rng: lsp::Range, scope: usize) {
        sym.refs.push(Reference {
            name: name.to_string(),
            qualifiers: Vec::new(),
            ctx,
            rng,
            scope,
            caller: None
        });
    }

    /// Lines in a macro body are lexically processed for references but
    /// never alter scopes or symbols.
    fn macro_line(&self, sym: &mut Symbols, state: &mut State, lexed: &lexer::LexedLine, row: u32) {
        if let Some(cmd) = &lexed.command {
            let lower = cmd.text.to_lowercase();
            if lower == ".endmacro" || lower == ".endmac" {
                if let Some(mac) = state.in_macro {
                    sym.macros[mac].full.end = lsp::Position::new(row,(cmd.offset + cmd.text.len()) as u32);
                }
                state.in_macro = None;
                return;
            }
        }
        self.add_arg_refs(sym,&lexed.args,state.scope,row,None);
    }

    /// Struct and union bodies: member lines and nested struct/union.
    fn struct_line(&self, sym: &mut Symbols, state: &mut State, lexed: &lexer::LexedLine, row: u32) {
        let kind = sym.scopes[state.scope].kind;
        if let Some(cmd) = &lexed.command {
            let lower = cmd.text.to_lowercase();
            match lower.as_str() {
                ".endstruct" if kind == ScopeKind::Struct => {
                    self.close_scope(sym,state,cmd,row);
                    return;
                },
                ".endunion" if kind == ScopeKind::Union => {
                    self.close_scope(sym,state,cmd,row);
                    return;
                },
                ".struct" => {
                    self.open_scope(sym,state,ScopeKind::Struct,&lexed.args,cmd,row);
                    return;
                },
                ".union" => {
                    self.open_scope(sym,state,ScopeKind::Union,&lexed.args,cmd,row);
                    return;
                },
                ".tag" => {
                    self.tag_refs(sym,state,&lexed.args,row);
                    return;
                },
                _ => {}
            }
            // member line: name in label or command position, storage directive after
            let (member,directive,dir_args) = match (&lexed.label,&lexed.command,&lexed.args) {
                (Some(lab),Some(cmd),args) if !lab.text.is_empty() => (Some(lab.clone()),Some(cmd.text.to_lowercase()),args.clone()),
                (None,Some(cmd),Some(args)) if lexer::is_identifier(&cmd.text) => {
                    let inner = lexer::lex(&format!("{}{}"," ".repeat(args.offset),args.text));
                    (Some(cmd.clone()),inner.command.as_ref().map(|c| c.text.to_lowercase()),inner.args)
                },
                _ => (None,Some(lower.clone()),lexed.args.clone())
            };
            if let (Some(member),Some(directive)) = (&member,&directive) {
                if DATA_DIRECTIVES.contains(&directive.as_str()) || RES_DIRECTIVES.contains(&directive.as_str())
                    || STRING_DIRECTIVES.contains(&directive.as_str()) {
                    let rng = Self::item_range(member,row);
                    sym.add_symbol(Symbol {
                        name: member.text.clone(),
                        kind: SymbolKind::StructMember,
                        rng,
                        scope: state.scope,
                        segment: None
                    });
                    self.add_self_ref(sym,&member.text,RefContext::Symbol,rng,state.scope);
                }
            }
            if directive.as_deref() == Some(".tag") {
                self.tag_refs(sym,state,&dir_args,row);
            } else {
                self.add_arg_refs(sym,&dir_args,state.scope,row,None);
            }
        }
    }

    /// Enum bodies: `NAME` or `NAME = expr` lines become enum members.
    fn enum_line(&self, sym: &mut Symbols, state: &mut State, lexed: &lexer::LexedLine, code: &str, row: u32) {
        if let Some(cmd) = &lexed.command {
            let lower = cmd.text.to_lowercase();
            if lower == ".endenum" {
                self.close_scope(sym,state,cmd,row);
                return;
            }
            if let Some(caps) = self.const_re.captures(code) {
                let name = caps.get(1).expect(RCH);
                let rng = line_range(row as isize,name.start(),name.end());
                sym.add_symbol(Symbol {
                    name: name.as_str().to_string(),
                    kind: SymbolKind::EnumMember,
                    rng,
                    scope: state.scope,
                    segment: None
                });
                self.add_self_ref(sym,name.as_str(),RefContext::Symbol,rng,state.scope);
                let expr = caps.get(2).expect(RCH);
                let groups = parser::parse_args(expr.as_str(),expr.start());
                self.add_groups(sym,groups,state.scope,row,None);
                return;
            }
            if lexer::is_identifier(&cmd.text) && lexed.args.is_none() {
                let rng = Self::item_range(cmd,row);
                sym.add_symbol(Symbol {
                    name: cmd.text.clone(),
                    kind: SymbolKind::EnumMember,
                    rng,
                    scope: state.scope,
                    segment: None
                });
                self.add_self_ref(sym,&cmd.text,RefContext::Symbol,rng,state.scope);
            }
        }
    }

    /// `name = expr` and `name .set expr` lines.
    fn assignment(&self, sym: &mut Symbols, state: &State, code: &str, caps: &regex::Captures, kind: SymbolKind, row: u32) {
        let name = caps.get(1).expect(RCH);
        let rng = line_range(row as isize,name.start(),name.end());
        sym.add_symbol(Symbol {
            name: name.as_str().to_string(),
            kind,
            rng,
            scope: state.scope,
            segment: Some(state.seg.clone())
        });
        self.add_self_ref(sym,name.as_str(),RefContext::Symbol,rng,state.scope);
        let expr = caps.get(2).expect(RCH);
        let groups = parser::parse_args(&code[expr.start()..expr.end()],expr.start());
        self.add_groups(sym,groups,state.scope,row,None);
    }

    fn open_scope(&self, sym: &mut Symbols, state: &mut State, kind: ScopeKind, args: &Option<LineItem>, cmd: &LineItem, row: u32) {
        let named = match args {
            Some(item) => {
                let word = item.text.split_whitespace().next().unwrap_or("");
                match lexer::is_identifier(word) {
                    true => Some((word.to_string(),item.offset)),
                    false => None
                }
            },
            None => None
        };
        let (name,rng) = match &named {
            Some((word,offset)) => (word.clone(),line_range(row as isize,*offset,offset + word.len())),
            None => (super::synthetic_name(kind,row),Self::item_range(cmd,row))
        };
        let full = lsp::Range::new(lsp::Position::new(row,0),lsp::Position::new(row,(cmd.offset + cmd.text.len()) as u32));
        let idx = sym.add_scope(Scope {
            name: name.clone(),
            kind,
            rng,
            full,
            parent: Some(state.scope),
            children: Vec::new(),
            symbols: Vec::new(),
            imports: Vec::new(),
            segment: match kind {
                ScopeKind::Proc => Some(state.seg.clone()),
                _ => None
            }
        });
        if named.is_some() {
            self.add_self_ref(sym,&name,RefContext::Scope,rng,state.scope);
        }
        state.scope = idx;
        state.curr_label = None;
        state.pending_kind = false;
    }

    /// Close the current scope; the caller already checked the kind.
    fn close_scope(&self, sym: &mut Symbols, state: &mut State, cmd: &LineItem, row: u32) {
        sym.scopes[state.scope].full.end = lsp::Position::new(row,(cmd.offset + cmd.text.len()) as u32);
        state.scope = sym.scopes[state.scope].parent.unwrap_or(0);
        state.curr_label = None;
        state.pending_kind = false;
    }

    /// `.tag` arguments reference a struct scope.
    fn tag_refs(&self, sym: &mut Symbols, state: &State, args: &Option<LineItem>, row: u32) {
        if let Some(item) = args {
            let mut groups = parser::parse_args(&item.text,item.offset);
            for group in &mut groups {
                group.ctx = RefContext::Scope;
            }
            self.add_groups(sym,groups,state.scope,row,None);
        }
    }

    fn refine_label(&self, sym: &mut Symbols, state: &mut State, lower: &str) {
        if state.pending_kind {
            if let Some(label) = state.curr_label {
                let refined = match lower {
                    s if RES_DIRECTIVES.contains(&s) => Some(SymbolKind::ResLabel),
                    s if DATA_DIRECTIVES.contains(&s) => Some(SymbolKind::DataLabel),
                    s if STRING_DIRECTIVES.contains(&s) => Some(SymbolKind::StringLabel),
                    _ => None
                };
                if let Some(kind) = refined {
                    sym.symbols[label].kind = kind;
                    sym.symbols[label].segment = Some(state.seg.clone());
                }
            }
            // the first directive consumes the one-shot whether or not it refined
            state.pending_kind = false;
        }
    }

    fn segment_directive(&self, state: &mut State, lower: &str, args: &Option<LineItem>) {
        match lower {
            ".segment" => {
                if let Some(item) = args {
                    if let Some(caps) = self.string_re.captures(&item.text) {
                        state.seg = caps.get(1).expect(RCH).as_str().to_string();
                    }
                }
            },
            _ => state.seg = lower[1..].to_uppercase()
        }
    }

    fn import_export(&self, sym: &mut Symbols, state: &State, lower: &str, args: &Option<LineItem>, row: u32) {
        let item = match args {
            Some(item) => item,
            None => return
        };
        let zp = lower.ends_with("zp");
        for parsed in parser::parse_import_export(&item.text,item.offset) {
            let rng = line_range(row as isize,parsed.offset,parsed.offset + parsed.name.len());
            let addr_size = match (&parsed.addr_size,zp) {
                (Some(spec),_) => Some(spec.clone()),
                (None,true) => Some("zeropage".to_string()),
                (None,false) => None
            };
            if lower.starts_with(".import") || lower.starts_with(".global") {
                sym.add_import(Import {
                    name: parsed.name.clone(),
                    kind: match lower.starts_with(".global") {
                        true => ImportKind::Global,
                        false => ImportKind::Import
                    },
                    rng,
                    scope: state.scope,
                    addr_size
                });
            }
            if lower.starts_with(".export") || lower.starts_with(".global") {
                sym.add_export(Export {
                    name: parsed.name.clone(),
                    kind: match lower.starts_with(".global") {
                        true => ExportKind::Global,
                        false => ExportKind::Export
                    },
                    rng,
                    scope: state.scope
                });
                self.add_self_ref(sym,&parsed.name,RefContext::Symbol,rng,state.scope);
                if let Some((expr,expr_off)) = &parsed.value {
                    sym.add_symbol(Symbol {
                        name: parsed.name.clone(),
                        kind: SymbolKind::Constant,
                        rng,
                        scope: state.scope,
                        segment: Some(state.seg.clone())
                    });
                    let groups = parser::parse_args(expr,*expr_off);
                    self.add_groups(sym,groups,state.scope,row,None);
                }
            }
        }
    }

    fn include_directive(&self, sym: &mut Symbols, state: &mut State, binary: bool, args: &Option<LineItem>, row: u32) {
        if let Some(item) = args {
            if let Some(caps) = self.string_re.captures(&item.text) {
                let whole = caps.get(0).expect(RCH);
                let path = caps.get(1).expect(RCH);
                sym.includes.push(IncludeRecord {
                    path: path.as_str().to_string(),
                    rng: line_range(row as isize,item.offset + whole.start(),item.offset + whole.end()),
                    uri: None,
                    binary
                });
            }
        }
        if !binary {
            // whatever segment the include leaves behind is unknowable here
            state.seg = super::OPAQUE_SEGMENT.to_string();
        }
    }

    fn generic_line(&self, sym: &mut Symbols, state: &mut State, lexed: &lexer::LexedLine, row: u32) {
        if let Some(label) = &lexed.label {
            if label.text.is_empty() {
                let ordinal = sym.anons.add_def(row);
                sym.anons.add_ref(ordinal,line_range(row as isize,label.offset,label.offset + 1));
            } else if !label.text.starts_with("@") {
                let rng = Self::item_range(label,row);
                let idx = sym.add_symbol(Symbol {
                    name: label.text.clone(),
                    kind: SymbolKind::Label,
                    rng,
                    scope: state.scope,
                    segment: Some(state.seg.clone())
                });
                self.add_self_ref(sym,&label.text,RefContext::Symbol,rng,state.scope);
                state.curr_label = Some(idx);
                state.pending_kind = true;
            }
            // cheap locals are resolved on demand, they are not in the table
        }
        let cmd = match &lexed.command {
            Some(cmd) => cmd,
            None => return
        };
        let lower = cmd.text.to_lowercase();
        if lower.starts_with(".") {
            self.refine_label(sym,state,&lower);
            match lower.as_str() {
                ".proc" => self.open_scope(sym,state,ScopeKind::Proc,&lexed.args,cmd,row),
                ".scope" => self.open_scope(sym,state,ScopeKind::Scope,&lexed.args,cmd,row),
                ".struct" => self.open_scope(sym,state,ScopeKind::Struct,&lexed.args,cmd,row),
                ".union" => self.open_scope(sym,state,ScopeKind::Union,&lexed.args,cmd,row),
                ".enum" => self.open_scope(sym,state,ScopeKind::Enum,&lexed.args,cmd,row),
                ".endproc" if sym.scopes[state.scope].kind == ScopeKind::Proc && state.scope != 0 => self.close_scope(sym,state,cmd,row),
                ".endscope" if sym.scopes[state.scope].kind == ScopeKind::Scope && state.scope != 0 => self.close_scope(sym,state,cmd,row),
                ".macro" | ".mac" => {
                    if let Some(args) = &lexed.args {
                        let word = args.text.split_whitespace().next().unwrap_or("");
                        if lexer::is_identifier(word) {
                            let rng = line_range(row as isize,args.offset,args.offset + word.len());
                            let (idx,created) = sym.add_macro(Macro {
                                name: word.to_string(),
                                kind: MacroKind::Macro,
                                rng,
                                full: lsp::Range::new(lsp::Position::new(row,0),lsp::Position::new(row,(cmd.offset + cmd.text.len()) as u32))
                            });
                            if created {
                                self.add_self_ref(sym,word,RefContext::Macro,rng,state.scope);
                            }
                            state.in_macro = Some(idx);
                        }
                    }
                },
                ".define" => {
                    if let Some(args) = &lexed.args {
                        let word = args.text.split(|c: char| c.is_whitespace() || c == '(').next().unwrap_or("");
                        if lexer::is_identifier(word) {
                            let rng = line_range(row as isize,args.offset,args.offset + word.len());
                            let (_,created) = sym.add_macro(Macro {
                                name: word.to_string(),
                                kind: MacroKind::Define,
                                rng,
                                full: rng
                            });
                            if created {
                                self.add_self_ref(sym,word,RefContext::Macro,rng,state.scope);
                            }
                        }
                    }
                },
                ".include" => self.include_directive(sym,state,false,&lexed.args,row),
                ".incbin" => self.include_directive(sym,state,true,&lexed.args,row),
                ".import" | ".importzp" | ".export" | ".exportzp" | ".global" | ".globalzp" => {
                    self.import_export(sym,state,&lower,&lexed.args,row);
                },
                ".tag" => self.tag_refs(sym,state,&lexed.args,row),
                ".segment" | ".code" | ".data" | ".bss" | ".zeropage" | ".rodata" => {
                    self.segment_directive(state,&lower,&lexed.args);
                },
                _ => self.add_arg_refs(sym,&lexed.args,state.scope,row,None)
            }
        } else if mnemonics::is_mnemonic(&lower) {
            let caller = match (state.curr_label,sym.scopes[state.scope].kind) {
                (Some(label),_) => Some(Caller::Symbol(label)),
                (None,ScopeKind::Proc) => Some(Caller::Scope(state.scope)),
                _ => None
            };
            self.add_arg_refs(sym,&lexed.args,state.scope,row,match mnemonics::is_call(&lower) {
                true => caller,
                false => None
            });
        } else if lexer::is_identifier(&cmd.text) && !cmd.text.starts_with("@") {
            // not a directive, not an instruction: treat as a macro invocation
            sym.refs.push(Reference {
                name: cmd.text.clone(),
                qualifiers: Vec::new(),
                ctx: RefContext::Macro,
                rng: Self::item_range(cmd,row),
                scope: state.scope,
                caller: None
            });
            self.add_arg_refs(sym,&lexed.args,state.scope,row,None);
        }
    }
}
