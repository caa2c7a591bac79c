use super::super::scanner::Scanner;
use super::super::{Symbols,SymbolKind,MacroKind,ScopeKind,RefContext};

fn scan(text: &str) -> Symbols {
    Scanner::new().scan("file:///ws/test.s",text)
}

fn symbol_kind(sym: &Symbols, name: &str) -> SymbolKind {
    sym.symbols.iter().find(|s| s.name == name).expect("symbol missing").kind
}

mod scopes {
    use super::*;
    #[test]
    fn proc_open_close() {
        let sym = scan(".proc foo\nrts\n.endproc\njsr foo\n");
        assert_eq!(sym.scopes.len(),2);
        assert_eq!(sym.scopes[1].kind,ScopeKind::Proc);
        assert_eq!(sym.scopes[1].name,"foo");
        assert_eq!(sym.scopes[1].rng.start.line,0);
        assert_eq!(sym.scopes[1].rng.start.character,6);
        assert_eq!(sym.scopes[1].full.end.line,2);
        assert_eq!(sym.scopes[1].segment.as_deref(),Some("CODE"));
    }
    #[test]
    fn mismatched_closer_is_ignored() {
        let sym = scan(".proc foo\n.endscope\n.endproc\n");
        assert_eq!(sym.scopes[1].full.end.line,2);
    }
    #[test]
    fn unclosed_scope_extends_to_eof() {
        let sym = scan(".scope outer\nlda #1\n");
        assert_eq!(sym.scopes[1].full.end.line,1);
    }
    #[test]
    fn anonymous_scope_gets_synthetic_name() {
        let sym = scan(".struct\nx .byte\n.endstruct\n");
        assert!(super::super::super::is_synthetic(&sym.scopes[1].name));
    }
    #[test]
    fn nesting() {
        let sym = scan(".scope a\n.scope b\n.endscope\n.endscope\n");
        assert_eq!(sym.scopes.len(),3);
        assert_eq!(sym.scopes[2].parent,Some(1));
    }
}

mod labels {
    use super::*;
    #[test]
    fn plain_label() {
        let sym = scan("start:\n");
        assert_eq!(sym.symbols.len(),1);
        assert_eq!(symbol_kind(&sym,"start"),SymbolKind::Label);
    }
    #[test]
    fn refinement() {
        let sym = scan("data1: .byte 1\nmsg: .asciiz \"hi\"\nbuf:\n.res 8\n");
        assert_eq!(symbol_kind(&sym,"data1"),SymbolKind::DataLabel);
        assert_eq!(symbol_kind(&sym,"msg"),SymbolKind::StringLabel);
        assert_eq!(symbol_kind(&sym,"buf"),SymbolKind::ResLabel);
    }
    #[test]
    fn refinement_is_one_shot() {
        let sym = scan("buf:\n.align 4\nnop\n.res 8\n");
        // .align consumed the refinement window, so .res does not re-refine
        assert_eq!(symbol_kind(&sym,"buf"),SymbolKind::DataLabel);
    }
    #[test]
    fn cheap_labels_stay_out_of_the_table() {
        let sym = scan("foo:\n@loop: nop\nbne @loop\n");
        assert_eq!(sym.symbols.len(),1);
    }
    #[test]
    fn assignments() {
        let sym = scan("WIDTH = 40\ncounter .set 5\n");
        assert_eq!(symbol_kind(&sym,"WIDTH"),SymbolKind::Constant);
        assert_eq!(symbol_kind(&sym,"counter"),SymbolKind::Variable);
    }
}

mod segments {
    use super::*;
    #[test]
    fn directive_and_shorthand() {
        let sym = scan(".segment \"ZEROPAGE\"\nptr: .res 2\n.code\nstart:\n");
        let ptr = sym.symbols.iter().find(|s| s.name == "ptr").unwrap();
        assert_eq!(ptr.segment.as_deref(),Some("ZEROPAGE"));
        let start = sym.symbols.iter().find(|s| s.name == "start").unwrap();
        assert_eq!(start.segment.as_deref(),Some("CODE"));
    }
    #[test]
    fn opaque_after_include() {
        let sym = scan(".include \"other.inc\"\nafter:\n");
        let after = sym.symbols.iter().find(|s| s.name == "after").unwrap();
        assert_eq!(after.segment.as_deref(),Some(super::super::super::OPAQUE_SEGMENT));
    }
}

mod macros {
    use super::*;
    #[test]
    fn body_is_opaque() {
        let sym = scan(".macro push16 val\nstash: lda val\npha\n.endmacro\n");
        assert_eq!(sym.macros.len(),1);
        assert_eq!(sym.macros[0].kind,MacroKind::Macro);
        assert_eq!(sym.macros[0].full.end.line,3);
        // the label inside the body must not become a symbol
        assert_eq!(sym.symbols.len(),0);
    }
    #[test]
    fn first_definition_wins() {
        let sym = scan(".macro m\n.endmacro\n.macro m\n.endmacro\n");
        assert_eq!(sym.macros.len(),1);
        assert_eq!(sym.macros[0].rng.start.line,0);
    }
    #[test]
    fn define_is_single_line() {
        let sym = scan(".define COUNT 8\nlda #COUNT\n");
        assert_eq!(sym.macros.len(),1);
        assert_eq!(sym.macros[0].kind,MacroKind::Define);
    }
    #[test]
    fn invocation_is_a_macro_reference() {
        let sym = scan("push16 $1234\n");
        assert_eq!(sym.refs.len(),1);
        assert_eq!(sym.refs[0].ctx,RefContext::Macro);
        assert_eq!(sym.refs[0].name,"push16");
    }
}

mod import_export {
    use super::*;
    #[test]
    fn directives() {
        let sym = scan(".import ext1\n.export pub1\n.global both\n");
        assert_eq!(sym.imports.len(),2);
        assert_eq!(sym.exports.len(),2);
        assert_eq!(sym.imports[0].name,"ext1");
        assert_eq!(sym.imports[1].name,"both");
        assert_eq!(sym.exports[0].name,"pub1");
    }
    #[test]
    fn zp_variants_carry_address_size() {
        let sym = scan(".importzp zptr\n");
        assert_eq!(sym.imports[0].addr_size.as_deref(),Some("zeropage"));
    }
    #[test]
    fn export_with_value_defines_a_constant() {
        let sym = scan(".export cval = 3\n");
        assert_eq!(sym.exports.len(),1);
        assert_eq!(symbol_kind(&sym,"cval"),SymbolKind::Constant);
    }
    #[test]
    fn import_sites_are_not_references() {
        let sym = scan(".import ext1\n");
        assert_eq!(sym.refs.len(),0);
    }
    #[test]
    fn export_sites_are_references() {
        let sym = scan(".export pub1\n");
        assert_eq!(sym.refs.len(),1);
        assert_eq!(sym.refs[0].name,"pub1");
    }
}

mod bodies {
    use super::*;
    #[test]
    fn struct_members() {
        let sym = scan(".struct Point\nx .word\ny .word\n.endstruct\n");
        assert_eq!(sym.scopes[1].kind,ScopeKind::Struct);
        assert_eq!(symbol_kind(&sym,"x"),SymbolKind::StructMember);
        assert_eq!(symbol_kind(&sym,"y"),SymbolKind::StructMember);
        assert_eq!(sym.symbols[0].scope,1);
    }
    #[test]
    fn member_with_tag_references_the_struct() {
        let sym = scan(".struct Enemy\npos .tag Point\n.endstruct\n");
        assert_eq!(symbol_kind(&sym,"pos"),SymbolKind::StructMember);
        let tag_ref = sym.refs.iter().find(|r| r.name == "Point").expect("no tag ref");
        assert_eq!(tag_ref.ctx,RefContext::Scope);
    }
    #[test]
    fn enum_members() {
        let sym = scan(".enum Color\nRED\nGREEN = 2\n.endenum\n");
        assert_eq!(sym.scopes[1].kind,ScopeKind::Enum);
        assert_eq!(symbol_kind(&sym,"RED"),SymbolKind::EnumMember);
        assert_eq!(symbol_kind(&sym,"GREEN"),SymbolKind::EnumMember);
    }
}

mod anonymous {
    use super::*;
    #[test]
    fn defs_and_refs() {
        let sym = scan(":\nnop\n:\njmp :-\njmp :++\n");
        assert_eq!(sym.anons.defs,vec![0,2]);
        // ordinal 1: its own definition plus the :- on line 3
        assert_eq!(sym.anons.refs.get(&1).map(|v| v.len()),Some(2));
        // the :++ lands on ordinal 3 which never gets a definition
        assert_eq!(sym.anons.refs.get(&3).map(|v| v.len()),Some(1));
    }
    #[test]
    fn arrow_aliases() {
        let sym = scan(":\njmp :<\n");
        assert_eq!(sym.anons.refs.get(&0).map(|v| v.len()),Some(2));
    }
}

mod calls {
    use super::*;
    #[test]
    fn jsr_carries_the_active_label() {
        let sym = scan("caller:\njsr callee\n");
        let r = sym.refs.iter().find(|r| r.name == "callee").unwrap();
        assert!(r.caller.is_some());
    }
    #[test]
    fn proc_scope_is_the_fallback_caller() {
        let sym = scan(".proc outer\njsr callee\n.endproc\n");
        let r = sym.refs.iter().find(|r| r.name == "callee").unwrap();
        assert!(matches!(r.caller,Some(super::super::super::Caller::Scope(1))));
    }
    #[test]
    fn plain_operands_have_no_caller() {
        let sym = scan("caller:\nlda callee\n");
        let r = sym.refs.iter().find(|r| r.name == "callee").unwrap();
        assert!(r.caller.is_none());
    }
}

mod includes {
    use super::*;
    #[test]
    fn recorded_with_path_and_span() {
        let sym = scan(".include \"lib/util.inc\"\n");
        assert_eq!(sym.includes.len(),1);
        assert_eq!(sym.includes[0].path,"lib/util.inc");
        assert!(!sym.includes[0].binary);
        assert_eq!(sym.includes[0].rng.start.character,9);
    }
    #[test]
    fn incbin_is_binary() {
        let sym = scan(".incbin \"gfx.chr\"\n");
        assert!(sym.includes[0].binary);
    }
}
