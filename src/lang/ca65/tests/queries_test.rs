use lsp_types as lsp;
use super::{build,uri,pos};
use super::super::Entity;

mod rename {
    use super::*;
    #[test]
    fn edits_cover_every_reference() {
        let mut analyzer = build(&[("a.s",".proc foo\nrts\n.endproc\njsr foo\n")]);
        let edits = analyzer.rename(&uri("a.s"),&pos(3,5),"frob");
        assert_eq!(edits.len(),1);
        let file_edits = &edits[&uri("a.s")];
        assert_eq!(file_edits.len(),2);
        assert!(file_edits.iter().all(|e| e.new_text == "frob"));
    }
    #[test]
    fn cross_file_rename() {
        let mut analyzer = build(&[
            ("lib.s",".export bar\n.proc bar\nrts\n.endproc\n"),
            ("main.s",".import bar\njsr bar\n")
        ]);
        let edits = analyzer.rename(&uri("main.s"),&pos(1,5),"baz");
        assert_eq!(edits[&uri("lib.s")].len(),2);
        assert_eq!(edits[&uri("main.s")].len(),1);
    }
}

mod unused {
    use super::*;
    #[test]
    fn only_the_dead_symbol_is_flagged() {
        let mut analyzer = build(&[("a.s","used: rts\njsr used\ndead: rts\n")]);
        let diags = analyzer.unused_symbols(&uri("a.s"),&[]);
        assert_eq!(diags.len(),1);
        assert_eq!(diags[0].range.start.line,2);
        assert!(diags[0].message.contains("dead"));
    }
    #[test]
    fn exported_symbols_count_their_export_site() {
        let mut analyzer = build(&[("a.s",".export api\napi: rts\n")]);
        assert!(analyzer.unused_symbols(&uri("a.s"),&[]).is_empty());
    }
    #[test]
    fn usage_from_an_including_file_counts() {
        let mut analyzer = build(&[
            ("root.s",".include \"head.inc\"\njsr foo\n"),
            ("head.inc",".proc foo\nrts\n.endproc\n")
        ]);
        assert!(analyzer.unused_symbols(&uri("head.inc"),&[]).is_empty());
    }
    #[test]
    fn lines_with_other_diagnostics_are_skipped() {
        let mut analyzer = build(&[("a.s","dead: rts\n")]);
        let existing = vec![lsp::Diagnostic {
            range: lsp::Range::new(pos(0,0),pos(0,4)),
            severity: Some(lsp::DiagnosticSeverity::ERROR),
            message: "assembler says no".to_string(),
            ..Default::default()
        }];
        assert!(analyzer.unused_symbols(&uri("a.s"),&existing).is_empty());
    }
    #[test]
    fn disabled_by_settings() {
        let mut analyzer = build(&[("a.s","dead: rts\n")]);
        analyzer.update_doc_settings(&uri("a.s"),"{\"enableUnusedSymbolDiagnostics\": false}");
        assert!(analyzer.unused_symbols(&uri("a.s"),&[]).is_empty());
    }
}

mod hints {
    use super::*;
    fn whole_file() -> lsp::Range {
        lsp::Range::new(pos(0,0),pos(1000,0))
    }
    fn label_text(hint: &lsp::InlayHint) -> String {
        match &hint.label {
            lsp::InlayHintLabel::String(s) => s.clone(),
            _ => panic!("unexpected label form")
        }
    }
    #[test]
    fn anonymous_ordinals() {
        let mut analyzer = build(&[("a.s",":\nnop\n:\njmp :-\njmp :++\n")]);
        let hints = analyzer.inlay_hints(&uri("a.s"),&whole_file());
        assert_eq!(hints.len(),3);
        let on_line3 = hints.iter().find(|h| h.position.line == 3).expect("no hint on the reference");
        assert_eq!(label_text(on_line3),"L2");
        assert!(hints.iter().all(|h| h.position.line != 4));
    }
    #[test]
    fn import_from() {
        let mut analyzer = build(&[
            ("lib.s",".export bar\n.proc bar\nrts\n.endproc\n"),
            ("main.s",".import bar\njsr bar\n")
        ]);
        let hints = analyzer.inlay_hints(&uri("main.s"),&whole_file());
        assert_eq!(hints.len(),1);
        assert_eq!(label_text(&hints[0])," from lib.s");
        assert_eq!(hints[0].position.line,0);
    }
    #[test]
    fn gated_by_settings() {
        let mut analyzer = build(&[("a.s",":\njmp :-\n")]);
        analyzer.update_doc_settings(&uri("a.s"),"{\"anonymousLabelIndexHints\": false}");
        assert!(analyzer.inlay_hints(&uri("a.s"),&whole_file()).is_empty());
    }
    #[test]
    fn no_import_from_without_implicit_imports() {
        let mut analyzer = build(&[
            ("lib.s",".export bar\n.proc bar\nrts\n.endproc\n"),
            ("main.s",".import bar\njsr bar\n")
        ]);
        analyzer.update_doc_settings(&uri("main.s"),"{\"implicitImports\": false}");
        assert!(analyzer.inlay_hints(&uri("main.s"),&whole_file()).is_empty());
    }
}

mod hierarchy {
    use super::*;
    const PROG: &str = ".proc a\njsr b\n.endproc\n.proc b\nrts\n.endproc\n";
    #[test]
    fn incoming() {
        let mut analyzer = build(&[("a.s",PROG)]);
        let item = analyzer.prepare_call_hierarchy(&uri("a.s"),&pos(3,7)).expect("no item");
        let incoming = analyzer.incoming_calls(&item);
        assert_eq!(incoming.len(),1);
        let (caller,sites) = &incoming[0];
        let (name,_,_,_) = analyzer.entity_display(caller).unwrap();
        assert_eq!(name,"a");
        assert_eq!(sites.len(),1);
        assert_eq!(sites[0].start.line,1);
    }
    #[test]
    fn outgoing() {
        let mut analyzer = build(&[("a.s",PROG)]);
        let item = analyzer.prepare_call_hierarchy(&uri("a.s"),&pos(0,7)).expect("no item");
        let outgoing = analyzer.outgoing_calls(&item);
        assert_eq!(outgoing.len(),1);
        let (target,_) = &outgoing[0];
        let (name,_,_,_) = analyzer.entity_display(target).unwrap();
        assert_eq!(name,"b");
    }
    #[test]
    fn labels_act_as_callers() {
        let mut analyzer = build(&[("a.s","start:\njsr sub\nsub: rts\n")]);
        let item = analyzer.prepare_call_hierarchy(&uri("a.s"),&pos(2,1)).expect("no item");
        let incoming = analyzer.incoming_calls(&item);
        assert_eq!(incoming.len(),1);
        let (name,_,_,_) = analyzer.entity_display(&incoming[0].0).unwrap();
        assert_eq!(name,"start");
    }
}

mod outline {
    use super::*;
    #[test]
    fn nested_document_symbols() {
        let analyzer = build(&[("a.s",".scope gfx\n.proc draw\nrts\n.endproc\n.endscope\n")]);
        let symbols = analyzer.document_symbols(&uri("a.s"));
        assert_eq!(symbols.len(),1);
        assert_eq!(symbols[0].name,"gfx");
        let children = symbols[0].children.as_ref().unwrap();
        assert_eq!(children.len(),1);
        assert_eq!(children[0].name,"draw");
        assert_eq!(children[0].kind,lsp::SymbolKind::FUNCTION);
    }
    #[test]
    fn folding_covers_scopes_and_macros() {
        let analyzer = build(&[("a.s",".proc foo\nrts\n.endproc\n.macro m\nnop\n.endmacro\n")]);
        let folds = analyzer.folding_ranges(&uri("a.s"));
        assert_eq!(folds.len(),2);
    }
    #[test]
    fn folding_disabled_by_settings() {
        let mut analyzer = build(&[("a.s",".proc foo\nrts\n.endproc\n")]);
        analyzer.update_doc_settings(&uri("a.s"),"{\"smartFolding\": false}");
        assert!(analyzer.folding_ranges(&uri("a.s")).is_empty());
    }
    #[test]
    fn document_links_resolve_includes() {
        let analyzer = build(&[
            ("root.s",".include \"head.inc\"\n"),
            ("head.inc","nop\n")
        ]);
        let links = analyzer.document_links(&uri("root.s"));
        assert_eq!(links.len(),1);
        assert_eq!(links[0].target.as_ref().unwrap().to_string(),uri("head.inc"));
    }
}

mod highlights {
    use super::*;
    #[test]
    fn stay_in_the_current_file() {
        let mut analyzer = build(&[
            ("lib.s",".export bar\n.proc bar\nrts\n.endproc\n"),
            ("main.s",".import bar\njsr bar\n")
        ]);
        let marks = analyzer.document_highlights(&uri("main.s"),&pos(1,5));
        assert_eq!(marks.len(),1);
        assert_eq!(marks[0].range.start.line,1);
    }
}

mod hover {
    use super::*;
    fn hover_text(hover: &lsp::Hover) -> String {
        match &hover.contents {
            lsp::HoverContents::Markup(m) => m.value.clone(),
            _ => panic!("unexpected hover form")
        }
    }
    #[test]
    fn code_block_with_segment_and_comments() {
        let mut analyzer = build(&[("a.s","; adds things\nadder: rts\njsr adder\n")]);
        let hover = analyzer.hover(&uri("a.s"),&pos(2,5)).expect("no hover");
        let text = hover_text(&hover);
        assert!(text.contains("adder: rts"));
        assert!(text.contains(".segment \"CODE\""));
        assert!(text.contains("adds things"));
    }
    #[test]
    fn comment_block_crosses_an_export_line() {
        let mut analyzer = build(&[("a.s","; api entry\n.export api\napi: rts\njsr api\n")]);
        let hover = analyzer.hover(&uri("a.s"),&pos(3,5)).expect("no hover");
        assert!(hover_text(&hover).contains("api entry"));
    }
    #[test]
    fn scope_prefix() {
        let mut analyzer = build(&[("a.s",".scope gfx\ntable: .byte 0\n.endscope\nlda gfx::table\n")]);
        let hover = analyzer.hover(&uri("a.s"),&pos(3,10)).expect("no hover");
        assert!(hover_text(&hover).contains(".scope gfx"));
    }
}

mod rescan {
    use super::*;
    #[test]
    fn exports_follow_edits() {
        let mut analyzer = build(&[
            ("a.s",".import baz\njsr baz\n"),
            ("b.s","nop\n")
        ]);
        assert!(matches!(analyzer.entity_at(&uri("a.s"),&pos(1,5)),Some(Entity::Import { .. })));

        analyzer.update_document(&uri("b.s"),".export baz\nbaz: rts\n".to_string(),Some(2));
        let stack = analyzer.exports.get("baz").to_vec();
        assert_eq!(stack.len(),1);
        assert_eq!(stack[0].uri,uri("b.s"));
        let found = analyzer.workspace_symbols("baz");
        assert_eq!(found.len(),1);
        assert_eq!(found[0].location.uri.to_string(),uri("b.s"));
        match analyzer.entity_at(&uri("a.s"),&pos(1,5)) {
            Some(Entity::Symbol { uri: u, .. }) => assert_eq!(u,uri("b.s")),
            other => panic!("expected the new export, got {:?}",other)
        }

        analyzer.update_document(&uri("b.s"),"nop\n".to_string(),Some(3));
        assert!(analyzer.exports.get("baz").is_empty());
        assert!(matches!(analyzer.entity_at(&uri("a.s"),&pos(1,5)),Some(Entity::Import { .. })));
    }
    #[test]
    fn deletion_drops_the_file_everywhere() {
        let mut analyzer = build(&[
            ("root.s",".include \"head.inc\"\njsr foo\n"),
            ("head.inc",".export foo\n.proc foo\nrts\n.endproc\n")
        ]);
        analyzer.remove_document(&uri("head.inc"));
        assert!(analyzer.get_symbols(&uri("head.inc")).is_none());
        assert!(analyzer.exports.get("foo").is_empty());
        assert_eq!(analyzer.graph.translation_unit(&uri("root.s")).len(),1);
        assert!(analyzer.entity_at(&uri("root.s"),&pos(1,5)).is_none());
    }
}

mod completions {
    use super::*;
    #[test]
    fn command_position_offers_keywords_and_macros() {
        let mut analyzer = build(&[("a.s",".macro beep\nnop\n.endmacro\nl\n")]);
        let items = analyzer.completions(&uri("a.s"),&pos(3,1));
        assert!(items.iter().any(|i| i.label == "lda"));
        assert!(items.iter().any(|i| i.label == ".proc"));
        assert!(items.iter().any(|i| i.label == "beep"));
    }
    #[test]
    fn operand_position_offers_visible_symbols() {
        let mut analyzer = build(&[("a.s","speed = 2\nstart:\nlda s\n")]);
        let items = analyzer.completions(&uri("a.s"),&pos(2,5));
        assert!(items.iter().any(|i| i.label == "speed"));
        assert!(items.iter().any(|i| i.label == "start"));
        assert!(items.iter().any(|i| i.label == ".sizeof"));
    }
    #[test]
    fn cheap_locals_of_the_window() {
        let mut analyzer = build(&[("a.s","foo:\n@loop: nop\nbne @\n")]);
        let items = analyzer.completions(&uri("a.s"),&pos(2,5));
        assert!(items.iter().any(|i| i.label == "@loop"));
    }
    #[test]
    fn auto_import_carries_a_text_edit() {
        let mut analyzer = build(&[
            ("lib.s",".export bar\n.proc bar\nrts\n.endproc\n"),
            ("main.s","jsr b\n")
        ]);
        let items = analyzer.completions(&uri("main.s"),&pos(0,5));
        let item = items.iter().find(|i| i.label == "bar").expect("no auto import");
        let edits = item.additional_text_edits.as_ref().unwrap();
        assert_eq!(edits[0].new_text,".import bar\n");
        assert_eq!(edits[0].range.start.line,0);
    }
    #[test]
    fn auto_include_carries_a_text_edit() {
        let mut analyzer = build(&[
            ("main.s","lda v\n"),
            ("util.inc","vals: .byte 0\n")
        ]);
        let items = analyzer.completions(&uri("main.s"),&pos(0,5));
        let item = items.iter().find(|i| i.label == "util.inc").expect("no auto include");
        let edits = item.additional_text_edits.as_ref().unwrap();
        assert_eq!(edits[0].new_text,".include \"util.inc\"\n");
    }
}
