use super::{build,uri,pos};
use super::super::locals;
use super::super::scanner::Scanner;

mod anonymous {
    use super::*;
    const PROG: &str = ":\nnop\n:\njmp :-\njmp :++\n";
    #[test]
    fn minus_resolves_to_the_previous_label() {
        let sym = Scanner::new().scan(&uri("a.s"),PROG);
        assert_eq!(locals::resolve_anon(&sym,":-",3),Some(1));
        assert_eq!(sym.anons.defs[1],2);
    }
    #[test]
    fn out_of_range_fails() {
        let sym = Scanner::new().scan(&uri("a.s"),PROG);
        // two labels total, 1 + 2 = 3 is out of range
        assert_eq!(locals::resolve_anon(&sym,":++",4),None);
    }
    #[test]
    fn plus_skips_forward() {
        let sym = Scanner::new().scan(&uri("a.s"),"jmp :+\n:\n");
        assert_eq!(locals::resolve_anon(&sym,":+",0),Some(0));
    }
    #[test]
    fn double_minus() {
        let sym = Scanner::new().scan(&uri("a.s"),":\n:\njmp :--\n");
        assert_eq!(locals::resolve_anon(&sym,":--",2),Some(0));
    }
    #[test]
    fn definition_query() {
        let mut analyzer = build(&[("a.s",PROG)]);
        let defs = analyzer.goto_definition(&uri("a.s"),&pos(3,4));
        assert_eq!(defs.len(),1);
        assert_eq!(defs[0].range.start.line,2);
        let missing = analyzer.goto_definition(&uri("a.s"),&pos(4,4));
        assert!(missing.is_empty());
    }
}

mod cheap {
    use super::*;
    const PROG: &str = "foo:\n@loop: nop\nbne @loop\nbar:\n@loop: nop\nbne @loop\n";
    #[test]
    fn resolution_respects_boundaries() {
        let mut analyzer = build(&[("a.s",PROG)]);
        let first = analyzer.goto_definition(&uri("a.s"),&pos(2,6));
        assert_eq!(first.len(),1);
        assert_eq!(first[0].range.start.line,1);
        let second = analyzer.goto_definition(&uri("a.s"),&pos(5,6));
        assert_eq!(second.len(),1);
        assert_eq!(second[0].range.start.line,4);
    }
    #[test]
    fn references_stay_in_the_window() {
        let mut analyzer = build(&[("a.s",PROG)]);
        let refs = analyzer.references(&uri("a.s"),&pos(2,6));
        assert_eq!(refs.len(),2);
        let mut lines = refs.iter().map(|l| l.range.start.line).collect::<Vec<u32>>();
        lines.sort();
        assert_eq!(lines,vec![1,2]);
    }
    #[test]
    fn unresolved_cheap_local() {
        let mut analyzer = build(&[("a.s","foo:\nbne @nowhere\n")]);
        assert!(analyzer.goto_definition(&uri("a.s"),&pos(1,6)).is_empty());
    }
}
