use super::super::lexer::{lex,LineItem};

fn item(text: &str, offset: usize) -> Option<LineItem> {
    Some(LineItem { text: text.to_string(), offset })
}

mod items {
    use super::*;
    #[test]
    fn full_line() {
        let ans = lex("foo: lda #$01 ; comment");
        assert_eq!(ans.label,item("foo",0));
        assert_eq!(ans.command,item("lda",5));
        assert_eq!(ans.args,item("#$01",9));
        assert_eq!(ans.comment,item("; comment",14));
    }
    #[test]
    fn command_only() {
        let ans = lex("   rts");
        assert_eq!(ans.label,None);
        assert_eq!(ans.command,item("rts",3));
        assert_eq!(ans.args,None);
        assert_eq!(ans.comment,None);
    }
    #[test]
    fn empty_line() {
        let ans = lex("");
        assert!(ans.label.is_none() && ans.command.is_none());
    }
}

mod labels {
    use super::*;
    #[test]
    fn bare_anonymous() {
        let ans = lex(":");
        assert_eq!(ans.label,item("",0));
        assert_eq!(ans.command,None);
    }
    #[test]
    fn cheap_local() {
        let ans = lex("@skip: bne @skip");
        assert_eq!(ans.label,item("@skip",0));
        assert_eq!(ans.command,item("bne",7));
        assert_eq!(ans.args,item("@skip",11));
    }
    #[test]
    fn anonymous_ref_is_not_a_label() {
        let ans = lex("  jmp :-");
        assert_eq!(ans.label,None);
        assert_eq!(ans.command,item("jmp",2));
        assert_eq!(ans.args,item(":-",6));
    }
    #[test]
    fn double_colon_is_not_a_label() {
        let ans = lex("jmp ::start");
        assert_eq!(ans.label,None);
        assert_eq!(ans.command,item("jmp",0));
    }
    #[test]
    fn indented_label() {
        let ans = lex("  loop: dex");
        assert_eq!(ans.label,item("loop",2));
        assert_eq!(ans.command,item("dex",8));
    }
}

mod comments {
    use super::*;
    #[test]
    fn semicolon_in_string() {
        let ans = lex(".byte \";\" ; real");
        assert_eq!(ans.comment,item("; real",10));
    }
    #[test]
    fn semicolon_char_literal() {
        let ans = lex("lda #';'");
        assert_eq!(ans.comment,None);
        assert_eq!(ans.args,item("#';'",4));
    }
    #[test]
    fn unclosed_char_literal() {
        let ans = lex("cmp #'; ; done");
        assert_eq!(ans.comment,item("; done",8));
    }
}
