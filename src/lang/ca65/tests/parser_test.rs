use super::super::parser::{parse_args,parse_import_export};
use super::super::RefContext;

mod name_groups {
    use super::*;
    #[test]
    fn single_name() {
        let groups = parse_args("foo",0);
        assert_eq!(groups.len(),1);
        assert_eq!(groups[0].tokens.len(),1);
        assert_eq!(groups[0].tokens[0].name,"foo");
        assert_eq!(groups[0].tokens[0].offset,0);
        assert_eq!(groups[0].ctx,RefContext::Symbol);
        assert!(!groups[0].leading_empty);
    }
    #[test]
    fn qualified_name() {
        let groups = parse_args("foo::bar",10);
        assert_eq!(groups.len(),1);
        assert_eq!(groups[0].tokens.len(),2);
        assert_eq!(groups[0].tokens[0].name,"foo");
        assert_eq!(groups[0].tokens[0].offset,10);
        assert_eq!(groups[0].tokens[1].name,"bar");
        assert_eq!(groups[0].tokens[1].offset,15);
    }
    #[test]
    fn root_anchor() {
        let groups = parse_args("::foo",0);
        assert_eq!(groups.len(),1);
        assert!(groups[0].leading_empty);
        assert_eq!(groups[0].tokens[0].name,"foo");
        assert_eq!(groups[0].tokens[0].offset,2);
    }
    #[test]
    fn comma_separates_groups() {
        let groups = parse_args("table,x",0);
        assert_eq!(groups.len(),2);
        assert_eq!(groups[0].tokens[0].name,"table");
        assert_eq!(groups[1].tokens[0].name,"x");
        assert_eq!(groups[1].tokens[0].offset,6);
    }
    #[test]
    fn expression_operators_terminate() {
        let groups = parse_args("lo+hi*2",0);
        assert_eq!(groups.len(),2);
        assert_eq!(groups[0].tokens[0].name,"lo");
        assert_eq!(groups[1].tokens[0].name,"hi");
    }
}

mod masking {
    use super::*;
    #[test]
    fn hex_is_blanked() {
        let groups = parse_args("$FF,foo",0);
        assert_eq!(groups.len(),1);
        assert_eq!(groups[0].tokens[0].name,"foo");
        assert_eq!(groups[0].tokens[0].offset,4);
    }
    #[test]
    fn string_is_blanked() {
        let groups = parse_args("\"abc\",foo",0);
        assert_eq!(groups.len(),1);
        assert_eq!(groups[0].tokens[0].name,"foo");
        assert_eq!(groups[0].tokens[0].offset,6);
    }
    #[test]
    fn pseudo_function_names_are_skipped() {
        let groups = parse_args(".lobyte(val)",0);
        assert_eq!(groups.len(),1);
        assert_eq!(groups[0].tokens[0].name,"val");
        assert_eq!(groups[0].tokens[0].offset,8);
    }
    #[test]
    fn numbers_are_skipped() {
        let groups = parse_args("2*half",0);
        assert_eq!(groups.len(),1);
        assert_eq!(groups[0].tokens[0].name,"half");
    }
}

mod sizeof {
    use super::*;
    #[test]
    fn tagged_and_blanked() {
        let groups = parse_args(".sizeof(Point)",0);
        assert_eq!(groups.len(),1);
        assert_eq!(groups[0].ctx,RefContext::Sizeof);
        assert_eq!(groups[0].tokens[0].name,"Point");
        assert_eq!(groups[0].tokens[0].offset,8);
    }
    #[test]
    fn qualified_inside() {
        let groups = parse_args(".sizeof(Gfx::Sprite)",0);
        assert_eq!(groups.len(),1);
        assert_eq!(groups[0].tokens.len(),2);
        assert_eq!(groups[0].ctx,RefContext::Sizeof);
    }
    #[test]
    fn mixed_with_plain_names() {
        let groups = parse_args("count*.sizeof(Point)+base",0);
        assert_eq!(groups.len(),3);
        let sizeofs = groups.iter().filter(|g| g.ctx == RefContext::Sizeof).count();
        assert_eq!(sizeofs,1);
    }
}

mod import_export {
    use super::*;
    #[test]
    fn plain_list() {
        let items = parse_import_export("foo, bar, baz",0);
        assert_eq!(items.len(),3);
        assert_eq!(items[0].name,"foo");
        assert_eq!(items[1].name,"bar");
        assert_eq!(items[1].offset,5);
        assert_eq!(items[2].name,"baz");
    }
    #[test]
    fn address_spec() {
        let items = parse_import_export("bar: zeropage",0);
        assert_eq!(items.len(),1);
        assert_eq!(items[0].addr_size,Some("zeropage".to_string()));
        assert_eq!(items[0].value,None);
    }
    #[test]
    fn inline_value() {
        let items = parse_import_export("baz = 5",0);
        assert_eq!(items.len(),1);
        assert_eq!(items[0].value,Some(("5".to_string(),6)));
    }
    #[test]
    fn walrus_value() {
        let items = parse_import_export("qux := 2",0);
        assert_eq!(items[0].value,Some(("2".to_string(),7)));
    }
    #[test]
    fn mixed_list() {
        let items = parse_import_export("foo, bar: zeropage, baz = 5",0);
        assert_eq!(items.len(),3);
        assert_eq!(items[0].name,"foo");
        assert_eq!(items[1].addr_size,Some("zeropage".to_string()));
        assert_eq!(items[2].value,Some(("5".to_string(),26)));
    }
}
