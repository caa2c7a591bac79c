use super::super::includes::IncludesGraph;

fn edges(graph: &IncludesGraph, uri: &str) -> (Vec<String>,Vec<String>) {
    (graph.includes_of(uri).to_vec(),graph.included_by_of(uri).to_vec())
}

mod adjacency {
    use super::*;
    #[test]
    fn inverses_stay_in_sync() {
        let mut graph = IncludesGraph::new();
        graph.update_includes("a",vec!["b".to_string(),"c".to_string()]);
        assert_eq!(edges(&graph,"a").0,vec!["b","c"]);
        assert_eq!(edges(&graph,"b").1,vec!["a"]);
        assert_eq!(edges(&graph,"c").1,vec!["a"]);
        graph.update_includes("a",vec!["c".to_string()]);
        assert!(edges(&graph,"b").1.is_empty());
        assert_eq!(edges(&graph,"c").1,vec!["a"]);
    }
    #[test]
    fn remove_file_clears_both_directions() {
        let mut graph = IncludesGraph::new();
        graph.update_includes("a",vec!["b".to_string()]);
        graph.update_includes("b",vec!["c".to_string()]);
        graph.remove_file("b");
        assert!(edges(&graph,"a").0.is_empty());
        assert!(edges(&graph,"c").1.is_empty());
    }
}

mod closure {
    use super::*;
    #[test]
    fn chain() {
        let mut graph = IncludesGraph::new();
        graph.update_includes("a",vec!["b".to_string()]);
        graph.update_includes("b",vec!["c".to_string()]);
        let tu = graph.translation_unit("c");
        assert_eq!(tu.len(),3);
        assert_eq!(tu[0],"c");
        assert!(tu.contains(&"a".to_string()) && tu.contains(&"b".to_string()));
    }
    #[test]
    fn include_sees_the_whole_unit() {
        // the S3 shape: root includes head, so head's unit contains both
        let mut graph = IncludesGraph::new();
        graph.update_includes("root.s",vec!["head.inc".to_string()]);
        let tu = graph.translation_unit("head.inc");
        assert_eq!(tu.len(),2);
        assert!(tu.contains(&"root.s".to_string()));
    }
    #[test]
    fn diamond() {
        let mut graph = IncludesGraph::new();
        graph.update_includes("main",vec!["l".to_string(),"r".to_string()]);
        graph.update_includes("l",vec!["shared".to_string()]);
        graph.update_includes("r",vec!["shared".to_string()]);
        let tu = graph.translation_unit("shared");
        assert_eq!(tu.len(),4);
    }
    #[test]
    fn two_separate_roots() {
        let mut graph = IncludesGraph::new();
        graph.update_includes("m1",vec!["shared".to_string()]);
        graph.update_includes("m2",vec!["shared".to_string()]);
        let tu = graph.translation_unit("shared");
        assert_eq!(tu.len(),3);
    }
    #[test]
    fn cycles_are_tolerated() {
        let mut graph = IncludesGraph::new();
        graph.update_includes("a",vec!["b".to_string()]);
        graph.update_includes("b",vec!["a".to_string()]);
        let tu = graph.translation_unit("a");
        assert_eq!(tu.len(),2);
    }
    #[test]
    fn lone_file_is_its_own_root() {
        let graph = IncludesGraph::new();
        assert_eq!(graph.translation_unit("solo"),vec!["solo"]);
        assert_eq!(graph.roots_of("solo"),vec!["solo"]);
    }
}
