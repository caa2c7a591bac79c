use std::path::PathBuf;
use super::super::analysis::Analyzer;
use super::super::settings;

fn write(dir: &std::path::Path, rel: &str, text: &str) -> PathBuf {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("mkdir failed");
    }
    std::fs::write(&path,text).expect("write failed");
    path
}

fn uri_of(path: &std::path::Path) -> String {
    crate::lang::uri_from_file_path(path).expect("bad path").to_string()
}

#[test]
fn discovery_filters_by_extension() {
    let dir = tempfile::tempdir().expect("no temp dir");
    write(dir.path(),"main.s","jsr foo\n");
    write(dir.path(),"lib/util.inc",".proc foo\nrts\n.endproc\n");
    write(dir.path(),"README.md","not assembly\n");
    let mut analyzer = Analyzer::new();
    analyzer.init_workspace(vec![dir.path().to_path_buf()],Vec::new()).expect("init failed");
    assert_eq!(analyzer.ws.docs.len(),2);
}

#[test]
fn additional_extensions_are_equivalent() {
    let dir = tempfile::tempdir().expect("no temp dir");
    write(dir.path(),"main.s","nop\n");
    write(dir.path(),"defs.mac",".macro m\n.endmacro\n");
    let mut analyzer = Analyzer::new();
    let config = settings::parse("{\"additionalExtensions\": [\".mac\"]}").expect("bad json");
    analyzer.set_config(config);
    analyzer.init_workspace(vec![dir.path().to_path_buf()],Vec::new()).expect("init failed");
    assert_eq!(analyzer.ws.docs.len(),2);
}

#[test]
fn include_resolution_prefers_the_local_directory() {
    let dir = tempfile::tempdir().expect("no temp dir");
    let main = write(dir.path(),"src/main.s",".include \"util.inc\"\njsr foo\n");
    let local = write(dir.path(),"src/util.inc",".proc foo\nrts\n.endproc\n");
    write(dir.path(),"other/util.inc","nop\n");
    let mut analyzer = Analyzer::new();
    analyzer.init_workspace(vec![dir.path().to_path_buf()],Vec::new()).expect("init failed");
    let tu = analyzer.graph.translation_unit(&uri_of(&local));
    assert!(tu.contains(&uri_of(&main)));
}

#[test]
fn include_dirs_extend_the_search_path() {
    let dir = tempfile::tempdir().expect("no temp dir");
    let main = write(dir.path(),"main.s",".include \"util.inc\"\njsr foo\n");
    let lib = write(dir.path(),"lib/util.inc",".proc foo\nrts\n.endproc\n");
    let mut analyzer = Analyzer::new();
    let config = settings::parse("{\"includeDirs\": [\"lib\"]}").expect("bad json");
    analyzer.set_config(config);
    analyzer.init_workspace(vec![dir.path().to_path_buf()],Vec::new()).expect("init failed");
    assert!(analyzer.graph.includes_of(&uri_of(&main)).contains(&uri_of(&lib)));
}

#[test]
fn queries_gate_on_initialization() {
    let mut analyzer = Analyzer::new();
    assert!(analyzer.goto_definition("file:///nowhere.s",&super::pos(0,0)).is_empty());
    assert!(analyzer.completions("file:///nowhere.s",&super::pos(0,0)).is_empty());
    assert!(!analyzer.ready());
}
