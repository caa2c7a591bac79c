//! Parse settings sent by any client.
//!
//! The server checks for specific keys under the `ca65` section; unknown
//! keys are ignored.  The structure is shared by the analyzer modules.

use crate::DYNERR;
use crate::lang::{update_json_bool,update_json_string,update_json_string_vec};

#[derive(Clone)]
pub struct Settings {
    pub executable_path: String,
    pub enable_stderr_diagnostics: bool,
    pub enable_unused_symbol_diagnostics: bool,
    pub include_dirs: Vec<String>,
    pub bin_include_dirs: Vec<String>,
    pub auto_include_extensions: Vec<String>,
    pub additional_extensions: Vec<String>,
    pub anonymous_label_index_hints: bool,
    pub import_from_hints: bool,
    pub smart_folding: bool,
    pub implicit_imports: bool
}

impl Settings {
    pub fn new() -> Self {
        Self {
            executable_path: "ca65".to_string(),
            enable_stderr_diagnostics: true,
            enable_unused_symbol_diagnostics: true,
            include_dirs: Vec::new(),
            bin_include_dirs: Vec::new(),
            auto_include_extensions: vec![".inc".to_string()],
            additional_extensions: Vec::new(),
            anonymous_label_index_hints: true,
            import_from_hints: true,
            smart_folding: true,
            implicit_imports: true
        }
    }
}

pub fn parse(json: &str) -> Result<Settings,DYNERR> {
    let mut ans = Settings::new();
    if let Ok(root) = serde_json::from_str::<serde_json::Value>(json) {
        update_json_string(&root,"executablePath",&mut ans.executable_path);
        update_json_bool(&root,"enableStderrDiagnostics",&mut ans.enable_stderr_diagnostics);
        update_json_bool(&root,"enableUnusedSymbolDiagnostics",&mut ans.enable_unused_symbol_diagnostics);
        update_json_string_vec(&root,"includeDirs",&mut ans.include_dirs);
        update_json_string_vec(&root,"binIncludeDirs",&mut ans.bin_include_dirs);
        update_json_string_vec(&root,"autoIncludeExtensions",&mut ans.auto_include_extensions);
        update_json_string_vec(&root,"additionalExtensions",&mut ans.additional_extensions);
        update_json_bool(&root,"anonymousLabelIndexHints",&mut ans.anonymous_label_index_hints);
        update_json_bool(&root,"importFromHints",&mut ans.import_from_hints);
        update_json_bool(&root,"smartFolding",&mut ans.smart_folding);
        update_json_bool(&root,"implicitImports",&mut ans.implicit_imports);
    }
    Ok(ans)
}
