//! Exports map.
//!
//! Workspace wide index of exported names.  Each name keys a stack of
//! entries in insertion order; replacing a file's exports first removes
//! every entry that file contributed, so a rescan is atomic with respect
//! to readers.

use std::collections::HashMap;

#[derive(Clone,PartialEq,Debug)]
pub struct ExportEntry {
    pub uri: String,
    /// handle into the owning file's export arena
    pub idx: usize
}

pub struct ExportsMap {
    map: HashMap<String,Vec<ExportEntry>>
}

impl ExportsMap {
    pub fn new() -> Self {
        Self { map: HashMap::new() }
    }
    /// Replace every export contributed by `uri` with the new set of
    /// `(name, handle)` pairs.
    pub fn update_exports(&mut self, uri: &str, new_set: Vec<(String,usize)>) {
        self.remove_file(uri);
        for (name,idx) in new_set {
            let stack = self.map.entry(name).or_insert(Vec::new());
            stack.push(ExportEntry { uri: uri.to_string(), idx });
        }
    }
    pub fn remove_file(&mut self, uri: &str) {
        for stack in self.map.values_mut() {
            stack.retain(|e| e.uri != uri);
        }
        self.map.retain(|_,stack| !stack.is_empty());
    }
    pub fn get(&self, name: &str) -> &[ExportEntry] {
        match self.map.get(name) {
            Some(v) => v,
            None => &[]
        }
    }
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.map.keys()
    }
    pub fn dump(&self) -> String {
        let mut ans = String::new();
        let mut names = self.map.keys().collect::<Vec<&String>>();
        names.sort();
        for name in names {
            ans += &format!("{}\n",name);
            for entry in self.get(name) {
                ans += &format!("  {}\n",entry.uri);
            }
        }
        ans
    }
}
