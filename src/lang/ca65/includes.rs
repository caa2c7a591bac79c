//! Includes graph.
//!
//! Directed multigraph over file URIs with both `includes` and
//! `included-by` adjacency, kept as mutual inverses.  Translation units
//! are derived here: for every root ancestor of a file (a file nobody
//! includes), take the union of the root's transitive descendants.
//! Cycles are tolerated, traversal carries a visited set.

use std::collections::{HashMap,HashSet};

pub struct IncludesGraph {
    includes: HashMap<String,Vec<String>>,
    included_by: HashMap<String,Vec<String>>
}

impl IncludesGraph {
    pub fn new() -> Self {
        Self {
            includes: HashMap::new(),
            included_by: HashMap::new()
        }
    }
    /// Atomically replace the outgoing edges of `uri`, adjusting the
    /// inverse adjacency to match.
    pub fn update_includes(&mut self, uri: &str, neighbors: Vec<String>) {
        if let Some(old) = self.includes.remove(uri) {
            for target in old {
                if let Some(inv) = self.included_by.get_mut(&target) {
                    inv.retain(|u| u != uri);
                }
            }
        }
        for target in &neighbors {
            let inv = self.included_by.entry(target.clone()).or_insert(Vec::new());
            inv.push(uri.to_string());
        }
        self.includes.insert(uri.to_string(),neighbors);
    }
    /// Drop a file from both directions.
    pub fn remove_file(&mut self, uri: &str) {
        self.update_includes(uri,Vec::new());
        self.includes.remove(uri);
        if let Some(old) = self.included_by.remove(uri) {
            for source in old {
                if let Some(fwd) = self.includes.get_mut(&source) {
                    fwd.retain(|u| u != uri);
                }
            }
        }
    }
    pub fn includes_of(&self, uri: &str) -> &[String] {
        match self.includes.get(uri) {
            Some(v) => v,
            None => &[]
        }
    }
    pub fn included_by_of(&self, uri: &str) -> &[String] {
        match self.included_by.get(uri) {
            Some(v) => v,
            None => &[]
        }
    }
    fn walk(&self, uri: &str, forward: bool) -> Vec<String> {
        let map = match forward {
            true => &self.includes,
            false => &self.included_by
        };
        let mut visited = HashSet::new();
        let mut stack = vec![uri.to_string()];
        let mut ans = Vec::new();
        visited.insert(uri.to_string());
        while let Some(curr) = stack.pop() {
            if let Some(neighbors) = map.get(&curr) {
                for n in neighbors {
                    if visited.insert(n.clone()) {
                        ans.push(n.clone());
                        stack.push(n.clone());
                    }
                }
            }
        }
        ans
    }
    /// transitive targets of this file's includes, not including itself
    pub fn descendants(&self, uri: &str) -> Vec<String> {
        self.walk(uri,true)
    }
    /// every file that transitively includes this one
    pub fn ancestors(&self, uri: &str) -> Vec<String> {
        self.walk(uri,false)
    }
    fn has_parents(&self, uri: &str) -> bool {
        match self.included_by.get(uri) {
            Some(v) => !v.is_empty(),
            None => false
        }
    }
    /// Root ancestors of a file: ancestors with no inbound edges, or the
    /// file itself when it has none.  A pure cycle yields the file itself.
    pub fn roots_of(&self, uri: &str) -> Vec<String> {
        let mut ans = Vec::new();
        if !self.has_parents(uri) {
            ans.push(uri.to_string());
        }
        for anc in self.ancestors(uri) {
            if !self.has_parents(&anc) {
                ans.push(anc);
            }
        }
        if ans.is_empty() {
            ans.push(uri.to_string());
        }
        ans
    }
    /// The translation unit of a file: the file itself first, then the
    /// union of the transitive descendants of each of its roots.
    pub fn translation_unit(&self, uri: &str) -> Vec<String> {
        let mut ans = vec![uri.to_string()];
        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(uri.to_string());
        for root in self.roots_of(uri) {
            for member in std::iter::once(root.clone()).chain(self.descendants(&root)) {
                if seen.insert(member.clone()) {
                    ans.push(member);
                }
            }
        }
        ans
    }
    pub fn dump(&self) -> String {
        let mut ans = String::new();
        let mut uris = self.includes.keys().collect::<Vec<&String>>();
        uris.sort();
        for uri in uris {
            ans += &format!("{}\n",uri);
            for target in self.includes_of(uri) {
                ans += &format!("  includes {}\n",target);
            }
            for source in self.included_by_of(uri) {
                ans += &format!("  included by {}\n",source);
            }
        }
        ans
    }
}
