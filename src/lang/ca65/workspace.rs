//! Workspace discovery and include path resolution.
//!
//! A workspace is a set of root directories.  Sources are gathered with a
//! case insensitive glob and buffered in memory; nested roots are handled
//! by assigning each file to its deepest containing root.  Include paths
//! are resolved against the directory of the containing file first, then
//! against the configured include directories, which may themselves be
//! glob patterns relative to a workspace root.

use std::collections::HashMap;
use std::path::{Path,PathBuf};
use crate::lang::{Document,pathbuf_from_uri,uri_from_file_path};
use crate::STDRESULT;

pub const DEFAULT_EXTENSIONS: [&str;3] = [".s",".asm",".inc"];

pub struct Workspace {
    pub roots: Vec<PathBuf>,
    /// uri string to buffered document
    pub docs: HashMap<String,Document>
}

/// Lexically remove `.` and `..` components.
fn normalize_path(path: &Path) -> PathBuf {
    let mut ans = PathBuf::new();
    for comp in path.components() {
        match comp {
            std::path::Component::CurDir => {},
            std::path::Component::ParentDir => {
                ans.pop();
            },
            other => ans.push(other)
        }
    }
    ans
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(n) => n.to_lowercase(),
        None => return false
    };
    extensions.iter().any(|e| name.ends_with(&e.to_lowercase()))
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            roots: Vec::new(),
            docs: HashMap::new()
        }
    }
    pub fn set_roots(&mut self, roots: Vec<PathBuf>) {
        self.roots = roots;
    }
    /// The deepest workspace root containing the path.
    pub fn deepest_root(&self, path: &Path) -> Option<PathBuf> {
        let mut best: Option<PathBuf> = None;
        for root in &self.roots {
            if path.starts_with(root) {
                let better = match &best {
                    Some(b) => root.components().count() > b.components().count(),
                    None => true
                };
                if better {
                    best = Some(root.clone());
                }
            }
        }
        best
    }
    /// Buffer every source under the roots whose name ends with one of the
    /// extensions.  Unreadable files are logged and skipped.
    pub fn gather(&mut self, extensions: &[String], max_files: usize) -> STDRESULT {
        self.docs = HashMap::new();
        let opt = glob::MatchOptions {
            case_sensitive: false,
            require_literal_leading_dot: false,
            require_literal_separator: false
        };
        let mut count = 0;
        for root in self.roots.clone() {
            log::debug!("scanning {}",root.display());
            let patt = root.join("**").join("*");
            let globable = match patt.as_os_str().to_str() {
                Some(g) => g.to_string(),
                None => {
                    log::warn!("directory {} could not be globbed",root.display());
                    continue;
                }
            };
            if let Ok(paths) = glob::glob_with(&globable,opt) {
                for entry in paths {
                    let path = match entry {
                        Ok(p) => p,
                        Err(_) => continue
                    };
                    if !path.is_file() || !has_extension(&path,extensions) {
                        continue;
                    }
                    match (uri_from_file_path(&path),std::fs::read_to_string(&path)) {
                        (Ok(uri),Ok(txt)) => {
                            log::trace!("{}",uri.as_str());
                            self.docs.insert(uri.to_string(),Document::new(uri,txt));
                        },
                        (_,Err(e)) => log::error!("could not read {}: {}",path.display(),e),
                        (Err(_),_) => log::error!("could not form URI for {}",path.display())
                    }
                    count += 1;
                    if count >= max_files {
                        return Err(Box::new(crate::lang::Error::OutOfRange));
                    }
                }
            }
        }
        log::info!("there are {} sources in the workspace",self.docs.len());
        Ok(())
    }
    pub fn update_doc(&mut self, doc: Document) {
        self.docs.insert(doc.uri.to_string(),doc);
    }
    pub fn remove_doc(&mut self, uri: &str) {
        self.docs.remove(uri);
    }
    /// Expand configured include directories, which may be glob patterns,
    /// relative to the root containing `from` (or any root).
    fn expand_dirs(&self, from: &Path, dirs: &[String]) -> Vec<PathBuf> {
        let mut ans = Vec::new();
        for dir in dirs {
            let patt = PathBuf::from(dir);
            if patt.is_absolute() {
                ans.push(patt);
                continue;
            }
            let mut bases = Vec::new();
            if let Some(root) = self.deepest_root(from) {
                bases.push(root);
            } else {
                bases.append(&mut self.roots.clone());
            }
            for base in bases {
                let joined = base.join(dir);
                if let Some(globable) = joined.as_os_str().to_str() {
                    if let Ok(paths) = glob::glob(globable) {
                        for entry in paths.flatten() {
                            ans.push(entry);
                        }
                    }
                }
            }
        }
        ans
    }
    /// Resolve an include path argument to a URI.  The directory of the
    /// containing file wins, then the configured directories in order.
    /// Buffered sources are preferred to cold filesystem probes.
    pub fn resolve_include(&self, from_uri: &str, path: &str, dirs: &[String]) -> Option<String> {
        let from = match crate::lang::normalize_client_uri_str(from_uri) {
            Ok(uri) => pathbuf_from_uri(&uri).ok()?,
            Err(_) => return None
        };
        let mut candidates = Vec::new();
        if let Some(parent) = from.parent() {
            candidates.push(parent.to_path_buf());
        }
        candidates.append(&mut self.expand_dirs(&from,dirs));
        for dir in candidates {
            let target = normalize_path(&dir.join(path));
            if let Ok(uri) = uri_from_file_path(&target) {
                if self.docs.contains_key(&uri.to_string()) {
                    return Some(uri.to_string());
                }
                if target.is_file() {
                    return Some(uri.to_string());
                }
            }
        }
        None
    }
}
