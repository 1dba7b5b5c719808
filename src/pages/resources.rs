//! Resource browser: a path tree over an in-memory resource bundle, searched
//! with the same walker as the object tree.

use std::collections::{BTreeMap, HashMap};

use slotmap::new_key_type;

use crate::tree::{Forest, TreeNavigation, TreeWalker};

new_key_type! {
    pub struct ResourceId;
}

/// Named blobs addressed by absolute `/`-separated paths.
#[derive(Debug, Clone, Default)]
pub struct ResourceBundle {
    files: BTreeMap<String, Vec<u8>>,
}

impl ResourceBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file. Leading and repeated slashes are normalized away.
    pub fn insert(&mut self, path: &str, data: impl Into<Vec<u8>>) {
        self.files.insert(normalize(path), data.into());
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(&normalize(path)).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn normalize(path: &str) -> String {
    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", parts.join("/"))
}

/// A directory or file row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    /// Last path segment.
    pub name: String,
    /// Full path; directories end with `/`.
    pub path: String,
    /// Byte size of files; `None` for directories.
    pub size: Option<usize>,
}

type ResourceTree = Forest<ResourceId, ResourceEntry>;

pub struct ResourceBrowser {
    tree: ResourceTree,
    by_path: HashMap<String, ResourceId>,
    walker: TreeWalker<ResourceTree, String>,
}

impl ResourceBrowser {
    pub fn new(bundle: &ResourceBundle) -> Self {
        let mut browser = Self {
            tree: Forest::new(),
            by_path: HashMap::new(),
            walker: TreeWalker::new(
                |tree: &ResourceTree, row, prefix: &String| {
                    tree.get(row).is_some_and(|e| e.path.starts_with(prefix.as_str()))
                },
                String::new(),
            ),
        };
        for (path, data) in &bundle.files {
            browser.insert_file(path, data.len());
        }
        browser
    }

    fn insert_file(&mut self, path: &str, size: usize) {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut parent = None;
        let mut prefix = String::from("/");
        for (i, segment) in segments.iter().enumerate() {
            let is_file = i + 1 == segments.len();
            prefix.push_str(segment);
            if !is_file {
                prefix.push('/');
            }
            let row = match self.by_path.get(&prefix) {
                Some(&row) => row,
                None => {
                    let entry = ResourceEntry {
                        name: (*segment).to_owned(),
                        path: prefix.clone(),
                        size: is_file.then_some(size),
                    };
                    let row = match parent {
                        Some(parent) => self.tree.insert_child(parent, entry),
                        None => self.tree.insert_root(entry),
                    };
                    self.by_path.insert(prefix.clone(), row);
                    row
                }
            };
            parent = Some(row);
        }
    }

    pub fn find(&self, path: &str) -> Option<ResourceId> {
        self.by_path.get(path).copied()
    }

    pub fn get(&self, row: ResourceId) -> Option<&ResourceEntry> {
        self.tree.get(row)
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Entries in depth-first pre-order.
    pub fn entries(&self) -> Vec<&ResourceEntry> {
        self.tree
            .walk_all()
            .into_iter()
            .filter_map(|row| self.tree.get(row))
            .collect()
    }

    pub fn cursor(&self) -> Option<ResourceId> {
        self.walker.cursor()
    }

    /// Search for the next entry whose path starts with `prefix`. A changed
    /// prefix restarts from the current row; repeating it moves on.
    pub fn search(&mut self, prefix: &str, backwards: bool) -> Option<ResourceId> {
        let repeat = self.walker.data() == prefix;
        self.walker.set_data(prefix.to_owned());
        self.walker.next_match(&self.tree, repeat, backwards)
    }

    pub fn reset_search(&mut self) {
        self.walker.reset(None);
    }

    /// Total byte size of `row` and everything beneath it.
    pub fn total_size(&self, row: ResourceId) -> usize {
        self.tree
            .walk_depth_first(row)
            .into_iter()
            .filter_map(|r| self.tree.get(r)?.size)
            .sum()
    }

    /// Depth of `row` (top-level entries are 0).
    pub fn depth(&self, row: ResourceId) -> usize {
        self.tree.depth(row)
    }

    pub fn has_children(&self, row: ResourceId) -> bool {
        self.tree.first_child(row).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle() -> ResourceBundle {
        let mut bundle = ResourceBundle::new();
        bundle.insert("/org/gilt/ui/main.ui", "<interface/>");
        bundle.insert("/org/gilt/ui/menus.ui", "<menu/>");
        bundle.insert("org/gilt/style.css", "label {}");
        bundle
    }

    #[test]
    fn builds_directory_tree() {
        let browser = ResourceBrowser::new(&bundle());
        let paths: Vec<_> = browser.entries().iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "/org/",
                "/org/gilt/",
                "/org/gilt/style.css",
                "/org/gilt/ui/",
                "/org/gilt/ui/main.ui",
                "/org/gilt/ui/menus.ui",
            ]
        );
        let ui = browser.find("/org/gilt/ui/").unwrap();
        assert_eq!(browser.total_size(ui), 12 + 7);
        assert_eq!(browser.depth(ui), 2);
        assert!(browser.has_children(ui));
    }

    #[test]
    fn bundle_normalizes_paths() {
        let bundle = bundle();
        assert_eq!(bundle.get("org//gilt/style.css"), Some(&b"label {}"[..]));
        assert_eq!(bundle.len(), 3);
    }

    #[test]
    fn prefix_search_walks_forward_and_back() {
        let mut browser = ResourceBrowser::new(&bundle());
        let main = browser.find("/org/gilt/ui/main.ui").unwrap();
        let menus = browser.find("/org/gilt/ui/menus.ui").unwrap();
        let ui = browser.find("/org/gilt/ui/").unwrap();

        assert_eq!(browser.search("/org/gilt/ui", false), Some(ui));
        assert_eq!(browser.search("/org/gilt/ui", false), Some(main));
        assert_eq!(browser.search("/org/gilt/ui", false), Some(menus));
        assert_eq!(browser.search("/org/gilt/ui", false), None);
        assert_eq!(browser.cursor(), Some(menus));
        assert_eq!(browser.search("/org/gilt/ui", true), Some(main));
    }

    #[test]
    fn new_prefix_tests_current_row_first() {
        let mut browser = ResourceBrowser::new(&bundle());
        let main = browser.find("/org/gilt/ui/main.ui").unwrap();
        browser.search("/org/gilt/ui/m", false);
        assert_eq!(browser.cursor(), Some(main));
        assert_eq!(browser.search("/org/gilt/ui/main", false), Some(main));
        browser.reset_search();
        assert_eq!(browser.cursor(), None);
    }
}
