//! # File Tree
//!
//! Arena-backed directory tree for the file selection step.
//!
//! ```text
//! FileTree
//! └── nodes: Vec<FileEntry>     // nodes[0] is the synthetic root
//!     ├── children: Vec<NodeId> // owned, in display order
//!     └── parent: Option<NodeId> // non-owning back-reference
//! ```
//!
//! Every other structure (the flattened view, the selected set) refers to
//! entries by `NodeId`, so an entry is never duplicated.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

/// Directories are listed while their depth (root = 0) is at most this value.
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &["node_modules", "vendor"];

/// Index of an entry inside its `FileTree`.
pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    pub expanded: bool,
    /// Only ever true for files.
    pub checked: bool,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct FileTree {
    nodes: Vec<FileEntry>,
}

impl FileTree {
    pub const ROOT: NodeId = 0;

    /// Create a tree holding only the (expanded) root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let path = root.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            nodes: vec![FileEntry {
                name,
                path,
                is_dir: true,
                expanded: true,
                checked: false,
                children: Vec::new(),
                parent: None,
            }],
        }
    }

    /// Walk `root` from disk.
    ///
    /// Hidden entries and `node_modules`/`vendor` are skipped; siblings are
    /// ordered directories first, then by name. Unreadable directories are
    /// left empty rather than failing the scan.
    pub fn scan(root: &Path, max_depth: usize) -> Self {
        let mut tree = Self::new(root);
        tree.scan_dir(Self::ROOT, root, 0, max_depth);
        debug!(
            "Scanned {} ({} entries, max depth {})",
            root.display(),
            tree.nodes.len() - 1,
            max_depth
        );
        tree
    }

    fn scan_dir(&mut self, parent: NodeId, dir: &Path, depth: usize, max_depth: usize) {
        if depth > max_depth {
            return;
        }
        let read = match fs::read_dir(dir) {
            Ok(read) => read,
            Err(e) => {
                warn!("Skipping unreadable directory {}: {}", dir.display(), e);
                return;
            }
        };

        let mut entries: Vec<(String, bool)> = read
            .filter_map(Result::ok)
            .map(|entry| {
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                (entry.file_name().to_string_lossy().into_owned(), is_dir)
            })
            .filter(|(name, _)| !name.starts_with('.') && !SKIPPED_DIRS.contains(&name.as_str()))
            .collect();
        entries.sort_by(|(a_name, a_dir), (b_name, b_dir)| {
            b_dir.cmp(a_dir).then_with(|| a_name.cmp(b_name))
        });

        for (name, is_dir) in entries {
            let child = self.add_child(parent, name, is_dir);
            if is_dir {
                let child_path = self.nodes[child].path.clone();
                self.scan_dir(child, &child_path, depth + 1, max_depth);
            }
        }
    }

    /// Append a collapsed, unchecked child under `parent`.
    pub fn add_child(&mut self, parent: NodeId, name: impl Into<String>, is_dir: bool) -> NodeId {
        let name = name.into();
        let parent_path = &self.nodes[parent].path;
        let path = if parent_path == Path::new(".") {
            PathBuf::from(&name)
        } else {
            parent_path.join(&name)
        };
        let id = self.nodes.len();
        self.nodes.push(FileEntry {
            name,
            path,
            is_dir,
            expanded: false,
            checked: false,
            children: Vec::new(),
            parent: Some(parent),
        });
        self.nodes[parent].children.push(id);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&FileEntry> {
        self.nodes.get(id)
    }

    /// Depth-first list of visible entries. Excludes the root and only
    /// descends into expanded directories.
    pub fn flatten(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_visible(Self::ROOT, &mut out);
        out
    }

    fn collect_visible(&self, id: NodeId, out: &mut Vec<NodeId>) {
        for &child in &self.nodes[id].children {
            out.push(child);
            let entry = &self.nodes[child];
            if entry.is_dir && entry.expanded {
                self.collect_visible(child, out);
            }
        }
    }

    /// Flip a directory's expansion. Returns false (and does nothing) for files.
    pub fn toggle_expanded(&mut self, id: NodeId) -> bool {
        match self.nodes.get_mut(id) {
            Some(entry) if entry.is_dir => {
                entry.expanded = !entry.expanded;
                true
            }
            _ => false,
        }
    }

    /// Flip a file's checked flag, returning the new value. `None` for directories.
    pub fn toggle_checked(&mut self, id: NodeId) -> Option<bool> {
        match self.nodes.get_mut(id) {
            Some(entry) if !entry.is_dir => {
                entry.checked = !entry.checked;
                Some(entry.checked)
            }
            _ => None,
        }
    }

    /// Number of ancestors between `id` and the root.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.nodes.get(id).and_then(|e| e.parent);
        while let Some(parent) = current {
            depth += 1;
            current = self.nodes[parent].parent;
        }
        depth
    }

    /// One display line for an entry: indentation, folder arrow or checkbox, name.
    pub fn label(&self, id: NodeId) -> String {
        let Some(entry) = self.nodes.get(id) else {
            return String::new();
        };
        let indent = "  ".repeat(self.depth(id));
        if entry.is_dir {
            let icon = if entry.expanded { "▼" } else { "▶" };
            let count = if !entry.expanded && !entry.children.is_empty() {
                format!(" ({} items)", entry.children.len())
            } else {
                String::new()
            };
            format!("{indent}{icon} {}/{count}", entry.name)
        } else {
            let checkbox = if entry.checked { "◉" } else { "◯" };
            format!("{indent}  {checkbox} {}", entry.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::temp_tree;

    fn names(tree: &FileTree, ids: &[NodeId]) -> Vec<String> {
        ids.iter()
            .map(|&id| tree.get(id).map(|e| e.name.clone()).unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_scan_orders_directories_first_then_alphabetically() {
        let dir = temp_tree(&["zeta.txt", "alpha.txt", "src/main.rs", "docs/guide.md"]);
        let tree = FileTree::scan(dir.path(), DEFAULT_MAX_DEPTH);
        let top = tree.get(FileTree::ROOT).unwrap().children.clone();
        assert_eq!(names(&tree, &top), vec!["docs", "src", "alpha.txt", "zeta.txt"]);
    }

    #[test]
    fn test_scan_skips_hidden_and_vendored_directories() {
        let dir = temp_tree(&[
            ".git/config",
            ".env",
            "node_modules/pkg/index.js",
            "vendor/lib.go",
            "keep.txt",
        ]);
        let tree = FileTree::scan(dir.path(), DEFAULT_MAX_DEPTH);
        let top = tree.get(FileTree::ROOT).unwrap().children.clone();
        assert_eq!(names(&tree, &top), vec!["keep.txt"]);
    }

    #[test]
    fn test_scan_stops_below_max_depth() {
        let dir = temp_tree(&["a/b/c/d/e/deep.txt"]);
        let tree = FileTree::scan(dir.path(), DEFAULT_MAX_DEPTH);
        // a(1) b(2) c(3) d(4) are listed; d sits at depth 4 so it is not read.
        let mut id = FileTree::ROOT;
        for expected in ["a", "b", "c", "d"] {
            let children = &tree.get(id).unwrap().children;
            assert_eq!(children.len(), 1, "expected {expected} under {id}");
            id = children[0];
            assert_eq!(tree.get(id).unwrap().name, expected);
        }
        assert!(tree.get(id).unwrap().children.is_empty());
    }

    #[test]
    fn test_flatten_respects_expansion() {
        let mut tree = FileTree::new("project");
        let sub = tree.add_child(FileTree::ROOT, "subdirectory", true);
        tree.add_child(sub, "b.txt", false);
        let a = tree.add_child(FileTree::ROOT, "a.txt", false);
        // Insertion order here is display order.
        tree.nodes[FileTree::ROOT].children = vec![a, sub];

        assert_eq!(names(&tree, &tree.flatten()), vec!["a.txt", "subdirectory"]);

        assert!(tree.toggle_expanded(sub));
        assert_eq!(
            names(&tree, &tree.flatten()),
            vec!["a.txt", "subdirectory", "b.txt"]
        );
    }

    #[test]
    fn test_toggle_expanded_twice_restores_view() {
        let dir = temp_tree(&["a.txt", "sub/b.txt", "sub/inner/c.txt"]);
        let mut tree = FileTree::scan(dir.path(), DEFAULT_MAX_DEPTH);
        let before = tree.flatten();
        let sub = before[0];

        tree.toggle_expanded(sub);
        assert_ne!(tree.flatten(), before);
        tree.toggle_expanded(sub);
        assert_eq!(tree.flatten(), before);
    }

    #[test]
    fn test_toggles_reject_wrong_entry_kind() {
        let mut tree = FileTree::new(".");
        let dir = tree.add_child(FileTree::ROOT, "src", true);
        let file = tree.add_child(FileTree::ROOT, "a.txt", false);

        assert!(!tree.toggle_expanded(file));
        assert_eq!(tree.toggle_checked(dir), None);
        assert_eq!(tree.toggle_checked(file), Some(true));
        assert_eq!(tree.toggle_checked(file), Some(false));
    }

    #[test]
    fn test_child_paths_under_dot_root_are_relative() {
        let mut tree = FileTree::new(".");
        let src = tree.add_child(FileTree::ROOT, "src", true);
        let lib = tree.add_child(src, "lib.rs", false);
        assert_eq!(tree.get(lib).unwrap().path, PathBuf::from("src/lib.rs"));
    }

    #[test]
    fn test_label_and_depth() {
        let mut tree = FileTree::new(".");
        let src = tree.add_child(FileTree::ROOT, "src", true);
        let lib = tree.add_child(src, "lib.rs", false);

        assert_eq!(tree.depth(lib), 2);
        assert_eq!(tree.label(src), "  ▶ src/ (1 items)");
        tree.toggle_expanded(src);
        assert_eq!(tree.label(src), "  ▼ src/");
        tree.toggle_checked(lib);
        assert_eq!(tree.label(lib), "      ◉ lib.rs");
    }
}
