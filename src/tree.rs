//! Directory-structure tree for the document header.
//!
//! The tree and the [`Manifest`] come out of the same pass, so the order files
//! appear in the diagram is exactly the order their sections appear below it.
//! Paths the walk could not enter stay in the tree as annotated leaves.

use crate::types::{EntryId, Manifest, SkippedPath};
use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Directory,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub name: String,
    pub kind: NodeKind,
    pub children: Vec<TreeNode>,
    /// Manifest entry for files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<EntryId>,
    /// Why the node has no content, for skipped paths.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Hierarchy of retained directories and files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentTree {
    pub root: TreeNode,
    skipped: Vec<SkippedPath>,
}

enum DirSlot {
    Walked(Pending),
    Skipped(SkippedPath),
}

enum FileSlot {
    Entry(PathBuf, PathBuf),
    Skipped(SkippedPath),
}

#[derive(Default)]
struct Pending {
    dirs: BTreeMap<OsString, Pending>,
    files: BTreeMap<OsString, (PathBuf, PathBuf)>,
    skipped: BTreeMap<OsString, SkippedPath>,
}

fn names(relative: &Path) -> Vec<OsString> {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_os_string()),
            _ => None,
        })
        .collect()
}

impl Pending {
    fn descend(&mut self, dirs: &[OsString]) -> &mut Pending {
        let mut node = self;
        for dir in dirs {
            node = node.dirs.entry(dir.clone()).or_default();
        }
        node
    }

    fn insert_file(&mut self, relative: PathBuf, path: PathBuf) {
        let names = names(&relative);
        let Some((file, dirs)) = names.split_last() else {
            return;
        };
        self.descend(dirs).files.insert(file.clone(), (relative, path));
    }

    fn insert_skipped(&mut self, skipped: SkippedPath) {
        let names = names(&skipped.relative);
        let Some((last, dirs)) = names.split_last() else {
            return;
        };
        self.descend(dirs).skipped.insert(last.clone(), skipped);
    }

    fn finish(
        self,
        name: String,
        ordered: &mut Vec<(PathBuf, PathBuf)>,
        skipped: &mut Vec<SkippedPath>,
    ) -> TreeNode {
        let mut dirs: BTreeMap<OsString, DirSlot> = self
            .dirs
            .into_iter()
            .map(|(name, pending)| (name, DirSlot::Walked(pending)))
            .collect();
        let mut files: BTreeMap<OsString, FileSlot> = self
            .files
            .into_iter()
            .map(|(name, (relative, path))| (name, FileSlot::Entry(relative, path)))
            .collect();
        // A walked directory or retained file of the same name takes precedence.
        for (name, path) in self.skipped {
            if path.is_dir {
                dirs.entry(name).or_insert(DirSlot::Skipped(path));
            } else {
                files.entry(name).or_insert(FileSlot::Skipped(path));
            }
        }
        let mut children = Vec::with_capacity(dirs.len() + files.len());
        for (dir, slot) in dirs {
            let dir = dir.to_string_lossy().into_owned();
            match slot {
                DirSlot::Walked(pending) => children.push(pending.finish(dir, ordered, skipped)),
                DirSlot::Skipped(path) => {
                    children.push(annotated(dir, NodeKind::Directory, &path));
                    skipped.push(path);
                }
            }
        }
        for (file, slot) in files {
            let file = file.to_string_lossy().into_owned();
            match slot {
                FileSlot::Entry(relative, path) => {
                    let id = EntryId(ordered.len());
                    ordered.push((relative, path));
                    children.push(TreeNode {
                        name: file,
                        kind: NodeKind::File,
                        children: Vec::new(),
                        entry: Some(id),
                        note: None,
                    });
                }
                FileSlot::Skipped(path) => {
                    children.push(annotated(file, NodeKind::File, &path));
                    skipped.push(path);
                }
            }
        }
        TreeNode {
            name,
            kind: NodeKind::Directory,
            children,
            entry: None,
            note: None,
        }
    }
}

fn annotated(name: String, kind: NodeKind, skipped: &SkippedPath) -> TreeNode {
    TreeNode {
        name,
        kind,
        children: Vec::new(),
        entry: None,
        note: Some(skipped.reason.label().to_string()),
    }
}

impl DocumentTree {
    /// Builds the tree and manifest from retained files and skipped paths.
    ///
    /// `files` holds `(relative, on-disk)` pairs in any order. Directories are
    /// listed before files at every level and both are sorted by name, so the
    /// result does not depend on the order the filesystem handed entries out.
    /// A directory appears only if it holds a retained file or is itself
    /// skipped.
    pub fn build(
        root_name: impl Into<String>,
        files: Vec<(PathBuf, PathBuf)>,
        skipped: Vec<SkippedPath>,
    ) -> (Self, Manifest) {
        let mut pending = Pending::default();
        for (relative, path) in files {
            pending.insert_file(relative, path);
        }
        for path in skipped {
            pending.insert_skipped(path);
        }
        let mut ordered = Vec::new();
        let mut skipped = Vec::new();
        let root = pending.finish(root_name.into(), &mut ordered, &mut skipped);
        (Self { root, skipped }, Manifest::from_ordered(ordered))
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// Skipped paths in diagram order.
    pub fn skipped(&self) -> &[SkippedPath] {
        &self.skipped
    }

    /// Renders the tree like the `tree` command, directories suffixed with `/`
    /// and skipped paths followed by `[skipped: reason]`.
    pub fn render(&self) -> String {
        let mut out = format!("{}/\n", self.root.name);
        render_children(&self.root, "", &mut out);
        out
    }
}

fn render_children(node: &TreeNode, prefix: &str, out: &mut String) {
    let count = node.children.len();
    for (i, child) in node.children.iter().enumerate() {
        let last = i + 1 == count;
        out.push_str(prefix);
        out.push_str(if last { "└── " } else { "├── " });
        out.push_str(&child.name);
        if child.kind == NodeKind::Directory {
            out.push('/');
        }
        if let Some(note) = &child.note {
            out.push_str(&format!(" [skipped: {note}]"));
        }
        out.push('\n');
        if child.kind == NodeKind::Directory {
            let nested = format!("{prefix}{}", if last { "    " } else { "│   " });
            render_children(child, &nested, out);
        }
    }
}
