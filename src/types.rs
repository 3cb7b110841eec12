use crate::error::Warning;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Position of an entry in the [`Manifest`]. Stable for the life of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(pub usize);

/// A file selected for inclusion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub id: EntryId,
    /// Path relative to the root.
    pub relative: PathBuf,
    /// Path as reached from the root on disk.
    pub path: PathBuf,
}

impl ManifestEntry {
    /// The relative path as a sequence of segments.
    pub fn segments(&self) -> impl Iterator<Item = Cow<'_, str>> {
        self.relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
    }

    /// Relative path joined with `/` on every platform.
    pub fn display_path(&self) -> String {
        self.segments().collect::<Vec<_>>().join("/")
    }
}

/// Deterministically ordered list of included files.
///
/// Order is depth-first with directories before files and each group sorted
/// by name. It is the only ordering authority downstream of the walk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Builds a manifest from paths already in final order, numbering them.
    pub(crate) fn from_ordered(paths: Vec<(PathBuf, PathBuf)>) -> Self {
        let entries = paths
            .into_iter()
            .enumerate()
            .map(|(i, (relative, path))| ManifestEntry {
                id: EntryId(i),
                relative,
                path,
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ManifestEntry> {
        self.entries.iter()
    }

    pub fn get(&self, id: EntryId) -> Option<&ManifestEntry> {
        self.entries.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_relative(&self, relative: impl AsRef<Path>) -> bool {
        let relative = relative.as_ref();
        self.entries.iter().any(|e| e.relative == relative)
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a ManifestEntry;
    type IntoIter = std::slice::Iter<'a, ManifestEntry>;
    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// How a file's content is represented in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentKind {
    Text { language: String },
    Binary,
    TooLarge { size: u64, limit: u64 },
    Unreadable { message: String },
}

/// Rendered unit for one manifest entry. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub id: EntryId,
    pub kind: ContentKind,
    /// Normalized content, present only for text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ContentBlock {
    pub fn text(id: EntryId, language: impl Into<String>, text: String) -> Self {
        Self {
            id,
            kind: ContentKind::Text {
                language: language.into(),
            },
            text: Some(text),
        }
    }

    pub fn placeholder(id: EntryId, kind: ContentKind) -> Self {
        Self {
            id,
            kind,
            text: None,
        }
    }
}

/// Why the walk left a path out of the manifest without a rule excluding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// A followed link leads back to one of its own ancestors.
    SymlinkCycle,
    /// A followed link leads to a directory that is walked elsewhere.
    DuplicateLink,
    /// A directory link that was not followed.
    SymlinkNotFollowed,
    /// The directory could not be listed.
    Unreadable,
}

impl SkipReason {
    pub fn label(self) -> &'static str {
        match self {
            SkipReason::SymlinkCycle => "symlink cycle",
            SkipReason::DuplicateLink => "duplicate link",
            SkipReason::SymlinkNotFollowed => "symlink not followed",
            SkipReason::Unreadable => "unreadable",
        }
    }
}

/// A path shown in the document as an annotation instead of content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedPath {
    pub relative: PathBuf,
    pub is_dir: bool,
    pub reason: SkipReason,
    pub detail: String,
}

impl SkippedPath {
    pub fn display_path(&self) -> String {
        let joined = self
            .relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if self.is_dir { format!("{joined}/") } else { joined }
    }
}

/// Number of blocks of each kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindCounts {
    pub text: usize,
    pub binary: usize,
    pub too_large: usize,
    pub unreadable: usize,
}

impl KindCounts {
    pub(crate) fn record(&mut self, kind: &ContentKind) {
        match kind {
            ContentKind::Text { .. } => self.text += 1,
            ContentKind::Binary => self.binary += 1,
            ContentKind::TooLarge { .. } => self.too_large += 1,
            ContentKind::Unreadable { .. } => self.unreadable += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.text + self.binary + self.too_large + self.unreadable
    }
}

/// The assembled document plus everything a caller needs to judge it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub document: String,
    pub manifest: Manifest,
    pub counts: KindCounts,
    /// Paths annotated in the tree instead of listed in the manifest.
    pub skipped: Vec<SkippedPath>,
    /// Non-fatal conditions, in the order they were recorded.
    pub warnings: Vec<Warning>,
}

/// Outcome of a run that wrote its document to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub output: PathBuf,
    pub success: bool,
    pub files: usize,
    pub counts: KindCounts,
    pub skipped: Vec<SkippedPath>,
    pub warnings: Vec<Warning>,
}

impl Report {
    pub(crate) fn new(output: PathBuf, snapshot: Snapshot) -> Self {
        Self {
            output,
            success: true,
            files: snapshot.manifest.len(),
            counts: snapshot.counts,
            skipped: snapshot.skipped,
            warnings: snapshot.warnings,
        }
    }
}
