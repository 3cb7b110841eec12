//! Deterministic traversal producing the manifest and document tree.

use crate::error::{CodesnapError, Warning, WarningKind};
use crate::pattern::Matcher;
use crate::tree::DocumentTree;
use crate::types::{Manifest, SkipReason, SkippedPath};
use ignore::{Match, WalkBuilder};
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    pub include_hidden: bool,
    pub follow_links: bool,
    pub max_depth: Option<usize>,
    /// Lowercase extensions without the dot. Empty allows every file.
    pub extensions: Vec<String>,
    /// Canonical paths of files never included.
    pub skip_files: Vec<PathBuf>,
    /// File names never included, at any depth.
    pub skip_names: Vec<OsString>,
}

impl WalkOptions {
    /// Whether a file passes the extension allowlist. Files without an
    /// extension are checked by name, so `Dockerfile` matches `dockerfile`.
    pub fn allows_extension(&self, relative: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        let key = match relative.extension() {
            Some(ext) => ext.to_string_lossy().to_ascii_lowercase(),
            None => relative
                .file_name()
                .map(|n| n.to_string_lossy().trim_start_matches('.').to_ascii_lowercase())
                .unwrap_or_default(),
        };
        self.extensions.iter().any(|e| *e == key)
    }

    /// Adds `path` to the skip list: by real path when it exists, else by name.
    pub fn skip(&mut self, path: &Path) {
        match path.canonicalize() {
            Ok(real) => self.skip_files.push(real),
            Err(_) => {
                if let Some(name) = path.file_name() {
                    self.skip_names.push(name.to_os_string());
                }
            }
        }
    }

    fn is_skipped(&self, path: &Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };
        if self.skip_names.iter().any(|n| n == name) {
            return true;
        }
        if !self.skip_files.iter().any(|s| s.file_name() == Some(name)) {
            return false;
        }
        path.canonicalize()
            .is_ok_and(|real| self.skip_files.contains(&real))
    }
}

#[derive(Debug, Clone)]
pub struct Walk {
    pub manifest: Manifest,
    pub tree: DocumentTree,
    pub warnings: Vec<Warning>,
}

#[derive(Default)]
struct Findings {
    warnings: Vec<Warning>,
    skipped: Vec<SkippedPath>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Checks that `root` exists, is a directory and can be listed.
pub fn check_root(root: &Path) -> Result<PathBuf, CodesnapError> {
    let metadata = fs::metadata(root).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CodesnapError::RootNotFound {
            path: root.to_path_buf(),
        },
        _ => CodesnapError::io(root, e),
    })?;
    if !metadata.is_dir() {
        return Err(CodesnapError::NotADirectory {
            path: root.to_path_buf(),
        });
    }
    fs::read_dir(root).map_err(|e| CodesnapError::io(root, e))?;
    root.canonicalize().map_err(|e| CodesnapError::io(root, e))
}

/// Walks `root`, pruning everything `matcher` excludes.
///
/// Excluded directories are never entered. Directories that cannot be listed
/// and followed links that loop or repeat another directory are recorded as
/// warnings and kept in the tree as annotated leaves; the walk moves on to
/// their siblings.
pub fn walk(
    root: &Path,
    matcher: Arc<Matcher>,
    options: &WalkOptions,
) -> Result<Walk, CodesnapError> {
    let real_root = check_root(root)?;
    #[cfg(feature = "logging")]
    tracing::debug!("Walking {}", real_root.display());

    let findings = Arc::new(Mutex::new(Findings::default()));
    let visited = Mutex::new(HashSet::new());

    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .hidden(!options.include_hidden)
        .follow_links(options.follow_links)
        .max_depth(options.max_depth)
        .sort_by_file_name(|a, b| a.cmp(b));

    let filter_root = root.to_path_buf();
    let link_root = real_root.clone();
    let filter_matcher = Arc::clone(&matcher);
    let filter_findings = Arc::clone(&findings);
    builder.filter_entry(move |entry| {
        let Ok(relative) = entry.path().strip_prefix(&filter_root) else {
            return true;
        };
        let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
        if let Match::Ignore(_glob) = filter_matcher.matched(relative, is_dir) {
            #[cfg(feature = "logging")]
            tracing::trace!(
                "Pruned {} by '{}' ({})",
                relative.display(),
                _glob.original(),
                _glob.from().map(|f| f.display().to_string()).unwrap_or_default()
            );
            return false;
        }
        // A directory that is also a link can only show up when links are followed.
        if is_dir && entry.path_is_symlink() {
            if let Some((skipped, warning)) =
                check_link(entry.path(), relative, &link_root, &visited)
            {
                #[cfg(feature = "logging")]
                tracing::warn!("{}", warning);
                let mut findings = lock(filter_findings.as_ref());
                findings.skipped.push(skipped);
                findings.warnings.push(warning);
                return false;
            }
        }
        true
    });

    let mut files = Vec::new();
    for result in builder.build() {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                let warning = relativize(warning_from(&err, None), root);
                #[cfg(feature = "logging")]
                tracing::warn!("{}", warning);
                let mut findings = lock(findings.as_ref());
                if let Some(skipped) = skipped_from(&warning, root) {
                    findings.skipped.push(skipped);
                }
                findings.warnings.push(warning);
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }
        let Some(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            continue;
        }
        let path = entry.path();
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        if entry.path_is_symlink() && path.is_dir() {
            if !matcher.is_excluded(relative, true) {
                #[cfg(feature = "logging")]
                tracing::debug!("Not following symlinked directory {}", path.display());
                lock(findings.as_ref()).skipped.push(SkippedPath {
                    relative: relative.to_path_buf(),
                    is_dir: true,
                    reason: SkipReason::SymlinkNotFollowed,
                    detail: "Directory link not followed".to_string(),
                });
            }
            continue;
        }
        if !options.allows_extension(relative) || options.is_skipped(path) {
            continue;
        }
        files.push((relative.to_path_buf(), path.to_path_buf()));
    }

    let Findings { warnings, skipped } = std::mem::take(&mut *lock(findings.as_ref()));
    let root_name = real_root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| real_root.display().to_string());
    let (tree, manifest) = DocumentTree::build(root_name, files, skipped);
    #[cfg(feature = "logging")]
    tracing::info!(
        "Walk complete: {} files, {} skipped, {} warnings",
        manifest.len(),
        tree.skipped().len(),
        warnings.len()
    );
    Ok(Walk {
        manifest,
        tree,
        warnings,
    })
}

/// Decides whether a followed directory link may be entered.
///
/// A link to one of its own ancestors is a cycle. A link to a directory inside
/// the root is a duplicate, since the walk reaches that directory under its
/// real path. Links leaving the root are entered once per real target.
fn check_link(
    path: &Path,
    relative: &Path,
    real_root: &Path,
    visited: &Mutex<HashSet<PathBuf>>,
) -> Option<(SkippedPath, Warning)> {
    let target = path.canonicalize().ok()?;
    let parent = path.parent()?.canonicalize().ok()?;
    let shown = match target.strip_prefix(real_root) {
        Ok(inside) if inside.as_os_str().is_empty() => PathBuf::from("."),
        Ok(inside) => inside.to_path_buf(),
        Err(_) => target.clone(),
    };
    let (reason, warning) = if parent.starts_with(&target) {
        (SkipReason::SymlinkCycle, Warning::symlink_cycle(relative, &shown))
    } else if target.starts_with(real_root) || !lock(visited).insert(target) {
        (SkipReason::DuplicateLink, Warning::duplicate_link(relative, &shown))
    } else {
        return None;
    };
    let skipped = SkippedPath {
        relative: relative.to_path_buf(),
        is_dir: true,
        reason,
        detail: warning.message.clone(),
    };
    Some((skipped, warning))
}

fn warning_from(err: &ignore::Error, path: Option<&Path>) -> Warning {
    match err {
        ignore::Error::WithPath { path, err } => warning_from(err, Some(path)),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            warning_from(err, path)
        }
        ignore::Error::Loop { ancestor, child } => Warning::symlink_cycle(child, ancestor),
        other => Warning::new(
            path.map(Path::to_path_buf).unwrap_or_default(),
            other.to_string(),
            WarningKind::Traversal,
        ),
    }
}

fn relativize(mut warning: Warning, root: &Path) -> Warning {
    if let Ok(relative) = warning.path.strip_prefix(root) {
        warning.path = relative.to_path_buf();
    }
    warning
}

/// The tree annotation for a walk error that names a path under the root.
fn skipped_from(warning: &Warning, root: &Path) -> Option<SkippedPath> {
    if warning.path.as_os_str().is_empty() || warning.path.is_absolute() {
        return None;
    }
    let reason = match warning.kind {
        WarningKind::SymlinkCycle => SkipReason::SymlinkCycle,
        _ => SkipReason::Unreadable,
    };
    let is_dir = reason == SkipReason::SymlinkCycle
        || fs::symlink_metadata(root.join(&warning.path)).is_ok_and(|m| m.is_dir());
    Some(SkippedPath {
        relative: warning.path.clone(),
        is_dir,
        reason,
        detail: warning.message.clone(),
    })
}
