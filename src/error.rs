use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
/// Failures that abort a run before anything is written.
#[derive(Debug, Error)]
pub enum CodesnapError {
    #[error("Root path not found: {path}")]
    RootNotFound { path: PathBuf },
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error("Unknown preset '{0}'")]
    UnknownPreset(String),
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(String),
}
impl CodesnapError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CodesnapError::Io {
            path: path.into(),
            source,
        }
    }
}
/// An ignore pattern that could not be compiled.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid ignore pattern '{pattern}': {message}")]
pub struct PatternError {
    pub pattern: String,
    pub message: String,
}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A bad ignore pattern was dropped.
    PatternSkipped,
    /// A directory could not be read during the walk.
    Traversal,
    /// A followed directory link pointed at one of its own ancestors.
    SymlinkCycle,
    /// A followed directory link pointed at a directory walked elsewhere.
    DuplicateLink,
    /// A file could not be read; its block carries the error instead.
    Unreadable,
    /// A file exceeded the size limit and its content was skipped.
    Oversized,
}
/// Non-fatal condition recorded during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub path: PathBuf,
    pub message: String,
    pub kind: WarningKind,
}
impl Warning {
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }
    pub(crate) fn pattern_skipped(error: &PatternError) -> Self {
        Self::new(
            error.pattern.clone(),
            error.to_string(),
            WarningKind::PatternSkipped,
        )
    }
    pub(crate) fn symlink_cycle(path: impl Into<PathBuf>, target: &std::path::Path) -> Self {
        Self::new(
            path,
            format!("Symlink cycle back to {}", target.display()),
            WarningKind::SymlinkCycle,
        )
    }
    pub(crate) fn duplicate_link(path: impl Into<PathBuf>, target: &std::path::Path) -> Self {
        Self::new(
            path,
            format!("Link to {}, which is walked at its real location", target.display()),
            WarningKind::DuplicateLink,
        )
    }
}
impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn pattern_error_names_pattern() {
        let err = PatternError {
            pattern: "a[".into(),
            message: "unclosed character class".into(),
        };
        assert!(err.to_string().contains("'a['"));
        let warning = Warning::pattern_skipped(&err);
        assert_eq!(warning.kind, WarningKind::PatternSkipped);
        assert_eq!(warning.path, PathBuf::from("a["));
    }
    #[test]
    fn pattern_error_converts_to_fatal() {
        let err: CodesnapError = PatternError {
            pattern: "x".into(),
            message: "bad".into(),
        }
        .into();
        assert!(matches!(err, CodesnapError::Pattern(_)));
    }
}
