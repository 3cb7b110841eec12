//! # Codesnap
//!
//! `codesnap` compiles a directory tree into one markdown document: a folder
//! diagram followed by a fenced, language-tagged section for every included
//! file. The same input tree always produces the same bytes, however many
//! worker threads read it.
//!
//! The pipeline runs in fixed stages:
//!
//! 1. Ignore rules (default folders, [presets](presets), the root
//!    `.gitignore`, user patterns) are compiled into a last-match-wins
//!    [`Matcher`].
//! 2. [`walker::walk`] prunes the tree and fixes the [`Manifest`] order.
//! 3. [`loader::load_all`] classifies and reads files on a worker pool.
//! 4. [`output::assemble`] lays the blocks out in manifest order.
//!
//! Bad files never stop a run. They show up in the document as annotations and
//! in [`Snapshot::warnings`], as do directories the walk could not enter. Only
//! an unusable root (or a bad pattern, when asked to abort on those) is fatal.
//!
//! # Features
//!
//! - `parallel`: Reads files on a Rayon pool.
//! - `logging`: Emits `tracing` events and lets the binary install a subscriber.
//!
//! # Example
//!
//! ```no_run
//! use codesnap::{BinaryDetection, CodesnapBuilder, run};
//!
//! let options = CodesnapBuilder::new(".")
//!     .presets(vec!["python".into()])
//!     .ignore_patterns(vec!["*.log".into(), "!important.log".into()])
//!     .binary_detection(BinaryDetection::Accurate)
//!     .max_file_size(Some(512 * 1024))
//!     .output("codebase.md")
//!     .build();
//!
//! let report = run(&options).expect("Failed to snapshot directory");
//! for warning in &report.warnings {
//!     eprintln!("warning: {warning}");
//! }
//! ```

pub mod classify;
mod engine;
mod error;
pub mod loader;
mod options;
pub mod output;
pub mod pattern;
pub mod presets;
pub mod tree;
mod types;
pub mod walker;

pub use engine::{run, snapshot};
pub use error::{CodesnapError, PatternError, Warning, WarningKind};
pub use options::{
    BinaryDetection, CodesnapBuilder, CodesnapOptions, DEFAULT_MAX_FILE_SIZE, DEFAULT_OUTPUT,
};
pub use pattern::{Matcher, PatternPolicy, RuleSet, RuleSource};
pub use presets::Preset;
pub use tree::DocumentTree;
pub use types::{
    ContentBlock, ContentKind, EntryId, KindCounts, Manifest, ManifestEntry, Report, SkipReason,
    SkippedPath, Snapshot,
};
