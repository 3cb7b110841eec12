use crate::pattern::PatternPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
/// Files larger than this are annotated instead of read, unless overridden.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;
pub const DEFAULT_OUTPUT: &str = "codebase.md";
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryDetection {
    /// A NUL byte in the probed prefix.
    Simple,
    /// `content_inspector` plus a ratio of control bytes.
    #[default]
    Accurate,
    /// Treat everything as text.
    None,
}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodesnapOptions {
    pub root: PathBuf,
    pub output: PathBuf,
    pub presets: Vec<String>,
    pub ignore_patterns: Vec<String>,
    /// Files left out of the document. A path that exists is matched by its
    /// real location; one that does not is matched by file name anywhere.
    pub exclude_files: Vec<PathBuf>,
    /// Allowed extensions, lowercase and without the dot. Empty means all.
    pub extensions: Vec<String>,
    pub respect_gitignore: bool,
    pub default_excludes: bool,
    pub include_hidden: bool,
    pub follow_links: bool,
    pub max_depth: Option<usize>,
    pub max_file_size: Option<u64>,
    pub binary_detection: BinaryDetection,
    /// Worker count for content loading; 0 picks available parallelism.
    pub threads: usize,
    pub pattern_policy: PatternPolicy,
}
impl Default for CodesnapOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            output: PathBuf::from(DEFAULT_OUTPUT),
            presets: Vec::new(),
            ignore_patterns: Vec::new(),
            exclude_files: Vec::new(),
            extensions: Vec::new(),
            respect_gitignore: true,
            default_excludes: true,
            include_hidden: false,
            follow_links: false,
            max_depth: None,
            max_file_size: Some(DEFAULT_MAX_FILE_SIZE),
            binary_detection: BinaryDetection::default(),
            threads: 0,
            pattern_policy: PatternPolicy::default(),
        }
    }
}
#[derive(Debug, Default)]
pub struct CodesnapBuilder {
    options: CodesnapOptions,
}
impl CodesnapBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            options: CodesnapOptions {
                root: root.into(),
                ..Default::default()
            },
        }
    }
    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.output = path.into();
        self
    }
    pub fn presets(mut self, names: Vec<String>) -> Self {
        self.options.presets = names;
        self
    }
    pub fn ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.options.ignore_patterns = patterns;
        self
    }
    pub fn exclude_files(mut self, paths: Vec<PathBuf>) -> Self {
        self.options.exclude_files = paths;
        self
    }
    pub fn extensions(mut self, extensions: Vec<String>) -> Self {
        self.options.extensions = extensions
            .into_iter()
            .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        self
    }
    pub fn respect_gitignore(mut self, yes: bool) -> Self {
        self.options.respect_gitignore = yes;
        self
    }
    pub fn default_excludes(mut self, yes: bool) -> Self {
        self.options.default_excludes = yes;
        self
    }
    pub fn include_hidden(mut self, yes: bool) -> Self {
        self.options.include_hidden = yes;
        self
    }
    pub fn follow_links(mut self, yes: bool) -> Self {
        self.options.follow_links = yes;
        self
    }
    pub fn max_depth(mut self, depth: Option<usize>) -> Self {
        self.options.max_depth = depth;
        self
    }
    pub fn max_file_size(mut self, limit: Option<u64>) -> Self {
        self.options.max_file_size = limit;
        self
    }
    pub fn binary_detection(mut self, method: BinaryDetection) -> Self {
        self.options.binary_detection = method;
        self
    }
    pub fn threads(mut self, threads: usize) -> Self {
        self.options.threads = threads;
        self
    }
    pub fn pattern_policy(mut self, policy: PatternPolicy) -> Self {
        self.options.pattern_policy = policy;
        self
    }
    pub fn build(self) -> CodesnapOptions {
        self.options
    }
}
