//! Ordered gitignore-style rule sets.
//!
//! A [`RuleSet`] is an ordered list of pattern lines. Order matters: when
//! several rules match the same path, the one that appears last decides
//! whether the path is ignored (`pattern`) or re-included (`!pattern`).
//! Presets, the root `.gitignore` and user patterns are all flattened into one
//! sequence before compiling, so the matcher itself knows nothing about where
//! a rule came from beyond the origin recorded on each compiled glob.
//!
//! Line syntax is git's: `*`, `?` and `[...]` stay within a segment, `**`
//! spans segments, a leading or inner `/` anchors to the root, a trailing `/`
//! matches directories only, `!` negates, and `\!`/`\#` escape.

use crate::error::PatternError;
use ignore::Match;
use ignore::gitignore::{Gitignore, GitignoreBuilder, Glob};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where a rule came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSource {
    Preset(String),
    Default,
    Gitignore,
    User,
}

impl RuleSource {
    /// Origin attached to every glob compiled from this source.
    pub fn origin(&self) -> PathBuf {
        match self {
            RuleSource::Preset(name) => PathBuf::from(format!("preset:{name}")),
            RuleSource::Default => PathBuf::from("default"),
            RuleSource::Gitignore => PathBuf::from(".gitignore"),
            RuleSource::User => PathBuf::from("user"),
        }
    }
}

/// What to do when a pattern fails to compile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternPolicy {
    /// Fail the whole compilation with the first bad pattern.
    #[default]
    Abort,
    /// Drop bad patterns and report them.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub line: String,
    pub source: RuleSource,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one pattern line. Blank lines and comments are dropped.
    pub fn push(&mut self, line: &str, source: RuleSource) {
        if line.trim().is_empty() || line.starts_with('#') {
            return;
        }
        self.rules.push(Rule {
            line: line.to_string(),
            source,
        });
    }

    pub fn extend<I, S>(&mut self, lines: I, source: RuleSource)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.push(line.as_ref(), source.clone());
        }
    }

    /// Moves every rule of `other` to the end, keeping their sources.
    pub fn append(&mut self, other: RuleSet) {
        self.rules.extend(other.rules);
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Compiles the rules into a [`Matcher`].
    ///
    /// Under [`PatternPolicy::Abort`] the first bad pattern is returned as the
    /// error. Under [`PatternPolicy::Skip`] bad patterns are left out of the
    /// matcher and returned alongside it.
    pub fn compile(
        &self,
        policy: PatternPolicy,
    ) -> Result<(Matcher, Vec<PatternError>), PatternError> {
        let mut builder = GitignoreBuilder::new(".");
        let mut skipped = Vec::new();
        for rule in &self.rules {
            let Err(e) = builder.add_line(Some(rule.source.origin()), &rule.line) else {
                continue;
            };
            let error = PatternError {
                pattern: rule.line.clone(),
                message: e.to_string(),
            };
            match policy {
                PatternPolicy::Abort => return Err(error),
                PatternPolicy::Skip => {
                    #[cfg(feature = "logging")]
                    tracing::warn!("Skipping invalid pattern: {}", error);
                    skipped.push(error);
                }
            }
        }
        let gitignore = builder.build().map_err(|e| PatternError {
            pattern: self
                .rules
                .iter()
                .map(|r| r.line.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            message: e.to_string(),
        })?;
        Ok((Matcher { gitignore }, skipped))
    }
}

/// Compiled rule set. Cheap to share across threads.
#[derive(Debug, Clone)]
pub struct Matcher {
    gitignore: Gitignore,
}

impl Matcher {
    /// Decides `relative` on its own, last match wins.
    ///
    /// Parents of `relative` are not consulted; see
    /// [`Matcher::is_excluded_with_parents`].
    pub fn matched(&self, relative: &Path, is_dir: bool) -> Match<&Glob> {
        self.gitignore.matched(relative, is_dir)
    }

    pub fn is_excluded(&self, relative: &Path, is_dir: bool) -> bool {
        self.matched(relative, is_dir).is_ignore()
    }

    /// Decides `relative` segment by segment from the root.
    ///
    /// Each ancestor directory is decided on its own; the first excluded
    /// ancestor excludes everything beneath it, whatever later negations say
    /// about the deeper path. This is the rule the walker applies by pruning.
    pub fn is_excluded_with_parents(&self, relative: &Path, is_dir: bool) -> bool {
        let mut prefix = PathBuf::new();
        let mut components = relative.components().peekable();
        while let Some(component) = components.next() {
            prefix.push(component);
            if components.peek().is_none() {
                break;
            }
            if self.is_excluded(&prefix, true) {
                return true;
            }
        }
        self.is_excluded(relative, is_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(lines: &[&str]) -> Matcher {
        let mut rules = RuleSet::new();
        rules.extend(lines, RuleSource::User);
        rules.compile(PatternPolicy::Abort).unwrap().0
    }

    #[test]
    fn blanks_and_comments_are_dropped() {
        let mut rules = RuleSet::new();
        rules.extend(["", "   ", "# note", "\\#hash", "*.o"], RuleSource::Gitignore);
        let lines: Vec<_> = rules.rules().iter().map(|r| r.line.as_str()).collect();
        assert_eq!(lines, ["\\#hash", "*.o"]);
        let m = rules.compile(PatternPolicy::Abort).unwrap().0;
        assert!(m.is_excluded(Path::new("#hash"), false));
    }

    #[test]
    fn last_match_wins_negation() {
        let m = matcher(&["*.log", "!important.log"]);
        assert!(!m.is_excluded(Path::new("important.log"), false));
        assert!(m.is_excluded(Path::new("debug.log"), false));
        assert!(m.is_excluded(Path::new("nested/debug.log"), false));
        assert!(!m.is_excluded(Path::new("nested/important.log"), false));
    }

    #[test]
    fn order_is_significant() {
        let m = matcher(&["!important.log", "*.log"]);
        assert!(m.is_excluded(Path::new("important.log"), false));
    }

    #[test]
    fn directory_only_rules() {
        let m = matcher(&["build/"]);
        assert!(m.is_excluded(Path::new("build"), true));
        assert!(m.is_excluded(Path::new("sub/build"), true));
        assert!(!m.is_excluded(Path::new("build"), false));
    }

    #[test]
    fn anchored_rules_only_match_at_root() {
        let m = matcher(&["/target", "docs/*.md"]);
        assert!(m.is_excluded(Path::new("target"), true));
        assert!(!m.is_excluded(Path::new("crates/x/target"), true));
        assert!(m.is_excluded(Path::new("docs/a.md"), false));
        assert!(!m.is_excluded(Path::new("docs/deep/a.md"), false));
    }

    #[test]
    fn wildcards_stay_within_segment() {
        let m = matcher(&["src/*.rs", "a?c"]);
        assert!(m.is_excluded(Path::new("src/lib.rs"), false));
        assert!(!m.is_excluded(Path::new("src/bin/main.rs"), false));
        assert!(m.is_excluded(Path::new("abc"), false));
        assert!(!m.is_excluded(Path::new("a/c"), false));
    }

    #[test]
    fn double_star_spans_segments() {
        let m = matcher(&["src/**/*.rs", "**/gen"]);
        assert!(m.is_excluded(Path::new("src/lib.rs"), false));
        assert!(m.is_excluded(Path::new("src/a/b/c.rs"), false));
        assert!(m.is_excluded(Path::new("gen"), true));
        assert!(m.is_excluded(Path::new("x/y/gen"), true));
    }

    #[test]
    fn excluded_parent_beats_inner_negation() {
        // `logs/` excludes the directory segment; `!logs/keep.txt` only
        // speaks about the file, which is never reached.
        let m = matcher(&["logs/", "!logs/keep.txt"]);
        assert!(!m.is_excluded(Path::new("logs/keep.txt"), false));
        assert!(m.is_excluded_with_parents(Path::new("logs/keep.txt"), false));
        assert!(m.is_excluded_with_parents(Path::new("a/logs/b/c.txt"), false));
        assert!(!m.is_excluded_with_parents(Path::new("src/main.rs"), false));
    }

    #[test]
    fn negation_on_the_directory_itself_reincludes() {
        let m = matcher(&["build/", "!build/"]);
        assert!(!m.is_excluded_with_parents(Path::new("build/out.txt"), false));
    }

    #[test]
    fn deciding_glob_carries_its_source() {
        let mut rules = RuleSet::new();
        rules.push("venv/", RuleSource::Preset("python".into()));
        rules.push("*.tmp", RuleSource::User);
        let m = rules.compile(PatternPolicy::Abort).unwrap().0;
        match m.matched(Path::new("venv"), true) {
            Match::Ignore(glob) => {
                assert_eq!(glob.original(), "venv/");
                assert_eq!(glob.from(), Some(Path::new("preset:python")));
            }
            other => panic!("expected ignore, got {other:?}"),
        }
        assert!(m.matched(Path::new("a.rs"), false).is_none());
    }

    #[test]
    fn abort_policy_names_bad_pattern() {
        let mut rules = RuleSet::new();
        rules.extend(["*.ok", "bad{", "*.tmp"], RuleSource::User);
        let err = rules.compile(PatternPolicy::Abort).unwrap_err();
        assert_eq!(err.pattern, "bad{");
    }

    #[test]
    fn skip_policy_drops_bad_pattern() {
        let mut rules = RuleSet::new();
        rules.extend(["*.ok", "bad{", "*.tmp"], RuleSource::User);
        let (m, skipped) = rules.compile(PatternPolicy::Skip).unwrap();
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].pattern, "bad{");
        assert!(m.is_excluded(Path::new("x.tmp"), false));
        assert!(m.is_excluded(Path::new("y.ok"), false));
    }
}
