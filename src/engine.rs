use crate::classify::ClassifyPolicy;
use crate::error::{CodesnapError, Warning, WarningKind};
use crate::loader::{self, LoadOptions};
use crate::options::CodesnapOptions;
use crate::output;
use crate::pattern::{RuleSet, RuleSource};
use crate::presets::{self, DEFAULT_EXCLUDED_FOLDERS, Preset};
use crate::types::{KindCounts, Report, Snapshot};
use crate::walker::{self, WalkOptions};
use std::fs;
use std::path::Path;
use std::sync::Arc;
/// Rules in evaluation order: default folders, presets, the root
/// `.gitignore`, then user patterns. Later rules win.
fn build_rules(
    options: &CodesnapOptions,
    real_root: &Path,
    preset_rules: RuleSet,
    warnings: &mut Vec<Warning>,
) -> RuleSet {
    let mut rules = RuleSet::new();
    if options.default_excludes {
        rules.extend(
            DEFAULT_EXCLUDED_FOLDERS.iter().map(|f| format!("{f}/")),
            RuleSource::Default,
        );
    }
    rules.append(preset_rules);
    if options.respect_gitignore {
        let path = real_root.join(".gitignore");
        match fs::read_to_string(&path) {
            Ok(text) => rules.extend(text.lines(), RuleSource::Gitignore),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                #[cfg(feature = "logging")]
                tracing::warn!("Could not read {}: {}", path.display(), e);
                warnings.push(Warning::new(
                    ".gitignore",
                    format!("Could not read .gitignore: {e}"),
                    WarningKind::Traversal,
                ));
            }
        }
    }
    rules.extend(&options.ignore_patterns, RuleSource::User);
    rules
}
fn effective_extensions(options: &CodesnapOptions, preset_extensions: Vec<String>) -> Vec<String> {
    let mut extensions = preset_extensions;
    for ext in &options.extensions {
        if !extensions.contains(ext) {
            extensions.push(ext.clone());
        }
    }
    extensions
}
/// Builds the document without writing it.
///
/// Only an invalid root, an unknown preset, a bad pattern under
/// [`PatternPolicy::Abort`](crate::PatternPolicy::Abort) or a failed worker
/// pool abort the run. Everything else ends up in [`Snapshot::warnings`].
pub fn snapshot(options: &CodesnapOptions) -> Result<Snapshot, CodesnapError> {
    #[cfg(feature = "logging")]
    tracing::info!("Starting codesnap with root: {}", options.root.display());
    let real_root = walker::check_root(&options.root)?;
    let presets = Preset::resolve(&options.presets)?;
    let merged = presets::merge(&presets);
    let mut warnings = Vec::new();
    let rules = build_rules(options, &real_root, merged.rules, &mut warnings);
    let (matcher, skipped) = rules.compile(options.pattern_policy)?;
    warnings.extend(skipped.iter().map(Warning::pattern_skipped));
    let mut walk_options = WalkOptions {
        include_hidden: options.include_hidden,
        follow_links: options.follow_links,
        max_depth: options.max_depth,
        extensions: effective_extensions(options, merged.extensions),
        skip_files: options.output.canonicalize().into_iter().collect(),
        skip_names: Vec::new(),
    };
    for path in &options.exclude_files {
        walk_options.skip(path);
    }
    let walk = walker::walk(&options.root, Arc::new(matcher), &walk_options)?;
    warnings.extend(walk.warnings);
    let load_options = LoadOptions {
        threads: options.threads,
        classify: ClassifyPolicy {
            max_file_size: options.max_file_size,
            binary_detection: options.binary_detection,
        },
    };
    let blocks = loader::load_all(&walk.manifest, &load_options)?;
    warnings.extend(blocks.warnings(&walk.manifest));
    let mut counts = KindCounts::default();
    for entry in &walk.manifest {
        if let Some(block) = blocks.get(entry.id) {
            counts.record(&block.kind);
        }
    }
    let document = output::assemble(&walk.tree, &walk.manifest, &blocks);
    #[cfg(feature = "logging")]
    tracing::info!(
        "Assembled {} files, {} skipped paths ({} warnings)",
        walk.manifest.len(),
        walk.tree.skipped().len(),
        warnings.len()
    );
    Ok(Snapshot {
        document,
        manifest: walk.manifest,
        counts,
        skipped: walk.tree.skipped().to_vec(),
        warnings,
    })
}
/// Builds the document and writes it to [`CodesnapOptions::output`].
///
/// Nothing is written when the run fails.
pub fn run(options: &CodesnapOptions) -> Result<Report, CodesnapError> {
    let snapshot = snapshot(options)?;
    output::write_document(&snapshot.document, &options.output)?;
    #[cfg(feature = "logging")]
    tracing::info!("Wrote {}", options.output.display());
    Ok(Report::new(options.output.clone(), snapshot))
}
