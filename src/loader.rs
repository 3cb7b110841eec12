//! Concurrent classification and reading of manifest entries.
//!
//! Entries are handed out in manifest order and may finish in any order. Each
//! worker produces exactly one [`ContentBlock`] keyed by its [`EntryId`]; the
//! assembler restores manifest order later.

use crate::classify::{ClassifyPolicy, Probe, classify};
use crate::error::{CodesnapError, Warning, WarningKind};
use crate::types::{ContentBlock, ContentKind, EntryId, Manifest, ManifestEntry};
use dashmap::DashMap;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::collections::HashMap;
use std::io::Read;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Worker count; 0 picks available parallelism.
    pub threads: usize,
    pub classify: ClassifyPolicy,
}

/// Blocks keyed by entry, in no particular order.
#[derive(Debug, Clone, Default)]
pub struct LoadedBlocks {
    blocks: HashMap<EntryId, ContentBlock>,
}

impl LoadedBlocks {
    pub fn get(&self, id: EntryId) -> Option<&ContentBlock> {
        self.blocks.get(&id)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Warnings for skipped or unreadable files, in manifest order.
    pub fn warnings(&self, manifest: &Manifest) -> Vec<Warning> {
        manifest
            .iter()
            .filter_map(|entry| {
                let block = self.blocks.get(&entry.id)?;
                match &block.kind {
                    ContentKind::Unreadable { message } => Some(Warning::new(
                        &entry.relative,
                        format!("Unreadable: {message}"),
                        WarningKind::Unreadable,
                    )),
                    ContentKind::TooLarge { size, limit } => Some(Warning::new(
                        &entry.relative,
                        format!("Skipped: {size} bytes exceeds limit of {limit}"),
                        WarningKind::Oversized,
                    )),
                    _ => None,
                }
            })
            .collect()
    }
}

impl FromIterator<ContentBlock> for LoadedBlocks {
    fn from_iter<I: IntoIterator<Item = ContentBlock>>(iter: I) -> Self {
        Self {
            blocks: iter.into_iter().map(|b| (b.id, b)).collect(),
        }
    }
}

/// Shared sink for worker results.
struct Collector {
    blocks: DashMap<EntryId, ContentBlock>,
}

impl Collector {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            blocks: DashMap::with_capacity(capacity),
        }
    }

    fn insert(&self, block: ContentBlock) {
        if let Some(_previous) = self.blocks.insert(block.id, block) {
            #[cfg(feature = "logging")]
            tracing::error!("Entry {:?} produced more than one block", _previous.id);
        }
    }

    fn finish(self) -> LoadedBlocks {
        LoadedBlocks {
            blocks: self.blocks.into_iter().collect(),
        }
    }
}

/// Loads every entry of `manifest`.
///
/// A bad file never stops its siblings: every entry ends up with exactly one
/// block, possibly a placeholder. The only error is failing to start the
/// worker pool.
pub fn load_all(manifest: &Manifest, options: &LoadOptions) -> Result<LoadedBlocks, CodesnapError> {
    let collector = Collector::with_capacity(manifest.len());
    #[cfg(feature = "parallel")]
    fan_out_parallel(manifest, options, &collector)?;
    #[cfg(not(feature = "parallel"))]
    fan_out(manifest, options, &collector);
    let blocks = collector.finish();
    #[cfg(feature = "logging")]
    tracing::debug!("Loaded {} of {} entries", blocks.len(), manifest.len());
    Ok(blocks)
}

#[cfg(feature = "parallel")]
fn fan_out_parallel(
    manifest: &Manifest,
    options: &LoadOptions,
    collector: &Collector,
) -> Result<(), CodesnapError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.threads)
        .thread_name(|i| format!("codesnap-load-{i}"))
        .build()
        .map_err(|e| CodesnapError::ThreadPool(e.to_string()))?;
    pool.install(|| {
        manifest
            .entries()
            .par_iter()
            .for_each(|entry| collector.insert(load_entry(entry, &options.classify)));
    });
    Ok(())
}

#[cfg(not(feature = "parallel"))]
fn fan_out(manifest: &Manifest, options: &LoadOptions, collector: &Collector) {
    for entry in manifest {
        collector.insert(load_entry(entry, &options.classify));
    }
}

/// Classifies and reads one entry end to end.
pub fn load_entry(entry: &ManifestEntry, policy: &ClassifyPolicy) -> ContentBlock {
    let classified = classify(&entry.path, policy);
    match (classified.kind, classified.probe) {
        (ContentKind::Text { language }, Some(probe)) => match read_rest(probe) {
            Ok(text) => ContentBlock::text(entry.id, language, text),
            Err(e) => {
                #[cfg(feature = "logging")]
                tracing::warn!("Failed reading {}: {}", entry.path.display(), e);
                ContentBlock::placeholder(
                    entry.id,
                    ContentKind::Unreadable {
                        message: e.to_string(),
                    },
                )
            }
        },
        (kind, _) => ContentBlock::placeholder(entry.id, kind),
    }
}

fn read_rest(probe: Probe) -> std::io::Result<String> {
    let Probe { mut head, mut reader } = probe;
    reader.read_to_end(&mut head)?;
    Ok(normalize(&String::from_utf8_lossy(&head)))
}

/// Strips a UTF-8 BOM and turns CRLF and lone CR into LF.
pub fn normalize(text: &str) -> String {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::BinaryDetection;
    use crate::tree::DocumentTree;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::tempdir;

    fn options(threads: usize) -> LoadOptions {
        LoadOptions {
            threads,
            classify: ClassifyPolicy {
                max_file_size: Some(1024),
                binary_detection: BinaryDetection::Accurate,
            },
        }
    }

    fn manifest_for(root: &Path, names: &[&str]) -> Manifest {
        let files = names
            .iter()
            .map(|n| (PathBuf::from(n), root.join(n)))
            .collect();
        DocumentTree::build("root", files, Vec::new()).1
    }

    #[test]
    fn normalize_line_endings() {
        assert_eq!(normalize("\u{feff}a\r\nb\rc\n"), "a\nb\nc\n");
        assert_eq!(normalize("plain\n"), "plain\n");
    }

    #[test]
    fn every_entry_gets_one_block() {
        let dir = tempdir().unwrap();
        let mut names = Vec::new();
        for i in 0..40 {
            let name = format!("f{i:02}.txt");
            fs::write(dir.path().join(&name), format!("file {i}")).unwrap();
            names.push(name);
        }
        fs::write(dir.path().join("bin.dat"), [0u8, 1, 2]).unwrap();
        fs::write(dir.path().join("big.txt"), "x".repeat(2048)).unwrap();
        names.push("bin.dat".into());
        names.push("big.txt".into());
        names.push("missing.txt".into());
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let manifest = manifest_for(dir.path(), &refs);

        let blocks = load_all(&manifest, &options(4)).unwrap();
        assert_eq!(blocks.len(), manifest.len());
        for entry in &manifest {
            let block = blocks.get(entry.id).unwrap();
            assert_eq!(block.id, entry.id);
        }

        let warnings = blocks.warnings(&manifest);
        let kinds: Vec<_> = warnings.iter().map(|w| w.kind).collect();
        assert_eq!(kinds, [WarningKind::Oversized, WarningKind::Unreadable]);
    }

    #[test]
    fn text_content_is_read_past_the_probe() {
        let dir = tempdir().unwrap();
        let body = "line\r\n".repeat(3000);
        fs::write(dir.path().join("long.txt"), &body).unwrap();
        let manifest = manifest_for(dir.path(), &["long.txt"]);
        let mut opts = options(2);
        opts.classify.max_file_size = None;
        let blocks = load_all(&manifest, &opts).unwrap();
        let text = blocks.get(EntryId(0)).unwrap().text.as_deref().unwrap();
        assert_eq!(text, "line\n".repeat(3000));
    }

    #[test]
    fn thread_count_does_not_change_blocks() {
        let dir = tempdir().unwrap();
        let names: Vec<String> = (0..25).map(|i| format!("m{i}.rs")).collect();
        for name in &names {
            fs::write(dir.path().join(name), format!("// {name}")).unwrap();
        }
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let manifest = manifest_for(dir.path(), &refs);
        let one = load_all(&manifest, &options(1)).unwrap();
        let many = load_all(&manifest, &options(8)).unwrap();
        for entry in &manifest {
            assert_eq!(one.get(entry.id), many.get(entry.id));
        }
    }
}
