//! Document assembly.
//!
//! [`assemble`] is pure: the same tree, manifest and blocks always give the
//! same bytes, whatever order the blocks were produced in.

use crate::error::CodesnapError;
use crate::loader::LoadedBlocks;
use crate::tree::DocumentTree;
use crate::types::{ContentBlock, ContentKind, Manifest, SkippedPath};
use std::fs;
use std::path::Path;

pub const TITLE: &str = "# Compiled Codebase";
pub const STRUCTURE_HEADING: &str = "## Folder Structure";
pub const SKIPPED_HEADING: &str = "## Skipped Paths";
pub const BINARY_NOTICE: &str = "[Binary file content not displayed]";
pub const MISSING_NOTICE: &str = "[Content missing]";

/// Renders the folder diagram followed by one section per manifest entry.
pub fn assemble(tree: &DocumentTree, manifest: &Manifest, blocks: &LoadedBlocks) -> String {
    let mut out = String::with_capacity(1024);
    out.push_str(TITLE);
    out.push_str("\n\n");
    out.push_str(STRUCTURE_HEADING);
    out.push_str("\n\n");
    push_fenced(&mut out, "text", &tree.render());
    push_skipped(&mut out, tree.skipped());

    for entry in manifest {
        out.push_str(&format!("## {}\n\n", entry.display_path()));
        match blocks.get(entry.id) {
            Some(block) => push_block(&mut out, block),
            None => {
                out.push_str(MISSING_NOTICE);
                out.push_str("\n\n");
            }
        }
    }
    out
}

/// Writes `document` to `path`, creating parent directories.
pub fn write_document(document: &str, path: impl AsRef<Path>) -> Result<(), CodesnapError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| CodesnapError::io(parent, e))?;
    }
    fs::write(path, document).map_err(|e| CodesnapError::io(path, e))?;
    Ok(())
}

/// The annotation shown in place of content for non-text blocks.
pub fn placeholder(kind: &ContentKind) -> Option<String> {
    match kind {
        ContentKind::Text { .. } => None,
        ContentKind::Binary => Some(BINARY_NOTICE.to_string()),
        ContentKind::TooLarge { size, limit } => Some(format!(
            "[File too large ({size} bytes, limit {limit} bytes), content not displayed]"
        )),
        ContentKind::Unreadable { message } => Some(format!("[Unreadable file: {message}]")),
    }
}

/// Lists paths the walk could not enter, in diagram order.
fn push_skipped(out: &mut String, skipped: &[SkippedPath]) {
    if skipped.is_empty() {
        return;
    }
    out.push_str(SKIPPED_HEADING);
    out.push_str("\n\n");
    for path in skipped {
        out.push_str(&format!(
            "- `{}` ({}): {}\n",
            path.display_path(),
            path.reason.label(),
            path.detail
        ));
    }
    out.push('\n');
}

fn push_block(out: &mut String, block: &ContentBlock) {
    match (&block.kind, &block.text) {
        (ContentKind::Text { language }, Some(text)) => push_fenced(out, language, text),
        (kind, _) => {
            out.push_str(&placeholder(kind).unwrap_or_else(|| MISSING_NOTICE.to_string()));
            out.push_str("\n\n");
        }
    }
}

fn push_fenced(out: &mut String, language: &str, content: &str) {
    let fence = fence_for(content);
    out.push_str(&fence);
    out.push_str(language);
    out.push('\n');
    out.push_str(content);
    if !content.is_empty() && !content.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&fence);
    out.push_str("\n\n");
}

/// A backtick fence longer than any backtick run inside `content`.
fn fence_for(content: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for c in content.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    "`".repeat((longest + 1).max(3))
}
