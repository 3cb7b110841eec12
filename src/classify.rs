//! Text/binary/oversized/unreadable classification of a single file.

use crate::options::BinaryDetection;
use crate::types::ContentKind;
use content_inspector::ContentType;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;

/// Bytes inspected before deciding text versus binary.
pub const PROBE_BYTES: usize = 8192;
/// Share of control bytes above which a prefix counts as binary.
const CONTROL_RATIO: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifyPolicy {
    pub max_file_size: Option<u64>,
    pub binary_detection: BinaryDetection,
}

/// The already-read prefix and an open reader positioned right after it.
pub struct Probe {
    pub head: Vec<u8>,
    pub reader: BufReader<File>,
}

pub struct ClassifiedFile {
    pub kind: ContentKind,
    /// Present only for text, so the loader can continue where the probe stopped.
    pub probe: Option<Probe>,
}

impl ClassifiedFile {
    fn placeholder(kind: ContentKind) -> Self {
        Self { kind, probe: None }
    }

    fn unreadable(error: std::io::Error) -> Self {
        Self::placeholder(ContentKind::Unreadable {
            message: error.to_string(),
        })
    }
}

/// Classifies the file at `path`. Never fails; I/O errors become
/// [`ContentKind::Unreadable`].
pub fn classify(path: &Path, policy: &ClassifyPolicy) -> ClassifiedFile {
    let metadata = match fs::metadata(path) {
        Ok(m) => m,
        Err(e) => return ClassifiedFile::unreadable(e),
    };
    if let Some(limit) = policy.max_file_size {
        if metadata.len() > limit {
            #[cfg(feature = "logging")]
            tracing::debug!(
                "File too large ({} > {}): {}",
                metadata.len(),
                limit,
                path.display()
            );
            return ClassifiedFile::placeholder(ContentKind::TooLarge {
                size: metadata.len(),
                limit,
            });
        }
    }

    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => return ClassifiedFile::unreadable(e),
    };
    let mut reader = BufReader::new(file);
    let mut head = Vec::with_capacity(PROBE_BYTES);
    if let Err(e) = reader
        .by_ref()
        .take(PROBE_BYTES as u64)
        .read_to_end(&mut head)
    {
        return ClassifiedFile::unreadable(e);
    }

    if is_binary(&head, policy.binary_detection) {
        #[cfg(feature = "logging")]
        tracing::debug!("Binary file detected: {}", path.display());
        return ClassifiedFile::placeholder(ContentKind::Binary);
    }

    ClassifiedFile {
        kind: ContentKind::Text {
            language: language_for(path),
        },
        probe: Some(Probe { head, reader }),
    }
}

/// Applies `method` to a probed prefix.
pub fn is_binary(head: &[u8], method: BinaryDetection) -> bool {
    match method {
        BinaryDetection::Simple => head.contains(&0),
        BinaryDetection::Accurate => {
            let utf8 = matches!(
                content_inspector::inspect(head),
                ContentType::UTF_8 | ContentType::UTF_8_BOM
            );
            !utf8 || control_ratio(head) > CONTROL_RATIO
        }
        BinaryDetection::None => false,
    }
}

fn control_ratio(head: &[u8]) -> f64 {
    if head.is_empty() {
        return 0.0;
    }
    let control = head
        .iter()
        .filter(|&&b| (b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r' | 0x0c | 0x1b)) || b == 0x7f)
        .count();
    control as f64 / head.len() as f64
}

/// Fence label for a text file: a known language, else the lowercase
/// extension, else empty.
pub fn language_for(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    if let Some(lang) = language_from_name(&name) {
        return lang.to_string();
    }
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match language_from_extension(&ext) {
        Some(lang) => lang.to_string(),
        None => ext,
    }
}

fn language_from_name(name: &str) -> Option<&'static str> {
    Some(match name {
        "dockerfile" | "containerfile" => "dockerfile",
        "makefile" | "gnumakefile" => "makefile",
        "cmakelists.txt" => "cmake",
        "cargo.lock" => "toml",
        _ => return None,
    })
}

fn language_from_extension(ext: &str) -> Option<&'static str> {
    Some(match ext {
        "rs" => "rust", "toml" => "toml", "json" | "jsonc" => "json",
        "md" | "markdown" | "mdx" => "markdown", "rst" => "rst", "txt" => "text",
        "html" | "htm" => "html", "css" => "css", "scss" => "scss", "sass" => "sass",
        "less" => "less", "js" | "mjs" | "cjs" => "javascript", "jsx" => "jsx",
        "ts" => "typescript", "tsx" => "tsx", "vue" => "vue", "svelte" => "svelte",
        "py" | "pyi" => "python", "sh" | "bash" => "bash", "yml" | "yaml" => "yaml",
        "xml" | "plist" | "svg" => "xml", "ini" | "cfg" | "conf" => "ini",
        "c" | "h" => "c", "cpp" | "cc" | "cxx" | "hpp" => "cpp", "asm" | "s" => "asm",
        "go" => "go", "zig" => "zig", "rb" | "erb" => "ruby", "php" => "php",
        "swift" => "swift", "m" => "objectivec", "kt" | "kts" => "kotlin",
        "java" => "java", "gradle" => "groovy", "scala" => "scala", "dart" => "dart",
        "r" => "r", "rmd" => "rmarkdown", "sql" => "sql", "tf" | "hcl" => "hcl",
        "mk" => "makefile", "cmake" => "cmake",
        _ => return None,
    })
}
