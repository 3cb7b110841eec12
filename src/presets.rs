//! Named rule bundles for common project layouts.
//!
//! A preset is plain data: an extension allowlist plus folder names to skip.
//! [`merge`] turns the folders into directory-only ignore rules so the matcher
//! never needs to know presets exist.

use crate::error::CodesnapError;
use crate::pattern::{RuleSet, RuleSource};

/// Folders skipped unless default excludes are turned off.
pub const DEFAULT_EXCLUDED_FOLDERS: &[&str] = &[
    ".git",
    ".idea",
    ".vscode",
    "venv",
    "__pycache__",
    "node_modules",
    "tests",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub description: &'static str,
    pub extensions: &'static [&'static str],
    pub exclude_folders: &'static [&'static str],
}

pub const PRESETS: &[Preset] = &[
    Preset {
        name: "python",
        aliases: &["py"],
        description: "Python projects",
        extensions: &[
            "py", "pyi", "toml", "ini", "cfg", "yml", "yaml", "txt", "md", "rst", "dockerfile",
        ],
        exclude_folders: &[
            "venv",
            ".venv",
            "env",
            ".env",
            "__pycache__",
            ".pytest_cache",
            "build",
            "dist",
            "*.egg-info",
            ".tox",
            ".mypy_cache",
            ".coverage",
            "htmlcov",
        ],
    },
    Preset {
        name: "js",
        aliases: &["javascript", "ts", "typescript"],
        description: "JavaScript/TypeScript projects",
        extensions: &[
            "js", "jsx", "ts", "tsx", "vue", "svelte", "json", "jsonc", "html", "css", "scss",
            "sass", "less", "mjs", "cjs", "md", "mdx", "lock",
        ],
        exclude_folders: &[
            "node_modules",
            "dist",
            "build",
            "coverage",
            ".next",
            ".nuxt",
            ".cache",
            ".parcel-cache",
        ],
    },
    Preset {
        name: "lowlevel",
        aliases: &["systems"],
        description: "Low-level programming projects",
        extensions: &[
            "c", "h", "cpp", "hpp", "cc", "cxx", "asm", "s", "rs", "go", "zig", "mk", "makefile",
            "cmake", "txt", "md",
        ],
        exclude_folders: &["build", "bin", "obj", "target", "debug", "release", "deps"],
    },
    Preset {
        name: "ml",
        aliases: &["machine-learning"],
        description: "Machine learning projects",
        extensions: &[
            "py", "yaml", "yml", "json", "txt", "md", "rst", "dockerfile", "cfg",
        ],
        exclude_folders: &[
            "venv",
            ".venv",
            "__pycache__",
            "data",
            "datasets",
            "checkpoints",
            "runs",
            "logs",
            "tensorboard",
            "wandb",
            "mlruns",
            "models",
        ],
    },
    Preset {
        name: "datascience",
        aliases: &["ds"],
        description: "Data science projects",
        extensions: &[
            "py", "r", "rmd", "sql", "yaml", "yml", "txt", "md", "dockerfile",
        ],
        exclude_folders: &[
            "venv",
            ".venv",
            "__pycache__",
            "data",
            "raw_data",
            "processed_data",
            "interim",
            "external",
            "figures",
            "results",
            "outputs",
        ],
    },
    Preset {
        name: "web",
        aliases: &[],
        description: "Web development projects",
        extensions: &[
            "html", "htm", "css", "scss", "sass", "less", "js", "ts", "jsx", "tsx", "php", "rb",
            "erb", "json", "md", "svg", "xml", "webmanifest",
        ],
        exclude_folders: &[
            "node_modules",
            "vendor",
            "dist",
            "build",
            "public/assets",
            "tmp",
            "cache",
            ".sass-cache",
        ],
    },
    Preset {
        name: "devops",
        aliases: &["infra"],
        description: "DevOps and infrastructure projects",
        extensions: &[
            "yml", "yaml", "tf", "hcl", "dockerfile", "conf", "sh", "bash", "json", "toml", "ini",
            "env", "md", "txt",
        ],
        exclude_folders: &[
            ".terraform",
            "terraform.tfstate.d",
            "charts",
            "manifests",
            "secrets",
            "keys",
            "certs",
            "logs",
        ],
    },
    Preset {
        name: "mobile",
        aliases: &[],
        description: "Mobile app projects",
        extensions: &[
            "kt", "java", "xml", "gradle", "swift", "m", "h", "plist", "dart", "yaml", "json",
            "md",
        ],
        exclude_folders: &[
            "build",
            ".gradle",
            ".idea",
            "Pods",
            "DerivedData",
            ".dart_tool",
            "ios/Pods",
        ],
    },
    Preset {
        name: "fullstack_js_python",
        aliases: &["fullstack"],
        description: "React/Vue frontends with Flask/Django backends",
        extensions: &[
            "js", "jsx", "ts", "tsx", "vue", "css", "scss", "sass", "html", "json", "svg", "py",
            "pyi", "yml", "yaml", "toml", "ini", "md", "rst", "txt", "dockerfile", "env",
            "gitignore",
        ],
        exclude_folders: &[
            "node_modules",
            "build",
            "dist",
            ".next",
            ".nuxt",
            ".cache",
            "venv",
            ".venv",
            "__pycache__",
            "*.egg-info",
            ".pytest_cache",
            ".git",
            ".idea",
            ".vscode",
        ],
    },
    Preset {
        name: "fullstack_mobile",
        aliases: &[],
        description: "Mobile apps with a backend",
        extensions: &[
            "kt", "java", "swift", "dart", "py", "go", "rs", "yml", "json", "md", "dockerfile",
        ],
        exclude_folders: &[
            "Pods",
            "build",
            ".gradle",
            "venv",
            "__pycache__",
            ".git",
            "node_modules",
        ],
    },
];

impl Preset {
    /// Looks a preset up by name or alias, case-insensitively.
    pub fn find(name: &str) -> Option<&'static Preset> {
        let name = name.trim().to_ascii_lowercase().replace('-', "_");
        PRESETS.iter().find(|p| {
            p.name == name
                || p
                    .aliases
                    .iter()
                    .any(|a| a.replace('-', "_") == name)
        })
    }

    /// Resolves every name, failing on the first unknown one.
    pub fn resolve<S: AsRef<str>>(names: &[S]) -> Result<Vec<&'static Preset>, CodesnapError> {
        names
            .iter()
            .map(|n| {
                let n = n.as_ref();
                Preset::find(n).ok_or_else(|| CodesnapError::UnknownPreset(n.to_string()))
            })
            .collect()
    }
}

/// Merges several presets in order, dropping repeated folders and extensions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedPresets {
    pub extensions: Vec<String>,
    pub rules: RuleSet,
}

pub fn merge(presets: &[&Preset]) -> MergedPresets {
    let mut merged = MergedPresets::default();
    let mut seen_folders: Vec<&str> = Vec::new();
    for preset in presets {
        for ext in preset.extensions {
            if !merged.extensions.iter().any(|e| e == ext) {
                merged.extensions.push(ext.to_string());
            }
        }
        for folder in preset.exclude_folders {
            if !seen_folders.contains(folder) {
                seen_folders.push(folder);
                merged.rules.push(
                    &format!("{folder}/"),
                    RuleSource::Preset(preset.name.to_string()),
                );
            }
        }
    }
    merged
}
