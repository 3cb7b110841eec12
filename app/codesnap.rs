//! Command-line interface for codesnap.
//!
//! Compiles a directory into a single markdown document and reports any files
//! that could only be annotated.

use clap::{ArgAction, Parser, ValueEnum};
use codesnap::presets::PRESETS;
use codesnap::{
    BinaryDetection, CodesnapBuilder, CodesnapOptions, DEFAULT_MAX_FILE_SIZE, DEFAULT_OUTPUT,
    PatternPolicy, Preset, Report, run,
};
use std::path::PathBuf;
use std::process::exit;

/// codesnap — compile a codebase into one markdown file
#[derive(Parser)]
#[command(name = "codesnap", version, about, long_about = None)]
struct Cli {
    /// Root directory (default current dir)
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Output markdown file
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Project preset (can be repeated)
    #[arg(short = 'p', long = "preset", value_parser = parse_preset)]
    presets: Vec<String>,

    /// File extension to include (can be repeated; default all)
    #[arg(short = 'e', long = "extension")]
    extensions: Vec<String>,

    /// Ignore pattern in .gitignore syntax (can be repeated, later wins)
    #[arg(short = 'I', long = "ignore")]
    ignore_patterns: Vec<String>,

    /// File to leave out, by path or by name (can be repeated)
    #[arg(short = 'x', long = "exclude-file")]
    exclude_files: Vec<PathBuf>,

    /// Do not read the root .gitignore
    #[arg(long)]
    no_gitignore: bool,

    /// Do not skip .git, node_modules, venv and similar folders
    #[arg(long)]
    no_default_excludes: bool,

    /// Include hidden files and folders
    #[arg(long)]
    hidden: bool,

    /// Follow symlinks
    #[arg(long)]
    follow_links: bool,

    /// Max depth (unlimited if not set)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Files larger than this many bytes are annotated instead of read
    #[arg(long, default_value_t = DEFAULT_MAX_FILE_SIZE)]
    max_size: u64,

    /// Read files of any size
    #[arg(long, conflicts_with = "max_size")]
    no_size_limit: bool,

    /// Reader threads (0 = number of CPUs)
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Binary detection strategy
    #[arg(long, default_value = "accurate", value_parser = parse_binary_detection)]
    binary_detection: BinaryDetection,

    /// Drop invalid ignore patterns instead of failing
    #[arg(long)]
    skip_bad_patterns: bool,

    /// How to print the run summary
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    report: ReportFormat,

    /// List available presets and exit
    #[arg(long)]
    list_presets: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[cfg_attr(not(feature = "logging"), allow(dead_code))]
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

/// Parse string into BinaryDetection enum.
fn parse_binary_detection(s: &str) -> Result<BinaryDetection, String> {
    match s {
        "simple" => Ok(BinaryDetection::Simple),
        "accurate" => Ok(BinaryDetection::Accurate),
        "none" => Ok(BinaryDetection::None),
        _ => Err(format!("invalid binary detection method: {}", s)),
    }
}

/// Accept a preset name or alias.
fn parse_preset(s: &str) -> Result<String, String> {
    match Preset::find(s) {
        Some(preset) => Ok(preset.name.to_string()),
        None => {
            let names: Vec<_> = PRESETS.iter().map(|p| p.name).collect();
            Err(format!("unknown preset '{}' (available: {})", s, names.join(", ")))
        }
    }
}

impl Cli {
    fn into_options(self) -> (CodesnapOptions, ReportFormat) {
        let max_file_size = if self.no_size_limit {
            None
        } else {
            Some(self.max_size)
        };
        let policy = if self.skip_bad_patterns {
            PatternPolicy::Skip
        } else {
            PatternPolicy::Abort
        };
        let options = CodesnapBuilder::new(self.root)
            .output(self.output)
            .presets(self.presets)
            .extensions(self.extensions)
            .ignore_patterns(self.ignore_patterns)
            .exclude_files(self.exclude_files)
            .respect_gitignore(!self.no_gitignore)
            .default_excludes(!self.no_default_excludes)
            .include_hidden(self.hidden)
            .follow_links(self.follow_links)
            .max_depth(self.max_depth)
            .max_file_size(max_file_size)
            .threads(self.threads)
            .binary_detection(self.binary_detection)
            .pattern_policy(policy)
            .build();
        (options, self.report)
    }
}

#[cfg(feature = "logging")]
fn init_logging(verbose: u8) {
    use tracing_subscriber::fmt;
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    init_logging(cli.verbose);

    if cli.list_presets {
        print_presets();
        return;
    }

    let (options, format) = cli.into_options();
    match run(&options) {
        Ok(report) => output_report(&report, format),
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        }
    }
}

fn print_presets() {
    for preset in PRESETS {
        println!("{:<22} {}", preset.name, preset.description);
        if !preset.aliases.is_empty() {
            println!("{:<22} aliases: {}", "", preset.aliases.join(", "));
        }
    }
}

fn output_report(report: &Report, format: ReportFormat) {
    match format {
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(report).unwrap_or_else(|e| {
                eprintln!("JSON serialization error: {}", e);
                exit(1);
            });
            println!("{}", json);
        }
        ReportFormat::Text => {
            for warning in &report.warnings {
                eprintln!("warning: {}", warning);
            }
            let c = &report.counts;
            println!(
                "Wrote {} files to {} ({} text, {} binary, {} too large, {} unreadable)",
                c.total(),
                report.output.display(),
                c.text,
                c.binary,
                c.too_large,
                c.unreadable
            );
            if !report.skipped.is_empty() {
                println!("Skipped {} paths:", report.skipped.len());
                for path in &report.skipped {
                    println!("  {} ({})", path.display_path(), path.reason.label());
                }
            }
        }
    }
}
