//! Command-line interface definitions.
//!
//! Defines the argument parser and subcommands using clap's derive API.
//! Each subcommand corresponds to a distinct operation: reporting duplicate
//! imports, rewriting files, or listing scan targets.

use crate::dedupe::KeepPolicy;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Detect and merge duplicate imports in Go source files.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan files and report duplicate import groups without modifying anything.
    Check {
        /// Paths to scan. Defaults to current directory.
        #[arg(short, long)]
        paths: Option<Vec<PathBuf>>,

        /// Glob patterns for directories/files to exclude (e.g., "vendor", "*_test.go").
        /// By default, entries starting with `.` or `_` are excluded.
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Disable default exclusion of `.` and `_` prefixed entries.
        #[arg(long)]
        no_default_excludes: bool,

        /// Which duplicate to keep when merging a group.
        #[arg(short, long, value_enum, default_value = "unnamed")]
        keep: KeepPolicy,

        /// Package-name overrides in `import/path=name` format, consulted
        /// before the path-based guess for unaliased imports.
        #[arg(long, value_parser = parse_name)]
        name: Vec<(String, String)>,

        /// Emit JSON instead of human-readable output.
        #[arg(long)]
        json: bool,

        /// Print additional diagnostics to stderr.
        #[arg(short, long)]
        verbose: bool,
    },

    /// Merge duplicate imports and rewrite references that used them.
    Apply {
        /// Write results back to the files instead of previewing.
        #[arg(short, long)]
        write: bool,

        /// Show a unified diff of each change instead of the full file.
        #[arg(short, long)]
        diff: bool,

        /// Paths to scan. Defaults to current directory.
        #[arg(short, long)]
        paths: Option<Vec<PathBuf>>,

        /// Glob patterns for directories/files to exclude (e.g., "vendor", "*_test.go").
        /// By default, entries starting with `.` or `_` are excluded.
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Disable default exclusion of `.` and `_` prefixed entries.
        #[arg(long)]
        no_default_excludes: bool,

        /// Which duplicate to keep when merging a group.
        #[arg(short, long, value_enum, default_value = "unnamed")]
        keep: KeepPolicy,

        /// Package-name overrides in `import/path=name` format.
        #[arg(long, value_parser = parse_name)]
        name: Vec<(String, String)>,

        /// Trim duplicate import lines but leave references untouched.
        #[arg(long)]
        import_only: bool,
    },

    /// List files that would be scanned without processing them.
    Scan {
        /// Paths to scan. Defaults to current directory.
        #[arg(short, long)]
        paths: Option<Vec<PathBuf>>,

        /// Glob patterns for directories/files to exclude (e.g., "vendor", "*_test.go").
        /// By default, entries starting with `.` or `_` are excluded.
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Disable default exclusion of `.` and `_` prefixed entries.
        #[arg(long)]
        no_default_excludes: bool,
    },
}

fn parse_name(s: &str) -> Result<(String, String), String> {
    let parts: Vec<&str> = s.splitn(2, '=').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(format!("Invalid name format '{s}', expected 'import/path=name'"));
    }
    Ok((parts[0].to_string(), parts[1].to_string()))
}
