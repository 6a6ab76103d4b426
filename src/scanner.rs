//! Go file scanner.
//!
//! Recursively walks directories to collect `.go` files, skipping entries
//! whose names start with `.` or `_` (testdata conventions aside, the Go
//! toolchain ignores these too) plus any user-supplied exclude patterns.

use anyhow::{Context, Result};
use std::path::PathBuf;
use walkdir::WalkDir;

/// Collects all `.go` files under `paths`. Files passed directly are taken
/// as-is even when a pattern or the default excludes would skip them.
pub fn collect_go_files(
    paths: &[PathBuf],
    exclude: &[String],
    use_default_excludes: bool,
) -> Result<Vec<PathBuf>> {
    let patterns = exclude
        .iter()
        .map(|p| {
            glob::Pattern::new(p).with_context(|| format!("Invalid exclude pattern: {p}"))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }
        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            // depth 0 is the walk root itself, which may legitimately be
            // named `.` or live under a dot directory
            .filter_entry(|e| {
                e.depth() == 0
                    || !((use_default_excludes && is_hidden_or_underscore(e))
                        || matches_any(e, &patterns))
            })
        {
            let entry = entry?;
            if entry.file_type().is_file()
                && entry.path().extension().is_some_and(|ext| ext == "go")
            {
                files.push(entry.into_path());
            }
        }
    }

    Ok(files)
}

fn is_hidden_or_underscore(entry: &walkdir::DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|s| s.starts_with('.') || s.starts_with('_'))
}

fn matches_any(entry: &walkdir::DirEntry, patterns: &[glob::Pattern]) -> bool {
    patterns.iter().any(|p| {
        p.matches_path(entry.path())
            || entry.file_name().to_str().is_some_and(|name| p.matches(name))
    })
}
