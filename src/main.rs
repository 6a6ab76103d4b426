//! dupe-imports: Detect and merge duplicate imports in Go source files.
//!
//! This tool scans Go files for import declarations that import the same
//! path more than once, keeps one spec per path according to the chosen
//! policy, removes the rest, and rewrites qualified references that used a
//! removed spec's name. Renames that an enclosing scope would capture are
//! refused and reported instead.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use dupe_imports::cli::{Args, Commands};
use dupe_imports::{Config, Error, FileReport, KeepPolicy, Outcome, scanner};
use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();

    let result = match args.command {
        Commands::Check {
            paths,
            exclude,
            no_default_excludes,
            keep,
            name,
            json,
            verbose,
        } => cmd_check(
            paths,
            &exclude,
            no_default_excludes,
            make_config(keep, false, name),
            json,
            verbose,
        ),
        Commands::Apply {
            write,
            diff,
            paths,
            exclude,
            no_default_excludes,
            keep,
            name,
            import_only,
        } => cmd_apply(
            write,
            diff,
            paths,
            &exclude,
            no_default_excludes,
            make_config(keep, import_only, name),
        ),
        Commands::Scan {
            paths,
            exclude,
            no_default_excludes,
        } => cmd_scan(paths, &exclude, no_default_excludes).map(|()| ExitCode::SUCCESS),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::from(2)
        }
    }
}

fn make_config(
    policy: KeepPolicy,
    import_only: bool,
    names: Vec<(String, String)>,
) -> Config {
    Config {
        policy,
        import_only,
        names: names.into_iter().collect::<HashMap<_, _>>(),
    }
}

/// Diagnostics from a check run.
#[derive(Debug, Default, Serialize)]
struct Diagnostics {
    files_scanned: usize,
    files_with_duplicates: usize,
    duplicate_groups: usize,
    violations: usize,
    parse_failures: usize,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    files: Vec<FileReport>,
    diagnostics: Diagnostics,
}

fn cmd_check(
    paths: Option<Vec<PathBuf>>,
    exclude: &[String],
    no_default_excludes: bool,
    config: Config,
    json_output: bool,
    verbose: bool,
) -> Result<ExitCode> {
    let scan_paths = paths.unwrap_or_else(|| vec![PathBuf::from(".")]);
    let files = scanner::collect_go_files(&scan_paths, exclude, !no_default_excludes)?;
    if verbose {
        eprintln!(
            "{} Found {} .go files to scan",
            "info:".blue().bold(),
            files.len()
        );
    }

    let mut reports = Vec::new();
    let mut parse_failures = 0;

    for file in &files {
        let source = std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        match dupe_imports::check_source(&source, file, &config) {
            Ok(report) if report.is_clean() => {}
            Ok(report) => reports.push(report),
            Err(err @ Error::Parse { .. }) => {
                eprintln!("{} {err}", "warn:".yellow().bold());
                parse_failures += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }

    let diagnostics = Diagnostics {
        files_scanned: files.len(),
        files_with_duplicates: reports.iter().filter(|r| !r.groups.is_empty()).count(),
        duplicate_groups: reports.iter().map(|r| r.groups.len()).sum(),
        violations: reports.iter().map(|r| r.violations.len()).sum(),
        parse_failures,
    };

    let dirty = !reports.is_empty() || parse_failures > 0;
    let result = CheckResult {
        files: reports,
        diagnostics,
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_check_result(&result, verbose);
    }

    Ok(if dirty {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}

fn print_check_result(result: &CheckResult, verbose: bool) {
    if verbose {
        let d = &result.diagnostics;
        println!(
            "\n{} Files: {}, with duplicates: {}, groups: {}, violations: {}",
            "Diagnostics:".bold(),
            d.files_scanned,
            d.files_with_duplicates,
            d.duplicate_groups,
            d.violations
        );
    }

    if result.files.is_empty() {
        println!("{} No duplicate imports found", "ok:".green().bold());
        return;
    }

    for report in &result.files {
        println!("\n{}", report.file.display().to_string().bold());
        for group in &report.groups {
            println!(
                "  {} imported {} times, keeping {}",
                group.path.cyan(),
                group.removed.len() + 1,
                group.kept.green()
            );
            for removed in &group.removed {
                println!("    {} {}", "drop".red(), removed.red());
            }
        }
        for violation in &report.violations {
            println!("  {} {violation}", "blocked:".yellow().bold());
        }
    }
}

fn cmd_apply(
    write: bool,
    diff: bool,
    paths: Option<Vec<PathBuf>>,
    exclude: &[String],
    no_default_excludes: bool,
    config: Config,
) -> Result<ExitCode> {
    let scan_paths = paths.unwrap_or_else(|| vec![PathBuf::from(".")]);
    let files = scanner::collect_go_files(&scan_paths, exclude, !no_default_excludes)?;

    let mut changed = 0usize;
    let mut failed = 0usize;

    for file in &files {
        let source = std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;

        let new_source = match dupe_imports::process_source(&source, file, &config) {
            Ok(Outcome::Unchanged) => continue,
            Ok(Outcome::Changed(out)) => out,
            Err(err) => {
                // a bad file never aborts the rest of the batch
                eprintln!("{} {err}", "error:".red().bold());
                failed += 1;
                continue;
            }
        };
        changed += 1;

        println!(
            "{} {}",
            if write { "Updating:" } else { "Would update:" }
                .yellow()
                .bold(),
            file.display()
        );
        if let Ok(report) = dupe_imports::check_source(&source, file, &config) {
            for group in &report.groups {
                println!(
                    "  {}: {} {} {}",
                    group.path,
                    group.removed.join(", ").red(),
                    "->".dimmed(),
                    group.kept.green()
                );
            }
        }
        if diff {
            print_diff(file, &source, &new_source);
        }
        if write {
            std::fs::write(file, &new_source)
                .with_context(|| format!("Failed to write {}", file.display()))?;
        }
    }

    if changed == 0 && failed == 0 {
        println!("{} No changes to apply", "info:".blue().bold());
    } else if !write {
        println!("\n{} Use --write to apply changes", "hint:".cyan().bold());
    }

    Ok(if failed > 0 {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}

fn print_diff(path: &Path, old: &str, new: &str) {
    let diff = TextDiff::from_lines(old, new);
    println!("--- {}", path.display());
    println!("+++ {}", path.display());
    for hunk in diff.unified_diff().context_radius(3).iter_hunks() {
        println!("{}", hunk.header().to_string().dimmed());
        for change in hunk.iter_changes() {
            match change.tag() {
                ChangeTag::Delete => print!("{}", format!("-{change}").red()),
                ChangeTag::Insert => print!("{}", format!("+{change}").green()),
                ChangeTag::Equal => print!(" {change}"),
            }
            if change.missing_newline() {
                println!();
            }
        }
    }
}

fn cmd_scan(
    paths: Option<Vec<PathBuf>>,
    exclude: &[String],
    no_default_excludes: bool,
) -> Result<()> {
    let scan_paths = paths.unwrap_or_else(|| vec![PathBuf::from(".")]);
    let files = scanner::collect_go_files(&scan_paths, exclude, !no_default_excludes)?;

    println!("Would scan {} files:", files.len());
    for file in files {
        println!("  {}", file.display());
    }

    Ok(())
}
