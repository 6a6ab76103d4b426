//! Per-file pipeline.
//!
//! Runs resolve → trim → scope build → rewrite over one file's source and
//! produces either the rewritten text or a structured failure. Each file is
//! a self-contained unit of work: the scope tree, rules, and diagnostics
//! built here never outlive the call, and files in a batch share nothing,
//! so callers are free to process them independently.

use crate::dedupe::{self, GroupSummary, KeepPolicy};
use crate::imports;
use crate::rewrite::{self, RewriteError, Violation};
use crate::scope::ScopeTree;
use crate::syntax;
use crate::trim;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tree_sitter::Tree;

/// Pipeline options for one invocation.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub policy: KeepPolicy,
    /// Trim duplicate imports but leave qualified references untouched.
    pub import_only: bool,
    /// Explicit import-path to package-name overrides, consulted before
    /// the guessing heuristic for unaliased specs.
    pub names: HashMap<String, String>,
}

/// Why a file produced no output.
#[derive(Debug, Error)]
pub enum Error {
    /// The parser rejected the file; not owned by this crate, passed
    /// through with position information.
    #[error("{file}:{line}:{column}: syntax error")]
    Parse {
        file: PathBuf,
        line: usize,
        column: usize,
    },
    /// One or more qualified references could not be safely renamed. The
    /// file's source is left untouched when this occurs.
    #[error(transparent)]
    Rewrite(#[from] RewriteError),
}

/// Whether the pipeline changed anything, so callers can skip re-printing
/// untouched files byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Unchanged,
    Changed(String),
}

/// Runs the full pipeline over one file's source.
///
/// Fast path: when no spec is marked removed the source is reported
/// unchanged without building scopes or rules. On a rewrite failure no
/// partial output is ever produced; the pre-rewrite source stands.
pub fn process_source(source: &str, file: &Path, config: &Config) -> Result<Outcome, Error> {
    let tree = parse_checked(source, file)?;
    let root = tree.root_node();

    let (decls, specs) = imports::collect_imports(root, source);
    let marks = dedupe::mark_duplicates(&specs, config.policy);
    if !marks.iter().any(|m| m.remove) {
        return Ok(Outcome::Unchanged);
    }

    let mut edits = trim::trim_imports(source, &decls, &specs, &marks);

    if !config.import_only {
        let scopes = ScopeTree::build(root, source);
        let rules = rewrite::build_rules(&specs, &marks, &config.names);
        edits.extend(rewrite::rewrite_refs(root, source, file, &rules, &scopes)?);
    }

    Ok(Outcome::Changed(syntax::apply_edits(source, &edits)))
}

/// Report for one checked file.
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub file: PathBuf,
    pub groups: Vec<GroupSummary>,
    pub violations: Vec<Violation>,
}

impl FileReport {
    pub fn is_clean(&self) -> bool {
        self.groups.is_empty() && self.violations.is_empty()
    }
}

/// Inspects one file without producing output: which duplicate groups
/// exist, and which of the implied renames would be refused.
pub fn check_source(source: &str, file: &Path, config: &Config) -> Result<FileReport, Error> {
    let tree = parse_checked(source, file)?;
    let root = tree.root_node();

    let (_, specs) = imports::collect_imports(root, source);
    let marks = dedupe::mark_duplicates(&specs, config.policy);
    let groups = dedupe::summarize(&specs, &marks, &config.names);

    let mut violations = Vec::new();
    if !groups.is_empty() && !config.import_only {
        let scopes = ScopeTree::build(root, source);
        let rules = rewrite::build_rules(&specs, &marks, &config.names);
        if let Err(RewriteError(found)) =
            rewrite::rewrite_refs(root, source, file, &rules, &scopes)
        {
            violations = found;
        }
    }

    Ok(FileReport {
        file: file.to_path_buf(),
        groups,
        violations,
    })
}

fn parse_checked(source: &str, file: &Path) -> Result<Tree, Error> {
    let Some(tree) = syntax::parse(source) else {
        return Err(Error::Parse {
            file: file.to_path_buf(),
            line: 1,
            column: 1,
        });
    };
    if let Some(pos) = syntax::first_error(tree.root_node()) {
        return Err(Error::Parse {
            file: file.to_path_buf(),
            line: pos.row + 1,
            column: pos.column + 1,
        });
    }
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(policy: KeepPolicy) -> Config {
        Config {
            policy,
            ..Config::default()
        }
    }

    fn changed(source: &str, policy: KeepPolicy) -> String {
        match process_source(source, Path::new("test.go"), &config(policy)).unwrap() {
            Outcome::Changed(out) => out,
            Outcome::Unchanged => panic!("expected a change"),
        }
    }

    #[test]
    fn file_without_duplicates_is_unchanged() {
        let source = "\
package main

import (
\t\"fmt\"
\t\"os\"
)

func main() {
\tfmt.Println(os.Args)
}
";
        let outcome = process_source(source, Path::new("test.go"), &config(KeepPolicy::Unnamed));
        assert_eq!(outcome.unwrap(), Outcome::Unchanged);
    }

    #[test]
    fn unreferenced_alias_is_dropped_without_diagnostics() {
        let source = "\
package main

import (
\t\"m\"
\tx \"m\"
)

func main() {
\tm.Foo()
}
";
        let out = changed(source, KeepPolicy::Unnamed);
        assert!(!out.contains("x \"m\""));
        assert!(out.contains("\"m\""));
        assert!(out.contains("m.Foo()"));
    }

    #[test]
    fn shadowed_target_reports_violation_and_withholds_output() {
        let source = "\
package main

import (
\t\"m\"
\tx \"m\"
)

func main() {
\tm := 1
\t_ = m
\tx.Foo()
}
";
        let err =
            process_source(source, Path::new("test.go"), &config(KeepPolicy::Unnamed)).unwrap_err();
        match err {
            Error::Rewrite(RewriteError(violations)) => {
                assert_eq!(violations.len(), 1);
                assert_eq!(violations[0].from, "x");
                assert_eq!(violations[0].to, "m");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn named_policy_rewrites_to_shortest_alias() {
        let source = "\
package main

import (
\ta \"m\"
\tbb \"m\"
)

func main() {
\tbb.X()
\tbb.Y()
}
";
        let out = changed(source, KeepPolicy::Named);
        assert!(out.contains("a \"m\""));
        assert!(!out.contains("bb"));
        assert!(out.contains("a.X()"));
        assert!(out.contains("a.Y()"));
    }

    #[test]
    fn blank_import_coexists_with_regular_import() {
        let source = "\
package main

import (
\t_ \"m\"
\t\"m\"
)

func main() {
\tm.Foo()
}
";
        let outcome = process_source(source, Path::new("test.go"), &config(KeepPolicy::Unnamed));
        assert_eq!(outcome.unwrap(), Outcome::Unchanged);
    }

    #[test]
    fn first_policy_keeps_first_of_three() {
        let source = "\
package main

import (
\ta \"m\"
\tb \"m\"
\tc \"m\"
)

func main() {
\ta.Do()
\tb.Do()
\tc.Do()
}
";
        let out = changed(source, KeepPolicy::First);
        assert!(out.contains("a \"m\""));
        assert!(!out.contains("b \"m\""));
        assert!(!out.contains("c \"m\""));
        assert_eq!(out.matches("a.Do()").count(), 3);
    }

    #[test]
    fn import_only_skips_reference_rewriting() {
        let source = "\
package main

import (
\t\"m\"
\tx \"m\"
)

func main() {
\tx.Foo()
}
";
        let cfg = Config {
            policy: KeepPolicy::Unnamed,
            import_only: true,
            names: HashMap::new(),
        };
        let out = match process_source(source, Path::new("test.go"), &cfg).unwrap() {
            Outcome::Changed(out) => out,
            Outcome::Unchanged => panic!("expected a change"),
        };
        assert!(!out.contains("x \"m\""));
        // references are deliberately left alone in import-only mode
        assert!(out.contains("x.Foo()"));
    }

    #[test]
    fn single_line_import_list_keeps_survivor() {
        let source = "\
package main

import (\"m\"; x \"m\")

func main() {
\tx.Foo()
}
";
        let out = changed(source, KeepPolicy::Unnamed);
        assert!(out.contains("\"m\""));
        assert!(out.contains("m.Foo()"));
        assert!(!out.contains("x \"m\""));
        let again = process_source(&out, Path::new("test.go"), &config(KeepPolicy::Unnamed));
        assert_eq!(again.unwrap(), Outcome::Unchanged);
    }

    #[test]
    fn pipeline_is_idempotent() {
        let source = "\
package main

import (
\t\"fmt\"
\tf \"fmt\"
)

func main() {
\tf.Println(\"hi\")
}
";
        let once = changed(source, KeepPolicy::Unnamed);
        let again = process_source(&once, Path::new("test.go"), &config(KeepPolicy::Unnamed));
        assert_eq!(again.unwrap(), Outcome::Unchanged);
    }

    #[test]
    fn rewritten_output_snapshot() {
        let source = "\
package main

import (
\t\"fmt\"
\tf \"fmt\"
)

func main() {
\tf.Println(\"hi\")
}
";
        let out = changed(source, KeepPolicy::Unnamed);
        insta::assert_snapshot!(out, @r#"
        package main

        import (
        	"fmt"
        )

        func main() {
        	fmt.Println("hi")
        }
        "#);
    }

    #[test]
    fn parse_failure_carries_position() {
        let err = process_source(
            "package main\n\nfunc f( {\n",
            Path::new("broken.go"),
            &config(KeepPolicy::Unnamed),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        assert!(err.to_string().contains("broken.go"));
    }

    #[test]
    fn check_reports_groups_and_violations() {
        let source = "\
package main

import (
\t\"m\"
\tx \"m\"
)

func main() {
\tm := 1
\t_ = m
\tx.Foo()
}
";
        let report = check_source(source, Path::new("test.go"), &config(KeepPolicy::Unnamed)).unwrap();
        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].kept, "m");
        assert_eq!(report.groups[0].removed, vec!["x".to_string()]);
        assert_eq!(report.violations.len(), 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn check_on_clean_file_is_clean() {
        let report = check_source(
            "package main\n\nimport \"fmt\"\n\nfunc main() { fmt.Println() }\n",
            Path::new("test.go"),
            &config(KeepPolicy::Unnamed),
        )
        .unwrap();
        assert!(report.is_clean());
    }
}
