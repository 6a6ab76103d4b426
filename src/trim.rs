//! Import declaration trimming.
//!
//! Turns removal marks into text edits: each removed spec's source lines go
//! away (taking its attached comments with them), a declaration left with
//! no specs is deleted outright, and a parenthesized block whose survivors
//! ended up out of path order is re-emitted in canonical order. Pure edit
//! construction; any input that parsed cannot fail here.

use crate::dedupe::Resolution;
use crate::imports::{ImportDecl, ImportSpec};
use crate::syntax::{Edit, line_end, line_start};

/// Builds the edits that trim removed specs out of the file's import
/// declarations. Declarations that lost nothing are left untouched.
pub fn trim_imports(
    source: &str,
    decls: &[ImportDecl],
    specs: &[ImportSpec],
    marks: &[Resolution],
) -> Vec<Edit> {
    let mut edits = Vec::new();

    for decl in decls {
        let removed: Vec<usize> = decl
            .specs
            .iter()
            .copied()
            .filter(|&i| marks[i].remove)
            .collect();
        if removed.is_empty() {
            continue;
        }
        let survivors: Vec<usize> = decl
            .specs
            .iter()
            .copied()
            .filter(|&i| !marks[i].remove)
            .collect();

        if survivors.is_empty() {
            // the whole declaration goes, `import (`/`)` lines included
            edits.push(Edit {
                start: line_start(source, decl.start),
                end: line_end(source, decl.end),
                new_text: String::new(),
            });
            continue;
        }

        if chunks_overlap(specs, decl) {
            edits.push(rebuild_decl(source, specs, decl, &survivors));
        } else if in_path_order(specs, &survivors) {
            for &i in &removed {
                edits.push(Edit {
                    start: specs[i].chunk_start,
                    end: specs[i].chunk_end,
                    new_text: String::new(),
                });
            }
        } else {
            edits.push(reorder_block(source, specs, decl, &survivors));
        }
    }

    edits
}

/// Whether any two specs of the declaration share source lines, as in
/// `import ("m"; x "m")`. Line-granular chunk deletion would take the
/// survivor down with the removed spec, so such declarations are rebuilt
/// from per-spec byte ranges instead.
fn chunks_overlap(specs: &[ImportSpec], decl: &ImportDecl) -> bool {
    let mut ranges: Vec<(usize, usize)> = decl
        .specs
        .iter()
        .map(|&i| (specs[i].chunk_start, specs[i].chunk_end))
        .collect();
    ranges.sort_unstable();
    ranges.windows(2).any(|pair| pair[1].0 < pair[0].1)
}

/// Re-emits the whole declaration as a canonical parenthesized block
/// holding only the surviving specs, one per line in path order. Attached
/// comments cannot be carried over reliably when lines are shared, so only
/// the spec text itself survives.
fn rebuild_decl(
    source: &str,
    specs: &[ImportSpec],
    decl: &ImportDecl,
    survivors: &[usize],
) -> Edit {
    let mut ordered: Vec<usize> = survivors.to_vec();
    ordered.sort_by(|&a, &b| specs[a].path.cmp(&specs[b].path));

    let mut new_text = String::from("import (\n");
    for &i in &ordered {
        new_text.push('\t');
        new_text.push_str(&source[specs[i].start..specs[i].end]);
        new_text.push('\n');
    }
    new_text.push(')');

    Edit {
        start: decl.start,
        end: decl.end,
        new_text,
    }
}

fn in_path_order(specs: &[ImportSpec], survivors: &[usize]) -> bool {
    survivors
        .windows(2)
        .all(|pair| specs[pair[0]].path <= specs[pair[1]].path)
}

/// Replaces a parenthesized block's spec region with the surviving spec
/// chunks sorted by path. Chunks carry their own comments and newlines, so
/// reordering them line-by-line keeps the block well formed.
fn reorder_block(
    source: &str,
    specs: &[ImportSpec],
    decl: &ImportDecl,
    survivors: &[usize],
) -> Edit {
    let start = decl
        .specs
        .iter()
        .map(|&i| specs[i].chunk_start)
        .min()
        .unwrap_or(decl.start);
    let end = decl
        .specs
        .iter()
        .map(|&i| specs[i].chunk_end)
        .max()
        .unwrap_or(decl.start);

    let mut ordered: Vec<usize> = survivors.to_vec();
    ordered.sort_by(|&a, &b| specs[a].path.cmp(&specs[b].path));

    let mut new_text = String::new();
    for &i in &ordered {
        new_text.push_str(&source[specs[i].chunk_start..specs[i].chunk_end]);
    }

    Edit {
        start,
        end,
        new_text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedupe::{KeepPolicy, mark_duplicates};
    use crate::imports::collect_imports;
    use crate::syntax::{apply_edits, parse};

    fn trim(source: &str, policy: KeepPolicy) -> String {
        let tree = parse(source).unwrap();
        let (decls, specs) = collect_imports(tree.root_node(), source);
        let marks = mark_duplicates(&specs, policy);
        let edits = trim_imports(source, &decls, &specs, &marks);
        apply_edits(source, &edits)
    }

    #[test]
    fn removes_duplicate_spec_line() {
        let source = "\
package main

import (
\t\"fmt\"
\tf \"fmt\"
\t\"os\"
)
";
        let out = trim(source, KeepPolicy::Unnamed);
        assert_eq!(
            out,
            "package main\n\nimport (\n\t\"fmt\"\n\t\"os\"\n)\n"
        );
    }

    #[test]
    fn removed_spec_takes_its_comments_along() {
        let source = "\
package main

import (
\t\"fmt\"
\t// stale alias
\tf \"fmt\" // trailing
)
";
        let out = trim(source, KeepPolicy::Unnamed);
        assert_eq!(out, "package main\n\nimport (\n\t\"fmt\"\n)\n");
    }

    #[test]
    fn drops_declaration_left_empty() {
        let source = "\
package main

import f \"fmt\"

import (
\t\"fmt\"
)

var x = 0
";
        let out = trim(source, KeepPolicy::Unnamed);
        assert_eq!(
            out,
            "package main\n\n\nimport (\n\t\"fmt\"\n)\n\nvar x = 0\n"
        );
    }

    #[test]
    fn untouched_declarations_are_not_reformatted() {
        let source = "\
package main

import (
\t\"os\"
\t\"fmt\"
)

import (
\t\"io\"
\tx \"io\"
)
";
        let out = trim(source, KeepPolicy::Unnamed);
        // first block is out of order but lost nothing; it stays as-is
        assert!(out.contains("\t\"os\"\n\t\"fmt\"\n"));
        assert!(!out.contains("x \"io\""));
    }

    #[test]
    fn rebuilds_declaration_when_specs_share_a_line() {
        let source = "\
package main

import (\"m\"; x \"m\")

var v = 0
";
        let out = trim(source, KeepPolicy::Unnamed);
        assert_eq!(
            out,
            "package main\n\nimport (\n\t\"m\"\n)\n\nvar v = 0\n"
        );
    }

    #[test]
    fn reorders_survivors_when_out_of_path_order() {
        let source = "\
package main

import (
\t\"os\"
\t\"fmt\"
\tx \"os\"
)
";
        let out = trim(source, KeepPolicy::Unnamed);
        assert_eq!(
            out,
            "package main\n\nimport (\n\t\"fmt\"\n\t\"os\"\n)\n"
        );
    }
}
