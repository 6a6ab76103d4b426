//! Qualified-reference rewriting.
//!
//! Once duplicate specs are marked, every qualified reference that names a
//! removed import must be renamed to the survivor's name. A rename is only
//! safe if the survivor's name is not already visible at the reference: a
//! parameter, local variable, or type of that name would capture the
//! identifier instead of the intended package. Unsafe renames are refused,
//! and every refusal in the file is collected before the pass fails as a
//! whole, so the caller sees all of them at once.

use crate::dedupe::Resolution;
use crate::imports::ImportSpec;
use crate::scope::{ScopeId, ScopeTree};
use crate::syntax::{self, Edit};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tree_sitter::Node;

/// A refused rename of one qualified reference.
#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    pub file: PathBuf,
    /// Line number, 1-indexed.
    pub line: usize,
    /// Column number, 1-indexed.
    pub column: usize,
    pub from: String,
    pub to: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: cannot rewrite `{}` to `{}`: identifier `{}` is already in scope and would not refer to the intended package",
            self.file.display(),
            self.line,
            self.column,
            self.from,
            self.to,
            self.to
        )
    }
}

/// All refused renames for one file, one entry per unsafe reference.
#[derive(Debug)]
pub struct RewriteError(pub Vec<Violation>);

impl fmt::Display for RewriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for RewriteError {}

/// Builds the rename rules implied by the removal marks: one `from -> to`
/// pair per removed spec, keyed by the local name code referred to it by.
/// Pairs whose names already coincide need no rewriting and produce no rule.
pub fn build_rules(
    specs: &[ImportSpec],
    marks: &[Resolution],
    names: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut rules = HashMap::new();
    for (i, mark) in marks.iter().enumerate() {
        if !mark.remove {
            continue;
        }
        let Some(survivor) = mark.subsumed_by else {
            panic!("removed spec without a subsuming spec");
        };
        let from = specs[i].local_name(names);
        let to = specs[survivor].local_name(names);
        if from != to {
            rules.insert(from, to);
        }
    }
    rules
}

/// Renames qualified references per `rules`, consulting `scopes` to veto
/// unsafe renames. Returns the rename edits, or every violation found if
/// any rename was refused.
pub fn rewrite_refs(
    root: Node,
    source: &str,
    file: &Path,
    rules: &HashMap<String, String>,
    scopes: &ScopeTree,
) -> Result<Vec<Edit>, RewriteError> {
    if rules.is_empty() {
        return Ok(Vec::new());
    }

    let mut walker = RefWalker {
        source,
        file,
        rules,
        scopes,
        current: scopes.root(),
        edits: Vec::new(),
        violations: Vec::new(),
    };
    walker.visit(root);

    if walker.violations.is_empty() {
        Ok(walker.edits)
    } else {
        Err(RewriteError(walker.violations))
    }
}

/// Depth-first traversal context: tracks the most recently entered scope so
/// each reference is checked against the innermost scope enclosing it. The
/// walk order here must match the scope builder's, which it does: both are
/// pre-order over the same tree.
struct RefWalker<'a> {
    source: &'a str,
    file: &'a Path,
    rules: &'a HashMap<String, String>,
    scopes: &'a ScopeTree,
    current: ScopeId,
    edits: Vec<Edit>,
    violations: Vec<Violation>,
}

impl RefWalker<'_> {
    fn visit(&mut self, node: Node) {
        if let Some(scope) = self.scopes.scope_at(node.id()) {
            self.current = scope;
        }

        match node.kind() {
            "selector_expression" => {
                if let Some(operand) = node.child_by_field_name("operand") {
                    if operand.kind() == "identifier" {
                        self.try_rename(operand);
                        return;
                    }
                }
                // not a package qualifier (call result, nested selector,
                // ...); the operand may still contain references
            }
            // type position spells qualified references as its own node
            "qualified_type" => {
                if let Some(package) = node.child_by_field_name("package") {
                    self.try_rename(package);
                }
                return;
            }
            _ => {}
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(child);
        }
    }

    fn try_rename(&mut self, ident: Node) {
        let name = syntax::text(ident, self.source);
        let Some(to) = self.rules.get(name) else {
            return;
        };
        if self.scopes.visible_from(self.current, to) {
            let pos = ident.start_position();
            self.violations.push(Violation {
                file: self.file.to_path_buf(),
                line: pos.row + 1,
                column: pos.column + 1,
                from: name.to_string(),
                to: to.clone(),
            });
        } else {
            self.edits.push(Edit {
                start: ident.start_byte(),
                end: ident.end_byte(),
                new_text: to.clone(),
            });
        }
    }
}
