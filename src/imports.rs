//! Import declaration extraction.
//!
//! Walks the top level of a parsed Go file and collects every import spec
//! with its normalized path, optional alias, attached comments, and the
//! byte ranges needed for later trimming. Also hosts the package-name
//! guessing heuristic used to label unaliased imports.

use crate::syntax::{self, line_end, line_start};
use std::collections::HashMap;
use tree_sitter::Node;

/// One import entry, e.g. `x "github.com/foo/bar"`.
#[derive(Debug, Clone)]
pub struct ImportSpec {
    /// Normalized import path with quoting stripped.
    pub path: String,
    /// Explicit local name; `.` marks a dot import, `_` a blank import.
    pub alias: Option<String>,
    /// Whether a doc or trailing line comment is attached.
    pub has_comment: bool,
    /// Line number, 1-indexed.
    pub line: usize,
    /// Column number, 1-indexed.
    pub column: usize,
    /// Byte range of the spec itself.
    pub start: usize,
    pub end: usize,
    /// Byte range of the spec's full source lines, including its doc
    /// comment, trailing comment, and terminating newline.
    pub chunk_start: usize,
    pub chunk_end: usize,
    /// Index of the owning declaration in the declaration list.
    pub decl: usize,
}

impl ImportSpec {
    pub fn is_dot(&self) -> bool {
        self.alias.as_deref() == Some(".")
    }

    pub fn is_blank(&self) -> bool {
        self.alias.as_deref() == Some("_")
    }

    /// The identifier code refers to this import by: the explicit alias if
    /// present, else an override from `names`, else the guessed package name.
    pub fn local_name(&self, names: &HashMap<String, String>) -> String {
        if let Some(alias) = &self.alias {
            return alias.clone();
        }
        if let Some(name) = names.get(&self.path) {
            return name.clone();
        }
        guess_package_name(&self.path)
    }
}

/// One `import` declaration, holding the indices of its specs.
#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub start: usize,
    pub end: usize,
    pub parenthesized: bool,
    pub specs: Vec<usize>,
}

/// Collects all import declarations and specs from a file's tree.
pub fn collect_imports(root: Node, source: &str) -> (Vec<ImportDecl>, Vec<ImportSpec>) {
    let mut decls = Vec::new();
    let mut specs = Vec::new();

    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        if child.kind() != "import_declaration" {
            continue;
        }
        let decl_index = decls.len();
        let mut decl = ImportDecl {
            start: child.start_byte(),
            end: child.end_byte(),
            parenthesized: false,
            specs: Vec::new(),
        };

        let mut decl_cursor = child.walk();
        for inner in child.named_children(&mut decl_cursor) {
            match inner.kind() {
                // bare form: `import "m"`; comments attach to the declaration
                "import_spec" => {
                    decl.specs.push(specs.len());
                    specs.push(extract_spec(inner, child, decl_index, source));
                }
                "import_spec_list" => {
                    decl.parenthesized = true;
                    let mut list_cursor = inner.walk();
                    for spec in inner.named_children(&mut list_cursor) {
                        if spec.kind() == "import_spec" {
                            decl.specs.push(specs.len());
                            specs.push(extract_spec(spec, spec, decl_index, source));
                        }
                    }
                }
                _ => {}
            }
        }
        decls.push(decl);
    }

    (decls, specs)
}

/// Builds an [`ImportSpec`] from a spec node. `anchor` is the node whose
/// siblings carry attached comments: the spec itself inside a parenthesized
/// list, or the whole declaration for the bare single-spec form.
fn extract_spec(spec: Node, anchor: Node, decl: usize, source: &str) -> ImportSpec {
    let alias = spec
        .child_by_field_name("name")
        .map(|name| syntax::text(name, source).to_string());
    let path = spec
        .child_by_field_name("path")
        .map(|path| normalize_path(syntax::text(path, source)))
        .unwrap_or_default();

    let (doc_start, trailing_end) = attached_comments(anchor);
    let pos = spec.start_position();

    ImportSpec {
        path,
        alias,
        has_comment: doc_start.is_some() || trailing_end.is_some(),
        line: pos.row + 1,
        column: pos.column + 1,
        start: spec.start_byte(),
        end: spec.end_byte(),
        chunk_start: line_start(source, doc_start.unwrap_or_else(|| anchor.start_byte())),
        chunk_end: line_end(source, trailing_end.unwrap_or_else(|| anchor.end_byte())),
        decl,
    }
}

/// Finds the start of a contiguous doc-comment run directly above `anchor`
/// and the end of a trailing comment on the same line, if either exists.
fn attached_comments(anchor: Node) -> (Option<usize>, Option<usize>) {
    let mut doc_start = None;
    let mut row = anchor.start_position().row;
    let mut prev = anchor.prev_sibling();
    while let Some(node) = prev {
        if node.kind() != "comment" || node.end_position().row + 1 != row {
            break;
        }
        doc_start = Some(node.start_byte());
        row = node.start_position().row;
        prev = node.prev_sibling();
    }

    let trailing_end = anchor.next_sibling().and_then(|node| {
        if node.kind() == "comment" && node.start_position().row == anchor.end_position().row {
            Some(node.end_byte())
        } else {
            None
        }
    });

    (doc_start, trailing_end)
}

/// Strips `"..."` or `` `...` `` quoting, normalizing the two spellings of
/// the same path.
fn normalize_path(literal: &str) -> String {
    let trimmed = literal.trim();
    let quoted = trimmed.len() >= 2
        && ((trimmed.starts_with('"') && trimmed.ends_with('"'))
            || (trimmed.starts_with('`') && trimmed.ends_with('`')));
    if quoted {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.to_string()
    }
}

/// Guesses the package name for an import path.
///
/// Handles conventional repository naming: `go-` prefixes, `-go` suffixes,
/// gopkg.in-style `.vN` suffixes, and `/vN` major-version path segments.
/// At its most elaborate, `foo.org/blah/go-yaml.v2/v2` guesses `yaml`.
/// The result may not match the package's actual declared name; a wrong
/// guess means the rewrite rule matches no reference, which is the
/// conservative outcome.
pub fn guess_package_name(path: &str) -> String {
    let mut last = path.rsplit('/').next().unwrap_or(path);

    // major-version directory, e.g. foo.org/blah/pkg/v2
    if is_version_segment(last) && last.len() < path.len() {
        let parent = &path[..path.len() - last.len() - 1];
        last = parent.rsplit('/').next().unwrap_or(parent);
    }

    // gopkg.in-style suffix, e.g. gopkg.in/yaml.v2
    let mut name = last;
    if let Some(idx) = name.rfind(".v") {
        if is_version_segment(&name[idx + 1..]) {
            name = &name[..idx];
        }
    }

    if let Some(stripped) = name.strip_prefix("go-") {
        stripped.to_string()
    } else if let Some(stripped) = name.strip_suffix("-go") {
        stripped.to_string()
    } else {
        name.to_string()
    }
}

fn is_version_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    chars.next() == Some('v')
        && !segment[1..].is_empty()
        && segment[1..].chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;

    fn collect(source: &str) -> (Vec<ImportDecl>, Vec<ImportSpec>) {
        let tree = parse(source).unwrap();
        collect_imports(tree.root_node(), source)
    }

    #[test]
    fn extracts_bare_import() {
        let (decls, specs) = collect("package main\n\nimport \"fmt\"\n");
        assert_eq!(decls.len(), 1);
        assert!(!decls[0].parenthesized);
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].path, "fmt");
        assert_eq!(specs[0].alias, None);
    }

    #[test]
    fn extracts_aliased_dot_and_blank_imports() {
        let source = "package main\n\nimport (\n\tf \"fmt\"\n\t. \"strings\"\n\t_ \"embed\"\n)\n";
        let (decls, specs) = collect(source);
        assert!(decls[0].parenthesized);
        assert_eq!(specs[0].alias.as_deref(), Some("f"));
        assert!(specs[1].is_dot());
        assert!(specs[2].is_blank());
    }

    #[test]
    fn normalizes_raw_string_paths() {
        let (_, specs) = collect("package main\n\nimport (\n\t\"fmt\"\n\t`fmt`\n)\n");
        assert_eq!(specs[0].path, specs[1].path);
    }

    #[test]
    fn detects_attached_comments() {
        let source = "package main\n\nimport (\n\t// doc\n\t\"fmt\"\n\t\"os\" // trailing\n\t\"io\"\n)\n";
        let (_, specs) = collect(source);
        assert!(specs[0].has_comment);
        assert!(specs[1].has_comment);
        assert!(!specs[2].has_comment);
    }

    #[test]
    fn chunk_covers_doc_comment_lines() {
        let source = "package main\n\nimport (\n\t// keep me with my spec\n\t\"fmt\"\n)\n";
        let (_, specs) = collect(source);
        let chunk = &source[specs[0].chunk_start..specs[0].chunk_end];
        assert_eq!(chunk, "\t// keep me with my spec\n\t\"fmt\"\n");
    }

    #[test]
    fn records_positions() {
        let (_, specs) = collect("package main\n\nimport (\n\t\"fmt\"\n)\n");
        assert_eq!(specs[0].line, 4);
        assert_eq!(specs[0].column, 2);
    }

    #[test]
    fn local_name_prefers_alias_then_override() {
        let (_, specs) = collect("package main\n\nimport (\n\tx \"a/b\"\n\t\"a/b\"\n)\n");
        let mut names = HashMap::new();
        names.insert("a/b".to_string(), "bee".to_string());
        assert_eq!(specs[0].local_name(&names), "x");
        assert_eq!(specs[1].local_name(&names), "bee");
        assert_eq!(specs[1].local_name(&HashMap::new()), "b");
    }

    #[test]
    fn guesses_package_names() {
        let cases = [
            ("github.com/foo/bar", "bar"),
            ("github.com/foo/bar/v2", "bar"),
            ("github.com/foo/go-bar/v2", "bar"),
            ("github.com/foo/bar-go/v2", "bar"),
            ("gopkg.in/yaml.v2", "yaml"),
            ("gopkg.in/go-yaml.v2", "yaml"),
            ("gopkg.in/yaml-go.v2", "yaml"),
            ("github.com/nishanths/go-xkcd", "xkcd"),
            ("github.com/nishanths/lyft-go", "lyft"),
            ("foo.org/blah/go-yaml.v2/v2", "yaml"),
            ("fmt", "fmt"),
        ];
        for (path, expect) in cases {
            assert_eq!(guess_package_name(path), expect, "path: {path}");
        }
    }
}
