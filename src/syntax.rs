//! Go syntax tree access and textual edits.
//!
//! Parsing and printing are delegated to tree-sitter: the pipeline consumes
//! a parsed `tree_sitter::Tree` and produces byte-offset `Edit`s against the
//! original source. "Printing" the mutated file is applying those edits,
//! sorted by position and replayed from the end of the string so earlier
//! edits never invalidate later offsets.

use tree_sitter::{Node, Parser, Point, Tree};

/// A single text replacement with byte-offset position information.
#[derive(Debug, Clone)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
    pub new_text: String,
}

/// Parses Go source into a tree-sitter tree.
///
/// Returns `None` only if the parser bails out entirely; syntactically broken
/// input still yields a tree, flagged via [`first_error`].
pub fn parse(source: &str) -> Option<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .expect("failed to load tree-sitter Go grammar");
    parser.parse(source, None)
}

/// Finds the position of the first syntax error under `node`, if any.
pub fn first_error(node: Node) -> Option<Point> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position());
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(pos) = first_error(child) {
            return Some(pos);
        }
    }
    Some(node.start_position())
}

/// The source text covered by `node`.
pub fn text<'a>(node: Node, source: &'a str) -> &'a str {
    &source[node.byte_range()]
}

/// Applies edits to source content, returning the modified string.
///
/// Edits are applied in descending start-offset order so that each
/// replacement leaves the offsets of the remaining ones intact. Edits must
/// cover disjoint, in-bounds ranges; a range that is inverted or reaches
/// past the content is a bug in edit construction and panics rather than
/// producing half-applied output.
pub fn apply_edits(content: &str, edits: &[Edit]) -> String {
    let mut ordered: Vec<&Edit> = edits.iter().collect();
    ordered.sort_by(|a, b| b.start.cmp(&a.start));

    let mut result = content.to_string();
    for edit in ordered {
        assert!(
            edit.start <= edit.end && edit.end <= result.len(),
            "edit range {}..{} out of bounds for {} bytes",
            edit.start,
            edit.end,
            result.len()
        );
        result.replace_range(edit.start..edit.end, &edit.new_text);
    }
    result
}

/// Converts a byte offset to 1-indexed line and column.
pub fn offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for (i, c) in source.char_indices() {
        if i >= offset {
            break;
        }
        if c == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

/// Byte offset of the start of the line containing `offset`.
pub fn line_start(source: &str, offset: usize) -> usize {
    source[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

/// Byte offset just past the newline of the line containing `offset`,
/// or the end of the source for the final line.
pub fn line_end(source: &str, offset: usize) -> usize {
    source[offset..]
        .find('\n')
        .map(|i| offset + i + 1)
        .unwrap_or(source.len())
}
