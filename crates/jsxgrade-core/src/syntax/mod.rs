//! JavaScript / TypeScript / JSX parsing.
//!
//! [`parse`] runs the tree-sitter TSX grammar over ES module source and
//! either returns a complete [`Tree`] or a [`ParseError`]; a grammar tree
//! with any ERROR or MISSING node is rejected, there is no error recovery
//! visible to callers. Lowering is bounded by a nesting limit so hostile
//! input cannot grow the tree without bound.

mod early;
mod lower;
pub mod tree;

pub use tree::{walk, FunctionForm, Node, NodeKind, Tree, Visitor};

use tree_sitter::{Node as TsNode, Parser};

use crate::error::ParseError;

/// Default limit on syntactic nesting.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Parse a module with the default nesting limit.
pub fn parse(source: &str) -> Result<Tree, ParseError> {
    parse_with_depth(source, DEFAULT_MAX_DEPTH)
}

/// Parse a module, failing once constructs nest deeper than `max_depth`.
pub fn parse_with_depth(source: &str, max_depth: usize) -> Result<Tree, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_typescript::LANGUAGE_TSX.into())
        .map_err(|e| ParseError::new(format!("Failed to load TSX grammar: {e}"), 1, 1))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ParseError::new("Parser produced no tree", 1, 1))?;

    let root = tree.root_node();
    if root.has_error() {
        return Err(match first_error(root) {
            Some(node) => describe_error(node, source),
            None => ParseError::new("Unexpected token", 1, 1),
        });
    }

    let program = lower::Lowering::new(source, max_depth).run(root)?;
    Ok(Tree::new(program))
}

/// The first ERROR or MISSING node in document order. Only subtrees that
/// contain an error are entered.
fn first_error(root: TsNode<'_>) -> Option<TsNode<'_>> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

fn describe_error(node: TsNode<'_>, source: &str) -> ParseError {
    if node.is_missing() {
        return error_at(source, node, format!("Expected \"{}\"", node.kind()));
    }
    let mut cursor = node.walk();
    while cursor.goto_first_child() {}
    let leaf = cursor.node();
    match source.get(leaf.byte_range()).filter(|t| !t.is_empty()) {
        Some(token) => error_at(source, leaf, format!("Unexpected token \"{token}\"")),
        None => error_at(source, node, "Unexpected end of input"),
    }
}

/// A [`ParseError`] at the start of `node`, with a 1-based character column.
pub(super) fn error_at(source: &str, node: TsNode<'_>, message: impl Into<String>) -> ParseError {
    let at = node.start_position();
    let start = node.start_byte();
    let column = start
        .checked_sub(at.column)
        .and_then(|line_start| source.get(line_start..start))
        .map_or(at.column, |prefix| prefix.chars().count());
    ParseError::new(message, at.row as u32 + 1, column as u32 + 1)
}
