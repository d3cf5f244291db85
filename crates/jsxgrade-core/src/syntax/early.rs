//! Module-code early errors the grammar itself accepts.
//!
//! The TSX grammar is permissive about a few rules a JavaScript engine
//! enforces before running a module: `return` outside a function, reserved
//! words as binding names, invalid assignment targets, malformed numeric
//! literals and identifier escapes, and mismatched JSX closing tags.

use tree_sitter::Node as TsNode;

use super::error_at;
use super::lower::jsx_name;
use crate::error::ParseError;

/// Words that cannot name a binding in strict (module) code.
const RESERVED_BINDINGS: &[&str] = &[
    "let",
    "static",
    "yield",
    "await",
    "implements",
    "interface",
    "package",
    "private",
    "protected",
    "public",
    "eval",
    "arguments",
];

const ASSIGNABLE: &[&str] = &[
    "identifier",
    "undefined",
    "member_expression",
    "subscript_expression",
    "parenthesized_expression",
    "non_null_expression",
    "object_pattern",
    "array_pattern",
];

const SIMPLE_ASSIGNABLE: &[&str] = &[
    "identifier",
    "undefined",
    "member_expression",
    "subscript_expression",
    "parenthesized_expression",
    "non_null_expression",
];

fn text<'s>(node: TsNode<'_>, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or("")
}

/// Check one named node. `functions` is the number of enclosing function
/// bodies.
pub(super) fn check(node: TsNode<'_>, source: &str, functions: usize) -> Result<(), ParseError> {
    match node.kind() {
        "return_statement" if functions == 0 => {
            Err(error_at(source, node, "'return' outside of function"))
        }
        "number" => check_number(node, source),
        "identifier"
        | "property_identifier"
        | "shorthand_property_identifier"
        | "shorthand_property_identifier_pattern"
        | "type_identifier" => check_identifier(node, source),
        "variable_declarator" | "function_declaration" | "function_expression"
        | "class_declaration" => check_binding(node.child_by_field_name("name"), source),
        "required_parameter" | "optional_parameter" => {
            check_binding(node.child_by_field_name("pattern"), source)
        }
        "arrow_function" => check_binding(node.child_by_field_name("parameter"), source),
        "catch_clause" => check_binding(node.child_by_field_name("parameter"), source),
        "assignment_expression" => check_target(node, source, "left", ASSIGNABLE),
        "augmented_assignment_expression" => {
            check_target(node, source, "left", SIMPLE_ASSIGNABLE)
        }
        "update_expression" => check_target(node, source, "argument", SIMPLE_ASSIGNABLE),
        "jsx_element" => check_jsx_tags(node, source),
        _ => Ok(()),
    }
}

fn check_binding(name: Option<TsNode<'_>>, source: &str) -> Result<(), ParseError> {
    let Some(name) = name.filter(|n| n.kind() == "identifier") else {
        return Ok(());
    };
    let word = text(name, source);
    if RESERVED_BINDINGS.contains(&word) {
        return Err(error_at(source, name, format!("Unexpected reserved word '{word}'")));
    }
    Ok(())
}

fn check_target(
    node: TsNode<'_>,
    source: &str,
    field: &str,
    allowed: &[&str],
) -> Result<(), ParseError> {
    match node.child_by_field_name(field) {
        Some(target) if !allowed.contains(&target.kind()) => {
            Err(error_at(source, target, "Invalid left-hand side in assignment"))
        }
        _ => Ok(()),
    }
}

fn check_number(node: TsNode<'_>, source: &str) -> Result<(), ParseError> {
    let literal = text(node, source).to_ascii_lowercase();
    if matches!(literal.as_str(), "0x" | "0b" | "0o") {
        return Err(error_at(source, node, "Expected number in radix"));
    }
    if literal.ends_with('_') || literal.contains("__") || literal.contains("_.") {
        return Err(error_at(source, node, "Numeric separator is not allowed here"));
    }
    Ok(())
}

fn check_identifier(node: TsNode<'_>, source: &str) -> Result<(), ParseError> {
    if valid_identifier(text(node, source)) {
        Ok(())
    } else {
        Err(error_at(source, node, "Invalid identifier"))
    }
}

/// Letters, digits, `$`, `_`, the two joiners, and well-formed `\u` escapes.
/// `-` only reaches here from JSX tag and attribute names.
fn valid_identifier(word: &str) -> bool {
    let mut chars = word.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if chars.next() != Some('u') {
                return false;
            }
            if chars.peek() == Some(&'{') {
                chars.next();
                let mut digits = 0;
                loop {
                    match chars.next() {
                        Some('}') if digits > 0 => break,
                        Some(h) if h.is_ascii_hexdigit() => digits += 1,
                        _ => return false,
                    }
                }
            } else {
                for _ in 0..4 {
                    if !chars.next().is_some_and(|h| h.is_ascii_hexdigit()) {
                        return false;
                    }
                }
            }
        } else if !(c.is_alphanumeric() || matches!(c, '$' | '_' | '-' | '\u{200C}' | '\u{200D}')) {
            return false;
        }
    }
    true
}

fn check_jsx_tags(node: TsNode<'_>, source: &str) -> Result<(), ParseError> {
    let open = node
        .child_by_field_name("open_tag")
        .and_then(|tag| tag.child_by_field_name("name"));
    let Some(close_tag) = node.child_by_field_name("close_tag") else {
        return Ok(());
    };
    let close = close_tag.child_by_field_name("name");
    match (open, close) {
        (None, None) => Ok(()),
        (None, Some(_)) => Err(error_at(
            source,
            close_tag,
            "Expected corresponding closing tag for JSX fragment",
        )),
        (Some(open), close) => {
            let expected = jsx_name(text(open, source));
            if close.map(|c| jsx_name(text(c, source))).as_deref() == Some(expected.as_str()) {
                Ok(())
            } else {
                Err(error_at(
                    source,
                    close_tag,
                    format!("Expected corresponding JSX closing tag for <{expected}>"),
                ))
            }
        }
    }
}
