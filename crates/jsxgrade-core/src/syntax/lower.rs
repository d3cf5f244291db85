//! Lowering of a tree-sitter TSX parse into the extractor's [`Node`] tree.
//!
//! The grammar tree is walked with a [`TreeCursor`] and the owned tree is
//! assembled on an explicit frame stack, so neither deep nesting nor long
//! operator chains touch the call stack.

use tree_sitter::{Node as TsNode, TreeCursor};

use super::early;
use super::tree::{FunctionForm, Node, NodeKind};
use crate::error::ParseError;

/// Grammar nodes that never reach the lowered tree.
const SKIPPED: &[&str] = &["comment", "html_comment", "hash_bang_line"];

/// Left-recursive chains grow with the length of an expression, not with its
/// nesting, so they do not count toward the depth limit.
const CHAINS: &[&str] = &[
    "binary_expression",
    "member_expression",
    "call_expression",
    "subscript_expression",
    "sequence_expression",
];

/// A node under construction. `kind: None` splices its children into the
/// parent when closed.
struct Frame {
    kind: Option<NodeKind>,
    children: Vec<Node>,
}

impl Frame {
    fn new(kind: Option<NodeKind>) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }
}

/// Bookkeeping for one entered grammar node.
struct Entry {
    grammar: &'static str,
    frames: u8,
    function: bool,
    counted: bool,
}

pub(super) struct Lowering<'s> {
    source: &'s str,
    max_depth: usize,
    frames: Vec<Frame>,
    entries: Vec<Entry>,
    depth: usize,
    functions: usize,
}

impl<'s> Lowering<'s> {
    pub(super) fn new(source: &'s str, max_depth: usize) -> Self {
        Self {
            source,
            max_depth,
            frames: vec![Frame::new(Some(NodeKind::Program))],
            entries: Vec::new(),
            depth: 0,
            functions: 0,
        }
    }

    /// Lower every node below `root`, in document order.
    pub(super) fn run(mut self, root: TsNode<'_>) -> Result<Node, ParseError> {
        let mut cursor = root.walk();
        if !cursor.goto_first_child() {
            return Ok(self.finish());
        }
        let mut level = 1usize;

        loop {
            let entered = self.enter(&cursor)?;
            if entered && cursor.goto_first_child() {
                level += 1;
                continue;
            }
            if entered {
                self.leave();
            }
            loop {
                if cursor.goto_next_sibling() {
                    break;
                }
                if !cursor.goto_parent() {
                    return Ok(self.finish());
                }
                level -= 1;
                if level == 0 {
                    return Ok(self.finish());
                }
                self.leave();
            }
        }
    }

    fn enter(&mut self, cursor: &TreeCursor<'_>) -> Result<bool, ParseError> {
        let node = cursor.node();
        let grammar = node.kind();
        if !node.is_named() || SKIPPED.contains(&grammar) {
            return Ok(false);
        }

        early::check(node, self.source, self.functions)?;

        let counted = !CHAINS.contains(&grammar);
        if counted {
            self.depth += 1;
            if self.depth > self.max_depth {
                let at = node.start_position();
                return Err(ParseError::new(
                    format!("Maximum nesting depth of {} exceeded", self.max_depth),
                    at.row as u32 + 1,
                    at.column as u32 + 1,
                ));
            }
        }

        // `x => x` has a bare parameter; give it the same `Params` wrapper the
        // parenthesized form gets.
        let parent = self.entries.last().map(|e| e.grammar);
        let mut frames = 1;
        if parent == Some("arrow_function") && cursor.field_name() == Some("parameter") {
            self.frames.push(Frame::new(Some(NodeKind::Params)));
            frames = 2;
        }
        let kind = self.kind_of(node);
        self.frames.push(Frame::new(kind));

        let function = is_function(grammar);
        if function {
            self.functions += 1;
        }
        self.entries.push(Entry {
            grammar,
            frames,
            function,
            counted,
        });
        Ok(true)
    }

    fn leave(&mut self) {
        let Some(entry) = self.entries.pop() else {
            return;
        };
        if entry.counted {
            self.depth -= 1;
        }
        if entry.function {
            self.functions -= 1;
        }
        for _ in 0..entry.frames {
            self.close_frame();
        }
    }

    fn close_frame(&mut self) {
        // The program frame is never closed here.
        if self.frames.len() < 2 {
            return;
        }
        let Some(frame) = self.frames.pop() else {
            return;
        };
        let Some(parent) = self.frames.last_mut() else {
            return;
        };
        match frame.kind {
            Some(kind) => parent.children.push(Node::new(kind, frame.children)),
            None => parent.children.extend(frame.children),
        }
    }

    fn finish(mut self) -> Node {
        while self.frames.len() > 1 {
            self.close_frame();
        }
        let children = self
            .frames
            .pop()
            .map(|frame| frame.children)
            .unwrap_or_default();
        Node::new(NodeKind::Program, children)
    }

    fn text(&self, node: TsNode<'_>) -> &'s str {
        self.source.get(node.byte_range()).unwrap_or("")
    }

    fn field_text(&self, node: TsNode<'_>, field: &str) -> Option<String> {
        node.child_by_field_name(field)
            .map(|child| self.text(child).to_string())
    }

    /// The lowered kind of `node`; `None` for wrappers that only group
    /// their children.
    fn kind_of(&self, node: TsNode<'_>) -> Option<NodeKind> {
        let kind = match node.kind() {
            "parenthesized_expression" | "required_parameter" | "optional_parameter" => {
                return None
            }
            "identifier" => NodeKind::Identifier {
                name: self.text(node).to_string(),
            },
            "variable_declaration" => NodeKind::VariableDeclaration { kind: "var" },
            "lexical_declaration" => NodeKind::VariableDeclaration {
                kind: node
                    .child_by_field_name("kind")
                    .map_or("let", |keyword| keyword.kind()),
            },
            "variable_declarator" => NodeKind::VariableDeclarator,
            "function_declaration" | "generator_function_declaration" => NodeKind::Function {
                form: FunctionForm::Declaration,
                name: self.field_text(node, "name"),
            },
            "function_expression" | "function" | "generator_function" => NodeKind::Function {
                form: FunctionForm::Expression,
                name: self.field_text(node, "name"),
            },
            "arrow_function" => NodeKind::Function {
                form: FunctionForm::Arrow,
                name: None,
            },
            "method_definition" => NodeKind::Function {
                form: FunctionForm::Method,
                name: self.field_text(node, "name"),
            },
            "formal_parameters" => NodeKind::Params,
            "return_statement" => NodeKind::Return,
            "import_statement" => NodeKind::Import {
                source: node
                    .child_by_field_name("source")
                    .map(|source| unquote(self.text(source)).to_string())
                    .unwrap_or_default(),
            },
            "object_pattern" => NodeKind::ObjectPattern,
            "shorthand_property_identifier_pattern" => NodeKind::PatternProperty {
                key: Some(self.text(node).to_string()),
            },
            "pair_pattern" => NodeKind::PatternProperty {
                key: node
                    .child_by_field_name("key")
                    .and_then(|key| self.property_key(key)),
            },
            "object_assignment_pattern" => NodeKind::PatternProperty {
                key: node
                    .child_by_field_name("left")
                    .filter(|left| left.kind() == "shorthand_property_identifier_pattern")
                    .map(|left| self.text(left).to_string()),
            },
            "rest_pattern" => NodeKind::RestElement,
            "call_expression" => NodeKind::Call,
            "member_expression" => NodeKind::Member {
                property: node
                    .child_by_field_name("property")
                    .filter(|p| {
                        matches!(p.kind(), "property_identifier" | "private_property_identifier")
                    })
                    .map(|p| self.text(p).to_string()),
            },
            "ternary_expression" => NodeKind::Conditional,
            "binary_expression" => {
                let op = node
                    .child_by_field_name("operator")
                    .map_or("", |operator| operator.kind());
                match op {
                    "&&" | "||" | "??" => NodeKind::Logical { op },
                    _ => NodeKind::Binary { op },
                }
            }
            "jsx_element" => match node
                .child_by_field_name("open_tag")
                .and_then(|open| open.child_by_field_name("name"))
            {
                Some(name) => NodeKind::JsxElement {
                    name: jsx_name(self.text(name)),
                },
                None => NodeKind::JsxFragment,
            },
            "jsx_self_closing_element" => NodeKind::JsxElement {
                name: node
                    .child_by_field_name("name")
                    .map(|name| jsx_name(self.text(name)))
                    .unwrap_or_default(),
            },
            "jsx_attribute" => NodeKind::JsxAttribute {
                name: node
                    .named_children(&mut node.walk())
                    .next()
                    .map(|name| jsx_name(self.text(name)))
                    .unwrap_or_default(),
            },
            other => NodeKind::Other(other),
        };
        Some(kind)
    }

    fn property_key(&self, key: TsNode<'_>) -> Option<String> {
        match key.kind() {
            "property_identifier" | "number" => Some(self.text(key).to_string()),
            "string" => Some(unquote(self.text(key)).to_string()),
            _ => None,
        }
    }
}

fn is_function(grammar: &str) -> bool {
    matches!(
        grammar,
        "function_declaration"
            | "generator_function_declaration"
            | "function_expression"
            | "function"
            | "generator_function"
            | "arrow_function"
            | "method_definition"
    )
}

/// Strip the quotes from a string literal.
pub(super) fn unquote(literal: &str) -> &str {
    let mut chars = literal.chars();
    match (chars.next(), chars.next_back()) {
        (Some(open), Some(close)) if open == close && matches!(open, '"' | '\'' | '`') => {
            chars.as_str()
        }
        _ => literal,
    }
}

/// Tag names as written, minus any whitespace around `.` or `:`.
pub(super) fn jsx_name(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}
