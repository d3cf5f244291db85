//! Parser-independent syntax tree.
//!
//! A [`Node`] is a kind tag with the smallest payload the feature extractor
//! needs plus ordered children. Consumers inspect trees through [`Visitor`]
//! and [`walk`]; nothing outside the `syntax` module knows how the tree was
//! produced.

/// The syntactic form of a function-shaped node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionForm {
    /// `function name() {}` in statement position.
    Declaration,
    /// `function () {}` or `function name() {}` in expression position.
    Expression,
    /// `() => {}`.
    Arrow,
    /// Object or class method, including getters, setters and constructors.
    Method,
}

/// Node kinds the feature extractor inspects. Everything else is kept as
/// [`NodeKind::Other`] so traversal still reaches its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Program,
    /// `var` / `let` / `const`. Children: declarators.
    VariableDeclaration { kind: &'static str },
    /// Children: `[target, type?, init?]`.
    VariableDeclarator,
    /// Children include one [`NodeKind::Params`] and the body.
    Function {
        form: FunctionForm,
        name: Option<String>,
    },
    /// Children: parameter patterns in declaration order, with any type
    /// annotations and defaults following their pattern.
    Params,
    /// Children: `[argument?]`, parentheses removed.
    Return,
    /// `import ... from "source"`.
    Import { source: String },
    /// Children: `PatternProperty` and `RestElement` nodes.
    ObjectPattern,
    /// `key` is `None` for computed keys.
    PatternProperty { key: Option<String> },
    RestElement,
    Identifier { name: String },
    /// Children: `[callee, ...]`.
    Call,
    /// Children: `[object, ...]`.
    Member { property: Option<String> },
    /// `test ? consequent : alternate`.
    Conditional,
    /// `&&`, `||` and `??`.
    Logical { op: &'static str },
    Binary { op: &'static str },
    /// Member tags are joined with `.`, namespaced tags with `:`.
    JsxElement { name: String },
    JsxFragment,
    JsxAttribute { name: String },
    /// Any other grammar node, tagged with its grammar name.
    Other(&'static str),
}

/// A node in the syntax tree.
#[derive(Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind, children: Vec<Node>) -> Self {
        Self { kind, children }
    }

    pub fn leaf(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    /// First child, if any.
    pub fn first(&self) -> Option<&Node> {
        self.children.first()
    }

    /// Identifier name, if this node is an identifier.
    pub fn identifier_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Identifier { name } => Some(name),
            _ => None,
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn size(&self) -> usize {
        let mut count = 0;
        walk(self, &mut |_: &Node| count += 1);
        count
    }
}

// Long left-associative chains (`a + b + c + ...`) produce trees as deep as
// the chain is long; drop them iteratively so the default recursive drop
// cannot exhaust the stack.
impl Drop for Node {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

/// A successfully parsed program.
#[derive(Debug)]
pub struct Tree {
    root: Node,
}

impl Tree {
    pub(crate) fn new(root: Node) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Visit every node in pre-order.
    pub fn walk<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        walk(&self.root, visitor);
    }
}

/// Callback for tree traversal.
pub trait Visitor {
    fn visit(&mut self, node: &Node);
}

impl<F: FnMut(&Node)> Visitor for F {
    fn visit(&mut self, node: &Node) {
        self(node)
    }
}

/// Pre-order, left-to-right traversal with an explicit stack.
pub fn walk<V: Visitor + ?Sized>(root: &Node, visitor: &mut V) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        visitor.visit(node);
        stack.extend(node.children.iter().rev());
    }
}
