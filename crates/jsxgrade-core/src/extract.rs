//! Feature extraction: one pre-order pass over a parsed tree that fills in
//! a [`FeatureContext`].

use tracing::trace;

use crate::context::{push_unique, FeatureContext};
use crate::error::ParseError;
use crate::syntax::{self, FunctionForm, Node, NodeKind, Tree, Visitor};

/// Build the feature context for a parse result. A failed parse yields the
/// all-defaults context with `parseError` set.
pub fn extract(result: &Result<Tree, ParseError>) -> FeatureContext {
    match result {
        Ok(tree) => extract_tree(tree),
        Err(err) => FeatureContext::broken(err.to_string()),
    }
}

/// Parse `source` and extract its features.
pub fn analyze_source(source: &str) -> FeatureContext {
    extract(&syntax::parse(source))
}

/// Parse with an explicit nesting limit, then extract.
pub fn analyze_source_with_depth(source: &str, max_depth: usize) -> FeatureContext {
    extract(&syntax::parse_with_depth(source, max_depth))
}

pub fn extract_tree(tree: &Tree) -> FeatureContext {
    let mut extractor = Extractor::default();
    tree.walk(&mut extractor);
    trace!(
        functions = extractor.ctx.function_names.len(),
        jsx_elements = extractor.ctx.jsx_elements.len(),
        "extracted feature context"
    );
    extractor.ctx
}

#[derive(Default)]
struct Extractor {
    ctx: FeatureContext,
}

impl Visitor for Extractor {
    fn visit(&mut self, node: &Node) {
        match &node.kind {
            NodeKind::Function { form, name } => self.function(node, *form, name.as_deref()),
            NodeKind::Return => self.return_statement(node),
            NodeKind::JsxElement { name } => {
                self.ctx.has_jsx = true;
                push_unique(&mut self.ctx.jsx_elements, name);
            }
            NodeKind::JsxFragment => {
                self.ctx.has_jsx = true;
                push_unique(&mut self.ctx.jsx_elements, "Fragment");
            }
            NodeKind::JsxAttribute { name } if name.starts_with("on") => {
                self.ctx.has_event_handler = true;
            }
            NodeKind::VariableDeclarator => {
                if let Some(name) = node.first().and_then(Node::identifier_name) {
                    push_unique(&mut self.ctx.variable_names, name);
                }
            }
            NodeKind::Call => self.call(node),
            NodeKind::Conditional | NodeKind::Logical { op: "&&" } => {
                self.ctx.has_conditional_rendering = true;
            }
            NodeKind::Import { source } => self.ctx.imported_modules.push(source.clone()),
            _ => {}
        }
    }
}

impl Extractor {
    fn function(&mut self, node: &Node, form: FunctionForm, name: Option<&str>) {
        match form {
            FunctionForm::Declaration | FunctionForm::Expression => {
                self.ctx.has_function_declaration = true;
                if let Some(name) = name {
                    push_unique(&mut self.ctx.function_names, name);
                }
            }
            FunctionForm::Arrow => {
                self.ctx.has_function_declaration = true;
                self.ctx.has_arrow_function = true;
            }
            // Methods, getters and setters only feed the props checks.
            FunctionForm::Method => {}
        }

        let Some(first_param) = node
            .children
            .iter()
            .find(|child| matches!(child.kind, NodeKind::Params))
            .and_then(Node::first)
        else {
            return;
        };
        match &first_param.kind {
            NodeKind::Identifier { name } if name == "props" => {
                self.ctx.has_props_parameter = true;
            }
            NodeKind::ObjectPattern => {
                self.ctx.has_props_destructuring = true;
                for property in &first_param.children {
                    if let NodeKind::PatternProperty { key: Some(key) } = &property.kind {
                        push_unique(&mut self.ctx.props_names, key);
                    }
                }
            }
            _ => {}
        }
    }

    fn return_statement(&mut self, node: &Node) {
        self.ctx.has_return_statement = true;
        match node.first().map(|argument| &argument.kind) {
            Some(NodeKind::JsxElement { name }) => {
                self.ctx.is_jsx_element = true;
                // Member (`Foo.Bar`) and namespaced (`svg:rect`) tags are not
                // plain element names.
                if !name.contains(['.', ':']) {
                    self.ctx.jsx_element_name = Some(name.clone());
                }
            }
            Some(NodeKind::JsxFragment) => self.ctx.is_jsx_element = true,
            _ => {}
        }
    }

    fn call(&mut self, node: &Node) {
        let Some(callee) = node.first() else { return };
        match &callee.kind {
            NodeKind::Identifier { name } => {
                let flag = match name.as_str() {
                    "useState" => &mut self.ctx.uses_use_state,
                    "useEffect" => &mut self.ctx.uses_use_effect,
                    "useRef" => &mut self.ctx.uses_use_ref,
                    "useCallback" => &mut self.ctx.uses_use_callback,
                    "useMemo" => &mut self.ctx.uses_use_memo,
                    "useContext" => &mut self.ctx.uses_use_context,
                    "createContext" => &mut self.ctx.uses_create_context,
                    _ => return,
                };
                *flag = true;
            }
            NodeKind::Member {
                property: Some(property),
            } if property == "map" => self.ctx.has_map_call = true,
            _ => {}
        }
    }
}
