//! The feature context: a flat, fully defaulted description of a program's
//! shape that checker expressions are evaluated against.

use serde::{Deserialize, Serialize};

/// Structural features extracted from one source text.
///
/// Serialized with the attribute names checker expressions use
/// (`hasFunctionDeclaration`, `isJSXElement`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeatureContext {
    pub has_function_declaration: bool,
    pub has_arrow_function: bool,
    pub function_names: Vec<String>,
    pub has_return_statement: bool,
    #[serde(rename = "isJSXElement")]
    pub is_jsx_element: bool,
    pub jsx_element_name: Option<String>,
    #[serde(rename = "hasJSX")]
    pub has_jsx: bool,
    pub jsx_elements: Vec<String>,
    pub variable_names: Vec<String>,
    pub imported_modules: Vec<String>,
    pub uses_use_state: bool,
    pub uses_use_effect: bool,
    pub uses_use_ref: bool,
    pub uses_use_callback: bool,
    pub uses_use_memo: bool,
    pub uses_use_context: bool,
    pub uses_create_context: bool,
    pub has_props_parameter: bool,
    pub has_props_destructuring: bool,
    pub props_names: Vec<String>,
    pub has_conditional_rendering: bool,
    pub has_map_call: bool,
    pub has_event_handler: bool,
    /// Set when the context describes source that failed to parse; every
    /// other attribute then keeps its default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
}

/// Borrowed view of one attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute<'a> {
    Flag(bool),
    List(&'a [String]),
    Text(Option<&'a str>),
}

/// Every attribute name a checker expression may reference.
pub const ATTRIBUTE_NAMES: &[&str] = &[
    "hasFunctionDeclaration",
    "hasArrowFunction",
    "functionNames",
    "hasReturnStatement",
    "isJSXElement",
    "jsxElementName",
    "hasJSX",
    "jsxElements",
    "variableNames",
    "importedModules",
    "usesUseState",
    "usesUseEffect",
    "usesUseRef",
    "usesUseCallback",
    "usesUseMemo",
    "usesUseContext",
    "usesCreateContext",
    "hasPropsParameter",
    "hasPropsDestructuring",
    "propsNames",
    "hasConditionalRendering",
    "hasMapCall",
    "hasEventHandler",
    "parseError",
];

impl FeatureContext {
    /// The all-defaults context for source that did not parse.
    pub fn broken(message: impl Into<String>) -> Self {
        Self {
            parse_error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn is_broken(&self) -> bool {
        self.parse_error.is_some()
    }

    /// Look up an attribute by its checker name.
    pub fn attribute(&self, name: &str) -> Option<Attribute<'_>> {
        use Attribute::{Flag, List, Text};
        let value = match name {
            "hasFunctionDeclaration" => Flag(self.has_function_declaration),
            "hasArrowFunction" => Flag(self.has_arrow_function),
            "functionNames" => List(&self.function_names),
            "hasReturnStatement" => Flag(self.has_return_statement),
            "isJSXElement" => Flag(self.is_jsx_element),
            "jsxElementName" => Text(self.jsx_element_name.as_deref()),
            "hasJSX" => Flag(self.has_jsx),
            "jsxElements" => List(&self.jsx_elements),
            "variableNames" => List(&self.variable_names),
            "importedModules" => List(&self.imported_modules),
            "usesUseState" => Flag(self.uses_use_state),
            "usesUseEffect" => Flag(self.uses_use_effect),
            "usesUseRef" => Flag(self.uses_use_ref),
            "usesUseCallback" => Flag(self.uses_use_callback),
            "usesUseMemo" => Flag(self.uses_use_memo),
            "usesUseContext" => Flag(self.uses_use_context),
            "usesCreateContext" => Flag(self.uses_create_context),
            "hasPropsParameter" => Flag(self.has_props_parameter),
            "hasPropsDestructuring" => Flag(self.has_props_destructuring),
            "propsNames" => List(&self.props_names),
            "hasConditionalRendering" => Flag(self.has_conditional_rendering),
            "hasMapCall" => Flag(self.has_map_call),
            "hasEventHandler" => Flag(self.has_event_handler),
            "parseError" => Text(self.parse_error.as_deref()),
            _ => return None,
        };
        Some(value)
    }

    /// Whether `name` is a checker-visible attribute.
    pub fn is_attribute(name: &str) -> bool {
        ATTRIBUTE_NAMES.contains(&name)
    }
}

/// Append `value` unless it is already present.
pub(crate) fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|existing| existing == value) {
        list.push(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_checker_names() {
        let ctx = FeatureContext {
            is_jsx_element: true,
            has_jsx: true,
            jsx_element_name: Some("div".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&ctx).expect("serialize");
        assert_eq!(json["isJSXElement"], true);
        assert_eq!(json["hasJSX"], true);
        assert_eq!(json["jsxElementName"], "div");
        assert_eq!(json["usesUseState"], false);
        assert!(json.get("parseError").is_none());
    }

    #[test]
    fn every_attribute_name_resolves() {
        let ctx = FeatureContext::default();
        for name in ATTRIBUTE_NAMES {
            assert!(ctx.attribute(name).is_some(), "{name} should resolve");
        }
        assert_eq!(ctx.attribute("constructor"), None);
        assert_eq!(ctx.attribute("process"), None);
    }

    #[test]
    fn broken_context_keeps_defaults() {
        let ctx = FeatureContext::broken("Unexpected token (1:9)");
        assert!(ctx.is_broken());
        assert_eq!(
            ctx,
            FeatureContext {
                parse_error: Some("Unexpected token (1:9)".into()),
                ..Default::default()
            }
        );
        let json = serde_json::to_string(&ctx).expect("serialize");
        let back: FeatureContext = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, ctx);
    }

    #[test]
    fn push_unique_preserves_first_occurrence_order() {
        let mut list = Vec::new();
        for name in ["b", "a", "b", "c", "a"] {
            push_unique(&mut list, name);
        }
        assert_eq!(list, vec!["b", "a", "c"]);
    }
}
