//! Checker expressions: a small, whitelisted boolean expression language
//! evaluated against a [`FeatureContext`].
//!
//! ```
//! use jsxgrade_core::checker::evaluate;
//! use jsxgrade_core::extract::analyze_source;
//!
//! let ctx = analyze_source("function Welcome() { return <div>Hi</div>; }");
//! assert!(evaluate(&ctx, "hasFunctionDeclaration && isJSXElement"));
//! assert!(evaluate(&ctx, r#"jsxElementName === "div""#));
//! ```
//!
//! Nothing outside the grammar is executable: there are no calls except
//! `.includes(..)`, no assignment, and identifiers resolve only to context
//! attributes.

mod eval;
mod parser;

use std::fmt;

pub use parser::{CompareOp, Expr, MAX_DEPTH};

use crate::context::FeatureContext;
use crate::error::CheckerError;

/// A runtime value inside a checker expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Number(f64),
    Str(String),
    List(Vec<String>),
    Null,
    Undefined,
}

impl Value {
    /// JavaScript truthiness. Lists are objects and always truthy.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::List(_) => true,
            Value::Null | Value::Undefined => false,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::List(_) => "array",
            Value::Null => "null",
            Value::Undefined => "undefined",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_js_string())
    }
}

/// A compiled checker expression, reusable across contexts.
#[derive(Debug, Clone, PartialEq)]
pub struct Checker {
    source: String,
    expr: Expr,
}

impl Checker {
    pub fn compile(source: &str) -> Result<Self, CheckerError> {
        let expr = parser::parse(source)?;
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Identifiers the expression references.
    pub fn identifiers(&self) -> Vec<&str> {
        self.expr.identifiers()
    }

    /// Identifiers that are not context attributes.
    pub fn unknown_identifiers(&self) -> Vec<&str> {
        self.identifiers()
            .into_iter()
            .filter(|name| !FeatureContext::is_attribute(name))
            .collect()
    }

    /// Evaluate to a value. A context built from unparseable source is an
    /// error.
    pub fn eval(&self, ctx: &FeatureContext) -> Result<Value, CheckerError> {
        if let Some(message) = &ctx.parse_error {
            return Err(CheckerError::BrokenContext(message.clone()));
        }
        eval::eval(&self.expr, ctx)
    }

    pub fn test(&self, ctx: &FeatureContext) -> Result<bool, CheckerError> {
        self.eval(ctx).map(|value| value.truthy())
    }
}

/// Compile and evaluate `expression`, keeping the diagnostic on failure.
pub fn try_evaluate(ctx: &FeatureContext, expression: &str) -> Result<bool, CheckerError> {
    Checker::compile(expression)?.test(ctx)
}

/// Compile and evaluate `expression`; any failure is `false`.
pub fn evaluate(ctx: &FeatureContext, expression: &str) -> bool {
    try_evaluate(ctx, expression).unwrap_or(false)
}

/// Syntax-only validation. Unknown identifiers are accepted.
pub fn validate_checker(expression: &str) -> Result<(), CheckerError> {
    Checker::compile(expression).map(drop)
}

/// Canonical checker examples as `(description, expression)` pairs.
pub fn checker_examples() -> &'static [(&'static str, &'static str)] {
    &[
        ("Has function declaration", "hasFunctionDeclaration"),
        ("Has return statement", "hasReturnStatement"),
        ("Returns JSX element", "isJSXElement"),
        ("Has JSX in code", "hasJSX"),
        ("Uses useState hook", "usesUseState"),
        ("Uses useEffect hook", "usesUseEffect"),
        ("Returns specific element (div)", r#"jsxElementName === "div""#),
        ("Contains multiple JSX elements", "jsxElements.length > 1"),
        ("Has at least one function", "functionNames.length > 0"),
    ]
}
