//! Evaluation of compiled checker expressions with JavaScript semantics.

use std::cmp::Ordering;

use crate::context::{Attribute, FeatureContext};
use crate::error::CheckerError;

use super::parser::{CompareOp, Expr};
use super::Value;

pub(super) fn eval(expr: &Expr, ctx: &FeatureContext) -> Result<Value, CheckerError> {
    Ok(match expr {
        Expr::Number(n) => Value::Number(*n),
        Expr::Str(s) => Value::Str(s.clone()),
        Expr::Bool(b) => Value::Bool(*b),
        Expr::Null => Value::Null,
        Expr::Undefined => Value::Undefined,
        Expr::Ident(name) => lookup(ctx, name)?,
        Expr::Not(inner) => Value::Bool(!eval(inner, ctx)?.truthy()),
        Expr::And(a, b) => {
            let left = eval(a, ctx)?;
            if left.truthy() {
                eval(b, ctx)?
            } else {
                left
            }
        }
        Expr::Or(a, b) => {
            let left = eval(a, ctx)?;
            if left.truthy() {
                left
            } else {
                eval(b, ctx)?
            }
        }
        Expr::Compare(op, a, b) => {
            let left = eval(a, ctx)?;
            let right = eval(b, ctx)?;
            Value::Bool(compare(*op, &left, &right))
        }
        Expr::Length(target) => match eval(target, ctx)? {
            Value::List(items) => Value::Number(items.len() as f64),
            Value::Str(s) => Value::Number(s.encode_utf16().count() as f64),
            other => {
                return Err(CheckerError::TypeMismatch(format!(
                    "cannot read length of {}",
                    other.type_name()
                )))
            }
        },
        Expr::Index(target, index) => {
            let target = eval(target, ctx)?;
            let index = eval(index, ctx)?;
            index_into(target, &index)?
        }
        Expr::Includes(target, needle) => {
            let target = eval(target, ctx)?;
            let needle = eval(needle, ctx)?;
            Value::Bool(includes(&target, &needle)?)
        }
    })
}

fn lookup(ctx: &FeatureContext, name: &str) -> Result<Value, CheckerError> {
    match ctx.attribute(name) {
        Some(Attribute::Flag(b)) => Ok(Value::Bool(b)),
        Some(Attribute::List(items)) => Ok(Value::List(items.to_vec())),
        Some(Attribute::Text(Some(text))) => Ok(Value::Str(text.to_string())),
        Some(Attribute::Text(None)) => Ok(Value::Null),
        None => Err(CheckerError::UnknownIdentifier(name.to_string())),
    }
}

fn index_into(target: Value, index: &Value) -> Result<Value, CheckerError> {
    let position = match index {
        Value::Number(n) if n.fract() == 0.0 && *n >= 0.0 => Some(*n as usize),
        Value::Str(s) => s.parse::<usize>().ok(),
        _ => None,
    };
    match target {
        Value::List(items) => Ok(position
            .and_then(|i| items.into_iter().nth(i))
            .map_or(Value::Undefined, Value::Str)),
        // Indexed by UTF-16 unit so `s[s.length - 1]` stays in bounds. A lone
        // surrogate comes back as U+FFFD.
        Value::Str(s) => Ok(position
            .and_then(|i| s.encode_utf16().nth(i))
            .map_or(Value::Undefined, |unit| {
                Value::Str(String::from_utf16_lossy(&[unit]))
            })),
        Value::Null | Value::Undefined => Err(CheckerError::TypeMismatch(format!(
            "cannot index into {}",
            target.type_name()
        ))),
        Value::Bool(_) | Value::Number(_) => Ok(Value::Undefined),
    }
}

fn includes(target: &Value, needle: &Value) -> Result<bool, CheckerError> {
    match target {
        Value::List(items) => Ok(match needle {
            Value::Str(s) => items.iter().any(|item| item == s),
            _ => false,
        }),
        Value::Str(s) => Ok(s.contains(needle.to_js_string().as_str())),
        other => Err(CheckerError::TypeMismatch(format!(
            "includes is not a function on {}",
            other.type_name()
        ))),
    }
}

fn compare(op: CompareOp, left: &Value, right: &Value) -> bool {
    match op {
        CompareOp::StrictEq => strict_eq(left, right),
        CompareOp::StrictNe => !strict_eq(left, right),
        CompareOp::LooseEq => loose_eq(left, right),
        CompareOp::LooseNe => !loose_eq(left, right),
        CompareOp::Lt => relational(left, right) == Some(Ordering::Less),
        CompareOp::Gt => relational(left, right) == Some(Ordering::Greater),
        CompareOp::Le => matches!(
            relational(left, right),
            Some(Ordering::Less | Ordering::Equal)
        ),
        CompareOp::Ge => matches!(
            relational(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        ),
    }
}

/// `===`. Lists compare by content.
fn strict_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::List(a), Value::List(b)) => a == b,
        (Value::Null, Value::Null) | (Value::Undefined, Value::Undefined) => true,
        _ => false,
    }
}

/// `==` with the abstract equality coercions.
fn loose_eq(left: &Value, right: &Value) -> bool {
    use Value::{Bool, List, Null, Number, Str, Undefined};
    match (left, right) {
        (Null | Undefined, Null | Undefined) => true,
        (Null | Undefined, _) | (_, Null | Undefined) => false,
        (Bool(b), other) => loose_eq(&Number(f64::from(u8::from(*b))), other),
        (other, Bool(b)) => loose_eq(other, &Number(f64::from(u8::from(*b)))),
        (Number(n), Str(s)) | (Str(s), Number(n)) => to_number(s) == *n,
        (List(items), primitive @ (Number(_) | Str(_)))
        | (primitive @ (Number(_) | Str(_)), List(items)) => {
            loose_eq(&Str(items.join(",")), primitive)
        }
        _ => strict_eq(left, right),
    }
}

/// Ordering for `<`-style operators; `None` whenever JavaScript would
/// answer false both ways (any NaN operand).
fn relational(left: &Value, right: &Value) -> Option<Ordering> {
    if let (Value::Str(a), Value::Str(b)) = (left, right) {
        return Some(a.encode_utf16().cmp(b.encode_utf16()));
    }
    left.to_number().partial_cmp(&right.to_number())
}

/// `Number(s)` for the subset of numeric strings checkers produce.
fn to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ => trimmed.parse().unwrap_or(f64::NAN),
    }
}

impl Value {
    fn to_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Str(s) => to_number(s),
            Value::List(items) => to_number(&items.join(",")),
            Value::Null => 0.0,
            Value::Undefined => f64::NAN,
        }
    }

    pub(super) fn to_js_string(&self) -> String {
        match self {
            Value::Number(n) => number_to_string(*n),
            Value::Bool(b) => b.to_string(),
            Value::Str(s) => s.clone(),
            Value::List(items) => items.join(","),
            Value::Null => "null".to_string(),
            Value::Undefined => "undefined".to_string(),
        }
    }
}

fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        (if n > 0.0 { "Infinity" } else { "-Infinity" }).to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_index_agrees_with_length() {
        let text = || Value::Str("a\u{1F600}".into());
        assert_eq!(
            index_into(text(), &Value::Number(0.0)).unwrap(),
            Value::Str("a".into())
        );
        // Length is 3 in UTF-16, so index 2 is the trailing surrogate.
        assert_eq!(
            index_into(text(), &Value::Number(2.0)).unwrap(),
            Value::Str("\u{FFFD}".into())
        );
        assert_eq!(index_into(text(), &Value::Number(3.0)).unwrap(), Value::Undefined);
    }

    #[test]
    fn loose_equality_coercions() {
        assert!(loose_eq(&Value::Null, &Value::Undefined));
        assert!(!loose_eq(&Value::Null, &Value::Bool(false)));
        assert!(loose_eq(&Value::Number(1.0), &Value::Str("1".into())));
        assert!(loose_eq(&Value::Bool(true), &Value::Number(1.0)));
        assert!(loose_eq(&Value::List(vec![]), &Value::Bool(false)));
        assert!(loose_eq(
            &Value::List(vec!["a".into()]),
            &Value::Str("a".into())
        ));
        assert!(!strict_eq(&Value::Number(1.0), &Value::Str("1".into())));
        assert!(!strict_eq(&Value::Number(f64::NAN), &Value::Number(f64::NAN)));
    }

    #[test]
    fn relational_ordering() {
        assert_eq!(
            relational(&Value::Str("b".into()), &Value::Str("a".into())),
            Some(Ordering::Greater)
        );
        assert_eq!(
            relational(&Value::Str("10".into()), &Value::Number(9.0)),
            Some(Ordering::Greater)
        );
        assert_eq!(relational(&Value::Undefined, &Value::Number(0.0)), None);
        assert_eq!(
            relational(&Value::Null, &Value::Number(0.0)),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn number_formatting_matches_javascript() {
        assert_eq!(number_to_string(3.0), "3");
        assert_eq!(number_to_string(0.5), "0.5");
        assert_eq!(number_to_string(-2.0), "-2");
        assert_eq!(number_to_string(f64::NAN), "NaN");
    }
}
