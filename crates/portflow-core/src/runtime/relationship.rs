//! Synchronous relationship evaluation.
//!
//! `passthrough` copies the source value. `javascript` and `transform`
//! bodies are either a registered pure function (looked up by the exact
//! body text) or one of a small set of built-in expressions over `source`:
//!
//! | Body                     | Result                                   |
//! |--------------------------|------------------------------------------|
//! | `source`                 | the value unchanged                      |
//! | `source.length`          | string char count or array length        |
//! | `source.a.b`             | nested field access, `null` when missing |
//! | `String(source)`         | string conversion                        |
//! | `Number(source)`         | numeric conversion                       |
//! | `Boolean(source)`        | truthiness                               |
//! | `!source`                | negated truthiness                       |
//! | `JSON.stringify(source)` | compact JSON text                        |
//!
//! `llm` relationships never evaluate here; the runtime turns them into
//! requests for the session driver.

use crate::primitives::MAX_FIELD_ACCESS_DEPTH;
use crate::types::Relationship;
use serde_json::{Number, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A registered pure transform.
pub type TransformFn = Arc<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>;

/// Named transforms available to `javascript` and `transform` bodies.
#[derive(Clone, Default)]
pub struct TransformRegistry {
    named: BTreeMap<String, TransformFn>,
}

impl std::fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformRegistry")
            .field("named", &self.named.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl TransformRegistry {
    /// Create a registry with only the built-in expressions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transform under the exact body text that selects it.
    #[must_use]
    pub fn with<F>(mut self, body: impl Into<String>, transform: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.named.insert(body.into(), Arc::new(transform));
        self
    }

    /// Check if a body is registered or built in.
    #[must_use]
    pub fn supports(&self, body: &str) -> bool {
        self.named.contains_key(body.trim()) || builtin(body.trim(), &Value::Null).is_some()
    }

    /// Evaluate a synchronous relationship over a source value.
    pub fn evaluate(&self, relationship: &Relationship, source: &Value) -> Result<Value, String> {
        match relationship {
            Relationship::Passthrough => Ok(source.clone()),
            Relationship::Javascript { body } | Relationship::Transform { body } => {
                let body = body.trim();
                if let Some(transform) = self.named.get(body) {
                    return transform(source);
                }
                builtin(body, source)
                    .unwrap_or_else(|| Err(format!("unsupported expression '{}'", body)))
            }
            Relationship::Llm { .. } => {
                Err("llm relationships are evaluated asynchronously".to_string())
            }
        }
    }
}

/// Evaluate a built-in expression. `None` if the body is not one.
fn builtin(body: &str, source: &Value) -> Option<Result<Value, String>> {
    let result = match body {
        "source" => Ok(source.clone()),
        "source.length" => length(source),
        "String(source)" => Ok(Value::String(to_text(source))),
        "Number(source)" => to_number(source),
        "Boolean(source)" => Ok(Value::Bool(truthy(source))),
        "!source" => Ok(Value::Bool(!truthy(source))),
        "JSON.stringify(source)" => Ok(Value::String(source.to_string())),
        _ => {
            let fields = body.strip_prefix("source.")?;
            return Some(field_access(source, fields));
        }
    };
    Some(result)
}

fn length(source: &Value) -> Result<Value, String> {
    match source {
        Value::String(s) => Ok(Value::from(s.chars().count())),
        Value::Array(items) => Ok(Value::from(items.len())),
        other => Err(format!("{} has no length", type_name(other))),
    }
}

fn field_access(source: &Value, fields: &str) -> Result<Value, String> {
    let segments: Vec<&str> = fields.split('.').collect();
    if segments.len() > MAX_FIELD_ACCESS_DEPTH {
        return Err(format!(
            "field access deeper than {} levels",
            MAX_FIELD_ACCESS_DEPTH
        ));
    }
    let valid = |s: &&str| {
        !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    };
    if !segments.iter().all(valid) {
        return Err(format!("unsupported expression 'source.{}'", fields));
    }
    let mut current = source;
    for segment in segments {
        let next = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        match next {
            Some(value) => current = value,
            None => return Ok(Value::Null),
        }
    }
    Ok(current.clone())
}

fn to_text(source: &Value) -> String {
    match source {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(to_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
        other => other.to_string(),
    }
}

fn to_number(source: &Value) -> Result<Value, String> {
    match source {
        Value::Number(_) => Ok(source.clone()),
        Value::Bool(b) => Ok(Value::from(u8::from(*b))),
        Value::Null => Ok(Value::from(0)),
        Value::String(s) => {
            let text = s.trim();
            if text.is_empty() {
                return Ok(Value::from(0));
            }
            if let Ok(i) = text.parse::<i64>() {
                return Ok(Value::from(i));
            }
            text.parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| format!("'{}' is not a number", text))
        }
        other => Err(format!("cannot convert {} to a number", type_name(other))),
    }
}

/// Truthiness of a value: `null`, `false`, `0`, `""` are false.
#[must_use]
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Outcome of a `validate` binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The target is valid.
    Pass,
    /// The target is invalid, with a message.
    Fail(String),
}

impl Verdict {
    /// Read a relationship result as a verdict.
    ///
    /// Accepts `true`/`false`, a string (empty passes, otherwise it is the
    /// failure message), or `{valid, message}`. Anything else is judged by
    /// truthiness.
    #[must_use]
    pub fn from_value(value: &Value, binding_id: &str) -> Self {
        let failed = || format!("Validation {} failed", binding_id);
        match value {
            Value::Bool(true) | Value::Null => Verdict::Pass,
            Value::Bool(false) => Verdict::Fail(failed()),
            Value::String(s) if s.is_empty() => Verdict::Pass,
            Value::String(s) => Verdict::Fail(s.clone()),
            Value::Object(map) if map.contains_key("valid") => {
                if map.get("valid").is_some_and(truthy) {
                    Verdict::Pass
                } else {
                    let message = map
                        .get("message")
                        .and_then(Value::as_str)
                        .map_or_else(failed, str::to_string);
                    Verdict::Fail(message)
                }
            }
            other if truthy(other) => Verdict::Pass,
            _ => Verdict::Fail(failed()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn js(body: &str) -> Relationship {
        Relationship::Javascript {
            body: body.to_string(),
        }
    }

    #[test]
    fn builtins_evaluate() {
        let reg = TransformRegistry::new();
        let cases = [
            ("source", json!([1, 2]), json!([1, 2])),
            ("source.length", json!(["a", "b", "c"]), json!(3)),
            ("source.length", json!("héllo"), json!(5)),
            ("source.user.name", json!({"user": {"name": "ada"}}), json!("ada")),
            ("source.user.missing", json!({"user": {}}), Value::Null),
            ("source.1", json!(["x", "y"]), json!("y")),
            ("String(source)", json!(50), json!("50")),
            ("String(source)", json!(["a", "b"]), json!("a,b")),
            ("Number(source)", json!(" 42 "), json!(42)),
            ("Number(source)", json!(true), json!(1)),
            ("Boolean(source)", json!(""), json!(false)),
            ("!source", json!(0), json!(true)),
            ("JSON.stringify(source)", json!({"a": 1}), json!("{\"a\":1}")),
        ];
        for (body, input, expected) in cases {
            assert_eq!(reg.evaluate(&js(body), &input), Ok(expected), "{body}");
        }
    }

    #[test]
    fn unsupported_body_is_error() {
        let reg = TransformRegistry::new();
        assert!(reg.evaluate(&js("source * 2"), &json!(1)).is_err());
        assert!(reg.evaluate(&js("source..a"), &json!(1)).is_err());
        assert!(reg.evaluate(&js("Number(source)"), &json!("abc")).is_err());
        assert!(reg.evaluate(&js("source.length"), &json!(3)).is_err());
        assert!(!reg.supports("source * 2"));
        assert!(reg.supports("source.items"));
    }

    #[test]
    fn registered_transform_wins() {
        let reg = TransformRegistry::new().with("double", |v: &Value| {
            v.as_i64()
                .map(|n| json!(n.saturating_mul(2)))
                .ok_or_else(|| "not an integer".to_string())
        });
        let rel = Relationship::Transform {
            body: "double".to_string(),
        };
        assert_eq!(reg.evaluate(&rel, &json!(21)), Ok(json!(42)));
        assert!(reg.supports("double"));
    }

    #[test]
    fn passthrough_copies_and_llm_refuses() {
        let reg = TransformRegistry::new();
        assert_eq!(reg.evaluate(&Relationship::Passthrough, &json!(50)), Ok(json!(50)));
        let llm = Relationship::Llm {
            body: "summarize".to_string(),
        };
        assert!(reg.evaluate(&llm, &json!("x")).is_err());
    }

    #[test]
    fn verdicts() {
        assert_eq!(Verdict::from_value(&json!(true), "v"), Verdict::Pass);
        assert_eq!(
            Verdict::from_value(&json!(false), "v"),
            Verdict::Fail("Validation v failed".to_string())
        );
        assert_eq!(
            Verdict::from_value(&json!("too short"), "v"),
            Verdict::Fail("too short".to_string())
        );
        assert_eq!(
            Verdict::from_value(&json!({"valid": false, "message": "no"}), "v"),
            Verdict::Fail("no".to_string())
        );
        assert_eq!(Verdict::from_value(&json!({"valid": true}), "v"), Verdict::Pass);
        assert_eq!(Verdict::from_value(&json!(3), "v"), Verdict::Pass);
    }
}
