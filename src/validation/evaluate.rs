//! Pure rule evaluation over JSON value graphs.

use super::rules::{Dive, RuleKind, RuleSet, Shape, ValidationRule};
use crate::schema::{Bound, ScalarKind, SchemaKind, SchemaNode};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

static DATE_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}[Tt ]\d{2}:\d{2}:\d{2}(\.\d+)?([Zz]|[+-]\d{2}:\d{2})$")
        .expect("date-time regex should be valid")
});

/// A failed rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Location of the offending value (`body.tags[1]`, `path.suffix`)
    pub path: String,
    pub rule: RuleKind,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.path, self.rule, self.message)
    }
}

fn child(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn violation(out: &mut Vec<Violation>, path: &str, rule: RuleKind, message: String) {
    out.push(Violation {
        path: path.to_string(),
        rule,
        message,
    });
}

/// Evaluate a field's rules against its wire value.
///
/// A missing key fails `required` when the field carries it and skips every
/// other rule. An explicit `null` is a present value on a nullable field and
/// skips the value rules. On any other field it fails `type` when the field
/// is required and counts as absent when it is not.
pub fn validate_field(
    rules: &[ValidationRule],
    nullable: bool,
    value: Option<&Value>,
    path: &str,
    out: &mut Vec<Violation>,
) {
    let required = rules.contains(&ValidationRule::Required);
    match value {
        None => {
            if required {
                violation(out, path, RuleKind::Required, "is required".to_string());
            }
        }
        Some(Value::Null) => {
            if required && !nullable {
                violation(out, path, RuleKind::Type, "must not be null".to_string());
            }
        }
        Some(v) => validate_value(rules, v, path, out),
    }
}

/// Evaluate every field of `set` against a JSON object
pub fn validate_object(set: &RuleSet, value: &Value, path: &str, out: &mut Vec<Violation>) {
    let Value::Object(map) = value else {
        violation(out, path, RuleKind::Type, "expected object".to_string());
        return;
    };
    for field in &set.fields {
        validate_field(
            &field.rules,
            field.nullable,
            map.get(&field.wire_key),
            &child(path, &field.wire_key),
            out,
        );
    }
}

/// Evaluate value rules against a present value.
///
/// A failed `type` rule stops evaluation for this value; the other rules
/// evaluate independently and all of their failures are reported.
pub fn validate_value(rules: &[ValidationRule], value: &Value, path: &str, out: &mut Vec<Violation>) {
    for rule in rules {
        match rule {
            ValidationRule::Required => {}
            ValidationRule::Type(shape) => {
                if !shape_accepts(*shape, value) {
                    violation(out, path, RuleKind::Type, format!("expected {shape}"));
                    return;
                }
            }
            ValidationRule::MinLength(n) => {
                if let Some(s) = value.as_str() {
                    if (s.chars().count() as u64) < *n {
                        violation(
                            out,
                            path,
                            RuleKind::MinLength,
                            format!("must be at least {n} characters"),
                        );
                    }
                }
            }
            ValidationRule::MaxLength(n) => {
                if let Some(s) = value.as_str() {
                    if (s.chars().count() as u64) > *n {
                        violation(
                            out,
                            path,
                            RuleKind::MaxLength,
                            format!("must be at most {n} characters"),
                        );
                    }
                }
            }
            ValidationRule::Minimum(bound) => {
                if let Some(x) = value.as_f64() {
                    if !above(x, bound) {
                        let op = if bound.exclusive { ">" } else { ">=" };
                        violation(out, path, RuleKind::Minimum, format!("must be {op} {}", bound.value));
                    }
                }
            }
            ValidationRule::Maximum(bound) => {
                if let Some(x) = value.as_f64() {
                    if !below(x, bound) {
                        let op = if bound.exclusive { "<" } else { "<=" };
                        violation(out, path, RuleKind::Maximum, format!("must be {op} {}", bound.value));
                    }
                }
            }
            ValidationRule::MinItems(n) => {
                if let Some(items) = value.as_array() {
                    if (items.len() as u64) < *n {
                        violation(
                            out,
                            path,
                            RuleKind::MinItems,
                            format!("must contain at least {n} items"),
                        );
                    }
                }
            }
            ValidationRule::MaxItems(n) => {
                if let Some(items) = value.as_array() {
                    if (items.len() as u64) > *n {
                        violation(
                            out,
                            path,
                            RuleKind::MaxItems,
                            format!("must contain at most {n} items"),
                        );
                    }
                }
            }
            ValidationRule::Enum(members) => {
                if !members.iter().any(|m| same_value(m, value)) {
                    let allowed = members
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ");
                    violation(out, path, RuleKind::Enum, format!("must be one of [{allowed}]"));
                }
            }
            ValidationRule::Pattern(pattern) => {
                if let Some(s) = value.as_str() {
                    if !pattern.is_match(s) {
                        violation(
                            out,
                            path,
                            RuleKind::Pattern,
                            format!("must match pattern '{}'", pattern.source()),
                        );
                    }
                }
            }
            ValidationRule::Dive(Dive::Fields(set)) => {
                if value.is_object() {
                    validate_object(set, value, path, out);
                }
            }
            ValidationRule::Dive(Dive::Elements { rules, nullable }) => {
                if let Some(items) = value.as_array() {
                    for (idx, item) in items.iter().enumerate() {
                        let item_path = format!("{path}[{idx}]");
                        if item.is_null() {
                            if !nullable {
                                violation(
                                    out,
                                    &item_path,
                                    RuleKind::Type,
                                    "must not be null".to_string(),
                                );
                            }
                            continue;
                        }
                        validate_value(rules, item, &item_path, out);
                    }
                }
            }
        }
    }
}

fn above(x: f64, bound: &Bound) -> bool {
    if bound.exclusive {
        x > bound.value
    } else {
        x >= bound.value
    }
}

fn below(x: f64, bound: &Bound) -> bool {
    if bound.exclusive {
        x < bound.value
    } else {
        x <= bound.value
    }
}

fn shape_accepts(shape: Shape, value: &Value) -> bool {
    match shape {
        Shape::String => value.is_string(),
        Shape::Integer => value.is_i64() || value.is_u64(),
        Shape::Number => value.is_number(),
        Shape::Boolean => value.is_boolean(),
        Shape::DateTime => value.as_str().is_some_and(|s| DATE_TIME.is_match(s)),
        Shape::Object => value.is_object(),
        Shape::Array => value.is_array(),
    }
}

fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Coerce a raw parameter string to the JSON value its schema declares.
///
/// A string that does not parse as the declared kind is kept as a string so
/// the `type` rule reports it.
#[must_use]
pub fn coerce_param(raw: &str, node: &SchemaNode) -> Value {
    let target = node.target();
    match &target.kind {
        SchemaKind::Scalar(ScalarKind::Integer) => raw
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
        SchemaKind::Scalar(ScalarKind::Number) => raw
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(raw.to_string())),
        SchemaKind::Scalar(ScalarKind::Boolean) => match raw {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(raw.to_string()),
        },
        SchemaKind::Array(element) => Value::Array(
            raw.split(',')
                .map(|part| coerce_param(part, element))
                .collect(),
        ),
        _ => Value::String(raw.to_string()),
    }
}

/// Coerce every occurrence of a parameter.
///
/// Array schemas collect all occurrences, each split on commas. Scalars take
/// the last occurrence.
#[must_use]
pub fn coerce_params(raws: &[&str], node: &SchemaNode) -> Option<Value> {
    if let Some(element) = node.element() {
        if raws.is_empty() {
            return None;
        }
        let items = raws
            .iter()
            .flat_map(|raw| raw.split(','))
            .map(|part| coerce_param(part, element))
            .collect();
        return Some(Value::Array(items));
    }
    raws.last().map(|raw| coerce_param(raw, node))
}
