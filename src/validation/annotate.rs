use super::rules::{Dive, Pattern, ValidationRule};
use crate::ir::{Attribute, Expression, Literal, Meta};
use serde_json::Value;

fn number(x: f64) -> Expression {
    if x.fract() == 0.0 && x.abs() < 9.0e15 {
        Expression::Lit(Literal::Int(x as i64))
    } else {
        Expression::Lit(Literal::Float(x))
    }
}

fn uint(n: u64) -> Expression {
    Expression::Lit(Literal::UInt(n))
}

fn member(v: &Value) -> Expression {
    match v {
        Value::String(s) => Expression::str(s.clone()),
        Value::Bool(b) => Expression::Lit(Literal::Bool(*b)),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Expression::Lit(Literal::Int(i)),
            (None, Some(f)) => number(f),
            (None, None) => Expression::str(n.to_string()),
        },
        other => Expression::str(other.to_string()),
    }
}

fn bounds(name: &str, min: Option<Expression>, max: Option<Expression>) -> Option<Meta> {
    let mut items = Vec::new();
    if let Some(min) = min {
        items.push(Meta::NameValue("min".to_string(), min));
    }
    if let Some(max) = max {
        items.push(Meta::NameValue("max".to_string(), max));
    }
    (!items.is_empty()).then(|| Meta::List(name.to_string(), items))
}

/// Translate compiled rules into `#[validate(...)]` metas.
///
/// Vocabulary: `required`, `length(min, max)`, `range(min, max,
/// exclusive_min, exclusive_max)`, `items(min, max)`, `one_of(...)`,
/// `regex(path = CONST)`, `dive` for a nested record and `dive(...)` carrying
/// the element rules of a sequence. `required` is emitted only when `optional`
/// is set, meaning the field is `Option`-typed for presence alone; a direct
/// value is present by construction and a nullable `Option` accepts `None`.
/// Type rules have no annotation since the Rust type enforces them.
///
/// `pattern_const` names the const holding a pattern source; `depth` counts
/// how many `dive`s deep the pattern sits.
pub fn annotate(
    rules: &[ValidationRule],
    optional: bool,
    depth: usize,
    pattern_const: &mut dyn FnMut(&Pattern, usize) -> String,
) -> Vec<Meta> {
    let mut metas = Vec::new();
    let (mut min_len, mut max_len) = (None, None);
    let (mut min, mut max, mut excl_min, mut excl_max) = (None, None, false, false);
    let (mut min_items, mut max_items) = (None, None);

    for rule in rules {
        match rule {
            ValidationRule::Required => {
                if optional {
                    metas.push(Meta::Path("required".to_string()));
                }
            }
            ValidationRule::Type(_) => {}
            ValidationRule::MinLength(n) => min_len = Some(uint(*n)),
            ValidationRule::MaxLength(n) => max_len = Some(uint(*n)),
            ValidationRule::Minimum(b) => {
                min = Some(number(b.value));
                excl_min = b.exclusive;
            }
            ValidationRule::Maximum(b) => {
                max = Some(number(b.value));
                excl_max = b.exclusive;
            }
            ValidationRule::MinItems(n) => min_items = Some(uint(*n)),
            ValidationRule::MaxItems(n) => max_items = Some(uint(*n)),
            ValidationRule::Enum(_) | ValidationRule::Pattern(_) | ValidationRule::Dive(_) => {}
        }
    }

    metas.extend(bounds("length", min_len, max_len));
    if let Some(Meta::List(name, mut items)) = bounds("range", min, max) {
        if excl_min {
            items.push(Meta::NameValue(
                "exclusive_min".to_string(),
                Expression::Lit(Literal::Bool(true)),
            ));
        }
        if excl_max {
            items.push(Meta::NameValue(
                "exclusive_max".to_string(),
                Expression::Lit(Literal::Bool(true)),
            ));
        }
        metas.push(Meta::List(name, items));
    }
    metas.extend(bounds("items", min_items, max_items));

    for rule in rules {
        match rule {
            ValidationRule::Enum(members) => {
                let members = members
                    .iter()
                    .map(|m| Meta::Value(member(m)))
                    .collect();
                metas.push(Meta::List("one_of".to_string(), members));
            }
            ValidationRule::Pattern(p) => {
                let name = pattern_const(p, depth);
                metas.push(Meta::List(
                    "regex".to_string(),
                    vec![Meta::NameValue("path".to_string(), Expression::path(name))],
                ));
            }
            ValidationRule::Dive(Dive::Fields(_)) => metas.push(Meta::Path("dive".to_string())),
            ValidationRule::Dive(Dive::Elements { rules, .. }) => {
                let nested = annotate(rules, false, depth + 1, &mut *pattern_const);
                if !nested.is_empty() {
                    metas.push(Meta::List("dive".to_string(), nested));
                }
            }
            _ => {}
        }
    }
    metas
}

/// Wrap metas in a `#[validate(...)]` attribute, `None` when there are none
#[must_use]
pub fn validate_attribute(metas: Vec<Meta>) -> Option<Attribute> {
    (!metas.is_empty()).then(|| Attribute::list("validate", metas))
}
