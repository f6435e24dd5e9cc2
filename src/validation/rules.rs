use crate::schema::{Bound, FieldDescriptor, ScalarKind};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// JSON shape a value must have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    String,
    Integer,
    Number,
    Boolean,
    DateTime,
    Object,
    Array,
}

impl Shape {
    /// Shape for a scalar kind; `Any` has none
    #[must_use]
    pub fn for_scalar(kind: ScalarKind) -> Option<Shape> {
        match kind {
            ScalarKind::String => Some(Shape::String),
            ScalarKind::Integer => Some(Shape::Integer),
            ScalarKind::Number => Some(Shape::Number),
            ScalarKind::Boolean => Some(Shape::Boolean),
            ScalarKind::DateTime => Some(Shape::DateTime),
            ScalarKind::Any => None,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Shape::String => "string",
            Shape::Integer => "integer",
            Shape::Number => "number",
            Shape::Boolean => "boolean",
            Shape::DateTime => "date-time",
            Shape::Object => "object",
            Shape::Array => "array",
        };
        write!(f, "{s}")
    }
}

/// A compiled `pattern` constraint
#[derive(Debug)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a pattern source
    ///
    /// # Errors
    ///
    /// Returns the regex error when `source` is not a valid expression.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Ok(Pattern {
            source: source.to_string(),
            regex: Regex::new(source)?,
        })
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn is_match(&self, s: &str) -> bool {
        self.regex.is_match(s)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// Nested validation of a container's contents
#[derive(Debug, Clone, PartialEq)]
pub enum Dive {
    /// Every field of a nested object
    Fields(Arc<RuleSet>),
    /// Every element of an array
    Elements {
        rules: Arc<Vec<ValidationRule>>,
        /// Whether `null` elements are allowed
        nullable: bool,
    },
}

/// One field-level validation rule
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationRule {
    /// The key must be present on the wire. `null` satisfies it only when
    /// the field is nullable.
    Required,
    /// The value must have this JSON shape; failing it skips the remaining rules
    Type(Shape),
    MinLength(u64),
    MaxLength(u64),
    Minimum(Bound),
    Maximum(Bound),
    MinItems(u64),
    MaxItems(u64),
    Enum(Vec<Value>),
    Pattern(Arc<Pattern>),
    Dive(Dive),
}

impl ValidationRule {
    #[must_use]
    pub fn kind(&self) -> RuleKind {
        match self {
            ValidationRule::Required => RuleKind::Required,
            ValidationRule::Type(_) => RuleKind::Type,
            ValidationRule::MinLength(_) => RuleKind::MinLength,
            ValidationRule::MaxLength(_) => RuleKind::MaxLength,
            ValidationRule::Minimum(_) => RuleKind::Minimum,
            ValidationRule::Maximum(_) => RuleKind::Maximum,
            ValidationRule::MinItems(_) => RuleKind::MinItems,
            ValidationRule::MaxItems(_) => RuleKind::MaxItems,
            ValidationRule::Enum(_) => RuleKind::Enum,
            ValidationRule::Pattern(_) => RuleKind::Pattern,
            ValidationRule::Dive(_) => RuleKind::Dive,
        }
    }
}

/// Rule kind reported in violations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Required,
    Type,
    MinLength,
    MaxLength,
    Minimum,
    Maximum,
    MinItems,
    MaxItems,
    Enum,
    Pattern,
    Dive,
}

impl RuleKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RuleKind::Required => "required",
            RuleKind::Type => "type",
            RuleKind::MinLength => "minLength",
            RuleKind::MaxLength => "maxLength",
            RuleKind::Minimum => "minimum",
            RuleKind::Maximum => "maximum",
            RuleKind::MinItems => "minItems",
            RuleKind::MaxItems => "maxItems",
            RuleKind::Enum => "enum",
            RuleKind::Pattern => "pattern",
            RuleKind::Dive => "dive",
        }
    }
}

impl Serialize for RuleKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rules of one field, keyed by its wire key
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRules {
    pub wire_key: String,
    /// Whether `null` is an accepted value
    pub nullable: bool,
    pub rules: Vec<ValidationRule>,
}

/// Compiled rules for every field of an object schema
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    pub name: String,
    pub fields: Vec<FieldRules>,
}

impl RuleSet {
    /// Collect the already-compiled rules of `fields`
    pub fn from_fields(name: impl Into<String>, fields: &[FieldDescriptor]) -> Self {
        RuleSet {
            name: name.into(),
            fields: fields
                .iter()
                .map(|f| FieldRules {
                    wire_key: f.wire_key.clone(),
                    nullable: f.ty.is_nullable(),
                    rules: f.rules.clone(),
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn field(&self, wire_key: &str) -> Option<&FieldRules> {
        self.fields.iter().find(|f| f.wire_key == wire_key)
    }
}
