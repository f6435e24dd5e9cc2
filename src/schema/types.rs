use crate::validation::{Pattern, ValidationRule};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// How required fields are represented in generated records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceMode {
    /// Required fields are direct values, optional fields are `Option<T>`
    #[default]
    Standard,
    /// Every field is `Option<T>`, required or not
    Explicit,
}

impl fmt::Display for PresenceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresenceMode::Standard => write!(f, "standard"),
            PresenceMode::Explicit => write!(f, "explicit"),
        }
    }
}

/// Primitive value kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    String,
    Integer,
    Number,
    Boolean,
    /// RFC 3339 timestamp carried as a string
    DateTime,
    /// Untyped schema (`{}`), any JSON value
    Any,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScalarKind::String => "string",
            ScalarKind::Integer => "integer",
            ScalarKind::Number => "number",
            ScalarKind::Boolean => "boolean",
            ScalarKind::DateTime => "date-time",
            ScalarKind::Any => "any",
        };
        write!(f, "{s}")
    }
}

/// Numeric bound, inclusive unless `exclusive`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub value: f64,
    pub exclusive: bool,
}

/// Leaf constraints declared on a schema
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub minimum: Option<Bound>,
    pub maximum: Option<Bound>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub pattern: Option<Arc<Pattern>>,
    /// Allowed members for non-string enums
    pub one_of: Vec<Value>,
}

impl Constraints {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Constraints::default()
    }
}

/// Shape of a resolved schema
#[derive(Debug, Clone)]
pub enum SchemaKind {
    Scalar(ScalarKind),
    /// String enumeration; members keep their wire spelling
    Enum(Vec<String>),
    Object(Vec<FieldDescriptor>),
    Array(Arc<SchemaNode>),
    /// A named schema reached through `$ref`, already resolved
    Reference(Arc<SchemaNode>),
}

/// A resolved schema.
///
/// Nodes are immutable once built and shared through `Arc`. No unresolved
/// `$ref` survives resolution: references are either [`SchemaKind::Reference`]
/// pointing at the resolved target, or an error.
#[derive(Debug, Clone)]
pub struct SchemaNode {
    /// Type name. Unique within a compilation when `declared` is set, a
    /// descriptive label otherwise.
    pub name: String,
    pub kind: SchemaKind,
    /// Whether this node gets its own top-level declaration
    pub declared: bool,
    pub nullable: bool,
    /// Numeric format (`int32`, `int64`, `float`, `double`)
    pub format: Option<String>,
    pub constraints: Constraints,
    pub description: Option<String>,
}

impl SchemaNode {
    /// Follow references down to the node that carries the shape
    #[must_use]
    pub fn target(&self) -> &SchemaNode {
        match &self.kind {
            SchemaKind::Reference(target) => target.target(),
            _ => self,
        }
    }

    /// Fields of an object node, looking through references
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        match &self.target().kind {
            SchemaKind::Object(fields) => fields,
            _ => &[],
        }
    }

    #[must_use]
    pub fn field(&self, wire_key: &str) -> Option<&FieldDescriptor> {
        self.fields().iter().find(|f| f.wire_key == wire_key)
    }

    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self.target().kind, SchemaKind::Object(_))
    }

    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self.target().kind, SchemaKind::Array(_))
    }

    /// Scalar kind after following references; string enums count as strings
    #[must_use]
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match &self.target().kind {
            SchemaKind::Scalar(kind) => Some(*kind),
            SchemaKind::Enum(_) => Some(ScalarKind::String),
            _ => None,
        }
    }

    /// Whether `null` is an accepted value, on this node or its target
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.nullable || self.target().nullable
    }

    /// Element node of an array, looking through references
    #[must_use]
    pub fn element(&self) -> Option<&Arc<SchemaNode>> {
        match &self.target().kind {
            SchemaKind::Array(element) => Some(element),
            _ => None,
        }
    }
}

/// One field of an object schema
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Rust identifier
    pub name: String,
    /// Key as it appears on the wire
    pub wire_key: String,
    pub ty: Arc<SchemaNode>,
    pub required: bool,
    /// `true` when the field is represented as `Option<T>`. Always set for
    /// optional fields, and for required ones under [`PresenceMode::Explicit`].
    pub nullable_presence: bool,
    /// Compiled rules, `required` first when present
    pub rules: Vec<ValidationRule>,
    pub description: Option<String>,
}

impl FieldDescriptor {
    /// Whether the generated field type is wrapped in `Option`
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.nullable_presence || self.ty.is_nullable()
    }
}
