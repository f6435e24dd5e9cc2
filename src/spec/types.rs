use crate::router::RouteTemplate;
use crate::schema::SchemaNode;
use crate::validation::ValidationRule;
use http::Method;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Where a parameter travels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl ParameterLocation {
    /// Parse the OpenAPI `in` value
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "path" => Some(ParameterLocation::Path),
            "query" => Some(ParameterLocation::Query),
            "header" => Some(ParameterLocation::Header),
            "cookie" => Some(ParameterLocation::Cookie),
            _ => None,
        }
    }
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterLocation::Path => write!(f, "path"),
            ParameterLocation::Query => write!(f, "query"),
            ParameterLocation::Header => write!(f, "header"),
            ParameterLocation::Cookie => write!(f, "cookie"),
        }
    }
}

/// A parameter after `$ref` resolution, schema still raw
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterMeta {
    pub name: String,
    pub location: ParameterLocation,
    pub required: bool,
    pub schema: Option<Value>,
    pub description: Option<String>,
}

/// A request body after `$ref` resolution
#[derive(Debug, Clone, PartialEq)]
pub struct RequestBodyMeta {
    pub content_type: String,
    pub required: bool,
    pub schema: Option<Value>,
}

/// A declared response header
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderMeta {
    pub name: String,
    pub required: bool,
    pub schema: Option<Value>,
    pub description: Option<String>,
}

/// One numeric-status response
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseMeta {
    pub status: u16,
    pub description: Option<String>,
    pub content_type: Option<String>,
    pub schema: Option<Value>,
    pub headers: Vec<HeaderMeta>,
}

/// An operation as declared, before schema resolution
#[derive(Debug, Clone)]
pub struct OperationMeta {
    pub operation_id: String,
    pub method: Method,
    pub route: RouteTemplate,
    pub summary: Option<String>,
    pub parameters: Vec<ParameterMeta>,
    pub request_body: Option<RequestBodyMeta>,
    pub responses: BTreeMap<u16, ResponseMeta>,
}

impl OperationMeta {
    /// Parameters declared in `location`, in declaration order
    pub fn parameters_in(&self, location: ParameterLocation) -> impl Iterator<Item = &ParameterMeta> {
        self.parameters.iter().filter(move |p| p.location == location)
    }
}

/// A resolved request body
#[derive(Debug, Clone)]
pub struct RequestBody {
    pub node: Arc<SchemaNode>,
    pub required: bool,
    pub content_type: String,
    /// Rules for the body as a whole: `required` when the body is, then the
    /// value rules of its schema
    pub rules: Vec<ValidationRule>,
}

/// Resolved request parts, each synthesized as one record
#[derive(Debug, Clone, Default)]
pub struct RequestParts {
    pub body: Option<RequestBody>,
    pub headers: Option<Arc<SchemaNode>>,
    pub query: Option<Arc<SchemaNode>>,
    pub path: Option<Arc<SchemaNode>>,
    pub cookies: Option<Arc<SchemaNode>>,
}

impl RequestParts {
    /// Part records in wire order: path, query, headers, cookies
    pub fn parameter_parts(&self) -> impl Iterator<Item = (ParameterLocation, &Arc<SchemaNode>)> {
        [
            (ParameterLocation::Path, self.path.as_ref()),
            (ParameterLocation::Query, self.query.as_ref()),
            (ParameterLocation::Header, self.headers.as_ref()),
            (ParameterLocation::Cookie, self.cookies.as_ref()),
        ]
        .into_iter()
        .filter_map(|(loc, node)| node.map(|n| (loc, n)))
    }

    /// Record for `location`, if the operation declares any parameter there
    #[must_use]
    pub fn part(&self, location: ParameterLocation) -> Option<&Arc<SchemaNode>> {
        match location {
            ParameterLocation::Path => self.path.as_ref(),
            ParameterLocation::Query => self.query.as_ref(),
            ParameterLocation::Header => self.headers.as_ref(),
            ParameterLocation::Cookie => self.cookies.as_ref(),
        }
    }
}

/// One declared status of an operation
#[derive(Debug, Clone)]
pub struct ResponseVariant {
    pub status_code: u16,
    pub description: Option<String>,
    pub content_type: Option<String>,
    pub body: Option<Arc<SchemaNode>>,
    /// Header record; every field uses explicit presence
    pub headers: Option<Arc<SchemaNode>>,
}

/// A fully resolved operation
#[derive(Debug, Clone)]
pub struct OperationSpec {
    pub operation_id: String,
    pub method: Method,
    pub route: RouteTemplate,
    pub summary: Option<String>,
    pub request: RequestParts,
    pub responses: BTreeMap<u16, ResponseVariant>,
}

impl OperationSpec {
    #[must_use]
    pub fn response(&self, status: u16) -> Option<&ResponseVariant> {
        self.responses.get(&status)
    }
}
