use crate::router::ParamVec;
use crate::schema::SchemaNode;
use crate::spec::{OperationSpec, ParameterLocation, RequestBody};
use crate::typed::{DynamicEnvelope, ResponsePayload, Validate};
use crate::validation::{validate_field, validate_object, RuleSet, Violation};
use http::Method;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use smallvec::SmallVec;
use std::sync::Arc;

/// Maximum inline headers/cookies before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header/cookie storage. Names are case-preserved; header
/// lookups ignore ASCII case.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Split a query string into decoded `(name, value)` pairs, repeats kept
pub fn parse_query(query: &str) -> ParamVec {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (Arc::from(k.as_ref()), v.into_owned()))
        .collect()
}

/// Parse a `Cookie` header value into `(name, value)` pairs
pub fn parse_cookies(header: &str) -> HeaderVec {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            let name = name.trim();
            (!name.is_empty()).then(|| (Arc::from(name), value.trim().to_string()))
        })
        .collect()
}

/// A transport-neutral request handed to the [`Dispatcher`](super::Dispatcher)
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    /// Path without the query string
    pub path: String,
    pub query: ParamVec,
    pub headers: HeaderVec,
    pub cookies: HeaderVec,
    /// Decoded JSON body, if any
    pub body: Option<Value>,
}

impl Request {
    /// Request for `target`, a path with an optional `?query` suffix
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, parse_query(query)),
            None => (target, ParamVec::new()),
        };
        Request {
            method,
            path: path.to_string(),
            query,
            headers: HeaderVec::new(),
            cookies: HeaderVec::new(),
            body: None,
        }
    }

    /// Add a header. A `Cookie` header is also split into cookies.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        if name.eq_ignore_ascii_case("cookie") {
            self.cookies.extend(parse_cookies(&value));
        }
        self.headers.push((Arc::from(name), value));
        self
    }

    #[must_use]
    pub fn with_cookie(mut self, name: &str, value: impl Into<String>) -> Self {
        self.cookies.push((Arc::from(name), value.into()));
        self
    }

    #[must_use]
    pub fn with_query(mut self, name: &str, value: impl Into<String>) -> Self {
        self.query.push((Arc::from(name), value.into()));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// First header named `name`, ignoring ASCII case
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Parameter record of one location with its compiled rules
#[derive(Debug)]
pub(crate) struct PartRules {
    pub(crate) location: ParameterLocation,
    pub(crate) node: Arc<SchemaNode>,
    pub(crate) rules: RuleSet,
}

/// Serving-time view of one compiled operation
#[derive(Debug)]
pub struct OperationRules {
    pub operation_id: Arc<str>,
    /// Declared statuses, ascending
    pub declared: Vec<u16>,
    pub(crate) parts: Vec<PartRules>,
    pub(crate) body: Option<RequestBody>,
    content_types: Vec<(u16, String)>,
}

impl OperationRules {
    #[must_use]
    pub fn from_spec(op: &OperationSpec) -> Self {
        OperationRules {
            operation_id: Arc::from(op.operation_id.as_str()),
            declared: op.responses.keys().copied().collect(),
            parts: op
                .request
                .parameter_parts()
                .map(|(location, node)| PartRules {
                    location,
                    node: Arc::clone(node),
                    rules: RuleSet::from_fields(node.name.clone(), node.fields()),
                })
                .collect(),
            body: op.request.body.clone(),
            content_types: op
                .responses
                .iter()
                .filter_map(|(status, v)| v.content_type.clone().map(|ct| (*status, ct)))
                .collect(),
        }
    }

    /// Declared media type of a status, if it has a body
    #[must_use]
    pub fn content_type(&self, status: u16) -> Option<&str> {
        self.content_types
            .iter()
            .find(|(s, _)| *s == status)
            .map(|(_, ct)| ct.as_str())
    }
}

/// A routed request with its parameters coerced to their declared types.
///
/// Parameter records are JSON objects keyed by wire name. Parameters absent
/// on the wire are absent from the record, never defaulted.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// Per-dispatcher sequence number for log correlation
    pub request_id: u64,
    pub operation_id: Arc<str>,
    pub method: Method,
    pub path: String,
    pub path_params: Value,
    pub query: Value,
    pub headers: Value,
    pub cookies: Value,
    pub body: Option<Value>,
    rules: Arc<OperationRules>,
}

fn coerce_part<'a, I>(node: &SchemaNode, lookup: I) -> Value
where
    I: Fn(&str) -> Vec<&'a str>,
{
    let mut record = Map::new();
    for field in node.fields() {
        let raws = lookup(&field.wire_key);
        if let Some(value) = crate::validation::coerce_params(&raws, &field.ty) {
            record.insert(field.wire_key.clone(), value);
        }
    }
    Value::Object(record)
}

impl HandlerRequest {
    pub(crate) fn build(
        request_id: u64,
        request: Request,
        path_params: &ParamVec,
        rules: Arc<OperationRules>,
    ) -> Self {
        let mut parts = [Value::Null, Value::Null, Value::Null, Value::Null];
        for part in &rules.parts {
            let value = match part.location {
                ParameterLocation::Path => coerce_part(&part.node, |key| {
                    path_params
                        .iter()
                        .rfind(|(k, _)| k.as_ref() == key)
                        .map(|(_, v)| vec![v.as_str()])
                        .unwrap_or_default()
                }),
                ParameterLocation::Query => coerce_part(&part.node, |key| {
                    request
                        .query
                        .iter()
                        .filter(|(k, _)| k.as_ref() == key)
                        .map(|(_, v)| v.as_str())
                        .collect()
                }),
                ParameterLocation::Header => coerce_part(&part.node, |key| {
                    request
                        .headers
                        .iter()
                        .filter(|(k, _)| k.eq_ignore_ascii_case(key))
                        .map(|(_, v)| v.as_str())
                        .collect()
                }),
                ParameterLocation::Cookie => coerce_part(&part.node, |key| {
                    request
                        .cookies
                        .iter()
                        .rfind(|(k, _)| k.as_ref() == key)
                        .map(|(_, v)| vec![v.as_str()])
                        .unwrap_or_default()
                }),
            };
            parts[slot(part.location)] = value;
        }
        let [path, query, headers, cookies] = parts;
        HandlerRequest {
            request_id,
            operation_id: Arc::clone(&rules.operation_id),
            method: request.method,
            path: request.path,
            path_params: path,
            query,
            headers,
            cookies,
            body: request.body,
            rules,
        }
    }

    /// Coerced parameter record for `location`; `Null` when the operation
    /// declares no parameter there
    #[must_use]
    pub fn part(&self, location: ParameterLocation) -> &Value {
        match location {
            ParameterLocation::Path => &self.path_params,
            ParameterLocation::Query => &self.query,
            ParameterLocation::Header => &self.headers,
            ParameterLocation::Cookie => &self.cookies,
        }
    }

    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&Value> {
        self.path_params.get(name)
    }

    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&Value> {
        self.query.get(name)
    }

    /// Deserialize a parameter record into its generated type
    ///
    /// # Errors
    ///
    /// Fails when the record does not fit `T`.
    pub fn part_as<T: DeserializeOwned>(
        &self,
        location: ParameterLocation,
    ) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.part(location).clone())
    }

    /// Deserialize the body into its generated type
    ///
    /// # Errors
    ///
    /// Fails when the body is absent or does not fit `T`.
    pub fn body_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.body.clone().unwrap_or(Value::Null))
    }

    /// Declared statuses of the operation, ascending
    #[must_use]
    pub fn declared_statuses(&self) -> &[u16] {
        &self.rules.declared
    }

    /// Envelope populating the `status` slot
    #[must_use]
    pub fn respond(&self, status: u16, payload: ResponsePayload) -> DynamicEnvelope {
        DynamicEnvelope::respond(self.rules.declared.iter().copied(), status, payload)
    }

    /// Envelope with every slot empty
    #[must_use]
    pub fn envelope(&self, status: u16) -> DynamicEnvelope {
        DynamicEnvelope::empty(self.rules.declared.iter().copied(), status)
    }
}

fn slot(location: ParameterLocation) -> usize {
    match location {
        ParameterLocation::Path => 0,
        ParameterLocation::Query => 1,
        ParameterLocation::Header => 2,
        ParameterLocation::Cookie => 3,
    }
}

impl Validate for HandlerRequest {
    /// Evaluate every parameter record, then the body. All violations are
    /// collected; none short-circuits another location.
    fn validate(&self) -> Result<(), Vec<Violation>> {
        let mut violations = Vec::new();
        for part in &self.rules.parts {
            validate_object(
                &part.rules,
                self.part(part.location),
                &part.location.to_string(),
                &mut violations,
            );
        }
        if let Some(body) = &self.rules.body {
            validate_field(
                &body.rules,
                body.node.is_nullable(),
                self.body.as_ref(),
                "body",
                &mut violations,
            );
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}
