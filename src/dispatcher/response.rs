use crate::typed::ResponsePayload;
use crate::validation::Violation;
use http::StatusCode;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Media type of problem-details error bodies
pub const PROBLEM_JSON: &str = "application/problem+json";

/// A transport-neutral response produced by the [`Dispatcher`](super::Dispatcher)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl Response {
    /// Response carrying the populated slot of an envelope
    #[must_use]
    pub fn from_payload(status: u16, payload: &ResponsePayload, content_type: Option<&str>) -> Self {
        let mut headers = payload.headers.clone();
        if payload.body.is_some() && !headers.keys().any(|k| k.eq_ignore_ascii_case("content-type")) {
            headers.insert(
                "content-type".to_string(),
                content_type.unwrap_or("application/json").to_string(),
            );
        }
        Response {
            status,
            headers,
            body: payload.body.clone(),
        }
    }

    /// RFC 7807 problem-details response
    #[must_use]
    pub fn problem(status: StatusCode, detail: impl Into<String>) -> Self {
        Self::problem_body(status, problem_body(status, &detail.into(), None))
    }

    /// 400 problem listing every violated rule under `errors`
    #[must_use]
    pub fn validation_failed(violations: &[Violation]) -> Self {
        let status = StatusCode::BAD_REQUEST;
        let detail = format!("{} validation rule(s) failed", violations.len());
        Self::problem_body(status, problem_body(status, &detail, Some(violations)))
    }

    fn problem_body(status: StatusCode, body: Value) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), PROBLEM_JSON.to_string());
        Response {
            status: status.as_u16(),
            headers,
            body: Some(body),
        }
    }

    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Violation paths listed in a validation problem, in report order
    #[must_use]
    pub fn violation_paths(&self) -> Vec<&str> {
        self.body
            .as_ref()
            .and_then(|b| b.get("errors"))
            .and_then(Value::as_array)
            .map(|errors| {
                errors
                    .iter()
                    .filter_map(|e| e.get("path").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn problem_body(status: StatusCode, detail: &str, errors: Option<&[Violation]>) -> Value {
    let mut body = json!({
        "type": "about:blank",
        "title": status.canonical_reason().unwrap_or("Error"),
        "status": status.as_u16(),
        "detail": detail,
    });
    if let (Some(errors), Value::Object(map)) = (errors, &mut body) {
        map.insert("errors".to_string(), json!(errors));
    }
    body
}
