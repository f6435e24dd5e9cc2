#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use super::*;
use crate::generator::Compiler;
use crate::spec::{Description, ParameterLocation};
use crate::typed::ResponsePayload;
use http::Method;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

fn description(base_path: &str) -> Description {
    Description {
        source: "resources.yaml".into(),
        title: "Resources".to_string(),
        slug: "resources".to_string(),
        base_path: base_path.to_string(),
        document: json!({
            "openapi": "3.1.0",
            "info": {"title": "Resources", "version": "1.0.0"},
            "paths": {
                "/path/to/{param}/resours{suffix}": {
                    "post": {
                        "operationId": "postResource",
                        "parameters": [
                            {"name": "param", "in": "path", "required": true, "schema": {"type": "string"}},
                            {"name": "suffix", "in": "path", "required": true, "schema": {"type": "string", "enum": ["e"]}},
                            {"name": "X-Trace", "in": "header", "required": true, "schema": {"type": "string", "minLength": 1}},
                            {"name": "limit", "in": "query", "schema": {"type": "integer", "minimum": 1}}
                        ],
                        "requestBody": {
                            "required": true,
                            "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Resource"}}}
                        },
                        "responses": {
                            "200": {
                                "description": "stored",
                                "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Resource"}}}
                            },
                            "400": {"description": "rejected"}
                        }
                    }
                },
                "/files/file{id}.json": {
                    "get": {
                        "operationId": "getFile",
                        "parameters": [
                            {"name": "id", "in": "path", "required": true, "schema": {"type": "integer"}},
                            {"name": "session", "in": "cookie", "schema": {"type": "string"}},
                            {"name": "ids", "in": "query", "schema": {"type": "array", "items": {"type": "integer"}}}
                        ],
                        "responses": {
                            "200": {"description": "ok", "content": {"application/vnd.file+json": {"schema": {"type": "object"}}}},
                            "404": {"description": "missing"}
                        }
                    }
                }
            },
            "components": {"schemas": {
                "Resource": {
                    "type": "object",
                    "required": ["name", "tags"],
                    "properties": {
                        "name": {"type": "string"},
                        "tags": {"type": "array", "items": {"type": "string", "minLength": 2}}
                    }
                }
            }}
        }),
        external: BTreeMap::new(),
    }
}

fn echo(req: HandlerRequest) -> crate::typed::DynamicEnvelope {
    let body = req.body.clone().unwrap_or(Value::Null);
    req.respond(200, ResponsePayload::json(body))
}

fn dispatcher(base_path: &str) -> Dispatcher {
    let compilation = Compiler::default().compile(&description(base_path)).unwrap();
    let mut d = Dispatcher::from_compilation(&compilation);
    assert!(d.register_handler("post_resource", echo));
    d
}

fn post(path: &str, body: Value) -> Request {
    Request::new(Method::POST, path)
        .with_header("x-trace", "abc")
        .with_body(body)
}

fn valid_body() -> Value {
    json!({"name": "widget", "tags": ["ab", "cd"]})
}

#[test]
fn test_mixed_segment_request_served() {
    let d = dispatcher("");
    let resp = d.dispatch(post("/path/to/param/resourse", valid_body()));
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, Some(valid_body()));
    assert_eq!(resp.get_header("Content-Type"), Some("application/json"));
}

#[test]
fn test_captured_suffix_outside_enum_is_400() {
    let d = dispatcher("");
    let resp = d.dispatch(post("/path/to/param/resourseee", valid_body()));
    assert_eq!(resp.status, 400);
    assert_eq!(resp.violation_paths(), vec!["path.suffix"]);
    assert_eq!(resp.get_header("content-type"), Some(PROBLEM_JSON));
    let body = resp.body.unwrap();
    assert_eq!(body["status"], 400);
    assert_eq!(body["title"], "Bad Request");
    assert_eq!(body["errors"][0]["rule"], "enum");
}

#[test]
fn test_mixed_segment_without_middle_is_404() {
    let d = dispatcher("");
    let resp = d.dispatch(post("/path/to/param/resours", valid_body()));
    assert_eq!(resp.status, 404);
    assert_eq!(resp.body.unwrap()["type"], "about:blank");
}

#[test]
fn test_structural_mismatch_is_400() {
    let d = dispatcher("");
    let resp = d.dispatch(Request::new(Method::GET, "/files/file7.xml"));
    assert_eq!(resp.status, 400);
    assert!(resp.violation_paths().is_empty());
}

#[test]
fn test_missing_required_string_names_field() {
    let d = dispatcher("");
    let resp = d.dispatch(post("/path/to/param/resourse", json!({"tags": []})));
    assert_eq!(resp.status, 400);
    assert_eq!(resp.violation_paths(), vec!["body.name"]);
}

#[test]
fn test_dive_element_failure_is_400() {
    let d = dispatcher("");
    let resp = d.dispatch(post(
        "/path/to/param/resourse",
        json!({"name": "widget", "tags": ["ok", "x", "also", "y"]}),
    ));
    assert_eq!(resp.status, 400);
    assert_eq!(resp.violation_paths(), vec!["body.tags[1]", "body.tags[3]"]);
    assert_eq!(resp.body.unwrap()["errors"][0]["rule"], "minLength");
}

#[test]
fn test_required_dive_container() {
    let d = dispatcher("");
    let empty = d.dispatch(post(
        "/path/to/param/resourse",
        json!({"name": "widget", "tags": []}),
    ));
    assert_eq!(empty.status, 200);

    let absent = d.dispatch(post("/path/to/param/resourse", json!({"name": "widget"})));
    assert_eq!(absent.status, 400);
    assert_eq!(absent.violation_paths(), vec!["body.tags"]);
    assert_eq!(absent.body.unwrap()["errors"][0]["rule"], "required");
}

#[test]
fn test_missing_required_body() {
    let d = dispatcher("");
    let resp = d.dispatch(Request::new(Method::POST, "/path/to/param/resourse").with_header("X-Trace", "t"));
    assert_eq!(resp.status, 400);
    assert_eq!(resp.violation_paths(), vec!["body"]);
}

#[test]
fn test_every_location_reported() {
    let d = dispatcher("");
    let resp = d.dispatch(
        Request::new(Method::POST, "/path/to/param/resourseee?limit=0")
            .with_body(json!({"tags": ["x"]})),
    );
    assert_eq!(resp.status, 400);
    assert_eq!(
        resp.violation_paths(),
        vec![
            "path.suffix",
            "query.limit",
            "header.X-Trace",
            "body.name",
            "body.tags[0]"
        ]
    );
}

#[test]
fn test_query_coercion_and_absence() {
    let compilation = Compiler::default().compile(&description("")).unwrap();
    let mut d = Dispatcher::from_compilation(&compilation);
    d.register_handler("post_resource", |req: HandlerRequest| {
        let limit = req.get_query_param("limit").cloned().unwrap_or(Value::Null);
        let present = req.part(ParameterLocation::Query).as_object().unwrap().len();
        req.respond(200, ResponsePayload::json(json!({"limit": limit, "keys": present})))
    });

    let with = d.dispatch(post("/path/to/param/resourse?limit=5", valid_body()));
    assert_eq!(with.body, Some(json!({"limit": 5, "keys": 1})));

    let without = d.dispatch(post("/path/to/param/resourse", valid_body()));
    assert_eq!(without.body, Some(json!({"limit": null, "keys": 0})));

    let malformed = d.dispatch(post("/path/to/param/resourse?limit=many", valid_body()));
    assert_eq!(malformed.status, 400);
    assert_eq!(malformed.body.unwrap()["errors"][0]["rule"], "type");
}

#[test]
fn test_path_cookie_and_array_query_coercion() {
    let compilation = Compiler::default().compile(&description("")).unwrap();
    let mut d = Dispatcher::from_compilation(&compilation);
    d.register_handler("get_file", |req: HandlerRequest| {
        let seen = json!({
            "id": req.get_path_param("id"),
            "session": req.cookies.get("session"),
            "ids": req.get_query_param("ids"),
        });
        req.respond(
            200,
            ResponsePayload::json(seen).with_header("x-served-by", "test"),
        )
    });
    let resp = d.dispatch(
        Request::new(Method::GET, "/files/file7.json?ids=1,2&ids=3")
            .with_header("Cookie", "theme=dark; session=s1"),
    );
    assert_eq!(resp.status, 200);
    assert_eq!(
        resp.body,
        Some(json!({"id": 7, "session": "s1", "ids": [1, 2, 3]}))
    );
    assert_eq!(resp.get_header("content-type"), Some("application/vnd.file+json"));
    assert_eq!(resp.get_header("X-Served-By"), Some("test"));
}

#[test]
fn test_handler_without_populated_slot_is_500() {
    let compilation = Compiler::default().compile(&description("")).unwrap();
    let mut d = Dispatcher::from_compilation(&compilation);
    d.register_handler("post_resource", |req: HandlerRequest| req.envelope(200));
    let resp = d.dispatch(post("/path/to/param/resourse", valid_body()));
    assert_eq!(resp.status, 500);
    let detail = resp.body.unwrap()["detail"].as_str().unwrap().to_string();
    assert!(detail.contains("no populated slot"), "{detail}");
}

#[test]
fn test_handler_populating_wrong_slot_is_500() {
    let compilation = Compiler::default().compile(&description("")).unwrap();
    let mut d = Dispatcher::from_compilation(&compilation);
    d.register_handler("post_resource", |req: HandlerRequest| {
        req.respond(400, ResponsePayload::empty()).with_status_code(200)
    });
    let resp = d.dispatch(post("/path/to/param/resourse", valid_body()));
    assert_eq!(resp.status, 500);
}

#[test]
fn test_undeclared_status_is_500() {
    let compilation = Compiler::default().compile(&description("")).unwrap();
    let mut d = Dispatcher::from_compilation(&compilation);
    d.register_handler("post_resource", |req: HandlerRequest| {
        req.respond(418, ResponsePayload::empty())
    });
    let resp = d.dispatch(post("/path/to/param/resourse", valid_body()));
    assert_eq!(resp.status, 500);
}

#[test]
fn test_declared_status_without_body() {
    let compilation = Compiler::default().compile(&description("")).unwrap();
    let mut d = Dispatcher::from_compilation(&compilation);
    d.register_handler("post_resource", |req: HandlerRequest| {
        assert_eq!(req.declared_statuses(), &[200, 400]);
        req.respond(400, ResponsePayload::empty())
    });
    let resp = d.dispatch(post("/path/to/param/resourse", valid_body()));
    assert_eq!(resp.status, 400);
    assert_eq!(resp.body, None);
    assert!(resp.headers.is_empty());
}

#[test]
fn test_handler_panic_is_500() {
    let compilation = Compiler::default().compile(&description("")).unwrap();
    let mut d = Dispatcher::from_compilation(&compilation);
    d.register_handler("post_resource", |_req: HandlerRequest| -> crate::typed::DynamicEnvelope {
        panic!("boom")
    });
    let resp = d.dispatch(post("/path/to/param/resourse", valid_body()));
    assert_eq!(resp.status, 500);
    let detail = resp.body.unwrap()["detail"].as_str().unwrap().to_string();
    assert!(detail.contains("boom"));
}

#[test]
fn test_unregistered_handler_is_501() {
    let d = dispatcher("");
    assert!(!d.has_handler("get_file"));
    let resp = d.dispatch(Request::new(Method::GET, "/files/file7.json"));
    assert_eq!(resp.status, 501);
}

#[test]
fn test_register_unknown_operation() {
    let mut d = dispatcher("");
    assert!(!d.register_handler("nope", echo));
    assert!(!d.has_handler("nope"));
    assert!(d.register_handler("post_resource", echo));
}

#[test]
fn test_base_path_is_stripped() {
    let d = dispatcher("/api");
    let ok = d.dispatch(post("/api/path/to/param/resourse", valid_body()));
    assert_eq!(ok.status, 200);
    let outside = d.dispatch(post("/apix/path/to/param/resourse", valid_body()));
    assert_eq!(outside.status, 404);
    let bare = d.dispatch(post("/path/to/param/resourse", valid_body()));
    assert_eq!(bare.status, 404);
}

#[test]
fn test_method_mismatch_is_404() {
    let d = dispatcher("");
    let resp = d.dispatch(Request::new(Method::GET, "/path/to/param/resourse"));
    assert_eq!(resp.status, 404);
}

#[test]
fn test_typed_part_access() {
    #[derive(serde::Deserialize)]
    struct Path {
        param: String,
        suffix: String,
    }
    #[derive(serde::Deserialize)]
    struct Resource {
        name: String,
        tags: Vec<String>,
    }
    let compilation = Compiler::default().compile(&description("")).unwrap();
    let mut d = Dispatcher::from_compilation(&compilation);
    d.register_handler("post_resource", |req: HandlerRequest| {
        let path: Path = req.part_as(ParameterLocation::Path).unwrap();
        let body: Resource = req.body_as().unwrap();
        req.respond(
            200,
            ResponsePayload::json(json!({
                "param": path.param,
                "suffix": path.suffix,
                "name": body.name,
                "tags": body.tags.len(),
            })),
        )
    });
    let resp = d.dispatch(post("/path/to/p1/resourse", valid_body()));
    assert_eq!(
        resp.body,
        Some(json!({"param": "p1", "suffix": "e", "name": "widget", "tags": 2}))
    );
}

#[test]
fn test_dispatcher_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Dispatcher>();

    let d = Arc::new(dispatcher(""));
    let threads: Vec<_> = (0..4)
        .map(|_| {
            let d = Arc::clone(&d);
            std::thread::spawn(move || d.dispatch(post("/path/to/param/resourse", valid_body())).status)
        })
        .collect();
    for t in threads {
        assert_eq!(t.join().unwrap(), 200);
    }
}

#[test]
fn test_parse_helpers() {
    let query = parse_query("a=1&b=two%20words&a=3");
    let pairs: Vec<(&str, &str)> = query.iter().map(|(k, v)| (k.as_ref(), v.as_str())).collect();
    assert_eq!(pairs, vec![("a", "1"), ("b", "two words"), ("a", "3")]);

    let cookies = parse_cookies("a=1; b = 2 ;broken; =x");
    let pairs: Vec<(&str, &str)> = cookies.iter().map(|(k, v)| (k.as_ref(), v.as_str())).collect();
    assert_eq!(pairs, vec![("a", "1"), ("b", "2")]);

    let req = Request::new(Method::GET, "/x?y=1");
    assert_eq!(req.path, "/x");
    assert_eq!(req.query.len(), 1);
}
