#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use brrtgen::dispatcher::{Dispatcher, Request, PROBLEM_JSON};
use brrtgen::typed::ResponsePayload;
use common::fixtures::{compile, pet_store};
use http::Method;
use serde_json::{json, Value};
use std::sync::Arc;

fn pet_dispatcher() -> Dispatcher {
    let compilation = compile(&pet_store());
    let mut dispatcher = Dispatcher::from_compilation(&compilation);
    dispatcher.register_handler("list_pets", |req| {
        let echo = json!({ "query": req.query.clone() });
        req.respond(
            200,
            ResponsePayload::json(echo).with_header("X-Next", "page-2"),
        )
    });
    dispatcher.register_handler("add_pet", |req| {
        let name = req.body.as_ref().and_then(|b| b.get("name")).cloned();
        req.respond(201, ResponsePayload::json(json!({ "id": 1, "name": name })))
    });
    dispatcher.register_handler("get_pet", |req| {
        match req.get_path_param("petId").and_then(Value::as_i64) {
            Some(7) => req.respond(200, ResponsePayload::json(json!({ "id": 7, "name": "rex" }))),
            _ => req.respond(404, ResponsePayload::empty()),
        }
    });
    dispatcher.register_handler("get_photo", |req| {
        let size = req.get_path_param("size").cloned().unwrap_or(Value::Null);
        req.respond(200, ResponsePayload::json(json!({ "size": size })))
    });
    dispatcher
}

#[test]
fn test_get_pet_found_and_missing() {
    let dispatcher = pet_dispatcher();

    let found = dispatcher.dispatch(Request::new(Method::GET, "/v2/pets/7"));
    assert_eq!(found.status, 200);
    assert_eq!(found.get_header("content-type"), Some("application/json"));
    assert_eq!(found.body, Some(json!({ "id": 7, "name": "rex" })));

    let missing = dispatcher.dispatch(Request::new(Method::GET, "/v2/pets/8"));
    assert_eq!(missing.status, 404);
    assert_eq!(missing.body, None);
}

#[test]
fn test_path_param_type_violation() {
    let dispatcher = pet_dispatcher();
    let response = dispatcher.dispatch(Request::new(Method::GET, "/v2/pets/seven"));
    assert_eq!(response.status, 400);
    assert_eq!(response.get_header("content-type"), Some(PROBLEM_JSON));
    assert_eq!(response.violation_paths(), vec!["path.petId"]);
    let errors = response.body.as_ref().unwrap()["errors"].as_array().unwrap().clone();
    assert_eq!(errors[0]["rule"], "type");
}

#[test]
fn test_query_coercion_and_bounds() {
    let dispatcher = pet_dispatcher();

    let ok = dispatcher.dispatch(Request::new(Method::GET, "/v2/pets?limit=5&tags=a,b&tags=c"));
    assert_eq!(ok.status, 200);
    assert_eq!(ok.get_header("X-Next"), Some("page-2"));
    assert_eq!(
        ok.body.unwrap()["query"],
        json!({ "limit": 5, "tags": ["a", "b", "c"] })
    );

    let too_big = dispatcher.dispatch(Request::new(Method::GET, "/v2/pets?limit=500"));
    assert_eq!(too_big.status, 400);
    assert_eq!(too_big.violation_paths(), vec!["query.limit"]);

    let none = dispatcher.dispatch(Request::new(Method::GET, "/v2/pets"));
    assert_eq!(none.status, 200);
    assert_eq!(none.body.unwrap()["query"], json!({}));
}

#[test]
fn test_body_dive_reports_every_element() {
    let dispatcher = pet_dispatcher();
    let response = dispatcher.dispatch(
        Request::new(Method::POST, "/v2/pets").with_body(json!({
            "name": "",
            "tags": ["ok", "x", "fine", "y"]
        })),
    );
    assert_eq!(response.status, 400);
    assert_eq!(
        response.violation_paths(),
        vec!["body.name", "body.tags[1]", "body.tags[3]"]
    );
}

#[test]
fn test_body_required_and_present() {
    let dispatcher = pet_dispatcher();

    let missing = dispatcher.dispatch(Request::new(Method::POST, "/v2/pets"));
    assert_eq!(missing.status, 400);
    assert_eq!(missing.violation_paths(), vec!["body"]);

    let created = dispatcher.dispatch(
        Request::new(Method::POST, "/v2/pets").with_body(json!({ "name": "rex", "tags": [] })),
    );
    assert_eq!(created.status, 201);
    assert_eq!(created.body, Some(json!({ "id": 1, "name": "rex" })));
}

#[test]
fn test_mixed_segment_enum_and_structure() {
    let dispatcher = pet_dispatcher();

    let ok = dispatcher.dispatch(Request::new(Method::GET, "/v2/pets/7/photolarge.png"));
    assert_eq!(ok.status, 200);
    assert_eq!(ok.body, Some(json!({ "size": "large" })));

    let bad_enum = dispatcher.dispatch(Request::new(Method::GET, "/v2/pets/7/photohuge.png"));
    assert_eq!(bad_enum.status, 400);
    assert_eq!(bad_enum.violation_paths(), vec!["path.size"]);

    let bad_suffix = dispatcher.dispatch(Request::new(Method::GET, "/v2/pets/7/photolarge.gif"));
    assert_eq!(bad_suffix.status, 400);
    assert!(bad_suffix.violation_paths().is_empty());

    let unknown = dispatcher.dispatch(Request::new(Method::GET, "/v2/pets/7/avatar.png"));
    assert_eq!(unknown.status, 404);
}

#[test]
fn test_undeclared_status_is_contract_violation() {
    let compilation = compile(&pet_store());
    let mut dispatcher = Dispatcher::from_compilation(&compilation);
    dispatcher.register_handler("get_pet", |req| {
        req.respond(503, ResponsePayload::json(json!({ "busy": true })))
    });
    let response = dispatcher.dispatch(Request::new(Method::GET, "/v2/pets/7"));
    assert_eq!(response.status, 500);
    assert_eq!(response.get_header("content-type"), Some(PROBLEM_JSON));
}

#[test]
fn test_unregistered_operation_is_not_implemented() {
    let compilation = compile(&pet_store());
    let dispatcher = Dispatcher::from_compilation(&compilation);
    let response = dispatcher.dispatch(Request::new(Method::GET, "/v2/pets/7"));
    assert_eq!(response.status, 501);
    assert_eq!(response.body.unwrap()["status"], 501);
}

#[test]
fn test_concurrent_dispatch() {
    let dispatcher = Arc::new(pet_dispatcher());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let dispatcher = Arc::clone(&dispatcher);
            std::thread::spawn(move || {
                let path = if i % 2 == 0 { "/v2/pets/7" } else { "/v2/pets/9" };
                dispatcher.dispatch(Request::new(Method::GET, path)).status
            })
        })
        .collect();
    let statuses: Vec<u16> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(statuses, vec![200, 404, 200, 404, 200, 404, 200, 404]);
}
