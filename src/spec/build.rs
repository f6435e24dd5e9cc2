use super::load::Description;
use super::types::{
    HeaderMeta, OperationMeta, OperationSpec, ParameterLocation, ParameterMeta, RequestBody,
    RequestBodyMeta, RequestParts, ResponseMeta, ResponseVariant,
};
use crate::diagnostics::Diagnostic;
use crate::error::CompileError;
use crate::router::RouteTemplate;
use crate::schema::{to_pascal_case, to_snake_case, Member, PresenceMode, SchemaResolver};
use http::Method;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

const JSON_MEDIA_TYPE: &str = "application/json";

fn method_for(key: &str) -> Option<Method> {
    match key.to_ascii_lowercase().as_str() {
        "get" => Some(Method::GET),
        "put" => Some(Method::PUT),
        "post" => Some(Method::POST),
        "delete" => Some(Method::DELETE),
        "options" => Some(Method::OPTIONS),
        "head" => Some(Method::HEAD),
        "patch" => Some(Method::PATCH),
        "trace" => Some(Method::TRACE),
        _ => None,
    }
}

fn unsupported(owner: &str, detail: impl Into<String>) -> CompileError {
    CompileError::UnsupportedConstruct {
        owner: owner.to_string(),
        detail: detail.into(),
    }
}

/// Follow `$ref`s into `#/components/<section>/` until an object is reached
fn follow<'a>(
    description: &'a Description,
    raw: &'a Value,
    section: &str,
    owner: &str,
) -> Result<&'a Map<String, Value>, CompileError> {
    let prefix = format!("#/components/{section}/");
    let mut current = raw;
    let mut visited: Vec<String> = Vec::new();
    loop {
        let obj = current
            .as_object()
            .ok_or_else(|| unsupported(owner, format!("{section} entry must be an object")))?;
        let Some(reference) = obj.get("$ref").and_then(Value::as_str) else {
            return Ok(obj);
        };
        let name = reference.strip_prefix(prefix.as_str()).ok_or_else(|| {
            unsupported(owner, format!("reference '{reference}' is not a {section} pointer"))
        })?;
        if visited.iter().any(|v| v == name) {
            visited.push(name.to_string());
            return Err(CompileError::CyclicSchema { chain: visited });
        }
        visited.push(name.to_string());
        current = description
            .component(section, name)
            .ok_or_else(|| CompileError::UnresolvedReference {
                owner: owner.to_string(),
                reference: reference.to_string(),
            })?;
    }
}

/// Pick the media type a body comes from: `application/json`, otherwise the
/// first entry declaring a schema, otherwise the first entry
fn select_media(content: &Map<String, Value>) -> Option<(&str, Option<&Value>)> {
    if let Some(media) = content.get(JSON_MEDIA_TYPE) {
        return Some((JSON_MEDIA_TYPE, media.get("schema")));
    }
    content
        .iter()
        .find(|(_, m)| m.get("schema").is_some())
        .or_else(|| content.iter().next())
        .map(|(k, m)| (k.as_str(), m.get("schema")))
}

fn text(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

/// `GET /pets/{id}` -> `get_pets_id`
fn synthesize_operation_id(method: &Method, path: &str) -> String {
    let method = method.as_str().to_ascii_lowercase();
    match to_snake_case(path).as_str() {
        "_" => method,
        rest => format!("{method}_{rest}"),
    }
}

fn resolve_handler_name(
    operation: &Map<String, Value>,
    method: &Method,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> String {
    let explicit = operation
        .iter()
        .find_map(|(key, val)| {
            if key.starts_with("x-handler") {
                val.as_str()
            } else {
                None
            }
        })
        .or_else(|| operation.get("operationId").and_then(Value::as_str))
        .map(to_snake_case)
        .filter(|id| id != "_");
    explicit.unwrap_or_else(|| {
        let synthesized = synthesize_operation_id(method, path);
        diagnostics.push(Diagnostic::warning(
            format!("path:{path}"),
            "synthesized_operation_id",
            format!("{method} {path} has no operationId or x-handler-* extension; using '{synthesized}'"),
        ));
        synthesized
    })
}

fn parameter(
    description: &Description,
    raw: &Value,
    owner: &str,
) -> Result<ParameterMeta, CompileError> {
    let obj = follow(description, raw, "parameters", owner)?;
    let name = text(obj, "name").ok_or_else(|| unsupported(owner, "parameter without a name"))?;
    let location = obj
        .get("in")
        .and_then(Value::as_str)
        .and_then(ParameterLocation::parse)
        .ok_or_else(|| unsupported(owner, format!("parameter '{name}' has no valid 'in'")))?;
    let schema = obj.get("schema").cloned().or_else(|| {
        obj.get("content")
            .and_then(Value::as_object)
            .and_then(select_media)
            .and_then(|(_, schema)| schema.cloned())
    });
    Ok(ParameterMeta {
        required: location == ParameterLocation::Path
            || obj.get("required").and_then(Value::as_bool).unwrap_or(false),
        name,
        location,
        schema,
        description: text(obj, "description"),
    })
}

/// Path-item parameters first, then operation parameters; an operation
/// parameter replaces a path-item one with the same name and location
fn merge_parameters(
    description: &Description,
    shared: Option<&Value>,
    own: Option<&Value>,
    owner: &str,
) -> Result<Vec<ParameterMeta>, CompileError> {
    let mut out: Vec<ParameterMeta> = Vec::new();
    for list in [shared, own].into_iter().flatten() {
        let list = list
            .as_array()
            .ok_or_else(|| unsupported(owner, "parameters must be a list"))?;
        for raw in list {
            let param = parameter(description, raw, owner)?;
            match out
                .iter_mut()
                .find(|p| p.name == param.name && p.location == param.location)
            {
                Some(existing) => *existing = param,
                None => out.push(param),
            }
        }
    }
    Ok(out)
}

/// Make path parameters agree with the template's placeholders
fn reconcile_path_params(
    route: &RouteTemplate,
    params: &mut Vec<ParameterMeta>,
    owner: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let names: Vec<&str> = route.param_names().collect();
    params.retain(|p| {
        let keep = p.location != ParameterLocation::Path || names.contains(&p.name.as_str());
        if !keep {
            diagnostics.push(Diagnostic::warning(
                owner,
                "unused_path_parameter",
                format!("path parameter '{}' does not appear in {route}; ignored", p.name),
            ));
        }
        keep
    });
    for name in names {
        let declared = params
            .iter()
            .any(|p| p.location == ParameterLocation::Path && p.name == name);
        if !declared {
            diagnostics.push(Diagnostic::warning(
                owner,
                "undeclared_path_parameter",
                format!("placeholder '{{{name}}}' in {route} is not declared; treated as a string"),
            ));
            params.push(ParameterMeta {
                name: name.to_string(),
                location: ParameterLocation::Path,
                required: true,
                schema: None,
                description: None,
            });
        }
    }
}

fn request_body(
    description: &Description,
    raw: Option<&Value>,
    owner: &str,
) -> Result<Option<RequestBodyMeta>, CompileError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let obj = follow(description, raw, "requestBodies", owner)?;
    let Some((content_type, schema)) = obj
        .get("content")
        .and_then(Value::as_object)
        .and_then(select_media)
    else {
        return Ok(None);
    };
    Ok(Some(RequestBodyMeta {
        content_type: content_type.to_string(),
        required: obj.get("required").and_then(Value::as_bool).unwrap_or(false),
        schema: schema.cloned(),
    }))
}

fn response_headers(
    description: &Description,
    headers: Option<&Value>,
    owner: &str,
) -> Result<Vec<HeaderMeta>, CompileError> {
    let Some(headers) = headers.and_then(Value::as_object) else {
        return Ok(Vec::new());
    };
    let mut out = Vec::with_capacity(headers.len());
    for (name, raw) in headers {
        // a Content-Type response header is ignored by definition
        if name.eq_ignore_ascii_case("content-type") {
            continue;
        }
        let obj = follow(description, raw, "headers", owner)?;
        out.push(HeaderMeta {
            name: name.clone(),
            required: obj.get("required").and_then(Value::as_bool).unwrap_or(false),
            schema: obj.get("schema").cloned(),
            description: text(obj, "description"),
        });
    }
    Ok(out)
}

fn responses(
    description: &Description,
    raw: Option<&Value>,
    owner: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<BTreeMap<u16, ResponseMeta>, CompileError> {
    let mut out = BTreeMap::new();
    let Some(map) = raw.and_then(Value::as_object) else {
        diagnostics.push(Diagnostic::warning(
            owner,
            "no_responses",
            "operation declares no responses",
        ));
        return Ok(out);
    };
    for (key, raw) in map {
        let status = match key.parse::<u16>() {
            Ok(code) if (100..=599).contains(&code) => code,
            _ => {
                diagnostics.push(Diagnostic::warning(
                    owner,
                    "skipped_status",
                    format!("response key '{key}' is not a numeric status; skipped"),
                ));
                continue;
            }
        };
        let obj = follow(description, raw, "responses", owner)?;
        let media = obj
            .get("content")
            .and_then(Value::as_object)
            .and_then(select_media);
        out.insert(
            status,
            ResponseMeta {
                status,
                description: text(obj, "description"),
                content_type: media.map(|(ct, _)| ct.to_string()),
                schema: media.and_then(|(_, schema)| schema.cloned()),
                headers: response_headers(description, obj.get("headers"), owner)?,
            },
        );
    }
    Ok(out)
}

/// Walk `paths` and collect every operation in document order.
///
/// Schemas stay raw here; [`resolve_operation`] resolves them.
///
/// # Errors
///
/// Fails on an invalid path template, a duplicate operation identity, or a
/// parameter/body/response reference that cannot be followed.
pub fn build_operations(
    description: &Description,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Vec<OperationMeta>, CompileError> {
    let mut operations = Vec::new();
    let mut seen = HashSet::new();
    let Some(paths) = description.paths() else {
        return Ok(operations);
    };

    for (path, item) in paths {
        let Some(item) = item.as_object() else {
            continue;
        };
        if item.contains_key("$ref") {
            diagnostics.push(Diagnostic::warning(
                format!("path:{path}"),
                "path_item_ref",
                "path item references are not followed; skipped",
            ));
            continue;
        }
        let route = RouteTemplate::parse(path)?;

        for (key, operation) in item {
            let Some(method) = method_for(key) else {
                continue;
            };
            let Some(operation) = operation.as_object() else {
                continue;
            };
            let operation_id = resolve_handler_name(operation, &method, path, diagnostics);
            if !seen.insert(operation_id.clone()) {
                return Err(CompileError::DuplicateOperation {
                    operation: operation_id,
                });
            }
            let owner = format!("operation:{operation_id}");

            let mut parameters = merge_parameters(
                description,
                item.get("parameters"),
                operation.get("parameters"),
                &owner,
            )?;
            reconcile_path_params(&route, &mut parameters, &owner, diagnostics);

            operations.push(OperationMeta {
                request_body: request_body(description, operation.get("requestBody"), &owner)?,
                responses: responses(description, operation.get("responses"), &owner, diagnostics)?,
                summary: text(operation, "summary"),
                operation_id,
                method,
                route: route.clone(),
                parameters,
            });
        }
    }

    debug!(
        document = %description.slug,
        operations = operations.len(),
        "Collected operations"
    );
    Ok(operations)
}

/// Resolve an operation's schemas.
///
/// Parameters are grouped into one record per location (`<Op>Path`,
/// `<Op>Query`, `<Op>Headers`, `<Op>Cookies`) using the resolver's presence
/// mode. Response headers always use explicit presence.
///
/// # Errors
///
/// Propagates resolver errors for any request or response schema.
pub fn resolve_operation(
    meta: &OperationMeta,
    resolver: &mut SchemaResolver<'_>,
) -> Result<OperationSpec, CompileError> {
    let owner = format!("operation:{}", meta.operation_id);
    let base = to_pascal_case(&meta.operation_id);
    let presence = resolver.presence();

    let mut request = RequestParts::default();
    for (location, suffix) in [
        (ParameterLocation::Path, "Path"),
        (ParameterLocation::Query, "Query"),
        (ParameterLocation::Header, "Headers"),
        (ParameterLocation::Cookie, "Cookies"),
    ] {
        let members: Vec<Member> = meta
            .parameters_in(location)
            .map(|p| Member {
                wire_key: p.name.clone(),
                schema: p.schema.clone(),
                required: p.required,
                description: p.description.clone(),
            })
            .collect();
        if members.is_empty() {
            continue;
        }
        let node = resolver.synthesize_object(&format!("{base}{suffix}"), &members, presence, &owner)?;
        match location {
            ParameterLocation::Path => request.path = Some(node),
            ParameterLocation::Query => request.query = Some(node),
            ParameterLocation::Header => request.headers = Some(node),
            ParameterLocation::Cookie => request.cookies = Some(node),
        }
    }

    if let Some(body) = &meta.request_body {
        let untyped = Value::Object(Map::new());
        let schema = body.schema.as_ref().unwrap_or(&untyped);
        let node = resolver.resolve_inline(schema, &format!("{base}Body"), &owner)?;
        let rules = resolver.rules().field_rules(&node, body.required);
        request.body = Some(RequestBody {
            node,
            required: body.required,
            content_type: body.content_type.clone(),
            rules,
        });
    }

    let mut responses = BTreeMap::new();
    for (status, response) in &meta.responses {
        let body = response
            .schema
            .as_ref()
            .map(|s| resolver.resolve_inline(s, &format!("{base}{status}Body"), &owner))
            .transpose()?;
        let headers = if response.headers.is_empty() {
            None
        } else {
            let members: Vec<Member> = response
                .headers
                .iter()
                .map(|h| Member {
                    wire_key: h.name.clone(),
                    schema: h.schema.clone(),
                    required: h.required,
                    description: h.description.clone(),
                })
                .collect();
            Some(resolver.synthesize_object(
                &format!("{base}{status}Headers"),
                &members,
                PresenceMode::Explicit,
                &owner,
            )?)
        };
        responses.insert(
            *status,
            ResponseVariant {
                status_code: *status,
                description: response.description.clone(),
                content_type: response.content_type.clone(),
                body,
                headers,
            },
        );
    }

    Ok(OperationSpec {
        operation_id: meta.operation_id.clone(),
        method: meta.method.clone(),
        route: meta.route.clone(),
        summary: meta.summary.clone(),
        request,
        responses,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use serde_json::json;

    fn description(paths: Value, components: Value) -> Description {
        Description {
            source: "inline.yaml".into(),
            title: "Inline".to_string(),
            slug: "inline".to_string(),
            base_path: String::new(),
            document: json!({
                "openapi": "3.1.0",
                "info": {"title": "Inline", "version": "1.0.0"},
                "paths": paths,
                "components": components
            }),
            external: BTreeMap::new(),
        }
    }

    #[test]
    fn test_operation_ids_and_order() {
        let d = description(
            json!({
                "/pets": {
                    "post": {"operationId": "addPet", "responses": {"201": {"description": "ok"}}},
                    "get": {"x-handler-list": "list_all", "operationId": "ignored", "responses": {}}
                },
                "/pets/{id}": {
                    "delete": {"responses": {"204": {"description": "gone"}}}
                }
            }),
            json!({}),
        );
        let mut diags = Vec::new();
        let ops = build_operations(&d, &mut diags).unwrap();
        let ids: Vec<&str> = ops.iter().map(|o| o.operation_id.as_str()).collect();
        assert_eq!(ids, vec!["add_pet", "list_all", "delete_pets_id"]);
        assert!(diags.iter().any(|d| d.kind == "synthesized_operation_id"));
        assert!(diags.iter().any(|d| d.kind == "undeclared_path_parameter"));
        assert_eq!(ops[2].parameters[0].name, "id");
        assert!(ops[2].parameters[0].required);
    }

    #[test]
    fn test_duplicate_operation() {
        let d = description(
            json!({
                "/a": {"get": {"operationId": "same", "responses": {}}},
                "/b": {"get": {"operationId": "same", "responses": {}}}
            }),
            json!({}),
        );
        let err = build_operations(&d, &mut Vec::new()).unwrap_err();
        assert_eq!(
            err,
            CompileError::DuplicateOperation {
                operation: "same".into()
            }
        );
    }

    #[test]
    fn test_parameter_merge_and_refs() {
        let d = description(
            json!({
                "/items/{id}": {
                    "parameters": [
                        {"name": "id", "in": "path", "schema": {"type": "string"}},
                        {"$ref": "#/components/parameters/Limit"}
                    ],
                    "get": {
                        "operationId": "getItem",
                        "parameters": [
                            {"name": "id", "in": "path", "required": true, "schema": {"type": "integer"}}
                        ],
                        "responses": {}
                    }
                }
            }),
            json!({
                "parameters": {
                    "Limit": {"name": "limit", "in": "query", "schema": {"type": "integer"}}
                }
            }),
        );
        let ops = build_operations(&d, &mut Vec::new()).unwrap();
        let params = &ops[0].parameters;
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].schema, Some(json!({"type": "integer"})));
        assert_eq!(params[1].name, "limit");
        assert!(!params[1].required);
    }

    #[test]
    fn test_missing_parameter_ref() {
        let d = description(
            json!({
                "/x": {"get": {
                    "operationId": "x",
                    "parameters": [{"$ref": "#/components/parameters/Nope"}],
                    "responses": {}
                }}
            }),
            json!({}),
        );
        let err = build_operations(&d, &mut Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            CompileError::UnresolvedReference { ref owner, .. } if owner == "operation:x"
        ));
    }

    #[test]
    fn test_responses_skip_non_numeric_and_pick_media() {
        let d = description(
            json!({
                "/x": {"get": {
                    "operationId": "x",
                    "responses": {
                        "200": {
                            "description": "ok",
                            "headers": {
                                "X-Rate": {"schema": {"type": "integer"}},
                                "Content-Type": {"schema": {"type": "string"}}
                            },
                            "content": {
                                "text/plain": {},
                                "application/xml": {"schema": {"type": "string"}}
                            }
                        },
                        "404": {"$ref": "#/components/responses/NotFound"},
                        "default": {"description": "error"},
                        "2XX": {"description": "range"}
                    }
                }}
            }),
            json!({
                "responses": {
                    "NotFound": {
                        "description": "missing",
                        "content": {"application/json": {"schema": {"type": "object"}}}
                    }
                }
            }),
        );
        let mut diags = Vec::new();
        let ops = build_operations(&d, &mut diags).unwrap();
        let responses = &ops[0].responses;
        assert_eq!(responses.keys().copied().collect::<Vec<_>>(), vec![200, 404]);
        assert_eq!(responses[&200].content_type.as_deref(), Some("application/xml"));
        assert_eq!(responses[&200].headers.len(), 1);
        assert_eq!(responses[&404].content_type.as_deref(), Some("application/json"));
        assert_eq!(
            diags.iter().filter(|d| d.kind == "skipped_status").count(),
            2
        );
    }

    #[test]
    fn test_invalid_template_fails() {
        let d = description(
            json!({"/a/{x}{y}": {"get": {"operationId": "x", "responses": {}}}}),
            json!({}),
        );
        assert!(matches!(
            build_operations(&d, &mut Vec::new()),
            Err(CompileError::InvalidRouteTemplate { .. })
        ));
    }

    #[test]
    fn test_resolve_operation_groups_parameters() {
        let d = description(
            json!({
                "/pets/{id}": {"put": {
                    "operationId": "updatePet",
                    "parameters": [
                        {"name": "id", "in": "path", "required": true, "schema": {"type": "integer"}},
                        {"name": "X-Trace", "in": "header", "schema": {"type": "string"}},
                        {"name": "dry", "in": "query", "schema": {"type": "boolean"}}
                    ],
                    "requestBody": {
                        "required": true,
                        "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Pet"}}}
                    },
                    "responses": {
                        "200": {
                            "description": "ok",
                            "headers": {"X-Rate": {"required": true, "schema": {"type": "integer"}}},
                            "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Pet"}}}
                        }
                    }
                }}
            }),
            json!({
                "schemas": {
                    "Pet": {"type": "object", "required": ["name"], "properties": {"name": {"type": "string"}}}
                }
            }),
        );
        let ops = build_operations(&d, &mut Vec::new()).unwrap();
        let mut resolver = SchemaResolver::new(&d, PresenceMode::Standard);
        resolver.resolve_components().unwrap();
        let op = resolve_operation(&ops[0], &mut resolver).unwrap();

        assert_eq!(op.request.path.as_ref().unwrap().name, "UpdatePetPath");
        assert_eq!(op.request.query.as_ref().unwrap().name, "UpdatePetQuery");
        assert_eq!(op.request.headers.as_ref().unwrap().name, "UpdatePetHeaders");
        assert!(op.request.cookies.is_none());

        let body = op.request.body.as_ref().unwrap();
        assert!(body.required);
        assert_eq!(body.node.target().name, "Pet");
        assert_eq!(body.rules.first(), Some(&crate::validation::ValidationRule::Required));

        let ok = op.response(200).unwrap();
        let headers = ok.headers.as_ref().unwrap();
        assert_eq!(headers.name, "UpdatePet200Headers");
        let rate = headers.field("X-Rate").unwrap();
        assert!(rate.required);
        assert!(rate.nullable_presence);
    }
}
