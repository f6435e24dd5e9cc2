//! Dispatcher core: route, coerce, validate, call the handler, check the
//! envelope.

use super::request::{HandlerRequest, OperationRules, Request};
use super::response::Response;
use crate::generator::Compilation;
use crate::router::{RouteOutcome, RouteTable};
use crate::spec::OperationSpec;
use crate::typed::{DynamicEnvelope, ResponseEnvelope, ResponsePayload, Validate};
use http::StatusCode;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// A registered operation handler
pub type Handler = Arc<dyn Fn(HandlerRequest) -> DynamicEnvelope + Send + Sync>;

/// In-process serving harness over one compiled description.
///
/// Holds the immutable route table and per-operation rules, plus the handler
/// registry. Dispatch takes `&self`, so a fully registered dispatcher can be
/// shared across threads behind an `Arc`.
pub struct Dispatcher {
    routes: Arc<RouteTable>,
    operations: HashMap<Arc<str>, Arc<OperationRules>>,
    handlers: HashMap<String, Handler>,
    next_request_id: AtomicU64,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut handlers: Vec<&String> = self.handlers.keys().collect();
        handlers.sort();
        f.debug_struct("Dispatcher")
            .field("routes", &self.routes.len())
            .field("operations", &self.operations.len())
            .field("handlers", &handlers)
            .finish()
    }
}

impl Dispatcher {
    #[must_use]
    pub fn new(routes: Arc<RouteTable>, operations: &[OperationSpec]) -> Self {
        let operations = operations
            .iter()
            .map(|op| {
                let rules = OperationRules::from_spec(op);
                (Arc::clone(&rules.operation_id), Arc::new(rules))
            })
            .collect();
        Dispatcher {
            routes,
            operations,
            handlers: HashMap::new(),
            next_request_id: AtomicU64::new(1),
        }
    }

    #[must_use]
    pub fn from_compilation(compilation: &Compilation) -> Self {
        Self::new(Arc::clone(&compilation.routes), &compilation.operations)
    }

    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Register `handler` for `operation_id`.
    ///
    /// Returns `false`, registering nothing, when the description has no
    /// such operation. A second registration replaces the first.
    pub fn register_handler<F>(&mut self, operation_id: &str, handler: F) -> bool
    where
        F: Fn(HandlerRequest) -> DynamicEnvelope + Send + Sync + 'static,
    {
        if !self.operations.contains_key(operation_id) {
            warn!(
                handler_name = %operation_id,
                "Handler registered for unknown operation - ignored"
            );
            return false;
        }
        if self
            .handlers
            .insert(operation_id.to_string(), Arc::new(handler))
            .is_some()
        {
            warn!(handler_name = %operation_id, "Replaced existing handler");
        } else {
            info!(
                handler_name = %operation_id,
                total_handlers = self.handlers.len(),
                "Handler registered successfully"
            );
        }
        true
    }

    #[must_use]
    pub fn has_handler(&self, operation_id: &str) -> bool {
        self.handlers.contains_key(operation_id)
    }

    /// Serve one request.
    ///
    /// | Outcome                                   | Status |
    /// |-------------------------------------------|--------|
    /// | no route                                  | 404    |
    /// | structural mismatch on a mixed segment    | 400    |
    /// | no handler registered                     | 501    |
    /// | parameter or body rule violated           | 400    |
    /// | handler panicked                          | 500    |
    /// | envelope with zero or several slots       | 500    |
    ///
    /// Errors are RFC 7807 problem-details bodies; validation problems list
    /// every violation under `errors`.
    pub fn dispatch(&self, request: Request) -> Response {
        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let start = Instant::now();

        let route_match = match self.routes.route(&request.method, &request.path) {
            RouteOutcome::Matched(m) => m,
            RouteOutcome::NoMatch => {
                info!(
                    request_id,
                    method = %request.method,
                    path = %request.path,
                    "No route matched"
                );
                return Response::problem(
                    StatusCode::NOT_FOUND,
                    format!("no route for {} {}", request.method, request.path),
                );
            }
            RouteOutcome::StructuralMismatch { route, segment } => {
                warn!(
                    request_id,
                    method = %request.method,
                    path = %request.path,
                    template = %route.template,
                    segment,
                    "Structural mismatch"
                );
                return Response::problem(
                    StatusCode::BAD_REQUEST,
                    format!(
                        "path segment {segment} does not fit route template {}",
                        route.template
                    ),
                );
            }
        };

        let operation_id = route_match.operation_id();
        let (Some(rules), Some(handler)) = (
            self.operations.get(operation_id),
            self.handlers.get(operation_id),
        ) else {
            error!(
                request_id,
                handler_name = %operation_id,
                available_handlers = self.handlers.len(),
                "Handler not found"
            );
            return Response::problem(
                StatusCode::NOT_IMPLEMENTED,
                format!("no handler registered for operation '{operation_id}'"),
            );
        };

        let handler_request = HandlerRequest::build(
            request_id,
            request,
            &route_match.path_params,
            Arc::clone(rules),
        );
        debug!(
            request_id,
            handler_name = %operation_id,
            path_params = %handler_request.path_params,
            query = %handler_request.query,
            "Request coerced"
        );

        if let Err(violations) = handler_request.validate() {
            warn!(
                request_id,
                handler_name = %operation_id,
                violations = violations.len(),
                first = ?violations.first(),
                "Request validation failed"
            );
            return Response::validation_failed(&violations);
        }

        let handler = Arc::clone(handler);
        let envelope = match catch_unwind(AssertUnwindSafe(move || handler(handler_request))) {
            Ok(envelope) => envelope,
            Err(panic) => {
                let panic_message = panic
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "non-string panic payload".to_string());
                error!(
                    request_id,
                    handler_name = %operation_id,
                    panic_message = %panic_message,
                    "Handler panicked"
                );
                return Response::problem(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("handler for '{operation_id}' panicked: {panic_message}"),
                );
            }
        };

        let status = match envelope.check() {
            Ok(status) => status,
            Err(violation) => {
                error!(
                    request_id,
                    handler_name = %operation_id,
                    status_code = violation.status_code,
                    populated = ?violation.populated,
                    "Handler contract violation"
                );
                return Response::problem(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("handler for '{operation_id}' broke its response contract: {violation}"),
                );
            }
        };

        let response = match envelope.payload() {
            Some(payload) => Response::from_payload(status, payload, rules.content_type(status)),
            None => Response::from_payload(status, &ResponsePayload::empty(), None),
        };
        info!(
            request_id,
            handler_name = %operation_id,
            status = response.status,
            latency_ms = start.elapsed().as_millis() as u64,
            "Handler response"
        );
        response
    }
}
