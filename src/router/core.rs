//! Route table: the serving-time view of compiled route templates.

use super::template::{MatchOutcome, RouteTemplate};
use http::{Method, StatusCode};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Maximum number of path parameters before captures spill to the heap.
/// Most templates bind four or fewer.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Captured path parameters. Names are shared with the template; values are
/// per-request.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// One registered route
#[derive(Debug, Clone)]
pub struct Route {
    pub method: Method,
    pub template: RouteTemplate,
    pub operation_id: Arc<str>,
}

impl Route {
    pub fn new(method: Method, template: RouteTemplate, operation_id: impl Into<Arc<str>>) -> Self {
        Route {
            method,
            template,
            operation_id: operation_id.into(),
        }
    }
}

/// A successful match
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: Arc<Route>,
    /// Parameters captured from the path in template order
    pub path_params: ParamVec,
}

impl RouteMatch {
    /// Get a path parameter by name.
    ///
    /// When a name repeats at different depths the last occurrence wins.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Parameters as an owned map. Allocates; prefer
    /// [`get_path_param`](Self::get_path_param) on the hot path.
    #[must_use]
    pub fn path_params_map(&self) -> HashMap<String, String> {
        self.path_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[must_use]
    pub fn operation_id(&self) -> &str {
        &self.route.operation_id
    }
}

/// Outcome of routing a request through the whole table
#[derive(Debug, Clone)]
pub enum RouteOutcome {
    Matched(RouteMatch),
    /// No route matched, but a route for this method failed only on a mixed
    /// segment's suffix
    StructuralMismatch { route: Arc<Route>, segment: usize },
    NoMatch,
}

impl RouteOutcome {
    /// Status to answer with when routing failed, `None` on a match
    #[must_use]
    pub fn failure_status(&self) -> Option<StatusCode> {
        match self {
            RouteOutcome::Matched(_) => None,
            RouteOutcome::StructuralMismatch { .. } => Some(StatusCode::BAD_REQUEST),
            RouteOutcome::NoMatch => Some(StatusCode::NOT_FOUND),
        }
    }
}

/// Immutable table of routes, tried in declaration order.
///
/// Built once per compiled description and safe to share across threads
/// without locking.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Arc<Route>>,
    /// Prefix stripped from request paths before matching (e.g. `/api/v1`)
    base_path: String,
}

impl RouteTable {
    #[must_use]
    pub fn new(routes: Vec<Route>, base_path: impl Into<String>) -> Self {
        let base_path = base_path.into();
        let routes: Vec<Arc<Route>> = routes.into_iter().map(Arc::new).collect();

        let routes_summary: Vec<String> = routes
            .iter()
            .take(10)
            .map(|r| format!("{} {}{}", r.method, base_path, r.template))
            .collect();
        info!(
            routes_count = routes.len(),
            base_path = %base_path,
            routes_summary = ?routes_summary,
            "Routing table loaded"
        );

        RouteTable { routes, base_path }
    }

    #[must_use]
    pub fn routes(&self) -> &[Arc<Route>] {
        &self.routes
    }

    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Print all registered routes to stdout
    pub fn dump_routes(&self) {
        println!(
            "[routes] base_path={} count={}",
            self.base_path,
            self.routes.len()
        );
        for route in &self.routes {
            println!(
                "[route] {} {}{} -> {}",
                route.method, self.base_path, route.template, route.operation_id
            );
        }
    }

    fn strip_base<'p>(&self, path: &'p str) -> Option<&'p str> {
        if self.base_path.is_empty() {
            return Some(path);
        }
        match path.strip_prefix(self.base_path.as_str())? {
            "" => Some("/"),
            rest if rest.starts_with('/') => Some(rest),
            _ => None,
        }
    }

    /// Route a request.
    ///
    /// The first route whose method and template both match wins. Without a
    /// match, a structural mismatch reported by any same-method route makes
    /// the outcome [`RouteOutcome::StructuralMismatch`]; otherwise it is
    /// [`RouteOutcome::NoMatch`], including paths that only match under
    /// another method.
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> RouteOutcome {
        debug!(method = %method, path = %path, "Route match attempt");
        let match_start = Instant::now();

        let Some(relative) = self.strip_base(path) else {
            warn!(
                method = %method,
                path = %path,
                base_path = %self.base_path,
                "Path outside base path"
            );
            return RouteOutcome::NoMatch;
        };

        let mut mismatch: Option<(Arc<Route>, usize)> = None;
        for route in self.routes.iter().filter(|r| r.method == *method) {
            match route.template.matches(relative) {
                MatchOutcome::Matched(path_params) => {
                    let match_duration = match_start.elapsed();
                    if match_duration > Duration::from_millis(1) {
                        warn!(
                            method = %method,
                            path = %path,
                            operation_id = %route.operation_id,
                            route_pattern = %route.template,
                            duration_us = match_duration.as_micros(),
                            "Slow route matching detected"
                        );
                    } else {
                        info!(
                            method = %method,
                            path = %path,
                            operation_id = %route.operation_id,
                            route_pattern = %route.template,
                            path_params = ?path_params,
                            duration_us = match_duration.as_micros(),
                            "Route matched"
                        );
                    }
                    return RouteOutcome::Matched(RouteMatch {
                        route: Arc::clone(route),
                        path_params,
                    });
                }
                MatchOutcome::StructuralMismatch { segment } => {
                    if mismatch.is_none() {
                        mismatch = Some((Arc::clone(route), segment));
                    }
                }
                MatchOutcome::NoMatch => {}
            }
        }

        let match_duration = match_start.elapsed();
        if let Some((route, segment)) = mismatch {
            warn!(
                method = %method,
                path = %path,
                route_pattern = %route.template,
                segment,
                duration_us = match_duration.as_micros(),
                "Structural mismatch"
            );
            return RouteOutcome::StructuralMismatch { route, segment };
        }

        warn!(
            method = %method,
            path = %path,
            duration_us = match_duration.as_micros(),
            "No route matched"
        );
        RouteOutcome::NoMatch
    }
}
