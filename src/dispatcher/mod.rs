//! # Dispatcher Module
//!
//! An in-process serving harness that behaves like a server generated from a
//! compiled description, without any HTTP transport. It consumes the same
//! [`RouteTable`](crate::router::RouteTable) and compiled rule sets the
//! compiler produced and yields the serving-time error taxonomy.
//!
//! ## Request Flow
//!
//! 1. The route table matches method and path (base path stripped first);
//!    `NoMatch` answers 404 and a structural mismatch on a mixed segment
//!    answers 400
//! 2. The operation's handler is looked up by operation id; none answers 501
//! 3. Path, query, header and cookie values are coerced to their declared
//!    types into one JSON record per location
//! 4. Every parameter record and the body are validated; any violation
//!    answers 400 listing all of them
//! 5. The handler runs under `catch_unwind`; a panic answers 500
//! 6. The returned envelope must populate exactly the slot of its status
//!    code, otherwise 500
//!
//! ## Handler Registration
//!
//! ```rust,ignore
//! use brrtgen::dispatcher::Dispatcher;
//! use brrtgen::typed::ResponsePayload;
//! use serde_json::json;
//!
//! let mut dispatcher = Dispatcher::from_compilation(&compilation);
//! dispatcher.register_handler("get_pet", |req| {
//!     let id = req.get_path_param("petId").cloned();
//!     req.respond(200, ResponsePayload::json(json!({ "id": id })))
//! });
//! ```
//!
//! Error bodies follow RFC 7807 (`type`, `title`, `status`, `detail`, and
//! `errors` for validation failures).

mod core;
mod request;
mod response;
#[cfg(test)]
mod tests;

pub use core::{Dispatcher, Handler};
pub use request::{
    parse_cookies, parse_query, HandlerRequest, HeaderVec, OperationRules, Request,
    MAX_INLINE_HEADERS,
};
pub use response::{Response, PROBLEM_JSON};
