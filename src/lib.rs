//! # brrtgen
//!
//! **brrtgen** compiles [OpenAPI 3.x](https://spec.openapis.org/oas/v3.1.0) descriptions into
//! typed Rust server source: one record per schema with validation annotations, one request
//! composite and one response envelope per operation, and a route table that tells apart
//! unknown paths (404) from malformed ones (400).
//!
//! ## Architecture
//!
//! - **[`spec`]** - Loads YAML/JSON descriptions and extracts operations
//! - **[`schema`]** - Resolves schemas (local and external `$ref`s) into an immutable type graph
//! - **[`validation`]** - Compiles schema constraints into rule sets, annotations and evaluators
//! - **[`router`]** - Parses path templates, including mixed segments like `file{id}.json`
//! - **[`ir`]** - The code builder model every stage emits into, plus its renderer
//! - **[`generator`]** - The compiler, batch driver and generator comparison harness
//! - **[`typed`]** - Runtime contracts generated code implements
//! - **[`dispatcher`]** - In-process serving harness over a compiled description
//! - **[`cli`]** - The `brrtgen` command line
//!
//! ### Compilation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant CLI as CLI<br/>(brrtgen generate)
//!     participant Spec as spec::load_description
//!     participant Build as spec::build_operations
//!     participant Schema as schema::SchemaResolver
//!     participant Rules as validation::RuleCompiler
//!     participant Gen as generator::Compiler
//!     participant IR as ir::render_file
//!     participant FS as File System
//!
//!     CLI->>Spec: load_description("petstore.yaml")
//!     Spec-->>CLI: Description
//!     CLI->>Gen: compile(&description)
//!     Gen->>Build: build_operations
//!     Gen->>Schema: resolve components and operation schemas
//!     Schema->>Rules: compile field rules (cached per schema)
//!     Gen->>Gen: emit records, requests, envelopes, ROUTES
//!     Gen-->>CLI: Compilation { file, routes, diagnostics }
//!     CLI->>IR: render_file(&file)
//!     CLI->>FS: write <out>/<slug>.rs
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! brrtgen generate --spec petstore.yaml --output src/api
//! brrtgen routes --spec petstore.yaml
//! brrtgen diff --spec petstore.yaml
//! ```
//!
//! Serving a compiled description in-process:
//!
//! ```rust,ignore
//! use brrtgen::dispatcher::{Dispatcher, Request};
//! use brrtgen::generator::Compiler;
//! use brrtgen::spec::load_description;
//! use brrtgen::typed::ResponsePayload;
//! use http::Method;
//!
//! let description = load_description("petstore.yaml".as_ref())?;
//! let compilation = Compiler::default().compile(&description)?;
//! let mut dispatcher = Dispatcher::from_compilation(&compilation);
//! dispatcher.register_handler("get_pet", |req| {
//!     req.respond(200, ResponsePayload::json(serde_json::json!({ "name": "rex" })))
//! });
//! let response = dispatcher.dispatch(Request::new(Method::GET, "/pets/7"));
//! assert_eq!(response.status, 200);
//! ```
//!
//! ## Logging
//!
//! Every stage logs through `tracing`; [`logging`] installs the subscriber
//! (`BRRTGEN_LOG_LEVEL`, `BRRTGEN_LOG_FORMAT`, `BRRTGEN_LOG_TARGET_FILTER`).

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod dispatcher;
pub mod error;
pub mod generator;
pub mod ir;
pub mod logging;
pub mod router;
pub mod schema;
pub mod spec;
pub mod typed;
pub mod validation;

pub use config::CompilerConfig;
pub use diagnostics::{Diagnostic, Severity};
pub use error::CompileError;
pub use generator::{CodeGenerator, Compilation, Compiler};
pub use spec::{load_description, Description};
