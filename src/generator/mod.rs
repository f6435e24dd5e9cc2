//! # Generator Module
//!
//! Turns a loaded [`Description`](crate::spec::Description) into one
//! generated Rust source file.
//!
//! ## Pipeline
//!
//! ```text
//! Description ─► build_operations ─► SchemaResolver ─► TypeEmitter ─┐
//!                                   resolve_operation ─► request ───┼─► FileBuilder ─► File ─► render_file
//!                                                      ─► response ─┘
//! ```
//!
//! A [`Compiler`] holds a [`CompilerConfig`](crate::config::CompilerConfig)
//! and nothing else; every compilation builds a fresh resolver, rule cache,
//! name allocator and file builder. [`run_batch`] drives it over a list of
//! files, recording per-file failures and honouring a cancellation flag
//! between files.
//!
//! ## Generated file
//!
//! For a description with a `Pet` schema and a `get_pet` operation answering
//! 200 and 404, the file contains, in order:
//!
//! - `BASE_PATH` and `ROUTES` consts;
//! - `Pet` with serde attributes and `#[validate(...)]` annotations, plus any
//!   `*_PATTERN` consts its fields name;
//! - `GetPetPath` and friends for each parameter location;
//! - `GetPetRequest`, the request composite;
//! - `GetPetResponse200`, `GetPetResponse404` payloads;
//! - `GetPetResponse`, the envelope, with `status_200`/`status_404`
//!   constructors and a `ResponseEnvelope` impl.
//!
//! ## Comparison
//!
//! [`diff_generators`] renders the output of two [`CodeGenerator`]s for the
//! same description and returns a unified diff; the CLI uses it to compare
//! standard and explicit presence.

mod batch;
mod compiler;
mod diff;
mod emit;
mod format;
mod output;
mod request;
mod response;

pub use batch::{generate_file, run_batch, BatchOptions, BatchReport, FileOutcome, Generated};
pub use compiler::{CodeGenerator, Compilation, Compiler};
pub use diff::{diff_generators, diff_text, GeneratorDiff};
pub use emit::{scalar_type, type_expr};
pub use format::format_file;
pub use output::{output_path, write_output};
pub use response::ResponseModel;
