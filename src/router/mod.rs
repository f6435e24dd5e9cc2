//! # Route Pattern Compiler
//!
//! Parses path templates into [`Segment`] sequences and matches request
//! paths against them, telling apart paths that are simply not routes (404)
//! from paths that hit a route's shape but carry a malformed segment (400).
//!
//! ## Segments
//!
//! | Template segment    | Kind                                 |
//! |---------------------|--------------------------------------|
//! | `pets`              | `Literal("pets")`                    |
//! | `{id}`              | `Param("id")`                        |
//! | `resours{suffix}`   | `Mixed("resours", "suffix", "")`     |
//! | `file{id}.json`     | `Mixed("file", "id", ".json")`       |
//!
//! ## Example
//!
//! ```rust
//! use brrtgen::router::{MatchOutcome, RouteTemplate};
//!
//! let template = RouteTemplate::parse("/files/file{id}.json").unwrap();
//! assert!(matches!(template.matches("/files/file7.json"), MatchOutcome::Matched(_)));
//! assert!(matches!(template.matches("/files/file7.xml"), MatchOutcome::StructuralMismatch { .. }));
//! assert_eq!(template.matches("/files/doc7.json"), MatchOutcome::NoMatch);
//! ```
//!
//! A [`RouteTable`] holds the compiled routes of one description; it is
//! immutable and matching takes `&self` only.

mod core;
mod template;

pub use core::{ParamVec, Route, RouteMatch, RouteOutcome, RouteTable, MAX_INLINE_PARAMS};
pub use template::{MatchOutcome, RouteTemplate, Segment};
