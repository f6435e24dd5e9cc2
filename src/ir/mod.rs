//! # Code Builder IR
//!
//! A minimal structural model of generated source: a [`File`] holds imports
//! and [`Declaration`]s; declarations are records, enums, aliases, functions,
//! impl blocks and consts built from composable [`Expression`] and
//! [`Statement`] nodes. Every other compiler stage emits into a
//! [`FileBuilder`] instead of concatenating source text.
//!
//! ```text
//! schema / validation / response / router ──► FileBuilder ──► File ──► render_file ──► String
//! ```
//!
//! Two guarantees hold for every builder:
//!
//! - declarations come out in insertion order;
//! - imports are deduplicated by module path, first insertion order preserved.
//!
//! Rendering is a separate step ([`render_file`]); the IR itself is pure data
//! and can be inspected in tests without going through text.

mod builder;
mod model;
mod render;
#[cfg(test)]
mod tests;

pub use builder::FileBuilder;
pub use model::*;
pub use render::{render_declaration, render_file, render_import};
