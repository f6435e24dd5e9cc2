//! # Validation Rule Compiler
//!
//! Compiles schema constraints into field-level [`ValidationRule`]s, renders
//! them as generated `#[validate(...)]` annotations, and evaluates them
//! against JSON values at serving time.
//!
//! ## Dive policy
//!
//! Object and array fields carry a [`Dive`] rule holding the nested schema's
//! compiled rules:
//!
//! - container absent and optional: the dive is skipped;
//! - container absent and required: fails on `required` before any dive;
//! - container present, even empty: every element or nested field satisfies
//!   its full rule set, including further dives.
//!
//! An empty required array satisfies `required`; only `minItems` rejects it.
//!
//! Rule sets of named schemas are compiled once per compilation and shared by
//! every field referencing them. Evaluation is a pure function from a value
//! to a list of [`Violation`]s; any violation is a 400-class failure.

mod annotate;
mod compiler;
mod evaluate;
mod rules;

pub use annotate::{annotate, validate_attribute};
pub use compiler::RuleCompiler;
pub use evaluate::{
    coerce_param, coerce_params, validate_field, validate_object, validate_value, Violation,
};
pub use rules::{Dive, FieldRules, Pattern, RuleKind, RuleSet, Shape, ValidationRule};
