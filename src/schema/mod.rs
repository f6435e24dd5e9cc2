//! # Schema/Type Resolver
//!
//! Turns the raw `components.schemas` of a [`Description`](crate::spec::Description)
//! (and any inline schema reached from an operation) into an immutable graph
//! of [`SchemaNode`]s.
//!
//! - `$ref`s are followed to their target, local or in an external document.
//!   A missing target is [`UnresolvedReference`](crate::error::CompileError::UnresolvedReference);
//!   a chain revisiting a schema on the resolution stack is
//!   [`CyclicSchema`](crate::error::CompileError::CyclicSchema).
//! - Object fields keep their source order.
//! - Required fields are direct values and optional ones are `Option<T>`.
//!   [`PresenceMode::Explicit`] makes every field `Option<T>` without
//!   touching the compiled rules.
//! - Inline objects and enums are named `<Owner><Field>`; collisions take a
//!   numeric suffix in discovery order.

mod naming;
mod resolver;
mod types;

pub use naming::{field_ident, to_pascal_case, to_snake_case, NameAllocator};
pub use resolver::{Member, SchemaResolver};
pub use types::{
    Bound, Constraints, FieldDescriptor, PresenceMode, ScalarKind, SchemaKind, SchemaNode,
};
