//! # Description loading and operation extraction
//!
//! [`load_description`] reads a YAML or JSON OpenAPI document (plus any
//! external documents it references) into a [`Description`].
//! [`build_operations`] walks its `paths` into [`OperationMeta`]s with
//! parameters, bodies and responses de-referenced but schemas still raw, and
//! [`resolve_operation`] turns one of those into an [`OperationSpec`] whose
//! request and response parts are resolved [`SchemaNode`](crate::schema::SchemaNode)s.

mod build;
mod load;
mod types;

pub use build::{build_operations, resolve_operation};
pub use load::{load_description, slugify, Description};
pub use types::{
    HeaderMeta, OperationMeta, OperationSpec, ParameterLocation, ParameterMeta, RequestBody,
    RequestBodyMeta, RequestParts, ResponseMeta, ResponseVariant,
};
