//! Per-operation request composite.

use super::emit::{annotation_rules, type_expr, TypeEmitter};
use crate::ir::{Attribute, Declaration, FieldDecl, FileBuilder, Meta, TypeDecl, TypeExpr};
use crate::schema::{to_pascal_case, NameAllocator, PresenceMode};
use crate::spec::{OperationSpec, ParameterLocation};

fn part_field(location: ParameterLocation) -> &'static str {
    match location {
        ParameterLocation::Path => "path",
        ParameterLocation::Query => "query",
        ParameterLocation::Header => "headers",
        ParameterLocation::Cookie => "cookies",
    }
}

/// Emit `{Operation}Request` holding the operation's parameter records and
/// body. Returns the allocated type name.
///
/// Parameter records are always present (their own fields carry presence);
/// the body is an `Option` unless it is required under standard presence.
pub(crate) fn emit_request(
    emitter: &mut TypeEmitter,
    builder: &mut FileBuilder,
    names: &mut NameAllocator,
    op: &OperationSpec,
    presence: PresenceMode,
) -> String {
    let name = names.allocate(&format!("{}Request", to_pascal_case(&op.operation_id)));
    builder.import(&format!("{}::typed", emitter.import_prefix()), "Validate");

    let mut fields = Vec::new();
    for (location, node) in op.request.parameter_parts() {
        fields.push(
            FieldDecl::new(part_field(location), TypeExpr::named(node.name.clone()))
                .with_attr(Attribute::list("validate", vec![Meta::Path("dive".to_string())])),
        );
    }

    if let Some(body) = &op.request.body {
        let nullable = body.node.is_nullable();
        let optional = !body.required || presence == PresenceMode::Explicit || nullable;
        let base = type_expr(&body.node);
        let ty = if optional { TypeExpr::option(base) } else { base };
        let mut field =
            FieldDecl::new("body", ty).with_doc(format!("`{}` payload", body.content_type));
        let rules = annotation_rules(&body.rules, &body.node);
        if let Some(attr) = emitter.validate_attr(builder, &name, "body", &rules, optional && !nullable) {
            field = field.with_attr(attr);
        }
        fields.push(field);
    }

    let doc = match &op.summary {
        Some(summary) => format!("Request parts of `{}`\n\n{summary}", op.operation_id),
        None => format!("Request parts of `{}`", op.operation_id),
    };
    let decl = TypeDecl::record(name.clone(), fields)
        .with_doc(doc)
        .with_attr(Attribute::derive(["Debug", "Clone", "PartialEq", "Validate"]));
    builder.declare(Declaration::Type(decl));
    name
}
