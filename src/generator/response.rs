//! Response model synthesis: per-status payloads, the envelope, its
//! constructors and its `ResponseEnvelope` impl.

use super::emit::{type_expr, TypeEmitter};
use crate::ir::{
    Attribute, Declaration, Expression, FieldDecl, FileBuilder, FuncDecl, ImplDecl, Literal,
    Receiver, Statement, TypeDecl, TypeExpr,
};
use crate::schema::{to_pascal_case, NameAllocator};
use crate::spec::{OperationSpec, ResponseVariant};

/// Names of the types synthesized for one operation's responses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseModel {
    pub envelope: String,
    /// `(status, payload type)` in ascending status order
    pub payloads: Vec<(u16, String)>,
}

fn slot(status: u16) -> String {
    format!("status_{status}")
}

fn payload_decl(name: &str, variant: &ResponseVariant) -> TypeDecl {
    let mut fields = Vec::new();
    if let Some(body) = &variant.body {
        let base = type_expr(body);
        let ty = if body.nullable || body.target().nullable {
            TypeExpr::option(base)
        } else {
            base
        };
        let mut field = FieldDecl::new("body", ty);
        if let Some(content_type) = &variant.content_type {
            field = field.with_doc(format!("`{content_type}` payload"));
        }
        fields.push(field);
    }
    if let Some(headers) = &variant.headers {
        fields.push(FieldDecl::new("headers", TypeExpr::named(headers.name.clone())));
    }
    let doc = match &variant.description {
        Some(description) => format!("{} response\n\n{description}", variant.status_code),
        None => format!("{} response", variant.status_code),
    };
    TypeDecl::record(name, fields)
        .with_doc(doc)
        .with_attr(Attribute::derive(["Debug", "Clone", "PartialEq", "Serialize"]))
}

fn constructor(envelope: &str, status: u16, payload: &str, all: &[(u16, String)]) -> FuncDecl {
    let mut fields = vec![(
        "status_code".to_string(),
        Expression::Lit(Literal::UInt(u64::from(status))),
    )];
    for (other, _) in all {
        let value = if *other == status {
            Expression::call("Some", vec![Expression::path("payload")])
        } else {
            Expression::path("None")
        };
        fields.push((slot(*other), value));
    }
    FuncDecl::new(slot(status))
        .with_doc(format!("`{envelope}` populating the {status} slot"))
        .param("payload", TypeExpr::named(payload))
        .returns(TypeExpr::named("Self"))
        .body(vec![Statement::Tail(Expression::StructLit {
            name: "Self".to_string(),
            fields,
        })])
}

fn envelope_impl(envelope: &str, payloads: &[(u16, String)]) -> ImplDecl {
    let status_code = FuncDecl::new("status_code")
        .receiver(Receiver::Ref)
        .returns(TypeExpr::named("u16"))
        .body(vec![Statement::Tail(
            Expression::path("self").field("status_code"),
        )]);

    let populated_body = if payloads.is_empty() {
        vec![Statement::Tail(Expression::call("Vec::new", Vec::new()))]
    } else {
        let mut body = vec![Statement::Let {
            name: "populated".to_string(),
            mutable: true,
            value: Expression::call("Vec::new", Vec::new()),
        }];
        for (status, _) in payloads {
            body.push(Statement::If {
                cond: Expression::path("self")
                    .field(slot(*status))
                    .method("is_some", Vec::new()),
                then: vec![Statement::Expr(Expression::path("populated").method(
                    "push",
                    vec![Expression::Lit(Literal::UInt(u64::from(*status)))],
                ))],
                otherwise: None,
            });
        }
        body.push(Statement::Tail(Expression::path("populated")));
        body
    };
    let populated = FuncDecl::new("populated")
        .receiver(Receiver::Ref)
        .returns(TypeExpr::vec(TypeExpr::named("u16")))
        .body(populated_body);

    ImplDecl {
        target: envelope.to_string(),
        trait_name: Some("ResponseEnvelope".to_string()),
        funcs: vec![status_code, populated],
    }
}

/// Emit payloads, the envelope and its impls for `op`.
///
/// Every declared status gets a `{Operation}Response{status}` payload and a
/// `status_{status}` slot. Constructors populate exactly one slot and set the
/// matching status code.
pub(crate) fn emit_responses(
    emitter: &TypeEmitter,
    builder: &mut FileBuilder,
    names: &mut NameAllocator,
    op: &OperationSpec,
) -> ResponseModel {
    let base = to_pascal_case(&op.operation_id);
    let envelope = names.allocate(&format!("{base}Response"));
    builder.import(
        &format!("{}::typed", emitter.import_prefix()),
        "ResponseEnvelope",
    );

    let mut payloads = Vec::with_capacity(op.responses.len());
    for (status, variant) in &op.responses {
        let name = names.allocate(&format!("{base}Response{status}"));
        builder.import("serde", "Serialize");
        builder.declare(Declaration::Type(payload_decl(&name, variant)));
        payloads.push((*status, name));
    }

    let mut fields = vec![FieldDecl::new("status_code", TypeExpr::named("u16"))
        .with_doc("Status the handler chose; names the populated slot")];
    for (status, payload) in &payloads {
        fields.push(FieldDecl::new(
            slot(*status),
            TypeExpr::option(TypeExpr::named(payload.clone())),
        ));
    }
    let decl = TypeDecl::record(envelope.clone(), fields)
        .with_doc(format!(
            "Responses of `{}`; exactly one slot is populated",
            op.operation_id
        ))
        .with_attr(Attribute::derive(["Debug", "Clone", "PartialEq"]));
    builder.declare(Declaration::Type(decl));

    if !payloads.is_empty() {
        builder.declare(Declaration::Impl(ImplDecl {
            target: envelope.clone(),
            trait_name: None,
            funcs: payloads
                .iter()
                .map(|(status, payload)| constructor(&envelope, *status, payload, &payloads))
                .collect(),
        }));
    }
    builder.declare(Declaration::Impl(envelope_impl(&envelope, &payloads)));

    ResponseModel { envelope, payloads }
}

