//! Schema nodes to IR declarations.

use crate::ir::{
    Attribute, ConstDecl, Declaration, Expression, FieldDecl, FileBuilder, Meta, TypeDecl,
    TypeExpr, VariantDecl,
};
use crate::schema::{
    to_pascal_case, to_snake_case, FieldDescriptor, NameAllocator, ScalarKind, SchemaKind,
    SchemaNode,
};
use crate::validation::{annotate, validate_attribute, Dive, Pattern, ValidationRule};
use std::collections::HashSet;
use std::sync::Arc;

pub(crate) const RECORD_DERIVES: [&str; 6] = [
    "Debug",
    "Clone",
    "PartialEq",
    "Serialize",
    "Deserialize",
    "Validate",
];

const ENUM_DERIVES: [&str; 8] = [
    "Debug",
    "Clone",
    "Copy",
    "PartialEq",
    "Eq",
    "Hash",
    "Serialize",
    "Deserialize",
];

/// Rust type for a scalar kind and numeric format
#[must_use]
pub fn scalar_type(kind: ScalarKind, format: Option<&str>) -> TypeExpr {
    match kind {
        ScalarKind::String | ScalarKind::DateTime => TypeExpr::named("String"),
        ScalarKind::Integer => match format {
            Some("int32") => TypeExpr::named("i32"),
            _ => TypeExpr::named("i64"),
        },
        ScalarKind::Number => match format {
            Some("float") => TypeExpr::named("f32"),
            _ => TypeExpr::named("f64"),
        },
        ScalarKind::Boolean => TypeExpr::named("bool"),
        ScalarKind::Any => TypeExpr::named("serde_json::Value"),
    }
}

fn is_nullable(node: &SchemaNode) -> bool {
    node.nullable || node.target().nullable
}

/// Rust type naming `node` where it is used
#[must_use]
pub fn type_expr(node: &SchemaNode) -> TypeExpr {
    if node.declared {
        return TypeExpr::named(node.name.clone());
    }
    shape_expr(node)
}

/// Rust type of `node`'s shape, ignoring its own declaration
fn shape_expr(node: &SchemaNode) -> TypeExpr {
    match &node.kind {
        SchemaKind::Reference(target) => type_expr(target),
        SchemaKind::Scalar(kind) => scalar_type(*kind, node.format.as_deref()),
        SchemaKind::Array(element) => {
            let inner = type_expr(element);
            if is_nullable(element) {
                TypeExpr::vec(TypeExpr::option(inner))
            } else {
                TypeExpr::vec(inner)
            }
        }
        // objects and string enums are always declared
        SchemaKind::Enum(_) => TypeExpr::named("String"),
        SchemaKind::Object(_) => TypeExpr::named("serde_json::Value"),
    }
}

fn screaming(s: &str) -> String {
    to_snake_case(s).to_ascii_uppercase()
}

/// Emits resolved schema nodes into a [`FileBuilder`]
pub(crate) struct TypeEmitter {
    import_prefix: String,
    const_names: NameAllocator,
}

impl TypeEmitter {
    pub(crate) fn new(import_prefix: &str) -> Self {
        TypeEmitter {
            import_prefix: import_prefix.to_string(),
            const_names: NameAllocator::new(),
        }
    }

    pub(crate) fn import_prefix(&self) -> &str {
        &self.import_prefix
    }

    pub(crate) fn import_record_traits(&self, builder: &mut FileBuilder) {
        builder.import("serde", "Deserialize");
        builder.import("serde", "Serialize");
        builder.import(&format!("{}::typed", self.import_prefix), "Validate");
    }

    /// Emit one declared node: a record, an enum or an alias
    pub(crate) fn emit_node(&mut self, builder: &mut FileBuilder, node: &SchemaNode) {
        if builder.is_declared(&node.name) {
            return;
        }
        let decl = match &node.kind {
            SchemaKind::Object(fields) => {
                self.import_record_traits(builder);
                let fields = fields
                    .iter()
                    .map(|f| self.field(builder, &node.name, f))
                    .collect();
                TypeDecl::record(node.name.clone(), fields)
                    .with_attr(Attribute::derive(RECORD_DERIVES))
            }
            SchemaKind::Enum(members) => {
                builder.import("serde", "Deserialize");
                builder.import("serde", "Serialize");
                TypeDecl::enumeration(node.name.clone(), variants(members))
                    .with_attr(Attribute::derive(ENUM_DERIVES))
            }
            _ => TypeDecl::alias(node.name.clone(), shape_expr(node)),
        };
        let decl = match &node.description {
            Some(doc) => TypeDecl {
                docs: vec![doc.clone()],
                ..decl
            },
            None => decl,
        };
        builder.declare(Declaration::Type(decl));
    }

    /// Field declaration with serde and validation attributes.
    ///
    /// Pattern consts the field needs are declared on `builder` before the
    /// caller declares the owning record.
    pub(crate) fn field(
        &mut self,
        builder: &mut FileBuilder,
        owner: &str,
        field: &FieldDescriptor,
    ) -> FieldDecl {
        let optional = field.is_optional();
        let base = type_expr(&field.ty);
        let ty = if optional { TypeExpr::option(base) } else { base };
        let mut decl = FieldDecl::new(field.name.clone(), ty);
        if let Some(doc) = &field.description {
            decl = decl.with_doc(doc.clone());
        }

        let mut serde = Vec::new();
        if field.name.trim_start_matches("r#") != field.wire_key {
            serde.push(Meta::NameValue(
                "rename".to_string(),
                Expression::str(field.wire_key.clone()),
            ));
        }
        if optional {
            serde.push(Meta::Path("default".to_string()));
            serde.push(Meta::NameValue(
                "skip_serializing_if".to_string(),
                Expression::str("Option::is_none"),
            ));
        }
        if !serde.is_empty() {
            decl = decl.with_attr(Attribute::list("serde", serde));
        }

        let field_name = field.name.trim_start_matches("r#");
        let rules = annotation_rules(&field.rules, &field.ty);
        let presence_only = optional && !field.ty.is_nullable();
        if let Some(attr) = self.validate_attr(builder, owner, field_name, &rules, presence_only) {
            decl = decl.with_attr(attr);
        }
        decl
    }

    /// `#[validate(...)]` for `rules`, declaring any pattern consts it names
    pub(crate) fn validate_attr(
        &mut self,
        builder: &mut FileBuilder,
        owner: &str,
        field_name: &str,
        rules: &[ValidationRule],
        optional: bool,
    ) -> Option<Attribute> {
        let mut consts = Vec::new();
        let names = &mut self.const_names;
        let metas = annotate(rules, optional, 0, &mut |pattern: &Pattern, depth: usize| {
            let mut name = format!("{}_{}", screaming(owner), screaming(field_name));
            for _ in 0..depth {
                name.push_str("_ITEMS");
            }
            name.push_str("_PATTERN");
            let name = names.allocate(&name);
            consts.push(ConstDecl {
                name: name.clone(),
                docs: Vec::new(),
                ty: TypeExpr::Ref(None, Box::new(TypeExpr::named("str"))),
                value: Expression::str(pattern.source()),
            });
            name
        });
        for c in consts {
            builder.declare(Declaration::Const(c));
        }
        validate_attribute(metas)
    }
}

/// Drop membership rules a generated enum type already enforces
pub(crate) fn annotation_rules(rules: &[ValidationRule], node: &SchemaNode) -> Vec<ValidationRule> {
    let typed_enum = matches!(node.target().kind, SchemaKind::Enum(_));
    rules
        .iter()
        .filter(|rule| !(typed_enum && matches!(rule, ValidationRule::Enum(_))))
        .map(|rule| match (rule, node.element()) {
            (ValidationRule::Dive(Dive::Elements { rules, nullable }), Some(element)) => {
                ValidationRule::Dive(Dive::Elements {
                    rules: Arc::new(annotation_rules(rules, element)),
                    nullable: *nullable,
                })
            }
            _ => rule.clone(),
        })
        .collect()
}

fn variants(members: &[String]) -> Vec<VariantDecl> {
    let mut seen = HashSet::new();
    members
        .iter()
        .map(|member| {
            let mut base = to_pascal_case(member);
            if base == "_" {
                base = "Empty".to_string();
            }
            let mut name = base.clone();
            let mut n = 2;
            while !seen.insert(name.clone()) {
                name = format!("{base}{n}");
                n += 1;
            }
            VariantDecl {
                name,
                attrs: vec![Attribute::serde_rename(member.clone())],
            }
        })
        .collect()
}
