#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;

fn sample_record() -> TypeDecl {
    TypeDecl::record(
        "Pet",
        vec![
            FieldDecl::new("name", TypeExpr::named("String")),
            FieldDecl::new("tag", TypeExpr::option(TypeExpr::named("String")))
                .with_attr(Attribute::serde_rename("petTag")),
        ],
    )
    .with_attr(Attribute::derive(["Debug", "Clone"]))
    .with_doc("A pet")
}

#[test]
fn test_imports_dedup_by_module_first_order() {
    let mut b = FileBuilder::new("petstore");
    b.import("serde", "Serialize");
    b.import("std::collections", "HashMap");
    b.import("serde", "Deserialize");
    b.import("serde", "Serialize");
    let file = b.finish();
    assert_eq!(file.imports.len(), 2);
    assert_eq!(file.imports[0].module, "serde");
    assert_eq!(file.imports[0].items, vec!["Serialize", "Deserialize"]);
    assert_eq!(file.imports[1].module, "std::collections");
}

#[test]
fn test_declarations_keep_insertion_order_and_skip_duplicates() {
    let mut b = FileBuilder::new("petstore");
    assert!(b.declare(Declaration::Type(TypeDecl::alias(
        "Zebra",
        TypeExpr::named("String")
    ))));
    assert!(b.declare(Declaration::Type(sample_record())));
    assert!(!b.declare(Declaration::Type(sample_record())));
    assert!(b.declare(Declaration::Impl(ImplDecl {
        target: "Pet".into(),
        trait_name: None,
        funcs: vec![],
    })));
    let file = b.finish();
    let names: Vec<_> = file.declarations.iter().map(|d| d.name()).collect();
    assert_eq!(names, vec![Some("Zebra"), Some("Pet"), None]);
}

#[test]
fn test_render_record() {
    let text = render_declaration(&Declaration::Type(sample_record()));
    let expected = "/// A pet\n#[derive(Debug, Clone)]\npub struct Pet {\n    pub name: String,\n    #[serde(rename = \"petTag\")]\n    pub tag: Option<String>,\n}";
    assert_eq!(text, expected);
}

#[test]
fn test_render_enum_and_alias() {
    let e = TypeDecl::enumeration(
        "Status",
        vec![VariantDecl {
            name: "Available".into(),
            attrs: vec![Attribute::serde_rename("available")],
        }],
    );
    assert_eq!(
        render_declaration(&Declaration::Type(e)),
        "pub enum Status {\n    #[serde(rename = \"available\")]\n    Available,\n}"
    );
    let a = TypeDecl::alias("Tags", TypeExpr::vec(TypeExpr::vec(TypeExpr::named("String"))));
    assert_eq!(
        render_declaration(&Declaration::Type(a)),
        "pub type Tags = Vec<Vec<String>>;"
    );
}

#[test]
fn test_render_impl_with_control_flow() {
    let populated = FuncDecl::new("populated")
        .receiver(Receiver::Ref)
        .returns(TypeExpr::vec(TypeExpr::named("u16")))
        .body(vec![
            Statement::Let {
                name: "out".into(),
                mutable: true,
                value: Expression::call("Vec::new", vec![]),
            },
            Statement::If {
                cond: Expression::path("self")
                    .field("status_200")
                    .method("is_some", vec![]),
                then: vec![Statement::Expr(
                    Expression::path("out").method("push", vec![Expression::Lit(Literal::UInt(200))]),
                )],
                otherwise: None,
            },
            Statement::Tail(Expression::path("out")),
        ]);
    let text = render_declaration(&Declaration::Impl(ImplDecl {
        target: "GetPetResponse".into(),
        trait_name: Some("ResponseEnvelope".into()),
        funcs: vec![populated],
    }));
    assert_eq!(
        text,
        "impl ResponseEnvelope for GetPetResponse {\n    fn populated(&self) -> Vec<u16> {\n        let mut out = Vec::new();\n        if self.status_200.is_some() {\n            out.push(200);\n        }\n        out\n    }\n}"
    );
}

#[test]
fn test_render_expressions() {
    let lit = Expression::StructLit {
        name: "Self".into(),
        fields: vec![
            ("status_code".into(), Expression::Lit(Literal::UInt(200))),
            ("status_200".into(), Expression::call("Some", vec![Expression::path("payload")])),
        ],
    };
    assert_eq!(lit.to_string(), "Self { status_code: 200, status_200: Some(payload) }");

    let cond = Expression::Binary {
        op: BinOp::And,
        lhs: Box::new(Expression::Not(Box::new(Expression::path("a")))),
        rhs: Box::new(Expression::path("b")),
    };
    assert_eq!(cond.to_string(), "(!a) && b");

    let table = Expression::Array(vec![Expression::Tuple(vec![
        Expression::str("GET"),
        Expression::str("/pets/{id}"),
    ])])
    .borrow();
    assert_eq!(table.to_string(), "&[(\"GET\", \"/pets/{id}\")]");
    assert_eq!(Expression::Lit(Literal::Float(1.0)).to_string(), "1.0");
}

#[test]
fn test_render_validate_meta() {
    let attr = Attribute::list(
        "validate",
        vec![
            Meta::Path("required".into()),
            Meta::List(
                "length".into(),
                vec![Meta::NameValue("min".into(), Expression::Lit(Literal::UInt(1)))],
            ),
            Meta::List("dive".into(), vec![Meta::Path("required".into())]),
        ],
    );
    assert_eq!(
        attr.to_string(),
        "#[validate(required, length(min = 1), dive(required))]"
    );
}

#[test]
fn test_render_file_frame() {
    let mut b = FileBuilder::new("petstore");
    b.import("serde", "Serialize");
    b.import("serde", "Deserialize");
    b.import_module("serde_json");
    b.declare(Declaration::Const(ConstDecl {
        name: "ANSWER".into(),
        docs: vec![],
        ty: TypeExpr::named("u16"),
        value: Expression::Lit(Literal::UInt(42)),
    }));
    let text = render_file(&b.finish()).unwrap();
    assert!(text.starts_with("// Code generated by brrtgen from petstore. DO NOT EDIT."));
    assert!(text.contains("\nuse serde::{Serialize, Deserialize};\nuse serde_json;\n"));
    assert!(text.contains("\n\npub const ANSWER: u16 = 42;\n"));
    assert!(text.ends_with('\n'));
}
