//! Reference renderer: File IR to Rust source text.
//!
//! Inline nodes (types, expressions, attribute metas) implement `Display`.
//! Block nodes are laid out by a small indenting printer, and the file frame
//! (header, imports, declarations) comes from an askama template. The output is
//! valid Rust but only loosely formatted; `rustfmt` owns final layout.

use super::model::{
    Attribute, ConstDecl, Declaration, Expression, File, FuncDecl, ImplDecl, Import, Literal,
    Meta, Receiver, Statement, TypeDecl, TypeDeclKind, TypeExpr,
};
use anyhow::Context;
use askama::Template;
use std::fmt;

/// File frame template
#[derive(Template)]
#[template(path = "file.rs.txt", escape = "none")]
struct FileTemplate<'a> {
    name: &'a str,
    imports: Vec<String>,
    declarations: Vec<String>,
}

/// Render a whole file to source text
///
/// # Errors
///
/// Returns an error if the file template fails to render.
pub fn render_file(file: &File) -> anyhow::Result<String> {
    let template = FileTemplate {
        name: &file.name,
        imports: file.imports.iter().map(render_import).collect(),
        declarations: file.declarations.iter().map(render_declaration).collect(),
    };
    let mut out = template
        .render()
        .with_context(|| format!("failed to render file '{}'", file.name))?;
    if !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}

/// Render one `use` item
#[must_use]
pub fn render_import(import: &Import) -> String {
    match import.items.as_slice() {
        [] => format!("use {};", import.module),
        [single] => format!("use {}::{};", import.module, single),
        items => format!("use {}::{{{}}};", import.module, items.join(", ")),
    }
}

/// Render one top-level declaration, without a trailing newline
#[must_use]
pub fn render_declaration(decl: &Declaration) -> String {
    let mut p = Printer::default();
    match decl {
        Declaration::Type(t) => type_decl(&mut p, t),
        Declaration::Func(f) => func_decl(&mut p, f, f.public),
        Declaration::Impl(i) => impl_decl(&mut p, i),
        Declaration::Const(c) => const_decl(&mut p, c),
    }
    p.finish()
}

#[derive(Default)]
struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn docs(&mut self, docs: &[String]) {
        for doc in docs {
            for line in doc.lines() {
                if line.is_empty() {
                    self.line("///");
                } else {
                    self.line(&format!("/// {line}"));
                }
            }
        }
    }

    fn attrs(&mut self, attrs: &[Attribute]) {
        for attr in attrs {
            self.line(&attr.to_string());
        }
    }

    fn nested(&mut self, f: impl FnOnce(&mut Printer)) {
        self.indent += 1;
        f(self);
        self.indent -= 1;
    }

    fn finish(mut self) -> String {
        while self.out.ends_with('\n') {
            self.out.pop();
        }
        self.out
    }
}

fn type_decl(p: &mut Printer, t: &TypeDecl) {
    p.docs(&t.docs);
    p.attrs(&t.attrs);
    match &t.kind {
        TypeDeclKind::Struct(fields) if fields.is_empty() => {
            p.line(&format!("pub struct {} {{}}", t.name));
        }
        TypeDeclKind::Struct(fields) => {
            p.line(&format!("pub struct {} {{", t.name));
            p.nested(|p| {
                for field in fields {
                    p.docs(&field.docs);
                    p.attrs(&field.attrs);
                    p.line(&format!("pub {}: {},", field.name, field.ty));
                }
            });
            p.line("}");
        }
        TypeDeclKind::Enum(variants) => {
            p.line(&format!("pub enum {} {{", t.name));
            p.nested(|p| {
                for variant in variants {
                    p.attrs(&variant.attrs);
                    p.line(&format!("{},", variant.name));
                }
            });
            p.line("}");
        }
        TypeDeclKind::Alias(target) => {
            p.line(&format!("pub type {} = {};", t.name, target));
        }
    }
}

fn func_decl(p: &mut Printer, f: &FuncDecl, public: bool) {
    p.docs(&f.docs);
    let mut params: Vec<String> = Vec::with_capacity(f.params.len() + 1);
    match f.receiver {
        Receiver::None => {}
        Receiver::Ref => params.push("&self".to_string()),
        Receiver::Value => params.push("self".to_string()),
    }
    params.extend(f.params.iter().map(|prm| format!("{}: {}", prm.name, prm.ty)));
    let ret = f
        .ret
        .as_ref()
        .map(|r| format!(" -> {r}"))
        .unwrap_or_default();
    let vis = if public { "pub " } else { "" };
    let signature = format!("{vis}fn {}({}){ret}", f.name, params.join(", "));
    if f.body.is_empty() {
        p.line(&format!("{signature} {{}}"));
        return;
    }
    p.line(&format!("{signature} {{"));
    p.nested(|p| block(p, &f.body));
    p.line("}");
}

fn impl_decl(p: &mut Printer, i: &ImplDecl) {
    match &i.trait_name {
        Some(tr) => p.line(&format!("impl {tr} for {} {{", i.target)),
        None => p.line(&format!("impl {} {{", i.target)),
    }
    p.nested(|p| {
        for (idx, f) in i.funcs.iter().enumerate() {
            if idx > 0 {
                p.line("");
            }
            // trait items inherit the trait's visibility
            func_decl(p, f, f.public && i.trait_name.is_none());
        }
    });
    p.line("}");
}

fn const_decl(p: &mut Printer, c: &ConstDecl) {
    p.docs(&c.docs);
    p.line(&format!("pub const {}: {} = {};", c.name, c.ty, c.value));
}

fn block(p: &mut Printer, stmts: &[Statement]) {
    for stmt in stmts {
        statement(p, stmt);
    }
}

fn statement(p: &mut Printer, stmt: &Statement) {
    match stmt {
        Statement::Let {
            name,
            mutable,
            value,
        } => {
            let m = if *mutable { "mut " } else { "" };
            p.line(&format!("let {m}{name} = {value};"));
        }
        Statement::Expr(e) => p.line(&format!("{e};")),
        Statement::Tail(e) => p.line(&e.to_string()),
        Statement::Return(None) => p.line("return;"),
        Statement::Return(Some(e)) => p.line(&format!("return {e};")),
        Statement::If {
            cond,
            then,
            otherwise,
        } => {
            p.line(&format!("if {cond} {{"));
            p.nested(|p| block(p, then));
            if let Some(other) = otherwise {
                p.line("} else {");
                p.nested(|p| block(p, other));
            }
            p.line("}");
        }
        Statement::IfLet {
            pattern,
            value,
            then,
        } => {
            p.line(&format!("if let {pattern} = {value} {{"));
            p.nested(|p| block(p, then));
            p.line("}");
        }
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named(name) => write!(f, "{name}"),
            TypeExpr::Generic(name, args) => write!(f, "{name}<{}>", join(args)),
            TypeExpr::Ref(Some(lifetime), inner) => write!(f, "&'{lifetime} {inner}"),
            TypeExpr::Ref(None, inner) => write!(f, "&{inner}"),
            TypeExpr::Slice(inner) => write!(f, "[{inner}]"),
            TypeExpr::Tuple(items) => write!(f, "({})", join(items)),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Debug escaping of str is a valid Rust string literal
            Literal::Str(s) => write!(f, "{s:?}"),
            Literal::Int(i) => write!(f, "{i}"),
            Literal::UInt(u) => write!(f, "{u}"),
            Literal::Float(x) => write!(f, "{x:?}"),
            Literal::Bool(b) => write!(f, "{b}"),
        }
    }
}

fn needs_parens(e: &Expression) -> bool {
    matches!(
        e,
        Expression::Binary { .. } | Expression::Not(_) | Expression::Ref(_)
    )
}

fn operand(e: &Expression) -> String {
    if needs_parens(e) {
        format!("({e})")
    } else {
        e.to_string()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Lit(lit) => write!(f, "{lit}"),
            Expression::Path(path) => write!(f, "{path}"),
            Expression::Call { func, args } => write!(f, "{func}({})", join(args)),
            Expression::MethodCall {
                receiver,
                method,
                args,
            } => write!(f, "{}.{method}({})", operand(receiver), join(args)),
            Expression::Field { base, name } => write!(f, "{}.{name}", operand(base)),
            Expression::StructLit { name, fields } if fields.is_empty() => {
                write!(f, "{name} {{}}")
            }
            Expression::StructLit { name, fields } => {
                let body = fields
                    .iter()
                    .map(|(k, v)| format!("{k}: {v}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{name} {{ {body} }}")
            }
            Expression::Ref(inner) => write!(f, "&{}", operand(inner)),
            Expression::Array(items) => write!(f, "[{}]", join(items)),
            Expression::Tuple(items) => write!(f, "({})", join(items)),
            Expression::Binary { op, lhs, rhs } => {
                write!(f, "{} {} {}", operand(lhs), op.token(), operand(rhs))
            }
            Expression::Not(inner) => write!(f, "!{}", operand(inner)),
        }
    }
}

impl fmt::Display for Meta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Meta::Path(p) => write!(f, "{p}"),
            Meta::NameValue(name, value) => write!(f, "{name} = {value}"),
            Meta::List(name, items) => write!(f, "{name}({})", join(items)),
            Meta::Value(value) => write!(f, "{value}"),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#[{}]", self.0)
    }
}
