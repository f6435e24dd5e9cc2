//! Data model of the code builder IR.
//!
//! Everything here is plain data. Nothing in the compiler assembles source
//! text by hand; it builds these nodes and hands a [`File`] to the renderer.

/// A type expression used in fields, parameters, returns and aliases
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    /// Named type, possibly path-qualified (`Pet`, `serde_json::Value`, `u16`)
    Named(String),
    /// Generic application (`Option<T>`, `Vec<T>`, `HashMap<K, V>`)
    Generic(String, Vec<TypeExpr>),
    /// Reference with optional lifetime (`&T`, `&'static T`)
    Ref(Option<String>, Box<TypeExpr>),
    /// Unsized slice (`[T]`)
    Slice(Box<TypeExpr>),
    /// Tuple (`(A, B)`)
    Tuple(Vec<TypeExpr>),
}

impl TypeExpr {
    /// A named type
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named(name.into())
    }

    /// `Option<inner>`
    #[must_use]
    pub fn option(inner: TypeExpr) -> Self {
        TypeExpr::Generic("Option".to_string(), vec![inner])
    }

    /// `Vec<inner>`
    #[must_use]
    pub fn vec(inner: TypeExpr) -> Self {
        TypeExpr::Generic("Vec".to_string(), vec![inner])
    }

    /// `&'static inner`
    #[must_use]
    pub fn static_ref(inner: TypeExpr) -> Self {
        TypeExpr::Ref(Some("static".to_string()), Box::new(inner))
    }

    /// Whether this is an `Option<_>`
    #[must_use]
    pub fn is_option(&self) -> bool {
        matches!(self, TypeExpr::Generic(name, _) if name == "Option")
    }
}

/// A literal value
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

/// Binary operators used by generated control flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Eq,
    Ne,
    And,
    Or,
}

impl BinOp {
    pub(crate) fn token(self) -> &'static str {
        match self {
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }
}

/// An expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Lit(Literal),
    /// Path or local name (`self`, `None`, `Self::STATUS`)
    Path(String),
    /// Function or constructor call (`Some(x)`, `Vec::new()`)
    Call {
        func: String,
        args: Vec<Expression>,
    },
    /// Method call (`x.is_some()`)
    MethodCall {
        receiver: Box<Expression>,
        method: String,
        args: Vec<Expression>,
    },
    /// Field access (`self.status_200`)
    Field {
        base: Box<Expression>,
        name: String,
    },
    /// Struct literal (`Self { a: x, b: None }`)
    StructLit {
        name: String,
        fields: Vec<(String, Expression)>,
    },
    /// Borrow (`&x`)
    Ref(Box<Expression>),
    /// Array literal (`[a, b]`)
    Array(Vec<Expression>),
    /// Tuple literal (`(a, b)`)
    Tuple(Vec<Expression>),
    Binary {
        op: BinOp,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    Not(Box<Expression>),
}

impl Expression {
    pub fn path(p: impl Into<String>) -> Self {
        Expression::Path(p.into())
    }

    pub fn str(s: impl Into<String>) -> Self {
        Expression::Lit(Literal::Str(s.into()))
    }

    pub fn call(func: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::Call {
            func: func.into(),
            args,
        }
    }

    #[must_use]
    pub fn method(self, method: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::MethodCall {
            receiver: Box::new(self),
            method: method.into(),
            args,
        }
    }

    #[must_use]
    pub fn field(self, name: impl Into<String>) -> Self {
        Expression::Field {
            base: Box::new(self),
            name: name.into(),
        }
    }

    #[must_use]
    pub fn borrow(self) -> Self {
        Expression::Ref(Box::new(self))
    }
}

/// A statement inside a function body
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Let {
        name: String,
        mutable: bool,
        value: Expression,
    },
    /// Expression statement, terminated with `;`
    Expr(Expression),
    /// Trailing expression producing the block's value
    Tail(Expression),
    Return(Option<Expression>),
    If {
        cond: Expression,
        then: Vec<Statement>,
        otherwise: Option<Vec<Statement>>,
    },
    /// `if let <pattern> = <value> { ... }`
    IfLet {
        pattern: String,
        value: Expression,
        then: Vec<Statement>,
    },
}

/// Attribute meta, modelled after `syn::Meta`
#[derive(Debug, Clone, PartialEq)]
pub enum Meta {
    /// `derive`, `required`
    Path(String),
    /// `rename = "petName"`, `path = PET_NAME_PATTERN`
    NameValue(String, Expression),
    /// `serde(rename = "x")`, `length(min = 1)`
    List(String, Vec<Meta>),
    /// Bare value inside a list (`one_of("a", "b")`)
    Value(Expression),
}

/// An outer attribute (`#[...]`)
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute(pub Meta);

impl Attribute {
    /// `#[derive(A, B)]`
    pub fn derive<I, S>(traits: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Attribute(Meta::List(
            "derive".to_string(),
            traits.into_iter().map(|t| Meta::Path(t.into())).collect(),
        ))
    }

    /// `#[serde(rename = "...")]`
    pub fn serde_rename(wire: impl Into<String>) -> Self {
        Attribute(Meta::List(
            "serde".to_string(),
            vec![Meta::NameValue("rename".to_string(), Expression::str(wire))],
        ))
    }

    /// `#[name(items...)]`
    pub fn list(name: impl Into<String>, items: Vec<Meta>) -> Self {
        Attribute(Meta::List(name.into(), items))
    }
}

/// A record field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeExpr,
    pub docs: Vec<String>,
    pub attrs: Vec<Attribute>,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        FieldDecl {
            name: name.into(),
            ty,
            docs: Vec::new(),
            attrs: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_attr(mut self, attr: Attribute) -> Self {
        self.attrs.push(attr);
        self
    }

    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.docs.push(doc.into());
        self
    }
}

/// A unit enum variant
#[derive(Debug, Clone, PartialEq)]
pub struct VariantDecl {
    pub name: String,
    pub attrs: Vec<Attribute>,
}

/// Shape of a type declaration
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDeclKind {
    Struct(Vec<FieldDecl>),
    Enum(Vec<VariantDecl>),
    Alias(TypeExpr),
}

/// A type declaration (record, enum or alias)
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub name: String,
    pub docs: Vec<String>,
    pub attrs: Vec<Attribute>,
    pub kind: TypeDeclKind,
}

impl TypeDecl {
    pub fn record(name: impl Into<String>, fields: Vec<FieldDecl>) -> Self {
        TypeDecl {
            name: name.into(),
            docs: Vec::new(),
            attrs: Vec::new(),
            kind: TypeDeclKind::Struct(fields),
        }
    }

    pub fn enumeration(name: impl Into<String>, variants: Vec<VariantDecl>) -> Self {
        TypeDecl {
            name: name.into(),
            docs: Vec::new(),
            attrs: Vec::new(),
            kind: TypeDeclKind::Enum(variants),
        }
    }

    pub fn alias(name: impl Into<String>, target: TypeExpr) -> Self {
        TypeDecl {
            name: name.into(),
            docs: Vec::new(),
            attrs: Vec::new(),
            kind: TypeDeclKind::Alias(target),
        }
    }

    #[must_use]
    pub fn with_attr(mut self, attr: Attribute) -> Self {
        self.attrs.push(attr);
        self
    }

    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.docs.push(doc.into());
        self
    }

    /// Fields of a record declaration, empty for enums and aliases
    #[must_use]
    pub fn fields(&self) -> &[FieldDecl] {
        match &self.kind {
            TypeDeclKind::Struct(fields) => fields,
            _ => &[],
        }
    }
}

/// How a function receives `self`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    None,
    Ref,
    Value,
}

/// A function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: TypeExpr,
}

/// A function declaration, free-standing or inside an [`ImplDecl`]
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub name: String,
    pub docs: Vec<String>,
    pub public: bool,
    pub receiver: Receiver,
    pub params: Vec<Param>,
    pub ret: Option<TypeExpr>,
    pub body: Vec<Statement>,
}

impl FuncDecl {
    pub fn new(name: impl Into<String>) -> Self {
        FuncDecl {
            name: name.into(),
            docs: Vec::new(),
            public: true,
            receiver: Receiver::None,
            params: Vec::new(),
            ret: None,
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn receiver(mut self, receiver: Receiver) -> Self {
        self.receiver = receiver;
        self
    }

    #[must_use]
    pub fn param(mut self, name: impl Into<String>, ty: TypeExpr) -> Self {
        self.params.push(Param {
            name: name.into(),
            ty,
        });
        self
    }

    #[must_use]
    pub fn returns(mut self, ty: TypeExpr) -> Self {
        self.ret = Some(ty);
        self
    }

    #[must_use]
    pub fn body(mut self, body: Vec<Statement>) -> Self {
        self.body = body;
        self
    }

    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.docs.push(doc.into());
        self
    }

    #[must_use]
    pub fn private(mut self) -> Self {
        self.public = false;
        self
    }
}

/// An `impl` block, inherent or for a trait
#[derive(Debug, Clone, PartialEq)]
pub struct ImplDecl {
    pub target: String,
    pub trait_name: Option<String>,
    pub funcs: Vec<FuncDecl>,
}

/// A `const` item
#[derive(Debug, Clone, PartialEq)]
pub struct ConstDecl {
    pub name: String,
    pub docs: Vec<String>,
    pub ty: TypeExpr,
    pub value: Expression,
}

/// A top-level declaration
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Type(TypeDecl),
    Func(FuncDecl),
    Impl(ImplDecl),
    Const(ConstDecl),
}

impl Declaration {
    /// Name used for duplicate detection; impl blocks have none
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Declaration::Type(t) => Some(&t.name),
            Declaration::Func(f) => Some(&f.name),
            Declaration::Const(c) => Some(&c.name),
            Declaration::Impl(_) => None,
        }
    }
}

/// A `use` item: one module path with the items imported from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub module: String,
    pub items: Vec<String>,
}

/// A complete generated source file
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    /// Logical file name (the description's slug)
    pub name: String,
    pub imports: Vec<Import>,
    pub declarations: Vec<Declaration>,
}

impl File {
    /// Look up a type declaration by name
    #[must_use]
    pub fn type_decl(&self, name: &str) -> Option<&TypeDecl> {
        self.declarations.iter().find_map(|d| match d {
            Declaration::Type(t) if t.name == name => Some(t),
            _ => None,
        })
    }

    /// All impl blocks targeting `target`
    pub fn impls_for<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a ImplDecl> + 'a {
        self.declarations.iter().filter_map(move |d| match d {
            Declaration::Impl(i) if i.target == target => Some(i),
            _ => None,
        })
    }

    /// Look up a const item by name
    #[must_use]
    pub fn const_decl(&self, name: &str) -> Option<&ConstDecl> {
        self.declarations.iter().find_map(|d| match d {
            Declaration::Const(c) if c.name == name => Some(c),
            _ => None,
        })
    }
}
