use super::naming::{field_ident, to_pascal_case, NameAllocator};
use super::types::{
    Bound, Constraints, FieldDescriptor, PresenceMode, ScalarKind, SchemaKind, SchemaNode,
};
use crate::error::CompileError;
use crate::spec::Description;
use crate::validation::{Pattern, RuleCompiler};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

const SCHEMA_POINTER: &str = "/components/schemas/";

/// Identity of a named schema: the document it lives in and its key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RefKey {
    /// `None` for the root document, the relative path for external ones
    doc: Option<String>,
    name: String,
}

impl fmt::Display for RefKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.doc {
            Some(doc) => write!(f, "{doc}#{}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Where a raw schema sits while it is being built
#[derive(Debug, Clone)]
struct Ctx {
    doc: Option<String>,
    owner: String,
    /// Name to use if the node needs a synthesized declaration
    hint: String,
    /// Reserved type name when the schema is a named component
    component: Option<String>,
    presence: PresenceMode,
}

impl Ctx {
    fn child(&self, hint: String) -> Ctx {
        Ctx {
            doc: self.doc.clone(),
            owner: self.owner.clone(),
            hint,
            component: None,
            presence: self.presence,
        }
    }

    fn unsupported(&self, detail: impl Into<String>) -> CompileError {
        CompileError::UnsupportedConstruct {
            owner: self.owner.clone(),
            detail: detail.into(),
        }
    }
}

/// One member of a synthesized object (a parameter, a response header)
#[derive(Debug, Clone)]
pub struct Member {
    pub wire_key: String,
    /// Raw schema; `None` means a plain string
    pub schema: Option<Value>,
    pub required: bool,
    pub description: Option<String>,
}

/// Resolves raw schemas of one description into [`SchemaNode`]s.
///
/// A resolver is created per compilation. It owns the name allocator and the
/// rule compiler so that names and shared rule sets never leak between
/// description files.
pub struct SchemaResolver<'d> {
    description: &'d Description,
    presence: PresenceMode,
    names: NameAllocator,
    components: HashMap<RefKey, String>,
    resolved: HashMap<RefKey, Arc<SchemaNode>>,
    stack: Vec<RefKey>,
    declared: Vec<Option<Arc<SchemaNode>>>,
    rules: RuleCompiler,
}

impl<'d> SchemaResolver<'d> {
    /// Create a resolver and reserve a type name for every local component,
    /// in source order, before anything inline can claim one
    pub fn new(description: &'d Description, presence: PresenceMode) -> Self {
        let mut names = NameAllocator::new();
        let mut components = HashMap::new();
        if let Some(schemas) = description.schemas() {
            for key in schemas.keys() {
                let name = names.allocate(&to_pascal_case(key));
                components.insert(
                    RefKey {
                        doc: None,
                        name: key.clone(),
                    },
                    name,
                );
            }
        }
        SchemaResolver {
            description,
            presence,
            names,
            components,
            resolved: HashMap::new(),
            stack: Vec::new(),
            declared: Vec::new(),
            rules: RuleCompiler::new(),
        }
    }

    #[must_use]
    pub fn presence(&self) -> PresenceMode {
        self.presence
    }

    /// Name allocator shared with every other synthesized declaration
    pub fn names(&mut self) -> &mut NameAllocator {
        &mut self.names
    }

    pub fn rules(&mut self) -> &mut RuleCompiler {
        &mut self.rules
    }

    /// Resolve every `components.schemas` entry of the root document.
    ///
    /// Returns `(source key, node)` pairs in source order.
    ///
    /// # Errors
    ///
    /// Fails on the first schema that references a missing target, closes a
    /// reference cycle or uses an unsupported construct.
    pub fn resolve_components(&mut self) -> Result<Vec<(String, Arc<SchemaNode>)>, CompileError> {
        let keys: Vec<String> = self
            .description
            .schemas()
            .map(|s| s.keys().cloned().collect())
            .unwrap_or_default();
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            let reference = format!("#{SCHEMA_POINTER}{key}");
            let node = self.resolve_key(
                RefKey {
                    doc: None,
                    name: key.clone(),
                },
                &format!("schema:{key}"),
                &reference,
            )?;
            out.push((key, node));
        }
        debug!(
            document = %self.description.slug,
            components = out.len(),
            declared = self.declared.len(),
            "Resolved component schemas"
        );
        Ok(out)
    }

    /// Resolve a schema found inline in an operation.
    ///
    /// `hint` names the type if the schema needs its own declaration.
    ///
    /// # Errors
    ///
    /// See [`resolve_components`](Self::resolve_components).
    pub fn resolve_inline(
        &mut self,
        raw: &Value,
        hint: &str,
        owner: &str,
    ) -> Result<Arc<SchemaNode>, CompileError> {
        let ctx = Ctx {
            doc: None,
            owner: owner.to_string(),
            hint: hint.to_string(),
            component: None,
            presence: self.presence,
        };
        self.build(raw, &ctx)
    }

    /// Build a declared record from loose members such as parameters or
    /// response headers.
    ///
    /// # Errors
    ///
    /// Fails when a member schema cannot be resolved.
    pub fn synthesize_object(
        &mut self,
        hint: &str,
        members: &[Member],
        presence: PresenceMode,
        owner: &str,
    ) -> Result<Arc<SchemaNode>, CompileError> {
        let name = self.names.allocate(hint);
        let slot = self.open_slot();
        let ctx = Ctx {
            doc: None,
            owner: owner.to_string(),
            hint: name.clone(),
            component: None,
            presence,
        };
        let string_schema = Value::Object(Map::from_iter([(
            "type".to_string(),
            Value::String("string".to_string()),
        )]));
        let entries: Vec<(String, &Value, bool, Option<String>)> = members
            .iter()
            .map(|m| {
                (
                    m.wire_key.clone(),
                    m.schema.as_ref().unwrap_or(&string_schema),
                    m.required,
                    m.description.clone(),
                )
            })
            .collect();
        let fields = self.fields(&name, entries, &ctx)?;
        let node = Arc::new(SchemaNode {
            name,
            kind: SchemaKind::Object(fields),
            declared: true,
            nullable: false,
            format: None,
            constraints: Constraints::default(),
            description: None,
        });
        self.fill_slot(slot, &node);
        Ok(node)
    }

    /// Declared nodes in discovery order
    #[must_use]
    pub fn declarations(&self) -> Vec<Arc<SchemaNode>> {
        self.declarations_since(0)
    }

    /// Number of declaration slots handed out so far; a mark for
    /// [`declarations_since`](Self::declarations_since)
    #[must_use]
    pub fn declaration_count(&self) -> usize {
        self.declared.len()
    }

    /// Declared nodes discovered after `mark`, in discovery order
    #[must_use]
    pub fn declarations_since(&self, mark: usize) -> Vec<Arc<SchemaNode>> {
        self.declared
            .iter()
            .skip(mark)
            .flatten()
            .map(Arc::clone)
            .collect()
    }

    fn open_slot(&mut self) -> usize {
        self.declared.push(None);
        self.declared.len() - 1
    }

    fn fill_slot(&mut self, slot: usize, node: &Arc<SchemaNode>) {
        if let Some(entry) = self.declared.get_mut(slot) {
            *entry = Some(Arc::clone(node));
        }
    }

    fn declared_name(&mut self, ctx: &Ctx) -> String {
        match &ctx.component {
            Some(name) => name.clone(),
            None => self.names.allocate(&ctx.hint),
        }
    }

    fn resolve_key(
        &mut self,
        key: RefKey,
        owner: &str,
        reference: &str,
    ) -> Result<Arc<SchemaNode>, CompileError> {
        if let Some(node) = self.resolved.get(&key) {
            return Ok(Arc::clone(node));
        }
        if let Some(pos) = self.stack.iter().position(|k| *k == key) {
            let mut chain: Vec<String> = self.stack[pos..].iter().map(ToString::to_string).collect();
            chain.push(key.to_string());
            return Err(CompileError::CyclicSchema { chain });
        }

        let description = self.description;
        let raw = description
            .document_for(key.doc.as_deref())
            .and_then(|doc| lookup_schema(doc, &key.name))
            .ok_or_else(|| CompileError::UnresolvedReference {
                owner: owner.to_string(),
                reference: reference.to_string(),
            })?;

        let type_name = match self.components.get(&key) {
            Some(name) => name.clone(),
            None => {
                let name = self.names.allocate(&to_pascal_case(&key.name));
                self.components.insert(key.clone(), name.clone());
                name
            }
        };

        self.stack.push(key.clone());
        let ctx = Ctx {
            doc: key.doc.clone(),
            owner: format!("schema:{}", key.name),
            hint: type_name.clone(),
            component: Some(type_name),
            presence: self.presence,
        };
        let node = self.build(raw, &ctx);
        self.stack.pop();
        let node = node?;
        self.resolved.insert(key, Arc::clone(&node));
        Ok(node)
    }

    fn parse_ref(&self, reference: &str, ctx: &Ctx) -> Result<RefKey, CompileError> {
        let (file, pointer) = reference.split_once('#').unwrap_or((reference, ""));
        let name = pointer
            .strip_prefix(SCHEMA_POINTER)
            .filter(|n| !n.is_empty() && !n.contains('/'))
            .ok_or_else(|| ctx.unsupported(format!("reference '{reference}' is not a schema pointer")))?;
        let name = name.replace("~1", "/").replace("~0", "~");
        let doc = if file.is_empty() {
            ctx.doc.clone()
        } else {
            Some(file.to_string())
        };
        Ok(RefKey { doc, name })
    }

    fn resolve_ref(&mut self, reference: &str, ctx: &Ctx) -> Result<Arc<SchemaNode>, CompileError> {
        let key = self.parse_ref(reference, ctx)?;
        self.resolve_key(key, &ctx.owner, reference)
    }

    fn build(&mut self, raw: &Value, ctx: &Ctx) -> Result<Arc<SchemaNode>, CompileError> {
        let obj = match raw {
            Value::Object(obj) => obj,
            Value::Bool(true) => return self.scalar(ctx, ScalarKind::Any, false, &Map::new()),
            _ => return Err(ctx.unsupported(format!("schema must be an object, found {raw}"))),
        };

        if let Some(reference) = obj.get("$ref").and_then(Value::as_str) {
            let target = self.resolve_ref(reference, ctx)?;
            return Ok(self.reference(target, flag(obj, "nullable"), ctx));
        }
        if obj.contains_key("allOf") {
            return self.all_of(obj, ctx);
        }
        if let Some(members) = obj.get("oneOf").or_else(|| obj.get("anyOf")) {
            return self.nullable_union(members, ctx);
        }

        let (ty, type_nullable) = schema_type(obj, ctx)?;
        let nullable = type_nullable || flag(obj, "nullable");
        match ty {
            Some("object") => self.object(obj, nullable, ctx),
            Some("array") => self.array(obj, nullable, ctx),
            Some("string") => {
                if let Some(members) = obj.get("enum").and_then(Value::as_array) {
                    return self.string_enum(obj, members, nullable, ctx);
                }
                let kind = match obj.get("format").and_then(Value::as_str) {
                    Some("date-time") => ScalarKind::DateTime,
                    _ => ScalarKind::String,
                };
                self.scalar(ctx, kind, nullable, obj)
            }
            Some("integer") => self.scalar(ctx, ScalarKind::Integer, nullable, obj),
            Some("number") => self.scalar(ctx, ScalarKind::Number, nullable, obj),
            Some("boolean") => self.scalar(ctx, ScalarKind::Boolean, nullable, obj),
            None => self.scalar(ctx, ScalarKind::Any, nullable, obj),
            Some(other) => Err(ctx.unsupported(format!("unknown type '{other}'"))),
        }
    }

    fn reference(&mut self, target: Arc<SchemaNode>, nullable: bool, ctx: &Ctx) -> Arc<SchemaNode> {
        let declared = ctx.component.is_some();
        let name = if declared {
            self.declared_name(ctx)
        } else {
            target.name.clone()
        };
        let node = Arc::new(SchemaNode {
            name,
            kind: SchemaKind::Reference(target),
            declared,
            nullable,
            format: None,
            constraints: Constraints::default(),
            description: None,
        });
        if declared {
            let slot = self.open_slot();
            self.fill_slot(slot, &node);
        }
        node
    }

    fn scalar(
        &mut self,
        ctx: &Ctx,
        kind: ScalarKind,
        nullable: bool,
        obj: &Map<String, Value>,
    ) -> Result<Arc<SchemaNode>, CompileError> {
        let declared = ctx.component.is_some();
        let name = if declared {
            self.declared_name(ctx)
        } else {
            ctx.hint.clone()
        };
        let mut constraints = constraints(obj, ctx)?;
        if let Some(members) = obj.get("enum").and_then(Value::as_array) {
            constraints.one_of = members.iter().filter(|m| !m.is_null()).cloned().collect();
        }
        let node = Arc::new(SchemaNode {
            name,
            kind: SchemaKind::Scalar(kind),
            declared,
            nullable,
            format: obj.get("format").and_then(Value::as_str).map(str::to_string),
            constraints,
            description: description(obj),
        });
        if declared {
            let slot = self.open_slot();
            self.fill_slot(slot, &node);
        }
        Ok(node)
    }

    fn string_enum(
        &mut self,
        obj: &Map<String, Value>,
        members: &[Value],
        nullable: bool,
        ctx: &Ctx,
    ) -> Result<Arc<SchemaNode>, CompileError> {
        let mut variants = Vec::with_capacity(members.len());
        for member in members {
            match member {
                Value::String(s) => variants.push(s.clone()),
                Value::Null => {}
                other => {
                    return Err(ctx.unsupported(format!("string enum member {other} is not a string")))
                }
            }
        }
        if variants.is_empty() {
            return Err(ctx.unsupported("enum without members"));
        }
        let name = self.declared_name(ctx);
        let slot = self.open_slot();
        let node = Arc::new(SchemaNode {
            name,
            kind: SchemaKind::Enum(variants),
            declared: true,
            nullable,
            format: None,
            constraints: constraints(obj, ctx)?,
            description: description(obj),
        });
        self.fill_slot(slot, &node);
        Ok(node)
    }

    fn array(
        &mut self,
        obj: &Map<String, Value>,
        nullable: bool,
        ctx: &Ctx,
    ) -> Result<Arc<SchemaNode>, CompileError> {
        let declared = ctx.component.is_some();
        let name = if declared {
            self.declared_name(ctx)
        } else {
            ctx.hint.clone()
        };
        let slot = declared.then(|| self.open_slot());
        let element_ctx = ctx.child(format!("{}Item", name));
        let element = match obj.get("items") {
            Some(items) => self.build(items, &element_ctx)?,
            None => self.scalar(&element_ctx, ScalarKind::Any, false, &Map::new())?,
        };
        let node = Arc::new(SchemaNode {
            name,
            kind: SchemaKind::Array(element),
            declared,
            nullable,
            format: None,
            constraints: constraints(obj, ctx)?,
            description: description(obj),
        });
        if let Some(slot) = slot {
            self.fill_slot(slot, &node);
        }
        Ok(node)
    }

    fn object(
        &mut self,
        obj: &Map<String, Value>,
        nullable: bool,
        ctx: &Ctx,
    ) -> Result<Arc<SchemaNode>, CompileError> {
        let name = self.declared_name(ctx);
        let slot = self.open_slot();
        let required: HashSet<&str> = obj
            .get("required")
            .and_then(Value::as_array)
            .map(|r| r.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        let entries: Vec<(String, &Value, bool, Option<String>)> = obj
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| {
                props
                    .iter()
                    .map(|(key, schema)| {
                        (
                            key.clone(),
                            schema,
                            required.contains(key.as_str()),
                            schema.get("description").and_then(Value::as_str).map(str::to_string),
                        )
                    })
                    .collect()
            })
            .unwrap_or_default();
        let fields = self.fields(&name, entries, ctx)?;
        let node = Arc::new(SchemaNode {
            name,
            kind: SchemaKind::Object(fields),
            declared: true,
            nullable,
            format: None,
            constraints: Constraints::default(),
            description: description(obj),
        });
        self.fill_slot(slot, &node);
        Ok(node)
    }

    fn fields(
        &mut self,
        owner_name: &str,
        entries: Vec<(String, &Value, bool, Option<String>)>,
        ctx: &Ctx,
    ) -> Result<Vec<FieldDescriptor>, CompileError> {
        let mut idents = HashSet::new();
        let mut fields = Vec::with_capacity(entries.len());
        for (wire_key, schema, required, doc) in entries {
            let child = ctx.child(format!("{owner_name}{}", to_pascal_case(&wire_key)));
            let ty = self.build(schema, &child)?;
            let name = unique_ident(&mut idents, &field_ident(&wire_key));
            let rules = self.rules.field_rules(&ty, required);
            fields.push(FieldDescriptor {
                name,
                wire_key,
                ty,
                required,
                nullable_presence: !required || ctx.presence == PresenceMode::Explicit,
                rules,
                description: doc,
            });
        }
        Ok(fields)
    }

    /// Merge object-only `allOf` members into one record.
    ///
    /// Referenced members are resolved in their own document and contribute
    /// their resolved fields; inline members are built in the current one. A
    /// later member redefining a key replaces the field in place. `required`
    /// lists are unioned across members.
    fn all_of(&mut self, obj: &Map<String, Value>, ctx: &Ctx) -> Result<Arc<SchemaNode>, CompileError> {
        let name = self.declared_name(ctx);
        let slot = self.open_slot();
        let mut fields = Vec::new();
        let mut required = Vec::new();
        self.merge_all_of(obj, &name, ctx, &mut fields, &mut required)?;

        let mut idents = HashSet::new();
        for field in &mut fields {
            let must = field.required || required.iter().any(|r| *r == field.wire_key);
            if must != field.required {
                field.required = must;
                field.rules = self.rules.field_rules(&field.ty, must);
            }
            field.nullable_presence = !field.required || ctx.presence == PresenceMode::Explicit;
            field.name = unique_ident(&mut idents, &field.name);
        }

        let node = Arc::new(SchemaNode {
            name,
            kind: SchemaKind::Object(fields),
            declared: true,
            nullable: flag(obj, "nullable"),
            format: None,
            constraints: Constraints::default(),
            description: description(obj),
        });
        self.fill_slot(slot, &node);
        Ok(node)
    }

    fn merge_all_of(
        &mut self,
        obj: &Map<String, Value>,
        owner_name: &str,
        ctx: &Ctx,
        fields: &mut Vec<FieldDescriptor>,
        required: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        if let Some(members) = obj.get("allOf") {
            let members = members
                .as_array()
                .ok_or_else(|| ctx.unsupported("allOf must be a list"))?;
            for member in members {
                let member_obj = member
                    .as_object()
                    .ok_or_else(|| ctx.unsupported("allOf member must be a schema object"))?;
                if let Some(reference) = member_obj.get("$ref").and_then(Value::as_str) {
                    let target = self.resolve_ref(reference, ctx)?;
                    if !target.is_object() {
                        return Err(ctx.unsupported(format!(
                            "allOf member '{reference}' is not an object schema"
                        )));
                    }
                    for field in target.fields() {
                        merge_field(fields, field.clone());
                    }
                } else {
                    self.merge_all_of(member_obj, owner_name, ctx, fields, required)?;
                }
            }
        }

        let is_object = obj.get("type").and_then(Value::as_str) == Some("object")
            || obj.contains_key("properties");
        if !is_object && !obj.contains_key("allOf") {
            return Err(ctx.unsupported("allOf member is not an object schema"));
        }
        if let Some(req) = obj.get("required").and_then(Value::as_array) {
            for r in req.iter().filter_map(Value::as_str) {
                if !required.iter().any(|seen| seen == r) {
                    required.push(r.to_string());
                }
            }
        }
        if let Some(props) = obj.get("properties").and_then(Value::as_object) {
            let entries = props
                .iter()
                .map(|(key, schema)| {
                    (
                        key.clone(),
                        schema,
                        false,
                        schema.get("description").and_then(Value::as_str).map(str::to_string),
                    )
                })
                .collect();
            for field in self.fields(owner_name, entries, ctx)? {
                merge_field(fields, field);
            }
        }
        Ok(())
    }

    fn nullable_union(&mut self, members: &Value, ctx: &Ctx) -> Result<Arc<SchemaNode>, CompileError> {
        let members = members
            .as_array()
            .ok_or_else(|| ctx.unsupported("oneOf/anyOf must be a list"))?;
        let (nulls, others): (Vec<&Value>, Vec<&Value>) = members
            .iter()
            .partition(|m| m.get("type").and_then(Value::as_str) == Some("null"));
        match others.as_slice() {
            [single] => {
                let node = self.build(single, ctx)?;
                if nulls.is_empty() || node.nullable {
                    return Ok(node);
                }
                let mut nullable = (*node).clone();
                nullable.nullable = true;
                let nullable = Arc::new(nullable);
                if nullable.declared {
                    if let Some(entry) = self
                        .declared
                        .iter_mut()
                        .flatten()
                        .find(|n| n.name == nullable.name)
                    {
                        *entry = Arc::clone(&nullable);
                    }
                }
                Ok(nullable)
            }
            _ => Err(ctx.unsupported(format!(
                "oneOf/anyOf with {} non-null members",
                others.len()
            ))),
        }
    }
}

/// Replace the field with the same wire key in place, or append
fn merge_field(fields: &mut Vec<FieldDescriptor>, field: FieldDescriptor) {
    match fields.iter_mut().find(|f| f.wire_key == field.wire_key) {
        Some(existing) => *existing = field,
        None => fields.push(field),
    }
}

/// `ident`, or `ident_2`, `ident_3`... when already taken
fn unique_ident(idents: &mut HashSet<String>, ident: &str) -> String {
    if idents.insert(ident.to_string()) {
        return ident.to_string();
    }
    let base = ident.trim_start_matches("r#");
    let mut n = 2;
    while !idents.insert(format!("{base}_{n}")) {
        n += 1;
    }
    format!("{base}_{n}")
}

fn lookup_schema<'v>(doc: &'v Value, name: &str) -> Option<&'v Value> {
    doc.get("components")?.get("schemas")?.get(name)
}

fn flag(obj: &Map<String, Value>, key: &str) -> bool {
    obj.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn description(obj: &Map<String, Value>) -> Option<String> {
    obj.get("description").and_then(Value::as_str).map(str::to_string)
}

/// Declared type of a schema plus whether `null` was listed alongside it
fn schema_type<'a>(obj: &'a Map<String, Value>, ctx: &Ctx) -> Result<(Option<&'a str>, bool), CompileError> {
    match obj.get("type") {
        Some(Value::String(t)) if t == "null" => Err(ctx.unsupported("schema of type null")),
        Some(Value::String(t)) => Ok((Some(t.as_str()), false)),
        Some(Value::Array(types)) => {
            let names: Vec<&str> = types.iter().filter_map(Value::as_str).collect();
            let nullable = names.contains(&"null");
            let rest: Vec<&str> = names.into_iter().filter(|t| *t != "null").collect();
            match rest.as_slice() {
                [single] => Ok((Some(*single), nullable)),
                [] => Err(ctx.unsupported("type list without a non-null type")),
                many => Err(ctx.unsupported(format!("type list [{}]", many.join(", ")))),
            }
        }
        Some(other) => Err(ctx.unsupported(format!("invalid type {other}"))),
        None => {
            if obj.contains_key("properties") {
                Ok((Some("object"), false))
            } else if obj.contains_key("items") {
                Ok((Some("array"), false))
            } else if let Some(members) = obj.get("enum").and_then(Value::as_array) {
                Ok((infer_enum_type(members), false))
            } else {
                Ok((None, false))
            }
        }
    }
}

fn infer_enum_type(members: &[Value]) -> Option<&'static str> {
    let present: Vec<&Value> = members.iter().filter(|m| !m.is_null()).collect();
    if present.iter().all(|m| m.is_string()) {
        Some("string")
    } else if present.iter().all(|m| m.is_i64() || m.is_u64()) {
        Some("integer")
    } else if present.iter().all(|m| m.is_number()) {
        Some("number")
    } else if present.iter().all(|m| m.is_boolean()) {
        Some("boolean")
    } else {
        None
    }
}

fn constraints(obj: &Map<String, Value>, ctx: &Ctx) -> Result<Constraints, CompileError> {
    let u = |key: &str| obj.get(key).and_then(Value::as_u64);
    let bound = |key: &str, exclusive_key: &str| -> Option<Bound> {
        match obj.get(exclusive_key) {
            // numeric form names the bound itself
            Some(Value::Number(n)) => n.as_f64().map(|value| Bound {
                value,
                exclusive: true,
            }),
            Some(Value::Bool(exclusive)) => obj.get(key).and_then(Value::as_f64).map(|value| Bound {
                value,
                exclusive: *exclusive,
            }),
            _ => obj.get(key).and_then(Value::as_f64).map(|value| Bound {
                value,
                exclusive: false,
            }),
        }
    };
    let pattern = match obj.get("pattern").and_then(Value::as_str) {
        Some(source) => Some(Arc::new(Pattern::new(source).map_err(|e| {
            ctx.unsupported(format!("invalid pattern '{source}': {e}"))
        })?)),
        None => None,
    };
    Ok(Constraints {
        min_length: u("minLength"),
        max_length: u("maxLength"),
        minimum: bound("minimum", "exclusiveMinimum"),
        maximum: bound("maximum", "exclusiveMaximum"),
        min_items: u("minItems"),
        max_items: u("maxItems"),
        pattern,
        one_of: Vec::new(),
    })
}
