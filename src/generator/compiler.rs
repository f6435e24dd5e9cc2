use super::emit::TypeEmitter;
use super::request::emit_request;
use super::response::{emit_responses, ResponseModel};
use crate::config::CompilerConfig;
use crate::diagnostics::Diagnostic;
use crate::error::CompileError;
use crate::ir::{ConstDecl, Declaration, Expression, File, FileBuilder, TypeExpr};
use crate::router::{Route, RouteTable};
use crate::schema::SchemaResolver;
use crate::spec::{build_operations, resolve_operation, Description, OperationSpec};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of compiling one description
#[derive(Debug)]
pub struct Compilation {
    pub file: File,
    /// Resolved operations in declaration order
    pub operations: Vec<OperationSpec>,
    /// Response types synthesized per operation, same order as `operations`
    pub responses: Vec<ResponseModel>,
    /// Compiled route table, ready for matching
    pub routes: Arc<RouteTable>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Compilation {
    #[must_use]
    pub fn operation(&self, operation_id: &str) -> Option<&OperationSpec> {
        self.operations
            .iter()
            .find(|op| op.operation_id == operation_id)
    }
}

/// Strategy for turning a description into generated source.
///
/// Implementations are interchangeable behind the comparison harness in
/// [`diff`](super::diff); each call starts from a clean slate.
pub trait CodeGenerator {
    /// Label used in diff headers and logs
    fn name(&self) -> String;

    /// Compile one description
    ///
    /// # Errors
    ///
    /// Returns the first [`CompileError`] met; nothing is generated for the
    /// description in that case.
    fn generate(&self, description: &Description) -> Result<Compilation, CompileError>;
}

/// The compiler: one parameterized invocation per description.
///
/// `Compiler` only holds configuration. Every [`compile`](Self::compile) call
/// creates its own resolver, name allocator, rule cache and [`FileBuilder`],
/// so nothing carries over from one description to the next.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    config: CompilerConfig,
}

impl Compiler {
    #[must_use]
    pub fn new(config: CompilerConfig) -> Self {
        Compiler { config }
    }

    #[must_use]
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile `description` into a [`Compilation`]
    ///
    /// Declarations come out as: the route consts, component schemas in
    /// source order, then per operation the records it introduced, its
    /// request composite, payloads, envelope and impls.
    ///
    /// # Errors
    ///
    /// See [`CodeGenerator::generate`].
    pub fn compile(&self, description: &Description) -> Result<Compilation, CompileError> {
        let start = Instant::now();
        info!(
            source = %description.source.display(),
            presence = %self.config.presence,
            "Compiling description"
        );

        let mut diagnostics = Vec::new();
        let metas = build_operations(description, &mut diagnostics)?;

        let mut resolver = SchemaResolver::new(description, self.config.presence);
        let components = resolver.resolve_components()?;
        debug!(components = components.len(), "Resolved component schemas");

        let mut builder = FileBuilder::new(description.slug.clone());
        let mut emitter = TypeEmitter::new(&self.config.import_prefix);

        builder.declare(Declaration::Const(ConstDecl {
            name: "BASE_PATH".to_string(),
            docs: vec!["Server base path stripped before route matching".to_string()],
            ty: str_ref(),
            value: Expression::str(description.base_path.clone()),
        }));
        builder.declare(Declaration::Const(ConstDecl {
            name: "ROUTES".to_string(),
            docs: vec!["`(method, template, operation_id)` in declaration order".to_string()],
            ty: TypeExpr::Ref(
                None,
                Box::new(TypeExpr::Slice(Box::new(TypeExpr::Tuple(vec![
                    str_ref(),
                    str_ref(),
                    str_ref(),
                ])))),
            ),
            value: Expression::Array(
                metas
                    .iter()
                    .map(|m| {
                        Expression::Tuple(vec![
                            Expression::str(m.method.as_str()),
                            Expression::str(m.route.as_str()),
                            Expression::str(m.operation_id.clone()),
                        ])
                    })
                    .collect(),
            )
            .borrow(),
        }));

        for node in resolver.declarations() {
            emitter.emit_node(&mut builder, &node);
        }
        let mut mark = resolver.declaration_count();

        let mut operations = Vec::with_capacity(metas.len());
        let mut responses = Vec::with_capacity(metas.len());
        for meta in &metas {
            let op = resolve_operation(meta, &mut resolver)?;
            for node in resolver.declarations_since(mark) {
                emitter.emit_node(&mut builder, &node);
            }
            mark = resolver.declaration_count();

            let presence = resolver.presence();
            emit_request(&mut emitter, &mut builder, resolver.names(), &op, presence);
            responses.push(emit_responses(&emitter, &mut builder, resolver.names(), &op));
            debug!(
                operation_id = %op.operation_id,
                method = %op.method,
                route = %op.route,
                statuses = op.responses.len(),
                "Compiled operation"
            );
            operations.push(op);
        }

        let routes = RouteTable::new(
            operations
                .iter()
                .map(|op| Route::new(op.method.clone(), op.route.clone(), op.operation_id.as_str()))
                .collect(),
            description.base_path.as_str(),
        );

        for d in &diagnostics {
            warn!(
                location = %d.location,
                kind = %d.kind,
                "{}", d.message
            );
        }

        let file = builder.finish();
        info!(
            source = %description.source.display(),
            declarations = file.declarations.len(),
            operations = operations.len(),
            rule_sets = resolver.rules().compiled_sets(),
            warnings = diagnostics.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Compiled description"
        );

        Ok(Compilation {
            file,
            operations,
            responses,
            routes: Arc::new(routes),
            diagnostics,
        })
    }
}

impl CodeGenerator for Compiler {
    fn name(&self) -> String {
        format!("brrtgen[{}]", self.config.presence)
    }

    fn generate(&self, description: &Description) -> Result<Compilation, CompileError> {
        self.compile(description)
    }
}

fn str_ref() -> TypeExpr {
    TypeExpr::Ref(None, Box::new(TypeExpr::named("str")))
}
