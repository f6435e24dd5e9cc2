use std::fmt;

/// Error raised while compiling one description file.
///
/// Compilation errors abort generation for the offending file only; a batch
/// driver records the error and moves on to the next file. Every variant
/// names the schema or operation that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// A `$ref` points at a schema that does not exist
    UnresolvedReference {
        /// Schema or operation that holds the reference
        owner: String,
        /// The `$ref` string as written
        reference: String,
    },
    /// A reference chain revisits a schema already being resolved
    ///
    /// Generated records must be finitely sized, so recursive schemas are rejected.
    CyclicSchema {
        /// Schema names on the resolution stack, first to last, closing the loop
        chain: Vec<String>,
    },
    /// A schema or operation uses a construct the compiler does not support
    UnsupportedConstruct {
        /// Schema or operation identity (e.g. `schema:Pet`, `operation:add_pet`)
        owner: String,
        /// What was found
        detail: String,
    },
    /// A path template cannot be parsed into segments
    InvalidRouteTemplate {
        /// The raw template string
        template: String,
        /// Why parsing failed
        reason: String,
    },
    /// The same operation identity is declared twice
    DuplicateOperation {
        /// Operation identity
        operation: String,
    },
}

impl CompileError {
    /// Identity of the schema or operation the error is about
    #[must_use]
    pub fn owner(&self) -> String {
        match self {
            CompileError::UnresolvedReference { owner, .. } => owner.clone(),
            CompileError::CyclicSchema { chain } => chain
                .first()
                .map(|n| format!("schema:{n}"))
                .unwrap_or_default(),
            CompileError::UnsupportedConstruct { owner, .. } => owner.clone(),
            CompileError::InvalidRouteTemplate { template, .. } => format!("route:{template}"),
            CompileError::DuplicateOperation { operation } => format!("operation:{operation}"),
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::UnresolvedReference { owner, reference } => {
                write!(f, "{owner}: unresolved reference '{reference}'")
            }
            CompileError::CyclicSchema { chain } => {
                write!(f, "cyclic schema: {}", chain.join(" -> "))
            }
            CompileError::UnsupportedConstruct { owner, detail } => {
                write!(f, "{owner}: unsupported construct: {detail}")
            }
            CompileError::InvalidRouteTemplate { template, reason } => {
                write!(f, "invalid route template '{template}': {reason}")
            }
            CompileError::DuplicateOperation { operation } => {
                write!(f, "duplicate operation '{operation}'")
            }
        }
    }
}

impl std::error::Error for CompileError {}
