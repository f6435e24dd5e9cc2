//! # CLI Module
//!
//! Command-line front end for the compiler.
//!
//! ## Commands
//!
//! ### `generate`
//!
//! Compile one or more descriptions into Rust source files:
//!
//! ```bash
//! brrtgen generate --spec petstore.yaml --spec users.yaml --output src/api
//! ```
//!
//! Files are processed one after another. A file that fails to compile is
//! reported and the batch moves on; the exit code is non-zero if any file
//! failed. SIGINT or SIGTERM stops the batch after the current file.
//!
//! ### `routes`
//!
//! Print the route table a description compiles to:
//!
//! ```bash
//! brrtgen routes --spec petstore.yaml
//! ```
//!
//! ### `check`
//!
//! Compile without writing and list warnings per file.
//!
//! ### `diff`
//!
//! Show how explicit presence changes the generated file:
//!
//! ```bash
//! brrtgen diff --spec petstore.yaml
//! ```
//!
//! ## Configuration
//!
//! `--config` (or `BRRTGEN_CONFIG`) names a TOML file; without it,
//! `brrtgen.toml` next to the first spec is used when present. `--presence`,
//! `--scheme` and `--import-prefix` override the file.

mod commands;

pub use commands::{
    effective_config, execute, run_cli, Cli, Commands, CompileArgs, PresenceArg, SchemeArg,
};

#[cfg(test)]
mod tests;
