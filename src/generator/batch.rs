//! Sequential batch driver over a list of description files.

use super::compiler::CodeGenerator;
use super::format::format_file;
use super::output::{output_path, write_output};
use crate::config::OutputScheme;
use crate::diagnostics::Diagnostic;
use crate::ir::render_file;
use crate::spec::load_description;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};

/// How a batch writes its output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    pub output_dir: PathBuf,
    pub scheme: OutputScheme,
    /// Run `rustfmt` on every written file
    pub format: bool,
    /// Compile and render without writing
    pub dry_run: bool,
}

/// A file that compiled
#[derive(Debug, Clone)]
pub struct Generated {
    /// Written path, or the path that would be written on a dry run
    pub output: PathBuf,
    pub source: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Outcome for one description file
#[derive(Debug)]
pub struct FileOutcome {
    pub spec: PathBuf,
    pub result: anyhow::Result<Generated>,
}

/// Outcomes of a whole batch, in input order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub files: Vec<FileOutcome>,
    /// Set when the batch stopped early on cancellation
    pub cancelled: bool,
}

impl BatchReport {
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.files.iter().filter(|f| f.result.is_ok()).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.files.len() - self.succeeded()
    }

    /// Every file compiled and the batch ran to completion
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.cancelled && self.failed() == 0
    }
}

/// Compile one description file and write (or render) its output
///
/// # Errors
///
/// Fails when the file cannot be loaded, compiled, rendered, written or
/// formatted.
pub fn generate_file<G: CodeGenerator + ?Sized>(
    generator: &G,
    spec: &Path,
    options: &BatchOptions,
) -> anyhow::Result<Generated> {
    let description = load_description(spec)?;
    let compilation = generator.generate(&description)?;
    let source = render_file(&compilation.file)?;

    let output = if options.dry_run {
        output_path(&options.output_dir, &description.slug, options.scheme)
    } else {
        let path = write_output(&options.output_dir, &description.slug, options.scheme, &source)?;
        if options.format {
            format_file(&path)?;
        }
        path
    };
    Ok(Generated {
        output,
        source,
        diagnostics: compilation.diagnostics,
    })
}

/// Process `specs` one after another.
///
/// A failing file is recorded and the batch moves on. `cancel` is checked
/// before each file; once set, the remaining files are skipped and the report
/// is marked cancelled. A file already started always runs to completion.
pub fn run_batch<G: CodeGenerator + ?Sized>(
    generator: &G,
    specs: &[PathBuf],
    options: &BatchOptions,
    cancel: &AtomicBool,
) -> BatchReport {
    let mut report = BatchReport::default();
    for (idx, spec) in specs.iter().enumerate() {
        if cancel.load(Ordering::SeqCst) {
            warn!(
                remaining = specs.len() - idx,
                "Batch cancelled before {}",
                spec.display()
            );
            report.cancelled = true;
            break;
        }
        let result = generate_file(generator, spec, options);
        match &result {
            Ok(generated) => info!(
                spec = %spec.display(),
                output = %generated.output.display(),
                warnings = generated.diagnostics.len(),
                dry_run = options.dry_run,
                "Generated"
            ),
            Err(e) => error!(spec = %spec.display(), error = %format!("{e:#}"), "Generation failed"),
        }
        report.files.push(FileOutcome {
            spec: spec.clone(),
            result,
        });
    }
    info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        cancelled = report.cancelled,
        "Batch finished"
    );
    report
}
