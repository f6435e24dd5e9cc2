use crate::config::{load_config, resolve_config_path, CompilerConfig, OutputScheme};
use crate::diagnostics::print_diagnostics;
use crate::generator::{
    diff_generators, run_batch, BatchOptions, BatchReport, CodeGenerator, Compiler,
};
use crate::logging::{init_logging_with_config, LogConfig};
use crate::schema::PresenceMode;
use crate::spec::load_description;
use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::debug;

/// Command-line interface for brrtgen
#[derive(Parser, Debug)]
#[command(name = "brrtgen", version)]
#[command(about = "OpenAPI 3.x to typed-server compiler", long_about = None)]
pub struct Cli {
    /// Log at debug level (overrides BRRTGEN_LOG_LEVEL)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Representation of required fields
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum PresenceArg {
    /// Required fields are direct values
    Standard,
    /// Every field is `Option<T>`
    Explicit,
}

impl From<PresenceArg> for PresenceMode {
    fn from(arg: PresenceArg) -> Self {
        match arg {
            PresenceArg::Standard => PresenceMode::Standard,
            PresenceArg::Explicit => PresenceMode::Explicit,
        }
    }
}

/// Output path scheme
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SchemeArg {
    /// `<out>/<slug>.rs`
    Flat,
    /// `<out>/<slug>/mod.rs`
    Nested,
}

impl From<SchemeArg> for OutputScheme {
    fn from(arg: SchemeArg) -> Self {
        match arg {
            SchemeArg::Flat => OutputScheme::Flat,
            SchemeArg::Nested => OutputScheme::Nested,
        }
    }
}

/// Options shared by every command that compiles
#[derive(clap::Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileArgs {
    /// Representation of required fields (overrides the config file)
    #[arg(long, value_enum)]
    pub presence: Option<PresenceArg>,

    /// Runtime crate path used in generated imports (overrides the config file)
    #[arg(long)]
    pub import_prefix: Option<String>,

    /// Compiler config file (default: brrtgen.toml next to the first spec)
    #[arg(long, env = "BRRTGEN_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile specs into Rust source files
    Generate {
        /// OpenAPI specification files (YAML or JSON)
        #[arg(short, long, required = true, num_args = 1..)]
        spec: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, default_value = "generated")]
        output: PathBuf,

        /// Output path scheme (overrides the config file)
        #[arg(long, value_enum)]
        scheme: Option<SchemeArg>,

        #[command(flatten)]
        compile: CompileArgs,

        /// Run rustfmt on every written file
        #[arg(long, default_value_t = false)]
        fmt: bool,

        /// Compile and report without writing files
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Print the route table of a spec
    Routes {
        /// OpenAPI specification file (YAML or JSON)
        #[arg(short, long)]
        spec: PathBuf,
    },
    /// Compile specs and report errors and warnings without writing
    Check {
        /// OpenAPI specification files (YAML or JSON)
        #[arg(short, long, required = true, num_args = 1..)]
        spec: Vec<PathBuf>,

        #[command(flatten)]
        compile: CompileArgs,
    },
    /// Diff standard against explicit-presence output for a spec
    Diff {
        /// OpenAPI specification file (YAML or JSON)
        #[arg(short, long)]
        spec: PathBuf,

        #[command(flatten)]
        compile: CompileArgs,
    },
}

/// Merge the config file with command-line overrides.
///
/// An explicit `--config` that does not exist is an error; a missing
/// auto-detected file just means defaults.
///
/// # Errors
///
/// Fails when the config file is missing (explicit path only), unreadable
/// or invalid, or when the resulting import prefix is empty.
pub fn effective_config(
    args: &CompileArgs,
    scheme: Option<SchemeArg>,
    first_spec: &Path,
) -> anyhow::Result<CompilerConfig> {
    if let Some(explicit) = &args.config {
        if !explicit.exists() {
            anyhow::bail!("Config file not found: {}", explicit.display());
        }
    }
    let mut config = match resolve_config_path(args.config.as_deref(), first_spec) {
        Some(path) => {
            debug!(config = %path.display(), "Loading compiler config");
            load_config(&path)?.unwrap_or_default()
        }
        None => CompilerConfig::default(),
    };
    if let Some(presence) = args.presence {
        config = config.with_presence(presence.into());
    }
    if let Some(scheme) = scheme {
        config = config.with_output(scheme.into());
    }
    if let Some(prefix) = &args.import_prefix {
        if prefix.trim().is_empty() {
            anyhow::bail!("--import-prefix must not be empty");
        }
        config = config.with_import_prefix(prefix.clone());
    }
    Ok(config)
}

fn print_report(report: &BatchReport, dry_run: bool) {
    for file in &report.files {
        match &file.result {
            Ok(generated) => {
                let verb = if dry_run { "would write" } else { "wrote" };
                println!(
                    "ok      {} -> {verb} {}",
                    file.spec.display(),
                    generated.output.display()
                );
                print_diagnostics(&generated.diagnostics);
            }
            Err(e) => println!("FAILED  {}: {e:#}", file.spec.display()),
        }
    }
    println!(
        "{} succeeded, {} failed{}",
        report.succeeded(),
        report.failed(),
        if report.cancelled { ", cancelled" } else { "" }
    );
}

/// Execute a parsed command.
///
/// Returns `Ok(true)` when every file compiled and the batch was not
/// cancelled.
///
/// # Errors
///
/// Returns an error for problems that stop the command before any file is
/// processed (config, a single-spec command's load or compile failure).
pub fn execute(command: &Commands, cancel: &AtomicBool) -> anyhow::Result<bool> {
    match command {
        Commands::Generate {
            spec,
            output,
            scheme,
            compile,
            fmt,
            dry_run,
        } => {
            let first = spec.first().context("at least one --spec is required")?;
            let config = effective_config(compile, *scheme, first)?;
            let options = BatchOptions {
                output_dir: output.clone(),
                scheme: config.output,
                format: *fmt,
                dry_run: *dry_run,
            };
            let report = run_batch(&Compiler::new(config), spec, &options, cancel);
            print_report(&report, *dry_run);
            Ok(report.is_success())
        }
        Commands::Routes { spec } => {
            let description = load_description(spec)?;
            let compilation = Compiler::default().compile(&description)?;
            compilation.routes.dump_routes();
            Ok(true)
        }
        Commands::Check { spec, compile } => {
            let first = spec.first().context("at least one --spec is required")?;
            let config = effective_config(compile, None, first)?;
            let options = BatchOptions {
                output_dir: PathBuf::new(),
                scheme: config.output,
                format: false,
                dry_run: true,
            };
            let report = run_batch(&Compiler::new(config), spec, &options, cancel);
            for file in &report.files {
                match &file.result {
                    Ok(generated) => {
                        println!(
                            "ok      {} ({} warning(s))",
                            file.spec.display(),
                            generated.diagnostics.len()
                        );
                        print_diagnostics(&generated.diagnostics);
                    }
                    Err(e) => println!("FAILED  {}: {e:#}", file.spec.display()),
                }
            }
            Ok(report.is_success())
        }
        Commands::Diff { spec, compile } => {
            let config = effective_config(compile, None, spec)?;
            let description = load_description(spec)?;
            let standard = Compiler::new(config.clone().with_presence(PresenceMode::Standard));
            let explicit = Compiler::new(config.with_presence(PresenceMode::Explicit));
            let diff = diff_generators(&standard, &explicit, &description)?;
            if diff.is_identical() {
                println!("{} and {} are identical", standard.name(), explicit.name());
            } else {
                print!("{}", diff.unified);
                println!(
                    "{} insertion(s), {} deletion(s)",
                    diff.insertions, diff.deletions
                );
            }
            Ok(true)
        }
    }
}

/// Stop batches between files on SIGINT/SIGTERM. A second signal exits
/// immediately.
#[cfg(unix)]
fn install_signal_handler(cancel: Arc<AtomicBool>) -> anyhow::Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;
    use std::sync::atomic::Ordering;

    let mut signals =
        Signals::new([SIGINT, SIGTERM]).context("Failed to register signal handlers")?;
    std::thread::Builder::new()
        .name("brrtgen-signals".to_string())
        .spawn(move || {
            for signal in signals.forever() {
                if cancel.swap(true, Ordering::SeqCst) {
                    tracing::warn!(signal, "Second signal received - exiting");
                    std::process::exit(130);
                }
                tracing::warn!(signal, "Signal received - stopping after the current file");
            }
        })
        .context("Failed to spawn signal thread")?;
    Ok(())
}

#[cfg(not(unix))]
fn install_signal_handler(_cancel: Arc<AtomicBool>) -> anyhow::Result<()> {
    Ok(())
}

/// Parse arguments, set up logging and signals, and run the command
///
/// # Errors
///
/// Returns an error if logging or signal setup fails or the command fails
/// before processing any file.
pub fn run_cli() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let mut log_config = LogConfig::from_env();
    if cli.verbose {
        log_config = log_config.with_level("debug");
    }
    init_logging_with_config(&log_config)?;

    let cancel = Arc::new(AtomicBool::new(false));
    install_signal_handler(Arc::clone(&cancel))?;

    if execute(&cli.command, &cancel)? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
