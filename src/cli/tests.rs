//! Unit tests for CLI commands
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use crate::cli::{effective_config, execute, Cli, Commands, CompileArgs, PresenceArg, SchemeArg};
use crate::config::OutputScheme;
use crate::schema::PresenceMode;
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use tempfile::tempdir;

const PING: &str = r#"openapi: 3.1.0
info:
  title: Ping Service
  version: 1.0.0
paths:
  /ping:
    get:
      operationId: ping
      responses:
        "200":
          description: pong
"#;

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_generate_command_defaults() {
    let cli = Cli::try_parse_from(["brrtgen", "generate", "--spec", "a.yaml"]).unwrap();
    assert!(!cli.verbose);
    match cli.command {
        Commands::Generate {
            spec,
            output,
            scheme,
            compile,
            fmt,
            dry_run,
        } => {
            assert_eq!(spec, vec![PathBuf::from("a.yaml")]);
            assert_eq!(output, PathBuf::from("generated"));
            assert_eq!(scheme, None);
            assert_eq!(compile.presence, None);
            assert_eq!(compile.import_prefix, None);
            assert!(!fmt);
            assert!(!dry_run);
        }
        _ => panic!("Expected Generate command"),
    }
}

#[test]
fn test_generate_command_with_flags() {
    let cli = Cli::try_parse_from([
        "brrtgen",
        "-v",
        "generate",
        "--spec",
        "a.yaml",
        "b.yaml",
        "--output",
        "out",
        "--presence",
        "explicit",
        "--scheme",
        "nested",
        "--import-prefix",
        "my_runtime",
        "--fmt",
        "--dry-run",
    ])
    .unwrap();
    assert!(cli.verbose);
    match cli.command {
        Commands::Generate {
            spec,
            output,
            scheme,
            compile,
            fmt,
            dry_run,
        } => {
            assert_eq!(spec.len(), 2);
            assert_eq!(output, PathBuf::from("out"));
            assert_eq!(scheme, Some(SchemeArg::Nested));
            assert_eq!(compile.presence, Some(PresenceArg::Explicit));
            assert_eq!(compile.import_prefix.as_deref(), Some("my_runtime"));
            assert!(fmt);
            assert!(dry_run);
        }
        _ => panic!("Expected Generate command"),
    }
}

#[test]
fn test_generate_requires_spec() {
    assert!(Cli::try_parse_from(["brrtgen", "generate"]).is_err());
    assert!(Cli::try_parse_from(["brrtgen", "generate", "--spec", "a.yaml", "--presence", "maybe"]).is_err());
}

#[test]
fn test_routes_and_diff_commands() {
    let cli = Cli::try_parse_from(["brrtgen", "routes", "--spec", "a.yaml"]).unwrap();
    assert!(matches!(cli.command, Commands::Routes { ref spec } if spec == Path::new("a.yaml")));

    let cli = Cli::try_parse_from(["brrtgen", "diff", "-s", "a.yaml"]).unwrap();
    assert!(matches!(cli.command, Commands::Diff { .. }));
}

#[test]
fn test_effective_config_reads_file_next_to_spec() {
    let dir = tempdir().unwrap();
    let spec = write(dir.path(), "ping.yaml", PING);
    write(
        dir.path(),
        "brrtgen.toml",
        "presence = \"explicit\"\nimport_prefix = \"rt\"\n",
    );

    let config = effective_config(&CompileArgs::default(), None, &spec).unwrap();
    assert_eq!(config.presence, PresenceMode::Explicit);
    assert_eq!(config.import_prefix, "rt");
    assert_eq!(config.output, OutputScheme::Flat);
}

#[test]
fn test_effective_config_flags_override_file() {
    let dir = tempdir().unwrap();
    let spec = write(dir.path(), "ping.yaml", PING);
    write(dir.path(), "brrtgen.toml", "presence = \"explicit\"\n");

    let args = CompileArgs {
        presence: Some(PresenceArg::Standard),
        import_prefix: Some("other".to_string()),
        config: None,
    };
    let config = effective_config(&args, Some(SchemeArg::Nested), &spec).unwrap();
    assert_eq!(config.presence, PresenceMode::Standard);
    assert_eq!(config.output, OutputScheme::Nested);
    assert_eq!(config.import_prefix, "other");
}

#[test]
fn test_effective_config_rejects_missing_explicit_file() {
    let dir = tempdir().unwrap();
    let spec = write(dir.path(), "ping.yaml", PING);
    let args = CompileArgs {
        config: Some(dir.path().join("absent.toml")),
        ..CompileArgs::default()
    };
    let err = effective_config(&args, None, &spec).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
}

#[test]
fn test_effective_config_rejects_empty_prefix() {
    let dir = tempdir().unwrap();
    let spec = write(dir.path(), "ping.yaml", PING);
    let args = CompileArgs {
        import_prefix: Some("  ".to_string()),
        ..CompileArgs::default()
    };
    assert!(effective_config(&args, None, &spec).is_err());
}

#[test]
fn test_execute_generate_writes_files() {
    let dir = tempdir().unwrap();
    let spec = write(dir.path(), "ping.yaml", PING);
    let out = dir.path().join("out");
    let cli = Cli::try_parse_from([
        "brrtgen",
        "generate",
        "--spec",
        spec.to_str().unwrap(),
        "--output",
        out.to_str().unwrap(),
    ])
    .unwrap();

    assert!(execute(&cli.command, &AtomicBool::new(false)).unwrap());
    let source = fs::read_to_string(out.join("ping_service.rs")).unwrap();
    assert!(source.contains("pub struct PingResponse {"));
}

#[test]
fn test_execute_generate_reports_failure() {
    let dir = tempdir().unwrap();
    let good = write(dir.path(), "ping.yaml", PING);
    let bad = write(dir.path(), "bad.yaml", "openapi: [");
    let out = dir.path().join("out");
    let cli = Cli::try_parse_from([
        "brrtgen",
        "generate",
        "--spec",
        bad.to_str().unwrap(),
        good.to_str().unwrap(),
        "--output",
        out.to_str().unwrap(),
    ])
    .unwrap();

    assert!(!execute(&cli.command, &AtomicBool::new(false)).unwrap());
    assert!(out.join("ping_service.rs").exists());
}

#[test]
fn test_execute_cancelled_batch_is_not_success() {
    let dir = tempdir().unwrap();
    let spec = write(dir.path(), "ping.yaml", PING);
    let out = dir.path().join("out");
    let cli = Cli::try_parse_from([
        "brrtgen",
        "generate",
        "--spec",
        spec.to_str().unwrap(),
        "--output",
        out.to_str().unwrap(),
    ])
    .unwrap();

    assert!(!execute(&cli.command, &AtomicBool::new(true)).unwrap());
    assert!(!out.exists());
}

#[test]
fn test_execute_check_and_diff_write_nothing() {
    let dir = tempdir().unwrap();
    let spec = write(dir.path(), "ping.yaml", PING);
    let spec_arg = spec.to_str().unwrap();

    let check = Cli::try_parse_from(["brrtgen", "check", "--spec", spec_arg]).unwrap();
    assert!(execute(&check.command, &AtomicBool::new(false)).unwrap());

    let diff = Cli::try_parse_from(["brrtgen", "diff", "--spec", spec_arg]).unwrap();
    assert!(execute(&diff.command, &AtomicBool::new(false)).unwrap());

    let routes = Cli::try_parse_from(["brrtgen", "routes", "--spec", spec_arg]).unwrap();
    assert!(execute(&routes.command, &AtomicBool::new(false)).unwrap());

    let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn test_execute_routes_missing_file_errors() {
    let cli = Cli::try_parse_from(["brrtgen", "routes", "--spec", "/nonexistent/spec.yaml"]).unwrap();
    assert!(execute(&cli.command, &AtomicBool::new(false)).is_err());
}
