#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::fixtures::PET_STORE;
use common::temp_files::{cleanup_temp_dirs, unique_dir, write_file};
use std::fs;
use std::process::Command;

fn brrtgen() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_brrtgen"));
    cmd.env_remove("BRRTGEN_CONFIG")
        .env("BRRTGEN_LOG_LEVEL", "warn");
    cmd
}

#[test]
fn test_cli_generate_writes_flat_file() {
    let dir = unique_dir("cli_generate");
    let spec = write_file(&dir, "pets.yaml", PET_STORE);
    let out = dir.join("out");

    let output = brrtgen()
        .arg("generate")
        .arg("--spec")
        .arg(&spec)
        .arg("--output")
        .arg(&out)
        .output()
        .expect("run cli");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 succeeded, 0 failed"));
    let source = fs::read_to_string(out.join("pet_store.rs")).unwrap();
    assert!(source.contains("pub struct Pet {"));
    cleanup_temp_dirs(&[dir]);
}

#[test]
fn test_cli_generate_uses_config_next_to_spec() {
    let dir = unique_dir("cli_config");
    let spec = write_file(&dir, "pets.yaml", PET_STORE);
    write_file(
        &dir,
        "brrtgen.toml",
        "output = \"nested\"\nimport_prefix = \"pet_runtime\"\n",
    );
    let out = dir.join("out");

    let status = brrtgen()
        .arg("generate")
        .arg("--spec")
        .arg(&spec)
        .arg("--output")
        .arg(&out)
        .status()
        .expect("run cli");
    assert!(status.success());
    let source = fs::read_to_string(out.join("pet_store").join("mod.rs")).unwrap();
    assert!(source.contains("use pet_runtime::typed::{Validate, ResponseEnvelope};"));
    cleanup_temp_dirs(&[dir]);
}

#[test]
fn test_cli_generate_exit_code_reflects_failures() {
    let dir = unique_dir("cli_failure");
    let good = write_file(&dir, "pets.yaml", PET_STORE);
    let bad = write_file(&dir, "bad.yaml", "openapi: 3.1.0\ninfo: [\n");
    let out = dir.join("out");

    let output = brrtgen()
        .arg("generate")
        .arg("--spec")
        .arg(&bad)
        .arg(&good)
        .arg("--output")
        .arg(&out)
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("FAILED"));
    assert!(stdout.contains("1 succeeded, 1 failed"));
    assert!(out.join("pet_store.rs").exists());
    cleanup_temp_dirs(&[dir]);
}

#[test]
fn test_cli_missing_explicit_config_fails() {
    let dir = unique_dir("cli_missing_config");
    let spec = write_file(&dir, "pets.yaml", PET_STORE);
    let status = brrtgen()
        .arg("generate")
        .arg("--spec")
        .arg(&spec)
        .arg("--config")
        .arg(dir.join("nope.toml"))
        .arg("--output")
        .arg(dir.join("out"))
        .status()
        .expect("run cli");
    assert!(!status.success());
    assert!(!dir.join("out").exists());
    cleanup_temp_dirs(&[dir]);
}

#[test]
fn test_cli_routes_lists_table() {
    let dir = unique_dir("cli_routes");
    let spec = write_file(&dir, "pets.yaml", PET_STORE);
    let output = brrtgen()
        .arg("routes")
        .arg("--spec")
        .arg(&spec)
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[routes] base_path=/v2 count=4"));
    assert!(stdout.contains("[route] GET /v2/pets/{petId}/photo{size}.png -> get_photo"));
    cleanup_temp_dirs(&[dir]);
}

#[test]
fn test_cli_diff_shows_presence_changes() {
    let dir = unique_dir("cli_diff");
    let spec = write_file(&dir, "pets.yaml", PET_STORE);
    let output = brrtgen()
        .arg("diff")
        .arg("--spec")
        .arg(&spec)
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--- brrtgen[standard]"));
    assert!(stdout.contains("+++ brrtgen[explicit]"));
    cleanup_temp_dirs(&[dir]);
}
