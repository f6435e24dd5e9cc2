use std::path::Path;
use std::process::Command;

/// Run `rustfmt` over one generated file, in place.
///
/// `BRRTGEN_RUSTFMT_BIN` overrides the binary.
///
/// # Errors
///
/// Fails when the binary cannot be spawned or exits unsuccessfully.
pub fn format_file(path: &Path) -> anyhow::Result<()> {
    // Allow tests to override the rustfmt binary path without mutating PATH
    let rustfmt_bin =
        std::env::var("BRRTGEN_RUSTFMT_BIN").unwrap_or_else(|_| "rustfmt".to_string());

    let mut cmd = Command::new(&rustfmt_bin);
    cmd.arg("--edition").arg("2021").arg(path);
    let status = cmd.status()?;
    if !status.success() {
        anyhow::bail!("{} failed on {}", rustfmt_bin, path.display());
    }
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use std::env;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::sync::{Mutex, OnceLock};

    // Serialize environment mutations to avoid test races
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn with_stub(script: &str) -> anyhow::Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let stub = dir.path().join("rustfmt");
        fs::write(&stub, script).unwrap();
        let mut perms = fs::metadata(&stub).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&stub, perms).unwrap();
        let target = dir.path().join("out.rs");
        fs::write(&target, "pub struct A {}\n").unwrap();

        let _guard = ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        let old_bin = env::var("BRRTGEN_RUSTFMT_BIN").ok();
        env::set_var("BRRTGEN_RUSTFMT_BIN", &stub);
        let res = format_file(&target);
        match old_bin {
            Some(v) => env::set_var("BRRTGEN_RUSTFMT_BIN", v),
            None => env::remove_var("BRRTGEN_RUSTFMT_BIN"),
        }
        res
    }

    #[test]
    fn test_format_file_ok() {
        assert!(with_stub("#!/bin/sh\nexit 0\n").is_ok());
    }

    #[test]
    fn test_format_file_error() {
        let err = with_stub("#!/bin/sh\nexit 1\n").unwrap_err();
        assert!(err.to_string().contains("failed on"));
    }
}
