use crate::config::OutputScheme;
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Where the file for `slug` goes under `out_dir`
#[must_use]
pub fn output_path(out_dir: &Path, slug: &str, scheme: OutputScheme) -> PathBuf {
    match scheme {
        OutputScheme::Flat => out_dir.join(format!("{slug}.rs")),
        OutputScheme::Nested => out_dir.join(slug).join("mod.rs"),
    }
}

/// Write generated source for `slug`, creating directories as needed.
///
/// Returns the written path.
///
/// # Errors
///
/// Fails when a directory cannot be created or the file cannot be written.
pub fn write_output(
    out_dir: &Path,
    slug: &str,
    scheme: OutputScheme,
    contents: &str,
) -> anyhow::Result<PathBuf> {
    let path = output_path(out_dir, slug, scheme);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    std::fs::write(&path, contents)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
