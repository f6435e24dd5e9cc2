//! Compiler configuration.
//!
//! One [`CompilerConfig`] parameterizes every compilation of a batch. It can
//! be written as a `brrtgen.toml` next to the first spec file:
//!
//! ```toml
//! presence = "explicit"
//! output = "nested"
//! import_prefix = "my_runtime"
//! ```
//!
//! Missing keys fall back to their defaults; command-line flags override file
//! values.

use crate::schema::PresenceMode;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Config file name looked up next to the first spec file
pub const CONFIG_FILE_NAME: &str = "brrtgen.toml";

/// Default runtime crate path used in generated imports
pub const DEFAULT_IMPORT_PREFIX: &str = "brrtgen";

/// Where generated files land under the output directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputScheme {
    /// `<out>/<slug>.rs`
    #[default]
    Flat,
    /// `<out>/<slug>/mod.rs`
    Nested,
}

impl fmt::Display for OutputScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputScheme::Flat => write!(f, "flat"),
            OutputScheme::Nested => write!(f, "nested"),
        }
    }
}

/// Parameters of one compiler invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    /// Representation of required fields
    pub presence: PresenceMode,
    /// Output path scheme
    pub output: OutputScheme,
    /// Path of the runtime crate that generated code imports from
    pub import_prefix: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            presence: PresenceMode::Standard,
            output: OutputScheme::Flat,
            import_prefix: DEFAULT_IMPORT_PREFIX.to_string(),
        }
    }
}

impl CompilerConfig {
    #[must_use]
    pub fn with_presence(mut self, presence: PresenceMode) -> Self {
        self.presence = presence;
        self
    }

    #[must_use]
    pub fn with_output(mut self, output: OutputScheme) -> Self {
        self.output = output;
        self
    }

    #[must_use]
    pub fn with_import_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.import_prefix = prefix.into();
        self
    }
}

/// Load a config file.
///
/// Returns `Ok(None)` when the file does not exist.
///
/// # Errors
///
/// Fails when the file exists but cannot be read or parsed.
pub fn load_config(config_path: &Path) -> anyhow::Result<Option<CompilerConfig>> {
    if !config_path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read compiler config: {}", config_path.display()))?;

    let config: CompilerConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse compiler config: {}", config_path.display()))?;

    if config.import_prefix.trim().is_empty() {
        anyhow::bail!(
            "Invalid compiler config {}: import_prefix must not be empty",
            config_path.display()
        );
    }

    Ok(Some(config))
}

/// Resolve the config path.
///
/// Priority: the explicit path, then `brrtgen.toml` next to the spec file.
pub fn resolve_config_path(explicit_path: Option<&Path>, spec_path: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }
    let candidate = spec_path.parent()?.join(CONFIG_FILE_NAME);
    candidate.exists().then_some(candidate)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = CompilerConfig::default();
        assert_eq!(config.presence, PresenceMode::Standard);
        assert_eq!(config.output, OutputScheme::Flat);
        assert_eq!(config.import_prefix, "brrtgen");
    }

    #[test]
    fn test_load_missing_is_none() {
        let dir = tempdir().unwrap();
        assert!(load_config(&dir.path().join("brrtgen.toml")).unwrap().is_none());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("brrtgen.toml");
        std::fs::write(&path, "presence = \"explicit\"\n").unwrap();
        let config = load_config(&path).unwrap().unwrap();
        assert_eq!(config.presence, PresenceMode::Explicit);
        assert_eq!(config.output, OutputScheme::Flat);
        assert_eq!(config.import_prefix, "brrtgen");
    }

    #[test]
    fn test_load_rejects_unknown_keys_and_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("brrtgen.toml");
        std::fs::write(&path, "presense = \"explicit\"\n").unwrap();
        assert!(load_config(&path).is_err());
        std::fs::write(&path, "output = \"tree\"\n").unwrap();
        assert!(load_config(&path).is_err());
        std::fs::write(&path, "import_prefix = \"  \"\n").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_resolve_config_path() {
        let dir = tempdir().unwrap();
        let spec = dir.path().join("openapi.yaml");
        assert_eq!(resolve_config_path(None, &spec), None);

        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "").unwrap();
        assert_eq!(
            resolve_config_path(None, &spec),
            Some(dir.path().join(CONFIG_FILE_NAME))
        );

        let explicit = dir.path().join("other.toml");
        assert_eq!(resolve_config_path(Some(&explicit), &spec), Some(explicit.clone()));
    }
}
