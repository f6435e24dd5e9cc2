//! Comparison harness: render two generators' output for one description and
//! diff the text.

use super::compiler::CodeGenerator;
use crate::ir::render_file;
use crate::spec::Description;
use anyhow::Context;
use similar::{ChangeTag, TextDiff};

/// Outcome of comparing two generators on one description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorDiff {
    pub left: String,
    pub right: String,
    /// Unified diff, empty when the outputs are identical
    pub unified: String,
    pub insertions: usize,
    pub deletions: usize,
}

impl GeneratorDiff {
    #[must_use]
    pub fn is_identical(&self) -> bool {
        self.insertions == 0 && self.deletions == 0
    }
}

/// Line diff of two texts in unified format
#[must_use]
pub fn diff_text(left_name: &str, left: &str, right_name: &str, right: &str) -> GeneratorDiff {
    let diff = TextDiff::from_lines(left, right);
    let (mut insertions, mut deletions) = (0, 0);
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => insertions += 1,
            ChangeTag::Delete => deletions += 1,
            ChangeTag::Equal => {}
        }
    }
    let unified = if insertions == 0 && deletions == 0 {
        String::new()
    } else {
        diff.unified_diff()
            .context_radius(3)
            .header(left_name, right_name)
            .to_string()
    };
    GeneratorDiff {
        left: left_name.to_string(),
        right: right_name.to_string(),
        unified,
        insertions,
        deletions,
    }
}

/// Run both generators on `description` and diff their rendered output
///
/// # Errors
///
/// Fails when either generator rejects the description or rendering fails.
pub fn diff_generators(
    left: &dyn CodeGenerator,
    right: &dyn CodeGenerator,
    description: &Description,
) -> anyhow::Result<GeneratorDiff> {
    let render = |g: &dyn CodeGenerator| -> anyhow::Result<String> {
        let compilation = g
            .generate(description)
            .with_context(|| format!("{} failed on {}", g.name(), description.source.display()))?;
        render_file(&compilation.file)
    };
    let left_text = render(left)?;
    let right_text = render(right)?;
    Ok(diff_text(&left.name(), &left_text, &right.name(), &right_text))
}
