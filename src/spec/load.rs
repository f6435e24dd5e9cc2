use anyhow::Context;
use oas3::OpenApiV3Spec;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A loaded interface description.
///
/// Holds the root document as a JSON value (object key order preserved) plus
/// every external document reached through a relative `$ref`, keyed by the
/// path exactly as written in the reference.
#[derive(Debug, Clone)]
pub struct Description {
    /// File the description was loaded from
    pub source: PathBuf,
    /// `info.title`
    pub title: String,
    /// Identifier derived from the title (`Pet Store` -> `pet_store`)
    pub slug: String,
    /// Path prefix from `servers[0].url`, empty when absent or `/`
    pub base_path: String,
    pub document: Value,
    pub external: BTreeMap<String, Value>,
}

impl Description {
    /// Build a description from an already parsed document.
    ///
    /// Unknown path-item keys are stripped and the result is checked
    /// structurally. External documents are not loaded; see
    /// [`with_external`](Self::with_external).
    ///
    /// # Errors
    ///
    /// Returns an error when the document is not a structurally valid
    /// OpenAPI 3 description.
    pub fn from_value(source: impl Into<PathBuf>, mut document: Value) -> anyhow::Result<Self> {
        let source = source.into();
        strip_unknown_verbs(&mut document);
        let spec: OpenApiV3Spec = serde_json::from_value(document.clone())
            .with_context(|| format!("{} is not a valid OpenAPI document", source.display()))?;
        let title = spec.info.title.clone();
        let slug = slugify(&title);
        let base_path = spec
            .servers
            .first()
            .map(|s| base_path_from_url(&s.url))
            .unwrap_or_default();
        Ok(Description {
            source,
            title,
            slug,
            base_path,
            document,
            external: BTreeMap::new(),
        })
    }

    /// Parse document text, YAML or JSON by file extension
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not parse or is not a valid description.
    pub fn parse_str(source: impl Into<PathBuf>, content: &str) -> anyhow::Result<Self> {
        let source = source.into();
        let document = parse_document(&source, content)?;
        Self::from_value(source, document)
    }

    /// Attach an external document under the path used to reference it
    #[must_use]
    pub fn with_external(mut self, path: impl Into<String>, document: Value) -> Self {
        self.external.insert(path.into(), document);
        self
    }

    /// Root document for `None`, an external one for `Some(path)`
    #[must_use]
    pub fn document_for(&self, doc: Option<&str>) -> Option<&Value> {
        match doc {
            None => Some(&self.document),
            Some(path) => self.external.get(path),
        }
    }

    /// `components.schemas` of the root document
    #[must_use]
    pub fn schemas(&self) -> Option<&Map<String, Value>> {
        self.document
            .get("components")?
            .get("schemas")?
            .as_object()
    }

    /// `paths` of the root document
    #[must_use]
    pub fn paths(&self) -> Option<&Map<String, Value>> {
        self.document.get("paths")?.as_object()
    }

    /// Look up `#/components/<section>/<name>` in the root document
    #[must_use]
    pub fn component(&self, section: &str, name: &str) -> Option<&Value> {
        self.document.get("components")?.get(section)?.get(name)
    }
}

/// Load a description and every external document it references.
///
/// # Errors
///
/// Returns an error if the file or any referenced document cannot be read or
/// parsed, or the root is not a valid description.
pub fn load_description(path: &Path) -> anyhow::Result<Description> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read description: {}", path.display()))?;
    let mut description = Description::parse_str(path, &content)?;

    let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let mut pending = BTreeSet::new();
    collect_external_refs(&description.document, &mut pending);
    while let Some(rel) = pending.pop_first() {
        if description.external.contains_key(&rel) {
            continue;
        }
        let file = base_dir.join(&rel);
        let text = std::fs::read_to_string(&file).with_context(|| {
            format!(
                "Failed to read external document '{rel}' referenced from {}",
                path.display()
            )
        })?;
        let document = parse_document(&file, &text)?;
        collect_external_refs(&document, &mut pending);
        debug!(external = %rel, "Loaded external document");
        description.external.insert(rel, document);
    }

    info!(
        source = %path.display(),
        slug = %description.slug,
        base_path = %description.base_path,
        external_documents = description.external.len(),
        "Loaded description"
    );
    Ok(description)
}

fn parse_document(path: &Path, content: &str) -> anyhow::Result<Value> {
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    if is_yaml {
        serde_yaml::from_str(content)
            .with_context(|| format!("Failed to parse YAML: {}", path.display()))
    } else {
        serde_json::from_str(content)
            .with_context(|| format!("Failed to parse JSON: {}", path.display()))
    }
}

fn collect_external_refs(value: &Value, out: &mut BTreeSet<String>) {
    match value {
        Value::Object(obj) => {
            if let Some(reference) = obj.get("$ref").and_then(Value::as_str) {
                let file = reference.split('#').next().unwrap_or_default();
                if !file.is_empty() {
                    out.insert(file.to_string());
                }
            }
            for v in obj.values() {
                collect_external_refs(v, out);
            }
        }
        Value::Array(items) => {
            for v in items {
                collect_external_refs(v, out);
            }
        }
        _ => {}
    }
}

fn strip_unknown_verbs(val: &mut Value) {
    const METHODS: [&str; 8] = ["get", "post", "put", "delete", "patch", "options", "head", "trace"];

    if let Some(Value::Object(paths_map)) = val.get_mut("paths") {
        for item in paths_map.values_mut() {
            if let Value::Object(obj) = item {
                obj.retain(|k, _| {
                    let lk = k.to_ascii_lowercase();
                    match lk.as_str() {
                        "summary" | "description" | "servers" | "parameters" | "$ref" => true,
                        m if METHODS.contains(&m) => true,
                        _ => k.starts_with("x-"),
                    }
                });
            }
        }
    }
}

/// `Pet Store API` -> `pet_store_api`
#[must_use]
pub fn slugify(title: &str) -> String {
    let slug = title
        .to_lowercase()
        .replace(|c: char| !c.is_ascii_alphanumeric(), "_")
        .split('_')
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    if slug.is_empty() {
        "api".to_string()
    } else {
        slug
    }
}

fn base_path_from_url(url_str: &str) -> String {
    url::Url::parse(url_str)
        .or_else(|_| url::Url::parse(&format!("http://dummy{url_str}")))
        .map(|u| {
            let p = u.path().trim_end_matches('/');
            if p == "/" || p.is_empty() {
                String::new()
            } else {
                p.to_string()
            }
        })
        .unwrap_or_default()
}
