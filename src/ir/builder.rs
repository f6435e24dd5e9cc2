use super::model::{Declaration, File, Import};
use std::collections::HashSet;

/// Accumulates imports and declarations for one generated file.
///
/// One builder is owned by one compilation; it is never shared across
/// description files. Declarations come out in insertion order. Imports are
/// keyed by module path: a second request for the same module merges its items
/// into the first entry, so the first-seen order of both modules and items is
/// preserved.
#[derive(Debug)]
pub struct FileBuilder {
    name: String,
    imports: Vec<Import>,
    declarations: Vec<Declaration>,
    declared: HashSet<String>,
}

impl FileBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        FileBuilder {
            name: name.into(),
            imports: Vec::new(),
            declarations: Vec::new(),
            declared: HashSet::new(),
        }
    }

    /// Request `use module::item;`
    pub fn import(&mut self, module: &str, item: &str) -> &mut Self {
        match self.imports.iter_mut().find(|i| i.module == module) {
            Some(existing) => {
                if !item.is_empty() && !existing.items.iter().any(|i| i == item) {
                    existing.items.push(item.to_string());
                }
            }
            None => self.imports.push(Import {
                module: module.to_string(),
                items: if item.is_empty() {
                    Vec::new()
                } else {
                    vec![item.to_string()]
                },
            }),
        }
        self
    }

    /// Request `use module;`
    pub fn import_module(&mut self, module: &str) -> &mut Self {
        self.import(module, "")
    }

    /// Append a declaration.
    ///
    /// Returns `false` and drops the declaration when a named declaration with
    /// the same name already exists. Impl blocks are always appended.
    pub fn declare(&mut self, decl: Declaration) -> bool {
        if let Some(name) = decl.name() {
            if !self.declared.insert(name.to_string()) {
                return false;
            }
        }
        self.declarations.push(decl);
        true
    }

    #[must_use]
    pub fn is_declared(&self, name: &str) -> bool {
        self.declared.contains(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    #[must_use]
    pub fn finish(self) -> File {
        File {
            name: self.name,
            imports: self.imports,
            declarations: self.declarations,
        }
    }
}
