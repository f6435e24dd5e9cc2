use super::rules::{Dive, RuleSet, Shape, ValidationRule};
use crate::schema::{Constraints, SchemaKind, SchemaNode};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Compiles schema constraints into [`ValidationRule`]s.
///
/// Rules for declared schemas are compiled once per compilation and shared
/// through `Arc` by every field that references them. One compiler belongs to
/// one compilation; it is never reused across description files.
#[derive(Debug, Default)]
pub struct RuleCompiler {
    values: HashMap<String, Arc<Vec<ValidationRule>>>,
    sets: HashMap<String, Arc<RuleSet>>,
}

impl RuleCompiler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules for a field of type `node`: `required` first, then the value rules
    pub fn field_rules(&mut self, node: &SchemaNode, required: bool) -> Vec<ValidationRule> {
        let values = self.value_rules(node);
        let mut rules = Vec::with_capacity(values.len() + 1);
        if required {
            rules.push(ValidationRule::Required);
        }
        rules.extend(values.iter().cloned());
        rules
    }

    /// Rules every present value of type `node` must satisfy
    pub fn value_rules(&mut self, node: &SchemaNode) -> Arc<Vec<ValidationRule>> {
        if let SchemaKind::Reference(target) = &node.kind {
            return self.value_rules(target);
        }
        if node.declared {
            if let Some(cached) = self.values.get(&node.name) {
                return Arc::clone(cached);
            }
        }

        let mut rules = Vec::new();
        match &node.kind {
            SchemaKind::Scalar(kind) => {
                if let Some(shape) = Shape::for_scalar(*kind) {
                    rules.push(ValidationRule::Type(shape));
                }
                leaf_rules(&node.constraints, &mut rules);
            }
            SchemaKind::Enum(members) => {
                rules.push(ValidationRule::Type(Shape::String));
                leaf_rules(&node.constraints, &mut rules);
                rules.push(ValidationRule::Enum(
                    members.iter().cloned().map(Value::String).collect(),
                ));
            }
            SchemaKind::Object(_) => {
                rules.push(ValidationRule::Type(Shape::Object));
                if let Some(set) = self.rule_set(node) {
                    rules.push(ValidationRule::Dive(Dive::Fields(set)));
                }
            }
            SchemaKind::Array(element) => {
                rules.push(ValidationRule::Type(Shape::Array));
                leaf_rules(&node.constraints, &mut rules);
                let element_rules = self.value_rules(element);
                if !element_rules.is_empty() || !element.nullable {
                    rules.push(ValidationRule::Dive(Dive::Elements {
                        rules: element_rules,
                        nullable: element.nullable,
                    }));
                }
            }
            SchemaKind::Reference(_) => {}
        }

        let rules = Arc::new(rules);
        if node.declared {
            self.values.insert(node.name.clone(), Arc::clone(&rules));
        }
        rules
    }

    /// Rule set for an object schema, `None` for anything else
    pub fn rule_set(&mut self, node: &SchemaNode) -> Option<Arc<RuleSet>> {
        let target = node.target();
        let SchemaKind::Object(fields) = &target.kind else {
            return None;
        };
        if target.declared {
            if let Some(cached) = self.sets.get(&target.name) {
                return Some(Arc::clone(cached));
            }
        }
        let set = Arc::new(RuleSet::from_fields(target.name.clone(), fields));
        if target.declared {
            self.sets.insert(target.name.clone(), Arc::clone(&set));
        }
        Some(set)
    }

    /// Number of rule sets compiled so far
    #[must_use]
    pub fn compiled_sets(&self) -> usize {
        self.sets.len()
    }
}

fn leaf_rules(c: &Constraints, rules: &mut Vec<ValidationRule>) {
    if let Some(n) = c.min_length {
        rules.push(ValidationRule::MinLength(n));
    }
    if let Some(n) = c.max_length {
        rules.push(ValidationRule::MaxLength(n));
    }
    if let Some(b) = c.minimum {
        rules.push(ValidationRule::Minimum(b));
    }
    if let Some(b) = c.maximum {
        rules.push(ValidationRule::Maximum(b));
    }
    if let Some(n) = c.min_items {
        rules.push(ValidationRule::MinItems(n));
    }
    if let Some(n) = c.max_items {
        rules.push(ValidationRule::MaxItems(n));
    }
    if !c.one_of.is_empty() {
        rules.push(ValidationRule::Enum(c.one_of.clone()));
    }
    if let Some(p) = &c.pattern {
        rules.push(ValidationRule::Pattern(Arc::clone(p)));
    }
}
