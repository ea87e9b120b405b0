use std::collections::{BTreeMap, HashMap};

use toml::Value;

use super::ClassId;

/// A single field's configuration contract.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    field: &'static str,
    path: String,
    default: Option<Value>,
}

impl Binding {
    pub(crate) fn new(field: &'static str, path: String, default: Option<Value>) -> Self {
        Self {
            field,
            path,
            default,
        }
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

/// All bindings declared on one class, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassMetadata {
    bindings: BTreeMap<&'static str, Binding>,
}

impl ClassMetadata {
    /// Adds or replaces the binding for its field.
    pub(crate) fn merge(&mut self, binding: Binding) {
        self.bindings.insert(binding.field, binding);
    }

    pub fn get(&self, field: &str) -> Option<&Binding> {
        self.bindings.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.values()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Per-class binding metadata. Records only ever grow.
#[derive(Debug, Clone, Default)]
pub struct MetadataStore {
    classes: HashMap<ClassId, ClassMetadata>,
}

impl MetadataStore {
    /// Merges `binding` into the record for `class`, creating it on first use.
    pub(crate) fn record(&mut self, class: ClassId, binding: Binding) {
        self.classes.entry(class).or_default().merge(binding);
    }

    pub fn get(&self, class: &ClassId) -> Option<&ClassMetadata> {
        self.classes.get(class)
    }
}
