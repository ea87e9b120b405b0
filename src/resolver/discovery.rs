//! Enumeration of container-managed instances.

use std::fmt;
use std::sync::Arc;

use crate::binding::{ClassId, Managed};

/// What role an instance plays in its module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceKind {
    Provider,
    Controller,
}

/// A managed instance as seen by the resolver.
///
/// `instance` is `None` for entries the container has not instantiated.
/// `class` is `None` when the concrete type was erased before registration,
/// e.g. a provider built by a factory returning `Arc<dyn Managed>`.
#[derive(Clone)]
pub struct InstanceWrapper {
    name: String,
    module: String,
    kind: InstanceKind,
    class: Option<ClassId>,
    instance: Option<Arc<dyn Managed>>,
}

impl InstanceWrapper {
    /// Wraps an instance whose concrete type is known.
    pub fn new<T: Managed>(
        name: impl Into<String>,
        module: impl Into<String>,
        kind: InstanceKind,
        instance: Arc<T>,
    ) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
            kind,
            class: Some(ClassId::of::<T>()),
            instance: Some(instance as Arc<dyn Managed>),
        }
    }

    /// Wraps a type-erased instance; it has no class identity.
    pub fn erased(
        name: impl Into<String>,
        module: impl Into<String>,
        kind: InstanceKind,
        instance: Arc<dyn Managed>,
    ) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
            kind,
            class: None,
            instance: Some(instance),
        }
    }

    /// An entry with no instance behind it yet.
    pub fn pending<T: Managed>(
        name: impl Into<String>,
        module: impl Into<String>,
        kind: InstanceKind,
    ) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
            kind,
            class: Some(ClassId::of::<T>()),
            instance: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn kind(&self) -> InstanceKind {
        self.kind
    }

    pub fn class(&self) -> Option<ClassId> {
        self.class
    }

    pub fn instance(&self) -> Option<&Arc<dyn Managed>> {
        self.instance.as_ref()
    }
}

impl fmt::Debug for InstanceWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceWrapper")
            .field("name", &self.name)
            .field("module", &self.module)
            .field("kind", &self.kind)
            .field("class", &self.class)
            .field("instantiated", &self.instance.is_some())
            .finish()
    }
}

/// Lists the instances a container currently manages.
pub trait Discovery {
    fn providers(&self) -> Vec<&InstanceWrapper>;
    fn controllers(&self) -> Vec<&InstanceWrapper>;
}

impl Discovery for [InstanceWrapper] {
    fn providers(&self) -> Vec<&InstanceWrapper> {
        self.iter()
            .filter(|w| w.kind == InstanceKind::Provider)
            .collect()
    }

    fn controllers(&self) -> Vec<&InstanceWrapper> {
        self.iter()
            .filter(|w| w.kind == InstanceKind::Controller)
            .collect()
    }
}
