use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use serde::de::DeserializeOwned;
use toml::Value;

use super::{BindingError, Recorder};

/// Stable identity of a type, used as the key for binding metadata.
///
/// Two ids are equal when they refer to the same type; the name is kept
/// only for diagnostics.
#[derive(Clone, Copy)]
pub struct ClassId {
    type_id: TypeId,
    name: &'static str,
}

impl ClassId {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ClassId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ClassId {}

impl Hash for ClassId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClassId").field(&self.name).finish()
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A field slot written once by the resolver.
///
/// Starts unresolved. The resolution pass stores the backend's answer,
/// after which the slot is read-only; a second write is rejected. A
/// resolved slot may still hold no value when the path was absent and no
/// default was declared.
#[derive(Debug, Default)]
pub struct Bound {
    cell: OnceLock<Option<Value>>,
}

impl Bound {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Returns the resolved value, if any.
    pub fn get(&self) -> Option<&Value> {
        self.cell.get().and_then(Option::as_ref)
    }

    /// Deserializes the resolved value into `T`.
    ///
    /// Returns `Ok(None)` while unresolved or when resolution produced no value.
    pub fn get_as<T: DeserializeOwned>(&self) -> Result<Option<T>, toml::de::Error> {
        self.get().cloned().map(|value| value.try_into()).transpose()
    }

    pub fn is_resolved(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Stores the resolved value. Hands it back if the slot was already set.
    pub(crate) fn resolve(&self, value: Option<Value>) -> Result<(), Option<Value>> {
        self.cell.set(value)
    }
}

/// An instance the container can hand to the resolver.
///
/// Types without bound fields implement this with the default `slot`.
pub trait Managed: Send + Sync + 'static {
    /// Returns the slot backing `field`, if the type has one.
    fn slot(&self, _field: &str) -> Option<&Bound> {
        None
    }
}

/// A type whose fields bind to configuration paths.
///
/// Usually implemented with [`bindable!`](crate::bindable).
pub trait Bindable: Managed + Sized {
    /// Names of the fields that can be bound.
    fn fields() -> &'static [&'static str];

    /// Records this type's bindings.
    fn declare(recorder: &mut Recorder<'_, Self>) -> Result<(), BindingError>;
}
