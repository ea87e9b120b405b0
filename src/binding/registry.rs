use std::collections::HashSet;
use std::marker::PhantomData;

use toml::Value;
use tracing::debug;

use super::metadata::{Binding, ClassMetadata, MetadataStore};
use super::{Bindable, BindingError, ClassId};

/// Set of classes that own at least one binding. Insert-only.
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    classes: HashSet<ClassId>,
}

impl ClassRegistry {
    pub(crate) fn insert(&mut self, class: ClassId) -> bool {
        self.classes.insert(class)
    }

    pub fn contains(&self, class: &ClassId) -> bool {
        self.classes.contains(class)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassId> {
        self.classes.iter()
    }
}

/// Every binding declared in the application, frozen.
///
/// Built once with [`Bindings::builder`] during startup and shared with the
/// resolver (typically as an `Arc<Bindings>`). Nothing can be added after
/// [`BindingsBuilder::build`].
///
/// ## Example
///
/// ```
/// use config_value::{bindable, Bindings, Bound, ClassId};
///
/// #[derive(Default)]
/// struct Db {
///     host: Bound,
///     port: Bound,
/// }
///
/// bindable!(Db {
///     host: "db.host" = "localhost",
///     port: "db.port" = 5432,
/// });
///
/// let bindings = Bindings::builder().register::<Db>()?.build();
///
/// let metadata = bindings.metadata(&ClassId::of::<Db>()).unwrap();
/// assert_eq!(metadata.get("host").unwrap().path(), "db.host");
/// # Ok::<(), config_value::BindingError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    metadata: MetadataStore,
    classes: ClassRegistry,
}

impl Bindings {
    pub fn builder() -> BindingsBuilder {
        BindingsBuilder::default()
    }

    /// Returns `true` if `class` declared at least one binding.
    pub fn is_registered(&self, class: &ClassId) -> bool {
        self.classes.contains(class)
    }

    pub fn metadata(&self, class: &ClassId) -> Option<&ClassMetadata> {
        self.metadata.get(class)
    }

    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }
}

/// Records bindings before they are frozen into [`Bindings`].
///
/// Classes can be registered in any order; each class's record is
/// independent.
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct BindingsBuilder {
    metadata: MetadataStore,
    classes: ClassRegistry,
}

impl BindingsBuilder {
    /// Records every binding `C` declares.
    pub fn register<C: Bindable>(mut self) -> Result<Self, BindingError> {
        C::declare(&mut Recorder {
            builder: &mut self,
            _class: PhantomData,
        })?;
        Ok(self)
    }

    /// Binds `field` of `C` to `path`, with an optional default.
    ///
    /// Declaring the same field again replaces its binding. Fails if `C`
    /// has no such bindable field or if `path` is empty.
    pub fn declare_binding<C: Bindable>(
        mut self,
        field: &'static str,
        path: impl Into<String>,
        default: Option<Value>,
    ) -> Result<Self, BindingError> {
        self.record::<C>(field, path.into(), default)?;
        Ok(self)
    }

    /// Freezes the recorded bindings.
    pub fn build(self) -> Bindings {
        Bindings {
            metadata: self.metadata,
            classes: self.classes,
        }
    }

    fn record<C: Bindable>(
        &mut self,
        field: &'static str,
        path: String,
        default: Option<Value>,
    ) -> Result<(), BindingError> {
        let class = ClassId::of::<C>();

        if !C::fields().contains(&field) {
            return Err(BindingError::UnknownField {
                class,
                field: field.to_string(),
            });
        }
        if path.is_empty() {
            return Err(BindingError::EmptyPath {
                class,
                field: field.to_string(),
            });
        }

        debug!(%class, field, %path, has_default = default.is_some(), "recorded binding");
        self.metadata.record(class, Binding::new(field, path, default));
        if self.classes.insert(class) {
            debug!(%class, "registered bindable class");
        }
        Ok(())
    }
}

/// Declaration handle passed to [`Bindable::declare`].
pub struct Recorder<'a, C> {
    builder: &'a mut BindingsBuilder,
    _class: PhantomData<fn() -> C>,
}

impl<C: Bindable> Recorder<'_, C> {
    /// Binds `field` to `path`, with an optional default.
    pub fn bind(
        &mut self,
        field: &'static str,
        path: impl Into<String>,
        default: Option<Value>,
    ) -> Result<&mut Self, BindingError> {
        self.builder.record::<C>(field, path.into(), default)?;
        Ok(self)
    }

    /// Binds `field` to `path`, falling back to `default` when absent.
    pub fn bind_or(
        &mut self,
        field: &'static str,
        path: impl Into<String>,
        default: impl Into<Value>,
    ) -> Result<&mut Self, BindingError> {
        self.bind(field, path, Some(default.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{Bound, Managed};

    #[derive(Default)]
    struct Db {
        host: Bound,
        port: Bound,
    }

    impl Managed for Db {
        fn slot(&self, field: &str) -> Option<&Bound> {
            match field {
                "host" => Some(&self.host),
                "port" => Some(&self.port),
                _ => None,
            }
        }
    }

    impl Bindable for Db {
        fn fields() -> &'static [&'static str] {
            &["host", "port"]
        }

        fn declare(recorder: &mut Recorder<'_, Self>) -> Result<(), BindingError> {
            recorder
                .bind_or("host", "db.host", "localhost")?
                .bind("port", "db.port", None)?;
            Ok(())
        }
    }

    #[derive(Default)]
    struct Cache {
        ttl: Bound,
    }

    impl Managed for Cache {
        fn slot(&self, field: &str) -> Option<&Bound> {
            (field == "ttl").then_some(&self.ttl)
        }
    }

    impl Bindable for Cache {
        fn fields() -> &'static [&'static str] {
            &["ttl"]
        }

        fn declare(_recorder: &mut Recorder<'_, Self>) -> Result<(), BindingError> {
            Ok(())
        }
    }

    #[test]
    fn test_register_records_all_fields() {
        let bindings = Bindings::builder().register::<Db>().unwrap().build();

        assert!(bindings.is_registered(&ClassId::of::<Db>()));
        let metadata = bindings.metadata(&ClassId::of::<Db>()).unwrap();
        assert_eq!(metadata.len(), 2);
        assert_eq!(
            metadata.get("host").unwrap().default_value(),
            Some(&Value::from("localhost"))
        );
        assert_eq!(metadata.get("port").unwrap().default_value(), None);
    }

    #[test]
    fn test_class_without_bindings_is_not_registered() {
        let bindings = Bindings::builder().register::<Cache>().unwrap().build();

        assert!(!bindings.is_registered(&ClassId::of::<Cache>()));
        assert!(bindings.metadata(&ClassId::of::<Cache>()).is_none());
        assert!(bindings.classes().is_empty());
    }

    #[test]
    fn test_separate_declarations_merge() {
        let bindings = Bindings::builder()
            .declare_binding::<Db>("host", "db.host", None)
            .unwrap()
            .declare_binding::<Db>("port", "db.port", Some(Value::Integer(5432)))
            .unwrap()
            .build();

        let metadata = bindings.metadata(&ClassId::of::<Db>()).unwrap();
        assert_eq!(metadata.len(), 2);
        assert_eq!(bindings.classes().len(), 1);
    }

    #[test]
    fn test_redeclaring_identical_binding_keeps_one_entry() {
        let bindings = Bindings::builder()
            .register::<Db>()
            .unwrap()
            .register::<Db>()
            .unwrap()
            .build();

        let metadata = bindings.metadata(&ClassId::of::<Db>()).unwrap();
        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata.get("host").unwrap().path(), "db.host");
    }

    #[test]
    fn test_class_order_is_irrelevant() {
        let forward = Bindings::builder()
            .declare_binding::<Cache>("ttl", "cache.ttl", None)
            .and_then(|b| b.register::<Db>())
            .unwrap()
            .build();
        let backward = Bindings::builder()
            .register::<Db>()
            .and_then(|b| b.declare_binding::<Cache>("ttl", "cache.ttl", None))
            .unwrap()
            .build();

        for bindings in [forward, backward] {
            assert_eq!(bindings.classes().len(), 2);
            assert_eq!(bindings.metadata(&ClassId::of::<Db>()).unwrap().len(), 2);
            assert_eq!(bindings.metadata(&ClassId::of::<Cache>()).unwrap().len(), 1);
        }
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = Bindings::builder().declare_binding::<Db>("user", "db.user", None);
        assert!(matches!(
            result,
            Err(BindingError::UnknownField { field, .. }) if field == "user"
        ));
    }

    #[test]
    fn test_empty_path_rejected() {
        let result = Bindings::builder().declare_binding::<Db>("host", "", None);
        assert!(matches!(result, Err(BindingError::EmptyPath { .. })));
    }
}
