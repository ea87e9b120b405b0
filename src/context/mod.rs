//! A minimal application container: holds managed instances, the
//! configuration lookup, and the modules whose init hooks run at startup.

mod module;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info};

use crate::binding::Managed;
use crate::config::ConfigLookup;
use crate::resolver::{Discovery, InstanceKind, InstanceWrapper};
use crate::Error;

pub use module::{DynamicModule, ModuleOptions, ValueModule};

/// Lifecycle hook fired once, after every instance has been constructed.
pub trait OnModuleInit: Send + Sync {
    fn on_module_init(&self, ctx: &ModuleContext<'_>) -> Result<(), Error>;
}

/// What a module's init hook can see.
pub struct ModuleContext<'a> {
    module: &'a str,
    config: &'a dyn ConfigLookup,
    discovery: &'a dyn Discovery,
}

impl<'a> ModuleContext<'a> {
    /// Name of the module whose hook is running.
    pub fn module(&self) -> &'a str {
        self.module
    }

    pub fn config(&self) -> &'a dyn ConfigLookup {
        self.config
    }

    /// Instances visible to this module.
    pub fn discovery(&self) -> &'a dyn Discovery {
        self.discovery
    }
}

/// Central application context holding the configuration lookup and every
/// managed instance.
///
/// Instances are registered while building. [`init`](Self::init) then fires
/// each module's init hooks exactly once; that is the point at which
/// [`ValueModule`] binds configuration onto instances.
///
/// ## Example
///
/// ```
/// use std::sync::Arc;
/// use config_value::{bindable, AppContext, Bindings, Bound, ConfigStore, ValueModule};
///
/// #[derive(Default)]
/// struct Db {
///     host: Bound,
/// }
///
/// bindable!(Db { host: "db.host" = "localhost" });
///
/// let bindings = Arc::new(Bindings::builder().register::<Db>()?.build());
/// let db = Arc::new(Db::default());
///
/// let mut ctx = AppContext::builder()
///     .with_config(ConfigStore::new())
///     .with_module(ValueModule::register(bindings, true))
///     .provider("app", "db", Arc::clone(&db))
///     .build()?;
/// ctx.init()?;
///
/// assert_eq!(db.host.get_as::<String>()?.as_deref(), Some("localhost"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct AppContext<C> {
    config: C,
    instances: Vec<InstanceWrapper>,
    modules: Vec<DynamicModule>,
    imports: HashMap<String, HashSet<String>>,
    initialized: bool,
}

impl<C> AppContext<C> {
    /// Returns a reference to the configuration.
    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn instances(&self) -> &[InstanceWrapper] {
        &self.instances
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl<C: ConfigLookup> AppContext<C> {
    /// Fires every module's init hooks, in registration order.
    ///
    /// Runs at most once. The first hook failure aborts startup; effects of
    /// hooks that already ran are kept.
    pub fn init(&mut self) -> Result<(), Error> {
        if self.initialized {
            return Err(Error::AlreadyInitialized);
        }
        self.initialized = true;

        for module in &self.modules {
            let importers = (!module.is_global()).then(|| self.importers_of(module.name()));
            let scope = Scope {
                instances: &self.instances,
                modules: importers,
            };
            let ctx = ModuleContext {
                module: module.name(),
                config: &self.config,
                discovery: &scope,
            };

            debug!(module = module.name(), global = module.is_global(), "initializing module");
            for hook in module.hooks() {
                hook.on_module_init(&ctx)?;
            }
        }

        info!(
            modules = self.modules.len(),
            instances = self.instances.len(),
            "application context initialized"
        );
        Ok(())
    }

    fn importers_of(&self, name: &str) -> HashSet<&str> {
        self.imports
            .iter()
            .filter(|(_, imported)| imported.contains(name))
            .map(|(importer, _)| importer.as_str())
            .collect()
    }
}

impl AppContext<()> {
    /// Creates a new builder for constructing an `AppContext`.
    pub fn builder() -> AppContextBuilder<()> {
        AppContextBuilder {
            config: None,
            instances: Vec::new(),
            modules: Vec::new(),
            imports: HashMap::new(),
        }
    }
}

/// Instances visible to one module's hooks.
struct Scope<'a> {
    instances: &'a [InstanceWrapper],
    /// `None` when every module is visible.
    modules: Option<HashSet<&'a str>>,
}

impl Scope<'_> {
    fn visible(&self, kind: InstanceKind) -> Vec<&InstanceWrapper> {
        self.instances
            .iter()
            .filter(|w| w.kind() == kind)
            .filter(|w| self.modules.as_ref().map_or(true, |m| m.contains(w.module())))
            .collect()
    }
}

impl Discovery for Scope<'_> {
    fn providers(&self) -> Vec<&InstanceWrapper> {
        self.visible(InstanceKind::Provider)
    }

    fn controllers(&self) -> Vec<&InstanceWrapper> {
        self.visible(InstanceKind::Controller)
    }
}

/// Builder for constructing an [`AppContext`].
///
/// The builder starts with no config (`AppContextBuilder<()>`) and transitions
/// to `AppContextBuilder<C>` when [`with_config`](Self::with_config) is called.
#[derive(Debug)]
#[must_use = "builders do nothing until .build() is called"]
pub struct AppContextBuilder<C> {
    config: Option<C>,
    instances: Vec<InstanceWrapper>,
    modules: Vec<DynamicModule>,
    imports: HashMap<String, HashSet<String>>,
}

impl AppContextBuilder<()> {
    /// Attaches the configuration lookup to the application context.
    pub fn with_config<C>(self, config: C) -> AppContextBuilder<C> {
        AppContextBuilder {
            config: Some(config),
            instances: self.instances,
            modules: self.modules,
            imports: self.imports,
        }
    }
}

impl<C> AppContextBuilder<C> {
    /// Adds a module; its hooks run on [`AppContext::init`].
    pub fn with_module(mut self, module: DynamicModule) -> Self {
        self.modules.push(module);
        self
    }

    /// Registers a provider instance in `module`.
    pub fn provider<T: Managed>(
        self,
        module: impl Into<String>,
        name: impl Into<String>,
        instance: Arc<T>,
    ) -> Self {
        self.instance(InstanceWrapper::new(name, module, InstanceKind::Provider, instance))
    }

    /// Registers a controller instance in `module`.
    pub fn controller<T: Managed>(
        self,
        module: impl Into<String>,
        name: impl Into<String>,
        instance: Arc<T>,
    ) -> Self {
        self.instance(InstanceWrapper::new(name, module, InstanceKind::Controller, instance))
    }

    /// Registers a pre-built wrapper.
    pub fn instance(mut self, wrapper: InstanceWrapper) -> Self {
        self.instances.push(wrapper);
        self
    }

    /// Makes `module` import the module named `imported`.
    pub fn import(mut self, module: impl Into<String>, imported: impl Into<String>) -> Self {
        self.imports
            .entry(module.into())
            .or_default()
            .insert(imported.into());
        self
    }

    /// Builds the `AppContext`.
    ///
    /// Returns an error if no configuration was provided, or if either side
    /// of an import names a module that is neither registered nor owns any
    /// instance.
    pub fn build(self) -> Result<AppContext<C>, Error> {
        let config = self.config.ok_or(Error::MissingConfig)?;

        let known: HashSet<&str> = self
            .modules
            .iter()
            .map(DynamicModule::name)
            .chain(self.instances.iter().map(InstanceWrapper::module))
            .collect();
        if let Some(unknown) = self
            .imports
            .iter()
            .flat_map(|(importer, imported)| std::iter::once(importer).chain(imported))
            .find(|name| !known.contains(name.as_str()))
        {
            return Err(Error::UnknownModule(unknown.clone()));
        }

        Ok(AppContext {
            config,
            instances: self.instances,
            modules: self.modules,
            imports: self.imports,
            initialized: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{Bindings, Bound};
    use crate::config::ConfigStore;
    use crate::resolver::ResolveError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Db {
        host: Bound,
    }

    crate::bindable!(Db { host: "db.host" = "localhost" });

    fn bindings() -> Arc<Bindings> {
        Arc::new(Bindings::builder().register::<Db>().unwrap().build())
    }

    #[derive(Default)]
    struct CountingHook {
        fired: AtomicUsize,
        seen: AtomicUsize,
    }

    impl OnModuleInit for CountingHook {
        fn on_module_init(&self, ctx: &ModuleContext<'_>) -> Result<(), Error> {
            self.fired.fetch_add(1, Ordering::SeqCst);
            let seen = ctx.discovery().providers().len() + ctx.discovery().controllers().len();
            self.seen.store(seen, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_build_without_config() {
        let result = AppContext::builder().build();
        assert!(matches!(result, Err(Error::MissingConfig)));
    }

    #[test]
    fn test_init_fires_hooks_once() {
        let hook = Arc::new(CountingHook::default());
        let mut ctx = AppContext::builder()
            .with_config(ConfigStore::new())
            .with_module(DynamicModule::new("probe", true).with_hook(hook.clone()))
            .provider("app", "db", Arc::new(Db::default()))
            .build()
            .unwrap();

        ctx.init().unwrap();
        assert!(ctx.is_initialized());
        assert!(matches!(ctx.init(), Err(Error::AlreadyInitialized)));
        assert_eq!(hook.fired.load(Ordering::SeqCst), 1);
        assert_eq!(hook.seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_global_module_binds_every_module() {
        let api = Arc::new(Db::default());
        let jobs = Arc::new(Db::default());

        let mut ctx = AppContext::builder()
            .with_config(ConfigStore::new())
            .with_module(ValueModule::register(bindings(), true))
            .provider("api", "db", Arc::clone(&api))
            .controller("jobs", "db", Arc::clone(&jobs))
            .build()
            .unwrap();
        ctx.init().unwrap();

        assert!(api.host.is_resolved());
        assert!(jobs.host.is_resolved());
    }

    #[test]
    fn test_non_global_module_binds_importers_only() {
        let api = Arc::new(Db::default());
        let jobs = Arc::new(Db::default());

        let mut ctx = AppContext::builder()
            .with_config(ConfigStore::new())
            .with_module(ValueModule::register(bindings(), false))
            .provider("api", "db", Arc::clone(&api))
            .provider("jobs", "db", Arc::clone(&jobs))
            .import("api", ValueModule::NAME)
            .build()
            .unwrap();
        ctx.init().unwrap();

        assert_eq!(api.host.get_as::<String>().unwrap().as_deref(), Some("localhost"));
        assert!(!jobs.host.is_resolved());
    }

    #[test]
    fn test_import_of_unknown_module_fails() {
        let result = AppContext::builder()
            .with_config(ConfigStore::new())
            .provider("api", "db", Arc::new(Db::default()))
            .import("api", "Nowhere")
            .build();

        assert!(matches!(result, Err(Error::UnknownModule(name)) if name == "Nowhere"));
    }

    #[test]
    fn test_import_from_unknown_module_fails() {
        let result = AppContext::builder()
            .with_config(ConfigStore::new())
            .with_module(ValueModule::register(bindings(), false))
            .provider("api", "db", Arc::new(Db::default()))
            .import("apii", ValueModule::NAME)
            .build();

        assert!(matches!(result, Err(Error::UnknownModule(name)) if name == "apii"));
    }

    #[test]
    fn test_hook_failure_aborts_init() {
        let db = Arc::new(Db::default());
        let mut ctx = AppContext::builder()
            .with_config(ConfigStore::new())
            // Two resolvers over the same instances: the second one conflicts.
            .with_module(ValueModule::register(bindings(), true))
            .with_module(ValueModule::register(bindings(), true))
            .provider("app", "db", Arc::clone(&db))
            .build()
            .unwrap();

        let result = ctx.init();

        assert!(matches!(
            result,
            Err(Error::Resolve(ResolveError::ConfigurationConflict { .. }))
        ));
        assert!(db.host.is_resolved());
    }
}
