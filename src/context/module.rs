use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use super::{ModuleContext, OnModuleInit};
use crate::binding::Bindings;
use crate::resolver::ValueExplorer;
use crate::Error;

/// A module contributed to an [`AppContext`](super::AppContext) at build time.
///
/// A global module's init hooks see every managed instance. A non-global
/// module's hooks only see instances of modules that import it by name.
pub struct DynamicModule {
    name: String,
    global: bool,
    hooks: Vec<Arc<dyn OnModuleInit>>,
}

impl DynamicModule {
    pub fn new(name: impl Into<String>, global: bool) -> Self {
        Self {
            name: name.into(),
            global,
            hooks: Vec::new(),
        }
    }

    /// Adds a hook fired once when the context initializes.
    #[must_use]
    pub fn with_hook(mut self, hook: Arc<dyn OnModuleInit>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_global(&self) -> bool {
        self.global
    }

    pub(crate) fn hooks(&self) -> &[Arc<dyn OnModuleInit>] {
        &self.hooks
    }
}

impl fmt::Debug for DynamicModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicModule")
            .field("name", &self.name)
            .field("global", &self.global)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

/// Options for [`ValueModule`], loadable from the host's own configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ModuleOptions {
    /// Bind instances of every module (`true`) or only of importers (`false`).
    pub global: bool,
}

impl Default for ModuleOptions {
    fn default() -> Self {
        Self { global: true }
    }
}

/// The module that resolves configuration bindings on init.
pub struct ValueModule;

impl ValueModule {
    /// Name other modules use to import it.
    pub const NAME: &'static str = "ValueModule";

    /// Builds the module around a [`ValueExplorer`] over `bindings`.
    pub fn register(bindings: Arc<Bindings>, global: bool) -> DynamicModule {
        DynamicModule::new(Self::NAME, global).with_hook(Arc::new(ValueExplorer::new(bindings)))
    }

    pub fn with_options(bindings: Arc<Bindings>, options: ModuleOptions) -> DynamicModule {
        Self::register(bindings, options.global)
    }
}

impl OnModuleInit for ValueExplorer {
    fn on_module_init(&self, ctx: &ModuleContext<'_>) -> Result<(), Error> {
        self.resolve(ctx.config(), ctx.discovery())?;
        Ok(())
    }
}
