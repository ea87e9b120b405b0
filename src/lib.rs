//! Declarative binding of configuration values onto fields of
//! container-managed instances.
//!
//! Types declare which of their [`Bound`] fields map to which configuration
//! paths (usually with [`bindable!`]). The declarations are collected once
//! into [`Bindings`]. When the [`AppContext`] initializes, the
//! [`ValueModule`]'s [`ValueExplorer`] walks every managed instance of a
//! registered type, asks the [`ConfigLookup`] for each path and writes the
//! answer onto that instance's slot.

pub mod binding;
pub mod config;
pub mod context;
mod error;
pub mod resolver;

pub use binding::{
    Bindable, Binding, BindingError, Bindings, BindingsBuilder, Bound, ClassId, ClassMetadata,
    Managed, Recorder,
};
pub use config::{ConfigError, ConfigLookup, ConfigStore};
pub use context::{
    AppContext, DynamicModule, ModuleContext, ModuleOptions, OnModuleInit, ValueModule,
};
pub use error::Error;
pub use resolver::{
    Discovery, InstanceKind, InstanceWrapper, ResolveError, ResolveReport, ValueExplorer,
};
pub use toml::Value;
