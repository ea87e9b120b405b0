use crate::binding::BindingError;
use crate::config::ConfigError;
use crate::resolver::ResolveError;
use thiserror::Error;

/// Top-level error type for the config-value library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("binding error: {0}")]
    Binding(#[from] BindingError),

    #[error("resolution failed: {0}")]
    Resolve(#[from] ResolveError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("application context requires a configuration")]
    MissingConfig,

    #[error("application context is already initialized")]
    AlreadyInitialized,

    #[error("imported module `{0}` is not registered")]
    UnknownModule(String),
}
