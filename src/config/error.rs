use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid key path: {0}")]
    InvalidPath(String),

    #[error("cannot write '{0}': an intermediate value is not a table")]
    NotATable(String),
}
