use thiserror::Error;

use crate::binding::ClassId;

/// Errors raised during a resolution pass.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResolveError {
    #[error("configuration conflict: `{class}.{field}` was already resolved")]
    ConfigurationConflict { class: ClassId, field: String },

    #[error("`{class}` declares a binding for `{field}` but exposes no slot for it")]
    MissingSlot { class: ClassId, field: String },
}
