use thiserror::Error;

use super::ClassId;

/// Errors raised while recording field bindings.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum BindingError {
    #[error("`{class}` has no bindable field `{field}`")]
    UnknownField { class: ClassId, field: String },

    #[error("binding for `{class}.{field}` has an empty configuration path")]
    EmptyPath { class: ClassId, field: String },
}
