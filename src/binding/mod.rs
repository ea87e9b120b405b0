//! Binding declarations: which fields of which types take which
//! configuration paths.

mod class;
mod error;
mod macros;
mod metadata;
mod registry;

pub use class::{Bindable, Bound, ClassId, Managed};
pub use error::BindingError;
pub use metadata::{Binding, ClassMetadata, MetadataStore};
pub use registry::{Bindings, BindingsBuilder, ClassRegistry, Recorder};
