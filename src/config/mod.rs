//! Configuration lookup: the capability bound fields are resolved through.

mod error;
mod path;
mod store;

pub use error::ConfigError;
pub use path::{parse_path, Segment};
pub use store::{ConfigLookup, ConfigStore};
