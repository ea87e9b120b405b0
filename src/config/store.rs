use toml::{Table, Value};

use super::path::{insert, lookup, parse_path};
use super::ConfigError;

/// Path-based configuration lookup.
///
/// This is the only thing the resolver needs from a configuration backend.
/// Implementations return the stored value at `path`, else a clone of
/// `default`, else `None`. Values are handed back verbatim; no coercion or
/// validation happens on either side of this trait.
pub trait ConfigLookup {
    fn get(&self, path: &str, default: Option<&Value>) -> Option<Value>;
}

/// In-memory configuration store over an already-built TOML table.
///
/// The store does not read files or the environment; the host builds the
/// table however it likes and hands it over.
///
/// ## Example
///
/// ```
/// use config_value::{ConfigLookup, ConfigStore};
///
/// let table: toml::Table = toml::from_str("[db]\nport = 5432").unwrap();
/// let store = ConfigStore::from(table);
///
/// assert_eq!(store.get("db.port", None), Some(toml::Value::Integer(5432)));
/// assert_eq!(
///     store.get("db.host", Some(&"localhost".into())),
///     Some(toml::Value::from("localhost"))
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigStore {
    root: Table,
}

impl ConfigStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value at `path`, if present.
    ///
    /// Malformed paths read as absent.
    pub fn value(&self, path: &str) -> Option<&Value> {
        let segments = parse_path(path).ok()?;
        lookup(&self.root, &segments)
    }

    /// Returns `true` if a value is stored at `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.value(path).is_some()
    }

    /// Stores `value` at `path`, creating intermediate tables as needed.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> Result<(), ConfigError> {
        let segments = parse_path(path)?;
        insert(&mut self.root, &segments, value.into(), path)
    }

    /// Returns the underlying table.
    pub fn as_table(&self) -> &Table {
        &self.root
    }
}

impl From<Table> for ConfigStore {
    fn from(root: Table) -> Self {
        Self { root }
    }
}

impl ConfigLookup for ConfigStore {
    fn get(&self, path: &str, default: Option<&Value>) -> Option<Value> {
        self.value(path).or(default).cloned()
    }
}

impl<L: ConfigLookup + ?Sized> ConfigLookup for &L {
    fn get(&self, path: &str, default: Option<&Value>) -> Option<Value> {
        (**self).get(path, default)
    }
}

impl<L: ConfigLookup + ?Sized> ConfigLookup for std::sync::Arc<L> {
    fn get(&self, path: &str, default: Option<&Value>) -> Option<Value> {
        (**self).get(path, default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_store(toml_str: &str) -> ConfigStore {
        ConfigStore::from(toml::from_str::<Table>(toml_str).unwrap())
    }

    #[test]
    fn test_present_value_wins_over_default() {
        let store = make_store("[a]\nb = 10");
        let default = Value::Integer(42);
        assert_eq!(store.get("a.b", Some(&default)), Some(Value::Integer(10)));
    }

    #[test]
    fn test_absent_path_falls_back_to_default() {
        let store = make_store("[a]\nc = 1");
        let default = Value::Integer(42);
        assert_eq!(store.get("a.b", Some(&default)), Some(Value::Integer(42)));
    }

    #[test]
    fn test_absent_path_without_default_is_none() {
        let store = make_store("");
        assert_eq!(store.get("a.b", None), None);
    }

    #[test]
    fn test_malformed_path_reads_as_absent() {
        let store = make_store("a = 1");
        let default = Value::from("fallback");
        assert_eq!(store.get("a..", Some(&default)), Some(default.clone()));
    }

    #[test]
    fn test_non_scalar_values_returned_verbatim() {
        let store = make_store("[db]\nhosts = [\"a\", \"b\"]");
        let hosts = store.get("db", None).unwrap();
        assert!(hosts.is_table());
        assert_eq!(hosts["hosts"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_set_then_get() {
        let mut store = ConfigStore::new();
        assert!(!store.contains("db.host"));
        store.set("db.host", "prod.example.com").unwrap();
        assert_eq!(
            store.get("db.host", None),
            Some(Value::from("prod.example.com"))
        );
    }

    #[test]
    fn test_failed_set_leaves_store_unchanged() {
        let mut store = ConfigStore::new();
        let result = store.set("db.hosts[0]", "a");

        assert!(matches!(result, Err(ConfigError::NotATable(_))));
        assert!(!store.contains("db"));
        assert!(store.as_table().is_empty());
    }

    #[test]
    fn test_set_rejects_invalid_path() {
        let mut store = ConfigStore::new();
        let result = store.set("db..host", 1);
        assert!(matches!(result, Err(ConfigError::InvalidPath(_))));
    }
}
