//! Request-lifetime key/value store read by the view layer.

use std::collections::BTreeMap;

use serde_json::Value;

/// Request-scoped attribute store.
///
/// Values are `serde_json::Value` so any view technology can render them.
///
/// # Examples
///
/// ```
/// use action_pipeline::Scope;
/// use serde_json::json;
///
/// let mut scope = Scope::new();
/// scope.set("name", json!("Alice"));
///
/// assert_eq!(scope.get("name"), Some(&json!("Alice")));
/// assert_eq!(scope.remove("name"), Some(json!("Alice")));
/// assert!(scope.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    attributes: BTreeMap<String, Value>,
}

impl Scope {
    /// Creates an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.attributes.insert(key.into(), value);
    }

    /// Removes and returns the value stored under `key`.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.attributes.remove(key)
    }

    /// Returns `true` if a value is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    /// Returns the number of stored attributes.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Returns `true` if no attributes are stored.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Iterates attributes in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }
}
