//! Publication of object properties into request scope.
//!
//! Each action and form type declares a [`Schema`]: an ordered list of
//! named properties with value providers. After a request chain finishes
//! (successfully or not) the pipeline walks the schema and writes every
//! value into the [`Scope`] for the view layer.
//!
//! Three kinds of property exist:
//!
//! - **field**: written under its own name
//! - **getter**: declared as `getXxx`, written under `xxx`
//! - **flag**: a boolean declared as `isXxx`, written under `xxx`
//!
//! Fields are written before getters and flags, so an accessor wins over a
//! field that publishes under the same key.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::error::Error;
use crate::scope::Scope;

const GETTER_PREFIX: &str = "get";
const FLAG_PREFIX: &str = "is";

/// Reason a property value could not be produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessError(String);

impl AccessError {
    /// Creates an access error.
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

impl std::fmt::Display for AccessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a property is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// A public data member
    Field,
    /// A `get…` accessor
    Getter,
    /// An `is…` boolean accessor
    Flag,
}

type Reader<T> = Arc<dyn Fn(&T) -> Result<Value, AccessError> + Send + Sync>;

struct Property<T> {
    name: String,
    kind: PropertyKind,
    read: Reader<T>,
}

impl<T> Property<T> {
    /// Scope key this property publishes under, if it qualifies at all.
    fn scope_key(&self) -> Option<String> {
        match self.kind {
            PropertyKind::Field => (!self.name.is_empty()).then(|| self.name.clone()),
            PropertyKind::Getter => accessor_key(&self.name, GETTER_PREFIX),
            PropertyKind::Flag => accessor_key(&self.name, FLAG_PREFIX),
        }
    }
}

fn accessor_key(name: &str, prefix: &str) -> Option<String> {
    name.strip_prefix(prefix)
        .filter(|rest| !rest.is_empty())
        .map(decapitalize)
}

fn to_value<V: Serialize>(value: V) -> Result<Value, AccessError> {
    serde_json::to_value(value).map_err(|e| AccessError::new(e.to_string()))
}

/// Ordered property declarations for a type.
///
/// # Examples
///
/// ```
/// use action_pipeline::{publish, AccessError, Schema, Scope};
/// use serde_json::json;
///
/// struct Profile {
///     name: String,
///     admin: bool,
/// }
///
/// let schema = Schema::<Profile>::new()
///     .field("name", |p| p.name.clone())
///     .getter("getDisplayName", |p| Ok::<_, AccessError>(format!("@{}", p.name)))
///     .flag("isAdmin", |p| Ok(p.admin));
///
/// let mut scope = Scope::new();
/// let profile = Profile { name: "alice".into(), admin: true };
/// publish(&profile, &schema, &mut scope).unwrap();
///
/// assert_eq!(scope.get("name"), Some(&json!("alice")));
/// assert_eq!(scope.get("displayName"), Some(&json!("@alice")));
/// assert_eq!(scope.get("admin"), Some(&json!(true)));
/// ```
pub struct Schema<T> {
    properties: Vec<Property<T>>,
}

impl<T: 'static> Schema<T> {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self {
            properties: Vec::new(),
        }
    }

    /// Declares a field published under its own name.
    pub fn field<V, F>(mut self, name: impl Into<String>, read: F) -> Self
    where
        V: Serialize,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.properties.push(Property {
            name: name.into(),
            kind: PropertyKind::Field,
            read: Arc::new(move |t: &T| to_value(read(t))),
        });
        self
    }

    /// Declares a `get…` accessor published under the decapitalized remainder.
    ///
    /// Accessors whose name does not start with `get` (or is exactly `get`)
    /// are registered but never published.
    pub fn getter<V, F>(mut self, name: impl Into<String>, read: F) -> Self
    where
        V: Serialize,
        F: Fn(&T) -> Result<V, AccessError> + Send + Sync + 'static,
    {
        self.properties.push(Property {
            name: name.into(),
            kind: PropertyKind::Getter,
            read: Arc::new(move |t: &T| read(t).and_then(to_value)),
        });
        self
    }

    /// Declares an `is…` boolean accessor published under the decapitalized
    /// remainder.
    pub fn flag<F>(mut self, name: impl Into<String>, read: F) -> Self
    where
        F: Fn(&T) -> Result<bool, AccessError> + Send + Sync + 'static,
    {
        self.properties.push(Property {
            name: name.into(),
            kind: PropertyKind::Flag,
            read: Arc::new(move |t: &T| read(t).map(Value::Bool)),
        });
        self
    }

    /// Folds a supertype's properties into this schema.
    ///
    /// `project` reaches the embedded supertype value. Declare the parent
    /// before the type's own properties so the derived values win on
    /// key collisions.
    pub fn inherit<P, F>(mut self, parent: Schema<P>, project: F) -> Self
    where
        P: 'static,
        F: Fn(&T) -> &P + Send + Sync + 'static,
    {
        let project = Arc::new(project);
        for property in parent.properties {
            let project = Arc::clone(&project);
            let read = property.read;
            self.properties.push(Property {
                name: property.name,
                kind: property.kind,
                read: Arc::new(move |t: &T| read((*project)(t))),
            });
        }
        self
    }

    /// Returns the number of declared properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns `true` if nothing is declared.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl<T: 'static> Default for Schema<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Types that can publish their properties into request scope.
pub trait Publish: Sized + 'static {
    /// Returns this type's property declarations, supertypes included.
    fn schema() -> Schema<Self>;
}

/// Publishes every qualifying property of `instance` into `scope`.
///
/// Fields are written first, then getters and flags in declaration order.
/// Values are staged before anything is written: if a single read fails,
/// the scope is left untouched and [`Error::Access`] is returned.
///
/// Returns the number of values written.
pub fn publish<T>(instance: &T, schema: &Schema<T>, scope: &mut Scope) -> Result<usize, Error> {
    let fields = schema
        .properties
        .iter()
        .filter(|p| p.kind == PropertyKind::Field);
    let accessors = schema
        .properties
        .iter()
        .filter(|p| p.kind != PropertyKind::Field);

    let mut staged = Vec::with_capacity(schema.properties.len());
    for property in fields.chain(accessors) {
        let Some(key) = property.scope_key() else {
            continue;
        };
        let value = (property.read)(instance).map_err(|e| Error::access(&property.name, e))?;
        staged.push((key, value));
    }

    let written = staged.len();
    for (key, value) in staged {
        scope.set(key, value);
    }
    Ok(written)
}

/// Publishes `instance` using its own declared schema.
pub fn publish_into<T: Publish>(instance: &T, scope: &mut Scope) -> Result<usize, Error> {
    publish(instance, &T::schema(), scope)
}

/// Lower-cases the first character of `name`, leaving acronyms alone.
///
/// If the first two characters are both upper-case the name is returned
/// unchanged.
///
/// # Examples
///
/// ```
/// use action_pipeline::decapitalize;
///
/// assert_eq!(decapitalize("Name"), "name");
/// assert_eq!(decapitalize("URLPath"), "URLPath");
/// assert_eq!(decapitalize("ID"), "ID");
/// ```
pub fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    if first.is_uppercase() && chars.clone().next().is_some_and(char::is_uppercase) {
        return name.to_string();
    }
    first.to_lowercase().chain(chars).collect()
}
