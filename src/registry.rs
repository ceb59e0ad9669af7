//! Per-request instance arena.
//!
//! Holds at most one instance per type for the lifetime of a request
//! processing chain. `Default` acts as the per-type factory.

use std::any::{Any, TypeId};
use std::collections::HashMap;

/// Request-scoped instance registry.
///
/// # Examples
///
/// ```
/// use action_pipeline::Registry;
///
/// #[derive(Default)]
/// struct Counter(u32);
///
/// let mut registry = Registry::new();
/// registry.get_or_insert_default::<Counter>().0 += 1;
/// registry.get_or_insert_default::<Counter>().0 += 1;
///
/// assert_eq!(registry.get::<Counter>().map(|c| c.0), Some(2));
/// assert!(registry.remove::<Counter>().is_some());
/// assert!(!registry.contains::<Counter>());
/// ```
#[derive(Default)]
pub struct Registry {
    instances: HashMap<TypeId, Box<dyn Any + Send>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the instance of `T`, if one was created for this request.
    pub fn get<T: Any + Send>(&self) -> Option<&T> {
        self.instances
            .get(&TypeId::of::<T>())
            .and_then(|b| b.downcast_ref::<T>())
    }

    /// Returns a mutable reference to the instance of `T`, if present.
    pub fn get_mut<T: Any + Send>(&mut self) -> Option<&mut T> {
        self.instances
            .get_mut(&TypeId::of::<T>())
            .and_then(|b| b.downcast_mut::<T>())
    }

    /// Returns the instance of `T`, creating it with `Default` on first use.
    pub fn get_or_insert_default<T: Any + Send + Default>(&mut self) -> &mut T {
        self.get_or_insert_with(T::default)
    }

    /// Returns the instance of `T`, creating it with `init` on first use.
    pub fn get_or_insert_with<T: Any + Send>(&mut self, init: impl FnOnce() -> T) -> &mut T {
        let slot = self
            .instances
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(init()));
        // The slot is keyed by `TypeId::of::<T>()`, so it always holds a `T`.
        match slot.downcast_mut::<T>() {
            Some(instance) => instance,
            None => unreachable!("registry slot holds a foreign type"),
        }
    }

    /// Stores `instance`, returning the previous instance of `T` if any.
    pub fn insert<T: Any + Send>(&mut self, instance: T) -> Option<T> {
        self.instances
            .insert(TypeId::of::<T>(), Box::new(instance))
            .and_then(|b| b.downcast::<T>().ok())
            .map(|b| *b)
    }

    /// Evicts the instance of `T`, returning it.
    pub fn remove<T: Any + Send>(&mut self) -> Option<T> {
        self.instances
            .remove(&TypeId::of::<T>())
            .and_then(|b| b.downcast::<T>().ok())
            .map(|b| *b)
    }

    /// Returns `true` if an instance of `T` is present.
    pub fn contains<T: Any + Send>(&self) -> bool {
        self.instances.contains_key(&TypeId::of::<T>())
    }

    /// Returns the number of stored instances.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Returns `true` if the registry holds no instances.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("instances", &self.instances.len())
            .finish()
    }
}
