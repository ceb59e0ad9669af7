//! Type-state markers for request context progression.
//!
//! A context starts out `Pending` and becomes `Dispatched` once a handler
//! method has been resolved. The method identity is written exactly once,
//! during that transition.

/// Marker type for a context whose handler method is not yet known.
///
/// `Ctx<Pending>` carries a scope and a registry but no method identity.
#[derive(Debug, Clone, Copy)]
pub struct Pending {
    _private: (),
}

/// Marker type for a context bound to a resolved handler method.
///
/// Only `Ctx<Dispatched>` exposes [`crate::Ctx::method`], which constraint
/// gates read to decide whether they apply.
#[derive(Debug, Clone, Copy)]
pub struct Dispatched {
    _private: (),
}
