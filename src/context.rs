use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

use crate::logging::RequestLog;
use crate::registry::Registry;
use crate::scope::Scope;
use crate::state::{Dispatched, Pending};

/// Name of the handler method dispatched for the current request.
///
/// Written once per dispatch and read by every constraint gate during
/// that request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodIdentity(String);

impl MethodIdentity {
    /// Creates a method identity.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the method name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MethodIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-request execution context.
///
/// `Ctx<S>` owns everything that lives exactly as long as one request chain:
/// the request id, the scope read by the view layer, the instance registry,
/// and (once dispatched) the method identity.
///
/// - `Ctx<Pending>`: created by the transport adapter, no method yet
/// - `Ctx<Dispatched>`: method resolved; the only state stages and
///   handlers ever see
///
/// # Type-State Progression
///
/// ```text
/// Ctx<Pending> --dispatch(method)--> Ctx<Dispatched>
/// ```
///
/// There is no way back, so the method identity cannot be rewritten halfway
/// through a request.
///
/// # Examples
///
/// ```
/// use action_pipeline::{Ctx, MethodIdentity};
///
/// let ctx = Ctx::new("req-1").dispatch(MethodIdentity::new("save"));
/// assert_eq!(ctx.method().name(), "save");
/// assert_eq!(ctx.request_id(), "req-1");
/// ```
pub struct Ctx<S = Dispatched> {
    request_id: String,
    method: Option<MethodIdentity>,
    scope: Scope,
    registry: Registry,
    _state: PhantomData<S>,
}

// ============================================================================
// Shared methods (available in all states)
// ============================================================================

impl<S> Ctx<S> {
    /// Returns the request ID for this context.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns the request scope.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Returns the request scope for writing.
    pub fn scope_mut(&mut self) -> &mut Scope {
        &mut self.scope
    }

    /// Returns the per-request instance registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Returns the per-request instance registry for writing.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Borrows the registry and the scope at the same time.
    pub fn split_mut(&mut self) -> (&mut Registry, &mut Scope) {
        (&mut self.registry, &mut self.scope)
    }

    /// Returns the form instance of type `F` exposed to downstream consumers.
    pub fn form<F: Any + Send>(&self) -> Option<&F> {
        self.registry.get::<F>()
    }
}

// ============================================================================
// Ctx<Pending>
// ============================================================================

impl Ctx<Pending> {
    /// Creates a fresh context for a new request.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            method: None,
            scope: Scope::new(),
            registry: Registry::new(),
            _state: PhantomData,
        }
    }

    /// Records the resolved handler method, moving the context to `Dispatched`.
    pub fn dispatch(self, method: MethodIdentity) -> Ctx<Dispatched> {
        Ctx {
            request_id: self.request_id,
            method: Some(method),
            scope: self.scope,
            registry: self.registry,
            _state: PhantomData,
        }
    }
}

// ============================================================================
// Ctx<Dispatched>
// ============================================================================

impl Ctx<Dispatched> {
    /// Returns the identity of the dispatched handler method.
    pub fn method(&self) -> &MethodIdentity {
        match &self.method {
            Some(method) => method,
            // `dispatch` is the only constructor of `Ctx<Dispatched>`.
            None => unreachable!("dispatched context without a method"),
        }
    }

    /// Returns a logger stamped with this request's id and method.
    pub fn log(&self) -> RequestLog<'_> {
        RequestLog::new(&self.request_id, Some(self.method().name()))
    }
}

impl<S> fmt::Debug for Ctx<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ctx")
            .field("request_id", &self.request_id)
            .field("method", &self.method)
            .field("scope", &self.scope)
            .field("registry", &self.registry)
            .finish()
    }
}
