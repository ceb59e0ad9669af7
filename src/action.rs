//! Capability traits implemented by application actions and forms.
//!
//! The pipeline never inspects types at runtime. Everything it needs to
//! know about an action (its handler table, hooks, per-method directives and
//! stages) or a form (its constraints, reset and validation methods) is
//! declared through these traits.

use std::sync::Arc;

use crate::binder::Bind;
use crate::config::ExecutionDirectives;
use crate::context::{Ctx, MethodIdentity};
use crate::error::{Error, ValidationMessage};
use crate::pipeline::Stage;
use crate::publish::{Publish, Schema};
use crate::request::{ParamMap, Request};
use crate::response::{Forward, Response};
use crate::validation::FieldConstraints;

/// A business handler method: `(action, ctx, request) -> response`.
pub type Handler<A> = fn(&mut A, &mut Ctx, &Request) -> Result<Response, Error>;

/// A before/after hook. `Some(forward)` short-circuits or overrides the
/// response.
pub type Hook<A> =
    fn(&mut A, &MethodIdentity, Option<&<A as Action>::Form>) -> Result<Option<Forward>, Error>;

/// A named validation method declared on a form, invoked on the raw form.
pub type FormCheck<F> = fn(&mut F) -> Vec<ValidationMessage>;

/// A named validation method declared on an action.
pub type ActionCheck<A> = fn(&A, &<A as Action>::Form) -> Vec<ValidationMessage>;

/// A form reset method.
pub type ResetMethod<F> = fn(&mut F);

/// A typed object holding one request's input.
///
/// Forms live in the per-request [`Registry`](crate::Registry) and are
/// created through [`Default`] on first use.
pub trait Form: Bind + Publish + Clone + Default + Send + 'static {
    /// `false` only for [`NoForm`].
    const DECLARED: bool = true;

    /// Declarative single-field constraints.
    fn constraints() -> FieldConstraints<Self> {
        FieldConstraints::new()
    }

    /// Looks up a reset method by name.
    fn reset_method(_name: &str) -> Option<ResetMethod<Self>> {
        None
    }

    /// Looks up a named validation method.
    fn validation_method(_name: &str) -> Option<FormCheck<Self>> {
        None
    }
}

/// Form type of actions that take no form input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoForm;

impl Bind for NoForm {
    fn bind(&mut self, _params: &ParamMap) -> Result<(), Error> {
        Ok(())
    }
}

impl Publish for NoForm {
    fn schema() -> Schema<Self> {
        Schema::new()
    }
}

impl Form for NoForm {
    const DECLARED: bool = false;
}

/// Optional hooks run around the main handler.
pub struct HookSet<A: Action> {
    /// Runs before the handler; `Some(forward)` skips it.
    pub before: Option<Hook<A>>,
    /// Runs after the handler (or the before short-circuit); `Some(forward)`
    /// replaces the response.
    pub after: Option<Hook<A>>,
}

impl<A: Action> HookSet<A> {
    /// No hooks.
    pub fn none() -> Self {
        Self {
            before: None,
            after: None,
        }
    }

    /// Sets the before hook.
    pub fn before(mut self, hook: Hook<A>) -> Self {
        self.before = Some(hook);
        self
    }

    /// Sets the after hook.
    pub fn after(mut self, hook: Hook<A>) -> Self {
        self.after = Some(hook);
        self
    }
}

impl<A: Action> Default for HookSet<A> {
    fn default() -> Self {
        Self::none()
    }
}

impl<A: Action> Clone for HookSet<A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A: Action> Copy for HookSet<A> {}

/// An application object whose handler methods the pipeline dispatches to.
///
/// # Examples
///
/// ```
/// use action_pipeline::{
///     Action, Ctx, Error, Handler, NoForm, Publish, Request, Response, Schema,
/// };
///
/// struct Ping {
///     hits: u32,
/// }
///
/// impl Ping {
///     fn index(&mut self, _ctx: &mut Ctx, _request: &Request) -> Result<Response, Error> {
///         self.hits += 1;
///         Ok(Response::text("pong"))
///     }
/// }
///
/// impl Publish for Ping {
///     fn schema() -> Schema<Self> {
///         Schema::new().field("hits", |p: &Ping| p.hits)
///     }
/// }
///
/// impl Action for Ping {
///     type Form = NoForm;
///
///     fn handler(name: &str) -> Option<Handler<Self>> {
///         match name {
///             "index" => Some(Ping::index),
///             _ => None,
///         }
///     }
/// }
///
/// assert!(Ping::handler("index").is_some());
/// assert!(Ping::handler("missing").is_none());
/// ```
pub trait Action: Publish + Send + 'static {
    /// The form bound for this action's requests.
    type Form: Form;

    /// Looks up a handler method by name.
    fn handler(name: &str) -> Option<Handler<Self>>;

    /// Before/after hooks.
    fn hooks() -> HookSet<Self> {
        HookSet::none()
    }

    /// Form processing directives for `method`. `None` means the method is
    /// not wrapped by form validation.
    fn directives(_method: &str) -> Option<ExecutionDirectives> {
        None
    }

    /// Additional stages declared on `method`, outermost first.
    fn stages(_method: &str) -> Vec<Arc<dyn Stage<Self>>> {
        Vec::new()
    }

    /// Looks up a named validation method declared on the action.
    fn validation_method(_name: &str) -> Option<ActionCheck<Self>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_form_is_not_declared() {
        assert!(!NoForm::DECLARED);
        assert!(NoForm::constraints().is_empty());
        assert!(NoForm::reset_method("reset").is_none());
        assert!(NoForm::schema().is_empty());
    }

    #[test]
    fn no_form_binds_nothing() {
        let mut params = ParamMap::new();
        params.add("anything", "value");

        assert!(NoForm.bind(&params).is_ok());
    }
}
