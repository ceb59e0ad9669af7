use std::any::type_name;
use std::sync::Arc;

use super::execute::FormValidationStage;
use super::stage::{Invoke, Next, Stage};
use crate::action::{Action, Handler, HookSet};
use crate::config::PipelineConfig;
use crate::context::{Ctx, MethodIdentity};
use crate::error::Error;
use crate::request::Request;
use crate::response::{ResolveForward, Response, ViewResolver};
use crate::state::Pending;

/// Binds actions to handler methods.
///
/// A bound [`WrappedHandler`] creates a fresh action for every request, so
/// one request's action state never reaches another request's scope.
///
/// # Examples
///
/// ```
/// use action_pipeline::{
///     Action, ActionDispatch, Ctx, Error, Handler, NoForm, Publish, Request, Response, Schema,
/// };
///
/// #[derive(Clone, Default)]
/// struct Hello {
///     greeted: bool,
/// }
///
/// impl Hello {
///     fn greet(&mut self, _ctx: &mut Ctx, _request: &Request) -> Result<Response, Error> {
///         self.greeted = true;
///         Ok(Response::text("hello"))
///     }
/// }
///
/// impl Publish for Hello {
///     fn schema() -> Schema<Self> {
///         Schema::new().flag("isGreeted", |h: &Hello| Ok(h.greeted))
///     }
/// }
///
/// impl Action for Hello {
///     type Form = NoForm;
///
///     fn handler(name: &str) -> Option<Handler<Self>> {
///         match name {
///             "greet" => Some(Hello::greet),
///             _ => None,
///         }
///     }
/// }
///
/// let dispatch = ActionDispatch::default();
/// assert!(dispatch.bind(Hello::default(), "missing").is_err());
///
/// let handler = dispatch.bind(Hello::default(), "greet").unwrap();
/// let outcome = handler.handle(Ctx::new("req-1"), &Request::new());
///
/// assert_eq!(outcome.result.as_ref().unwrap(), &Response::text("hello"));
/// assert_eq!(outcome.ctx.method().name(), "greet");
/// assert!(outcome.action::<Hello>().unwrap().greeted);
/// ```
#[derive(Clone)]
pub struct ActionDispatch {
    resolver: Arc<dyn ResolveForward>,
}

impl ActionDispatch {
    /// Creates a dispatcher resolving hook forwards with `resolver`.
    pub fn new(resolver: impl ResolveForward + 'static) -> Self {
        Self {
            resolver: Arc::new(resolver),
        }
    }

    /// Creates a dispatcher with a [`ViewResolver`] built from `config`.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(ViewResolver::new(config.view.clone()))
    }

    /// Resolves `method` on `A` and wraps it with its hooks and stages.
    ///
    /// `template` is cloned once per request. Stages declared by
    /// [`Action::stages`] run outermost; if the method has
    /// [`Action::directives`], a [`FormValidationStage`] runs innermost,
    /// directly around the hooks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the action has no handler named
    /// `method`.
    pub fn bind<A>(&self, template: A, method: &str) -> Result<WrappedHandler<A>, Error>
    where
        A: Action + Clone + Sync,
    {
        self.bind_with(move || template.clone(), method)
    }

    /// Like [`bind`](Self::bind), but builds each request's action with
    /// `factory`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the action has no handler named
    /// `method`.
    pub fn bind_with<A, F>(&self, factory: F, method: &str) -> Result<WrappedHandler<A>, Error>
    where
        A: Action,
        F: Fn() -> A + Send + Sync + 'static,
    {
        let handler = A::handler(method).ok_or_else(|| {
            Error::configuration(format!(
                "handler method '{}' not found on {}",
                method,
                type_name::<A>()
            ))
        })?;

        let mut stages = A::stages(method);
        if let Some(directives) = A::directives(method) {
            stages.push(Arc::new(FormValidationStage::new(directives)));
        }

        tracing::debug!(
            action = type_name::<A>(),
            method = %method,
            stages = stages.len(),
            "bound handler"
        );

        Ok(WrappedHandler {
            factory: Arc::new(factory),
            method: MethodIdentity::new(method),
            stages,
            invoke: HookedInvoke {
                handler,
                hooks: A::hooks(),
                resolver: Arc::clone(&self.resolver),
            },
        })
    }
}

impl Default for ActionDispatch {
    fn default() -> Self {
        Self::new(ViewResolver::default())
    }
}

/// What a handled request leaves behind.
#[derive(Debug)]
pub struct Outcome {
    /// The dispatched context, with everything published into scope
    pub ctx: Ctx,
    /// The chain's response or failure
    pub result: Result<Response, Error>,
}

impl Outcome {
    /// Returns the action instance that served the request.
    pub fn action<A: Action>(&self) -> Option<&A> {
        self.ctx.registry().get::<A>()
    }
}

/// An action method bound to its hooks and stages, ready to serve requests.
pub struct WrappedHandler<A: Action> {
    factory: Arc<dyn Fn() -> A + Send + Sync>,
    method: MethodIdentity,
    stages: Vec<Arc<dyn Stage<A>>>,
    invoke: HookedInvoke<A>,
}

impl<A: Action> WrappedHandler<A> {
    /// Runs one request through the stage chain.
    ///
    /// The action comes from the request's registry if the caller placed one
    /// there, otherwise from the handler's factory. Either way it is left in
    /// the registry afterwards, reachable through [`Outcome::action`].
    pub fn handle(&self, ctx: Ctx<Pending>, request: &Request) -> Outcome {
        let mut ctx = ctx.dispatch(self.method.clone());
        ctx.log().debug(format_args!("dispatching to {}", type_name::<A>()));

        let mut action = match ctx.registry_mut().remove::<A>() {
            Some(action) => action,
            None => (self.factory)(),
        };
        let result = Next::new(&self.stages, &self.invoke).run(&mut ctx, request, &mut action);
        ctx.registry_mut().insert(action);

        Outcome { ctx, result }
    }

    /// Returns the bound method.
    pub fn method(&self) -> &MethodIdentity {
        &self.method
    }
}

/// Runs the before hook, the handler and the after hook.
struct HookedInvoke<A: Action> {
    handler: Handler<A>,
    hooks: HookSet<A>,
    resolver: Arc<dyn ResolveForward>,
}

impl<A: Action> Invoke<A> for HookedInvoke<A> {
    fn invoke(&self, ctx: &mut Ctx, request: &Request, action: &mut A) -> Result<Response, Error> {
        let method = ctx.method().clone();

        let forward = match self.hooks.before {
            Some(before) => before(action, &method, ctx.form::<A::Form>())?,
            None => None,
        };

        let mut response = match forward {
            Some(forward) => {
                ctx.log().debug(format_args!("before hook forwarded to '{}'", forward));
                self.resolver.resolve(&forward, ctx)?
            }
            None => (self.handler)(action, ctx, request)?,
        };

        if let Some(after) = self.hooks.after {
            if let Some(forward) = after(action, &method, ctx.form::<A::Form>())? {
                ctx.log().debug(format_args!("after hook forwarded to '{}'", forward));
                response = self.resolver.resolve(&forward, ctx)?;
            }
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::NoForm;
    use crate::publish::{Publish, Schema};
    use crate::response::Forward;

    #[derive(Clone, Default)]
    struct Guarded {
        calls: u32,
        trail: Vec<&'static str>,
    }

    impl Guarded {
        fn run(&mut self, _: &mut Ctx, _: &Request) -> Result<Response, Error> {
            self.calls += 1;
            self.trail.push("main");
            Ok(Response::text("main"))
        }
    }

    impl Publish for Guarded {
        fn schema() -> Schema<Self> {
            Schema::new()
        }
    }

    impl Action for Guarded {
        type Form = NoForm;

        fn handler(name: &str) -> Option<Handler<Self>> {
            match name {
                "run" => Some(Guarded::run),
                _ => None,
            }
        }
    }

    fn dispatch(hooks: HookSet<Guarded>) -> (Outcome, Guarded) {
        let mut handler = ActionDispatch::default()
            .bind(Guarded::default(), "run")
            .expect("bind");
        handler.invoke.hooks = hooks;
        let mut outcome = handler.handle(Ctx::new("req-1"), &Request::new());
        let action = outcome
            .ctx
            .registry_mut()
            .remove::<Guarded>()
            .expect("action left in registry");
        (outcome, action)
    }

    fn deny(
        action: &mut Guarded,
        _: &MethodIdentity,
        _: Option<&NoForm>,
    ) -> Result<Option<Forward>, Error> {
        action.trail.push("before");
        Ok(Some(Forward::to("/denied")))
    }

    fn allow(
        action: &mut Guarded,
        _: &MethodIdentity,
        _: Option<&NoForm>,
    ) -> Result<Option<Forward>, Error> {
        action.trail.push("before");
        Ok(None)
    }

    fn fail(
        _: &mut Guarded,
        _: &MethodIdentity,
        _: Option<&NoForm>,
    ) -> Result<Option<Forward>, Error> {
        Err(Error::handler("precondition blew up"))
    }

    fn replace(
        action: &mut Guarded,
        _: &MethodIdentity,
        _: Option<&NoForm>,
    ) -> Result<Option<Forward>, Error> {
        action.trail.push("after");
        Ok(Some(Forward::to("/replaced")))
    }

    fn observe(
        action: &mut Guarded,
        _: &MethodIdentity,
        _: Option<&NoForm>,
    ) -> Result<Option<Forward>, Error> {
        action.trail.push("after");
        Ok(None)
    }

    #[test]
    fn unknown_method_is_a_configuration_error() {
        let err = ActionDispatch::default()
            .bind(Guarded::default(), "missing")
            .err()
            .expect("bind should fail");

        assert!(matches!(err, Error::Configuration(ref m) if m.contains("'missing'")));
    }

    #[test]
    fn no_hooks_runs_main_handler() {
        let (outcome, action) = dispatch(HookSet::none());

        assert_eq!(outcome.result.expect("result"), Response::text("main"));
        assert_eq!(action.calls, 1);
    }

    #[test]
    fn before_forward_skips_main_handler() {
        let (outcome, action) = dispatch(HookSet::none().before(deny).after(observe));

        assert_eq!(outcome.result.expect("result"), Response::view("/denied"));
        assert_eq!(action.calls, 0);
        assert_eq!(action.trail, vec!["before", "after"]);
    }

    #[test]
    fn after_forward_overrides_before_forward() {
        let (outcome, action) = dispatch(HookSet::none().before(deny).after(replace));

        assert_eq!(outcome.result.expect("result"), Response::view("/replaced"));
        assert_eq!(action.calls, 0);
    }

    #[test]
    fn after_forward_overrides_main_response() {
        let (outcome, action) = dispatch(HookSet::none().before(allow).after(replace));

        assert_eq!(outcome.result.expect("result"), Response::view("/replaced"));
        assert_eq!(action.trail, vec!["before", "main", "after"]);
    }

    #[test]
    fn before_error_skips_main_and_after() {
        let (outcome, action) = dispatch(HookSet::none().before(fail).after(replace));

        assert!(matches!(outcome.result, Err(Error::Handler(_))));
        assert_eq!(action.calls, 0);
        assert!(action.trail.is_empty());
    }

    #[test]
    fn handle_records_method_identity() {
        let (outcome, _) = dispatch(HookSet::none());

        assert_eq!(outcome.ctx.method(), &MethodIdentity::new("run"));
        assert_eq!(outcome.ctx.request_id(), "req-1");
    }

    #[test]
    fn each_request_gets_a_fresh_action() {
        let handler = ActionDispatch::default()
            .bind(Guarded::default(), "run")
            .expect("bind");

        let first = handler.handle(Ctx::new("req-1"), &Request::new());
        let second = handler.handle(Ctx::new("req-2"), &Request::new());

        assert_eq!(first.action::<Guarded>().map(|a| a.calls), Some(1));
        assert_eq!(second.action::<Guarded>().map(|a| a.calls), Some(1));
    }

    #[test]
    fn factory_builds_each_action() {
        let handler = ActionDispatch::default()
            .bind_with(
                || Guarded {
                    calls: 10,
                    ..Guarded::default()
                },
                "run",
            )
            .expect("bind");

        let outcome = handler.handle(Ctx::new("req-1"), &Request::new());

        assert_eq!(outcome.action::<Guarded>().map(|a| a.calls), Some(11));
    }

    #[test]
    fn action_placed_in_registry_is_used() {
        let handler = ActionDispatch::default()
            .bind(Guarded::default(), "run")
            .expect("bind");
        let mut ctx = Ctx::new("req-1");
        ctx.registry_mut().insert(Guarded {
            calls: 5,
            ..Guarded::default()
        });

        let outcome = handler.handle(ctx, &Request::new());

        assert_eq!(outcome.action::<Guarded>().map(|a| a.calls), Some(6));
    }
}
