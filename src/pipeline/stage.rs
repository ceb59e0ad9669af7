use std::sync::Arc;

use crate::action::Action;
use crate::context::Ctx;
use crate::error::Error;
use crate::request::Request;
use crate::response::Response;

/// A wrapping stage around a handler invocation.
///
/// A stage may do work before and after calling `next`, or return without
/// calling it at all.
pub trait Stage<A: Action>: Send + Sync {
    /// Runs this stage, delegating inward through `next`.
    fn intercept(
        &self,
        ctx: &mut Ctx,
        request: &Request,
        action: &mut A,
        next: Next<'_, A>,
    ) -> Result<Response, Error>;

    /// Stage name for logs.
    fn name(&self) -> &'static str {
        "Stage"
    }
}

/// The innermost call of a stage chain.
pub trait Invoke<A>: Send + Sync {
    /// Produces the response.
    fn invoke(&self, ctx: &mut Ctx, request: &Request, action: &mut A) -> Result<Response, Error>;
}

impl<A, F> Invoke<A> for F
where
    F: Fn(&mut Ctx, &Request, &mut A) -> Result<Response, Error> + Send + Sync,
{
    fn invoke(&self, ctx: &mut Ctx, request: &Request, action: &mut A) -> Result<Response, Error> {
        self(ctx, request, action)
    }
}

/// The remainder of a stage chain.
pub struct Next<'a, A: Action> {
    stages: &'a [Arc<dyn Stage<A>>],
    invoke: &'a dyn Invoke<A>,
}

impl<'a, A: Action> Next<'a, A> {
    /// Creates a chain over `stages` (outermost first) ending in `invoke`.
    pub fn new(stages: &'a [Arc<dyn Stage<A>>], invoke: &'a dyn Invoke<A>) -> Self {
        Self { stages, invoke }
    }

    /// Runs the next stage, or the innermost invocation if none is left.
    pub fn run(self, ctx: &mut Ctx, request: &Request, action: &mut A) -> Result<Response, Error> {
        match self.stages.split_first() {
            Some((stage, rest)) => {
                ctx.log().debug(format_args!("entering stage {}", stage.name()));
                stage.intercept(ctx, request, action, Next::new(rest, self.invoke))
            }
            None => self.invoke.invoke(ctx, request, action),
        }
    }
}

/// Opens a `tracing` span around the rest of the chain and logs its outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceStage;

impl<A: Action> Stage<A> for TraceStage {
    fn intercept(
        &self,
        ctx: &mut Ctx,
        request: &Request,
        action: &mut A,
        next: Next<'_, A>,
    ) -> Result<Response, Error> {
        let span = tracing::info_span!(
            "action",
            request_id = %ctx.request_id(),
            method = %ctx.method(),
            action = std::any::type_name::<A>()
        );
        let _guard = span.enter();

        let result = next.run(ctx, request, action);
        match &result {
            Ok(response) => ctx.log().info(format_args!("completed with {:?}", response)),
            Err(e) if e.is_validation() => ctx.log().info(format_args!("{}", e)),
            Err(e) => ctx.log().error(format_args!("failed: {}", e)),
        }
        result
    }

    fn name(&self) -> &'static str {
        "TraceStage"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Handler, NoForm};
    use crate::context::MethodIdentity;
    use crate::publish::{Publish, Schema};

    #[derive(Default)]
    struct Recorder {
        trail: Vec<&'static str>,
    }

    impl Publish for Recorder {
        fn schema() -> Schema<Self> {
            Schema::new()
        }
    }

    impl Action for Recorder {
        type Form = NoForm;

        fn handler(_name: &str) -> Option<Handler<Self>> {
            None
        }
    }

    struct Mark(&'static str, &'static str);

    impl Stage<Recorder> for Mark {
        fn intercept(
            &self,
            ctx: &mut Ctx,
            request: &Request,
            action: &mut Recorder,
            next: Next<'_, Recorder>,
        ) -> Result<Response, Error> {
            action.trail.push(self.0);
            let response = next.run(ctx, request, action);
            action.trail.push(self.1);
            response
        }
    }

    struct Halt;

    impl Stage<Recorder> for Halt {
        fn intercept(
            &self,
            _ctx: &mut Ctx,
            _request: &Request,
            _action: &mut Recorder,
            _next: Next<'_, Recorder>,
        ) -> Result<Response, Error> {
            Ok(Response::text("halted"))
        }
    }

    fn inner(_: &mut Ctx, _: &Request, action: &mut Recorder) -> Result<Response, Error> {
        action.trail.push("inner");
        Ok(Response::text("done"))
    }

    fn ctx() -> Ctx {
        Ctx::new("req-1").dispatch(MethodIdentity::new("index"))
    }

    #[test]
    fn stages_nest_outermost_first() {
        let stages: Vec<Arc<dyn Stage<Recorder>>> =
            vec![Arc::new(Mark("outer>", "<outer")), Arc::new(Mark("inner>", "<inner"))];
        let mut action = Recorder::default();

        let response = Next::new(&stages, &inner)
            .run(&mut ctx(), &Request::new(), &mut action)
            .expect("run");

        assert_eq!(response, Response::text("done"));
        assert_eq!(
            action.trail,
            vec!["outer>", "inner>", "inner", "<inner", "<outer"]
        );
    }

    #[test]
    fn stage_can_short_circuit() {
        let stages: Vec<Arc<dyn Stage<Recorder>>> = vec![Arc::new(Halt)];
        let mut action = Recorder::default();

        let response = Next::new(&stages, &inner)
            .run(&mut ctx(), &Request::new(), &mut action)
            .expect("run");

        assert_eq!(response, Response::text("halted"));
        assert!(action.trail.is_empty());
    }

    #[test]
    fn trace_stage_passes_through() {
        let stages: Vec<Arc<dyn Stage<Recorder>>> = vec![Arc::new(TraceStage)];
        let mut action = Recorder::default();

        let response = Next::new(&stages, &inner)
            .run(&mut ctx(), &Request::new(), &mut action)
            .expect("run");

        assert_eq!(response, Response::text("done"));
        assert_eq!(action.trail, vec!["inner"]);
    }
}
