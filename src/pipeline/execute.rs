use std::any::type_name;

use serde_json::Value;

use super::stage::{Next, Stage};
use crate::action::{Action, Form};
use crate::binder::{bind_files, clone_of, Bind};
use crate::config::ExecutionDirectives;
use crate::context::Ctx;
use crate::error::{Error, ValidationFailure};
use crate::logging::RequestLog;
use crate::normalize::normalize;
use crate::publish::{publish, Publish};
use crate::request::Request;
use crate::response::Response;
use crate::validation::ValidationOrchestrator;

/// Scope key under which the bound form's type name is published.
pub const FORM_TYPE_KEY: &str = "formType";

/// Binds, validates and publishes the action's form around the handler.
///
/// 1. fetch or create the form in the registry, reset it, bind the request
/// 2. if enabled, validate a normalized copy and fail with
///    [`Error::Validation`] when any step produced messages
/// 3. record the form's type name under [`FORM_TYPE_KEY`] and run the rest
///    of the chain
/// 4. evict the form on success if configured
/// 5. always publish the action's and form's properties into scope
///
/// The form object itself is never placed in scope. Downstream code reaches
/// the raw instance through [`Ctx::form`] until it is evicted.
///
/// A publication error replaces whatever the chain produced.
#[derive(Debug, Clone, Default)]
pub struct FormValidationStage {
    directives: ExecutionDirectives,
}

impl FormValidationStage {
    /// Creates a stage applying `directives`.
    pub fn new(directives: ExecutionDirectives) -> Self {
        Self { directives }
    }

    /// Returns the directives this stage applies.
    pub fn directives(&self) -> &ExecutionDirectives {
        &self.directives
    }

    fn process<A: Action>(
        &self,
        ctx: &mut Ctx,
        request: &Request,
        action: &mut A,
        next: Next<'_, A>,
    ) -> Result<(Response, Option<A::Form>), Error> {
        if !<A::Form as Form>::DECLARED {
            return next.run(ctx, request, action).map(|response| (response, None));
        }

        let method = ctx.method().clone();
        let request_id = ctx.request_id().to_string();
        let log = RequestLog::new(&request_id, Some(method.name()));

        let form = ctx.registry_mut().get_or_insert_default::<A::Form>();
        self.reset(form)?;
        form.bind(request.params())?;
        bind_files(form, request.files())?;
        log.debug(format_args!(
            "bound {} parameter(s) and {} file field(s) onto {}",
            request.params().len(),
            request.files().len(),
            type_name::<A::Form>()
        ));

        if self.directives.validate {
            let mut normalized = clone_of(&*form);
            normalized.bind(&normalize(request.params()))?;
            bind_files(&mut normalized, request.files())?;

            let messages = ValidationOrchestrator::new(
                &self.directives.validation_steps,
                self.directives.stop_on_first_error,
            )
            .run(&*action, &normalized, form, &method)?;

            if !messages.is_empty() {
                log.info(format_args!("validation failed with {} message(s)", messages.len()));
                return Err(ValidationFailure::new(messages).into());
            }
        }

        ctx.scope_mut().set(
            FORM_TYPE_KEY,
            Value::String(type_name::<A::Form>().to_string()),
        );

        let response = next.run(ctx, request, action)?;

        let evicted = if self.directives.remove_form_on_success {
            log.debug(format_args!("evicting {}", type_name::<A::Form>()));
            ctx.registry_mut().remove::<A::Form>()
        } else {
            None
        };
        Ok((response, evicted))
    }

    fn reset<F: Form>(&self, form: &mut F) -> Result<(), Error> {
        let name = self.directives.reset_method.as_str();
        if name.is_empty() {
            return Ok(());
        }
        match F::reset_method(name) {
            Some(reset) => {
                reset(form);
                Ok(())
            }
            None if self.directives.has_custom_reset() => Err(Error::configuration(format!(
                "reset method '{}' not found on form {}",
                name,
                type_name::<F>()
            ))),
            None => Ok(()),
        }
    }
}

impl<A: Action> Stage<A> for FormValidationStage {
    fn intercept(
        &self,
        ctx: &mut Ctx,
        request: &Request,
        action: &mut A,
        next: Next<'_, A>,
    ) -> Result<Response, Error> {
        let (result, evicted) = match self.process(ctx, request, action, next) {
            Ok((response, evicted)) => (Ok(response), evicted),
            Err(e) => (Err(e), None),
        };

        if let Err(e) = publish_properties(ctx, action, evicted.as_ref()) {
            ctx.log().error(format_args!("scope publication failed: {}", e));
            return Err(e);
        }
        result
    }

    fn name(&self) -> &'static str {
        "FormValidationStage"
    }
}

/// Publishes the action and, if it has one, its form into scope.
///
/// An evicted form is published from the value taken out of the registry.
fn publish_properties<A: Action>(
    ctx: &mut Ctx,
    action: &A,
    evicted: Option<&A::Form>,
) -> Result<usize, Error> {
    let (registry, scope) = ctx.split_mut();
    let mut written = publish(action, &<A as Publish>::schema(), scope)?;
    if <A::Form as Form>::DECLARED {
        if let Some(form) = evicted.or_else(|| registry.get::<A::Form>()) {
            written += publish(form, &<A::Form as Publish>::schema(), scope)?;
        }
    }
    Ok(written)
}
