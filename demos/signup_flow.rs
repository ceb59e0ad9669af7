//! Signup flow demonstration.
//!
//! This example walks a signup form through the pipeline:
//! 1. Bind an action method with its hooks and stages
//! 2. Submit a request that fails validation
//! 3. Submit a request that passes and reaches the handler
//! 4. Inspect what was published into scope for the view layer
//!
//! Run with: `cargo run --example signup_flow`

use std::sync::Arc;

use action_pipeline::{
    parse_param, Action, ActionDispatch, Bind, Ctx, Error, ExecutionDirectives, FieldConstraints,
    Form, FormCheck, Forward, Handler, HookSet, Length, MethodIdentity, Outcome, ParamMap,
    Pattern, PipelineConfig, Publish, Request, Required, Response, Schema, Stage, TraceStage,
    ValidationMessage,
};

#[derive(Debug, Clone, Default)]
struct SignupForm {
    username: Option<String>,
    email: Option<String>,
    age: Option<u32>,
}

impl Bind for SignupForm {
    fn bind(&mut self, params: &ParamMap) -> Result<(), Error> {
        if params.contains("username") {
            self.username = params.first("username").map(str::to_string);
        }
        if params.contains("email") {
            self.email = params.first("email").map(str::to_string);
        }
        if params.contains("age") {
            self.age = parse_param("age", params.first("age").map(str::trim))?;
        }
        Ok(())
    }
}

impl Publish for SignupForm {
    fn schema() -> Schema<Self> {
        Schema::new()
            .field("username", |f: &SignupForm| f.username.clone())
            .field("email", |f: &SignupForm| f.email.clone())
            .field("age", |f: &SignupForm| f.age)
    }
}

impl Form for SignupForm {
    fn constraints() -> FieldConstraints<Self> {
        let email = Pattern::new(r"[^@\s]+@[^@\s]+\.[a-z]+")
            .map(|p| p.with_message("{property} is not an email address"))
            .unwrap_or_else(|_| Pattern::uninitialized());

        FieldConstraints::new()
            .rule("username", |f: &SignupForm| f.username.clone(), Required::new())
            .rule(
                "username",
                |f: &SignupForm| f.username.clone(),
                Length::new(Some(3), Some(16)),
            )
            .rule("email", |f: &SignupForm| f.email.clone(), Required::new())
            .rule("email", |f: &SignupForm| f.email.clone(), email)
    }

    fn validation_method(name: &str) -> Option<FormCheck<Self>> {
        match name {
            "checkAdult" => Some(|f: &mut SignupForm| match f.age {
                Some(age) if age < 18 => {
                    vec![ValidationMessage::new("age", "must be 18 or older")]
                }
                _ => Vec::new(),
            }),
            _ => None,
        }
    }
}

#[derive(Clone, Default)]
struct SignupAction {
    members: Vec<String>,
    closed: bool,
}

impl SignupAction {
    fn submit(&mut self, ctx: &mut Ctx, _request: &Request) -> Result<Response, Error> {
        let username = ctx
            .form::<SignupForm>()
            .and_then(|f| f.username.clone())
            .unwrap_or_default();
        self.members.push(username.trim().to_string());
        Ok(Response::view("/signup/done.html"))
    }
}

impl Publish for SignupAction {
    fn schema() -> Schema<Self> {
        Schema::new()
            .getter("getMemberCount", |a: &SignupAction| Ok(a.members.len()))
            .flag("isClosed", |a: &SignupAction| Ok(a.closed))
    }
}

fn reject_when_closed(
    action: &mut SignupAction,
    _method: &MethodIdentity,
    _form: Option<&SignupForm>,
) -> Result<Option<Forward>, Error> {
    Ok(action.closed.then(|| Forward::to("closed")))
}

impl Action for SignupAction {
    type Form = SignupForm;

    fn handler(name: &str) -> Option<Handler<Self>> {
        match name {
            "submit" => Some(SignupAction::submit),
            _ => None,
        }
    }

    fn hooks() -> HookSet<Self> {
        HookSet::none().before(reject_when_closed)
    }

    fn directives(method: &str) -> Option<ExecutionDirectives> {
        match method {
            "submit" => Some(
                ExecutionDirectives::new()
                    .steps(["@", "checkAdult"])
                    .stop_on_first_error(false),
            ),
            _ => None,
        }
    }

    fn stages(_method: &str) -> Vec<Arc<dyn Stage<Self>>> {
        vec![Arc::new(TraceStage)]
    }
}

fn report(label: &str, outcome: &Outcome) {
    println!("\n=== {} ({}) ===", label, outcome.ctx.request_id());
    match &outcome.result {
        Ok(response) => println!("Response: {:?}", response),
        Err(err) => match err.validation_messages() {
            Some(messages) => {
                println!("Validation failed:");
                for message in messages {
                    println!("   - {}", message);
                }
            }
            None => println!("Error: {}", err),
        },
    }
    println!("Scope:");
    for (key, value) in outcome.ctx.scope().iter() {
        println!("   {} = {}", key, value);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = PipelineConfig::from_env();
    let dispatch = ActionDispatch::from_config(&config);
    let handler = dispatch.bind(SignupAction::default(), "submit")?;

    let invalid = Request::new()
        .param("username", " a ")
        .param("email", "not-an-email")
        .param("age", "16");
    report("Invalid submission", &handler.handle(Ctx::new("req-0001"), &invalid));

    let valid = Request::new()
        .param("username", " alice ")
        .param("email", "alice@example.com")
        .param("age", "34");
    let outcome = handler.handle(Ctx::new("req-0002"), &valid);
    report("Valid submission", &outcome);
    if let Some(action) = outcome.action::<SignupAction>() {
        println!("\nMembers: {:?}", action.members);
    }

    let closed = dispatch.bind(
        SignupAction {
            closed: true,
            ..SignupAction::default()
        },
        "submit",
    )?;
    report("Signups closed", &closed.handle(Ctx::new("req-0003"), &valid));

    Ok(())
}
