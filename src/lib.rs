//! Form binding, ordered validation and hook dispatch for server-side actions.
//!
//! This crate provides the per-request stage that sits between a routing
//! layer and an application's handler methods:
//! - **Binding**: request parameters and uploaded files are bound onto a
//!   typed form held in a per-request registry
//! - **Validation**: declarative field constraints and named validation
//!   methods run in a configured order against a normalized copy of the form
//! - **Dispatch**: optional before/after hooks can short-circuit or replace
//!   the handler's response
//! - **Publication**: action and form properties are written into a request
//!   scope for the view layer, on success and failure alike
//!
//! # Core Types
//!
//! - [`Ctx`]: per-request context carrying scope, registry and method identity
//! - [`Action`] / [`Form`]: capability traits implemented by application types
//! - [`Schema`]: explicit list of properties a type publishes
//! - [`ActionDispatch`]: binds an action method into a [`WrappedHandler`]
//! - [`FormValidationStage`]: the bind/validate/publish stage
//!
//! # Examples
//!
//! ```
//! use action_pipeline::{
//!     Action, ActionDispatch, Bind, Ctx, Error, ExecutionDirectives, FieldConstraints, Form,
//!     Handler, ParamMap, Publish, Request, Required, Response, Schema,
//! };
//!
//! #[derive(Debug, Clone, Default)]
//! struct Search {
//!     query: Option<String>,
//! }
//!
//! impl Bind for Search {
//!     fn bind(&mut self, params: &ParamMap) -> Result<(), Error> {
//!         if params.contains("q") {
//!             self.query = params.first("q").map(str::to_string);
//!         }
//!         Ok(())
//!     }
//! }
//!
//! impl Publish for Search {
//!     fn schema() -> Schema<Self> {
//!         Schema::new().field("query", |s: &Search| s.query.clone())
//!     }
//! }
//!
//! impl Form for Search {
//!     fn constraints() -> FieldConstraints<Self> {
//!         FieldConstraints::new().rule("q", |s: &Search| s.query.clone(), Required::new())
//!     }
//! }
//!
//! #[derive(Clone, Default)]
//! struct Catalog;
//!
//! impl Catalog {
//!     fn find(&mut self, ctx: &mut Ctx, _request: &Request) -> Result<Response, Error> {
//!         let query = ctx.form::<Search>().and_then(|s| s.query.clone()).unwrap_or_default();
//!         Ok(Response::text(format!("results for {}", query.trim())))
//!     }
//! }
//!
//! impl Publish for Catalog {
//!     fn schema() -> Schema<Self> {
//!         Schema::new()
//!     }
//! }
//!
//! impl Action for Catalog {
//!     type Form = Search;
//!
//!     fn handler(name: &str) -> Option<Handler<Self>> {
//!         match name {
//!             "find" => Some(Catalog::find),
//!             _ => None,
//!         }
//!     }
//!
//!     fn directives(_method: &str) -> Option<ExecutionDirectives> {
//!         Some(ExecutionDirectives::new())
//!     }
//! }
//!
//! let handler = ActionDispatch::default().bind(Catalog, "find").unwrap();
//!
//! let outcome = handler.handle(Ctx::new("req-1"), &Request::new().param("q", " rust "));
//! assert_eq!(outcome.result.unwrap(), Response::text("results for rust"));
//!
//! let outcome = handler.handle(Ctx::new("req-2"), &Request::new().param("q", "  "));
//! assert!(outcome.result.unwrap_err().is_validation());
//! assert_eq!(outcome.ctx.scope().get("query").unwrap(), "  ");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod action;
mod binder;
mod config;
mod context;
mod error;
mod logging;
mod normalize;
mod pipeline;
mod publish;
mod registry;
mod request;
mod response;
mod scope;
mod state;
pub mod validation;

pub use action::{
    Action, ActionCheck, Form, FormCheck, Handler, Hook, HookSet, NoForm, ResetMethod,
};
pub use binder::{bind_files, clone_of, parse_param, Bind, FileValue, UploadedFile};
pub use config::{ExecutionDirectives, PipelineConfig, ViewConfig, DEFAULT_RESET_METHOD};
pub use context::{Ctx, MethodIdentity};
pub use error::{Error, ValidationFailure, ValidationMessage};
pub use logging::RequestLog;
pub use normalize::{normalize, normalize_value};
pub use pipeline::{
    ActionDispatch, FormValidationStage, Invoke, Next, Outcome, Stage, TraceStage, WrappedHandler,
    FORM_TYPE_KEY,
};
pub use publish::{decapitalize, publish, publish_into, AccessError, PropertyKind, Publish, Schema};
pub use registry::Registry;
pub use request::{FileParts, ParamMap, ParamValues, Request, UploadedPart};
pub use response::{Forward, ResolveForward, Response, ViewResolver};
pub use scope::Scope;
pub use state::{Dispatched, Pending};
pub use validation::{
    effective_steps, validate_fields, Constraint, ConstraintParams, FieldConstraints, Length,
    Pattern, Required, TargetGate, ValidationOrchestrator, Violation, CONSTRAINTS_MARKER,
};
