//! Request processing chain.
//!
//! A request enters through [`WrappedHandler::handle`], which records the
//! dispatched method on the context, takes a fresh action instance for the
//! request and runs the stage chain:
//!
//! ```text
//! declared stages (outermost first)
//!   ↓
//! FormValidationStage   bind, reset, validate, evict, publish
//!   ↓
//! before hook → handler → after hook
//! ```
//!
//! Every stage receives the same `Ctx`, so nothing is carried in globals.
//! The action instance ends up in the request's registry; a bound handler
//! holds no per-request state and can serve any number of requests.

mod dispatch;
mod execute;
mod stage;

pub use dispatch::{ActionDispatch, Outcome, WrappedHandler};
pub use execute::{FormValidationStage, FORM_TYPE_KEY};
pub use stage::{Invoke, Next, Stage, TraceStage};
