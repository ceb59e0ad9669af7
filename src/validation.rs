//! Form validation.
//!
//! This module provides:
//! - `TargetGate`: restricts a constraint to certain handler methods
//! - `Constraint`: the contract every declarative constraint implements
//! - `FieldConstraints`: per-property constraint declarations for a form
//! - `ValidationOrchestrator`: runs the ordered validation steps
//!
//! Constraint checks always run against the normalized copy of a form, while
//! named validation methods see the raw instance that downstream handlers
//! will use.

pub mod constraint;
mod fields;
mod gate;
mod orchestrator;

pub use constraint::{Constraint, ConstraintParams, Length, Pattern, Required};
pub use fields::{validate_fields, FieldConstraints, Violation};
pub use gate::TargetGate;
pub use orchestrator::{effective_steps, ValidationOrchestrator, CONSTRAINTS_MARKER};
