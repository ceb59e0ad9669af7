//! Single-field constraint validation.

use serde::Serialize;
use serde_json::Value;

use super::constraint::{resolve_message, Constraint};
use crate::action::Form;
use crate::context::MethodIdentity;
use crate::error::{Error, ValidationMessage};

/// A constraint violation on one property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Property path that failed
    pub property: String,
    /// Unresolved message template
    pub template: String,
}

impl From<Violation> for ValidationMessage {
    fn from(violation: Violation) -> Self {
        let text = resolve_message(&violation.template, &violation.property);
        ValidationMessage::new(violation.property, text)
    }
}

type FieldReader<F> = Box<dyn Fn(&F) -> Result<Value, serde_json::Error> + Send + Sync>;

struct Rule<F> {
    property: String,
    read: FieldReader<F>,
    constraint: Box<dyn Constraint>,
}

/// Declarative constraints attached to a form's properties.
///
/// Rules are evaluated in declaration order, so violations come out in the
/// same order.
///
/// # Examples
///
/// ```
/// use action_pipeline::{FieldConstraints, Length, MethodIdentity, Required};
///
/// struct Signup {
///     email: Option<String>,
/// }
///
/// let constraints = FieldConstraints::<Signup>::new()
///     .rule("email", |s| s.email.clone(), Required::new())
///     .rule("email", |s| s.email.clone(), Length::max(64));
///
/// let violations = constraints
///     .validate(&Signup { email: None }, &MethodIdentity::new("submit"))
///     .unwrap();
///
/// assert_eq!(violations.len(), 1);
/// assert_eq!(violations[0].property, "email");
/// ```
pub struct FieldConstraints<F> {
    rules: Vec<Rule<F>>,
}

impl<F: 'static> FieldConstraints<F> {
    /// Creates an empty constraint set.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Attaches `constraint` to the property read by `read`.
    pub fn rule<V, R, C>(mut self, property: impl Into<String>, read: R, constraint: C) -> Self
    where
        V: Serialize,
        R: Fn(&F) -> V + Send + Sync + 'static,
        C: Constraint + 'static,
    {
        self.rules.push(Rule {
            property: property.into(),
            read: Box::new(move |f: &F| serde_json::to_value(read(f))),
            constraint: Box::new(constraint),
        });
        self
    }

    /// Returns the number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Applies every rule to `bean` for the dispatched `method`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Access`] if a property value cannot be read.
    pub fn validate(&self, bean: &F, method: &MethodIdentity) -> Result<Vec<Violation>, Error> {
        let mut violations = Vec::new();
        for rule in &self.rules {
            let value = (rule.read)(bean).map_err(|e| Error::access(&rule.property, e))?;
            if !rule.constraint.is_valid(&value, method) {
                violations.push(Violation {
                    property: rule.property.clone(),
                    template: rule.constraint.message().to_string(),
                });
            }
        }
        Ok(violations)
    }
}

impl<F: 'static> Default for FieldConstraints<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs a form's declared constraints against `bean`.
pub fn validate_fields<F: Form>(bean: &F, method: &MethodIdentity) -> Result<Vec<Violation>, Error> {
    F::constraints().validate(bean, method)
}
