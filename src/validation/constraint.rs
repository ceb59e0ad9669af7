use std::collections::BTreeMap;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use super::gate::TargetGate;
use crate::context::MethodIdentity;
use crate::error::Error;

/// Placeholder replaced by the property path when a message is resolved.
pub const PROPERTY_PLACEHOLDER: &str = "{property}";

/// Declarative parameters a constraint is initialized with.
///
/// # Examples
///
/// ```
/// use action_pipeline::ConstraintParams;
///
/// let params: ConstraintParams = serde_json::from_str(
///     r#"{ "message": "{property} is too long", "target": "save", "args": { "max": "8" } }"#,
/// ).unwrap();
///
/// assert_eq!(params.arg("max"), Some("8"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConstraintParams {
    /// Message template; `{property}` is replaced by the property path
    pub message: Option<String>,
    /// Comma-separated handler method names the constraint applies to
    pub target: Option<String>,
    /// Constraint-specific arguments
    pub args: BTreeMap<String, String>,
}

impl ConstraintParams {
    /// Creates empty parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the message template.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the target method list.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Adds a constraint-specific argument.
    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.insert(name.into(), value.into());
        self
    }

    /// Returns a constraint-specific argument.
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args.get(name).map(String::as_str)
    }

    fn parsed_arg(&self, name: &str) -> Result<Option<usize>, Error> {
        self.arg(name)
            .map(|v| {
                v.trim().parse::<usize>().map_err(|e| {
                    Error::configuration(format!("invalid '{}' argument '{}': {}", name, v, e))
                })
            })
            .transpose()
    }
}

/// Returns `true` for values every constraint accepts: `null` and empty arrays.
pub fn is_vacuous(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Replaces the property placeholder in a message template.
pub fn resolve_message(template: &str, property: &str) -> String {
    template.replace(PROPERTY_PLACEHOLDER, property)
}

/// Contract implemented by every declarative single-field constraint.
pub trait Constraint: Send + Sync {
    /// Applies declarative parameters, including the optional target list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for malformed arguments.
    fn initialize(&mut self, params: &ConstraintParams) -> Result<(), Error>;

    /// Returns the gate deciding which handler methods this constraint covers.
    fn gate(&self) -> &TargetGate;

    /// Returns the unresolved message template.
    fn message(&self) -> &str;

    /// Checks a value that is neither `null` nor an empty array.
    fn check(&self, value: &Value) -> bool;

    /// Returns `true` if `value` satisfies the constraint for `method`.
    ///
    /// The gate is consulted first; `null` and empty arrays are always valid.
    fn is_valid(&self, value: &Value, method: &MethodIdentity) -> bool {
        if !self.gate().is_applicable(method) {
            return true;
        }
        if is_vacuous(value) {
            return true;
        }
        self.check(value)
    }
}

fn apply_common(params: &ConstraintParams, gate: &mut TargetGate, message: &mut String) {
    *gate = TargetGate::configure(params.target.as_deref());
    if let Some(template) = &params.message {
        *message = template.clone();
    }
}

/// Rejects absent, blank and empty values.
#[derive(Debug, Clone)]
pub struct Required {
    gate: TargetGate,
    message: String,
}

impl Required {
    /// Creates an unrestricted required constraint.
    pub fn new() -> Self {
        Self {
            gate: TargetGate::unrestricted(),
            message: format!("{} is required", PROPERTY_PLACEHOLDER),
        }
    }

    /// Replaces the message template.
    pub fn with_message(mut self, template: impl Into<String>) -> Self {
        self.message = template.into();
        self
    }

    /// Restricts the constraint to the listed handler methods.
    pub fn only_for(mut self, targets_csv: &str) -> Self {
        self.gate = TargetGate::configure(Some(targets_csv));
        self
    }
}

impl Default for Required {
    fn default() -> Self {
        Self::new()
    }
}

impl Constraint for Required {
    fn initialize(&mut self, params: &ConstraintParams) -> Result<(), Error> {
        apply_common(params, &mut self.gate, &mut self.message);
        Ok(())
    }

    fn gate(&self) -> &TargetGate {
        &self.gate
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn check(&self, value: &Value) -> bool {
        match value {
            Value::String(s) => !s.trim().is_empty(),
            Value::Object(map) => !map.is_empty(),
            _ => true,
        }
    }

    // Absence is exactly what this constraint rejects.
    fn is_valid(&self, value: &Value, method: &MethodIdentity) -> bool {
        if !self.gate.is_applicable(method) {
            return true;
        }
        !is_vacuous(value) && self.check(value)
    }
}

/// Bounds the character count of string values.
#[derive(Debug, Clone)]
pub struct Length {
    min: Option<usize>,
    max: Option<usize>,
    gate: TargetGate,
    message: String,
}

impl Length {
    /// Creates a length constraint with optional bounds (inclusive).
    pub fn new(min: Option<usize>, max: Option<usize>) -> Self {
        Self {
            min,
            max,
            gate: TargetGate::unrestricted(),
            message: format!("{} has an invalid length", PROPERTY_PLACEHOLDER),
        }
    }

    /// Creates a length constraint with only an upper bound.
    pub fn max(max: usize) -> Self {
        Self::new(None, Some(max))
    }

    /// Replaces the message template.
    pub fn with_message(mut self, template: impl Into<String>) -> Self {
        self.message = template.into();
        self
    }

    /// Restricts the constraint to the listed handler methods.
    pub fn only_for(mut self, targets_csv: &str) -> Self {
        self.gate = TargetGate::configure(Some(targets_csv));
        self
    }

    fn within(&self, s: &str) -> bool {
        let len = s.chars().count();
        self.min.map_or(true, |min| len >= min) && self.max.map_or(true, |max| len <= max)
    }
}

impl Constraint for Length {
    fn initialize(&mut self, params: &ConstraintParams) -> Result<(), Error> {
        apply_common(params, &mut self.gate, &mut self.message);
        if let Some(min) = params.parsed_arg("min")? {
            self.min = Some(min);
        }
        if let Some(max) = params.parsed_arg("max")? {
            self.max = Some(max);
        }
        Ok(())
    }

    fn gate(&self) -> &TargetGate {
        &self.gate
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn check(&self, value: &Value) -> bool {
        match value {
            Value::String(s) => self.within(s),
            Value::Array(items) => items
                .iter()
                .all(|item| item.as_str().map_or(true, |s| self.within(s))),
            _ => true,
        }
    }
}

/// Requires string values to match a regular expression in full.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Option<Regex>,
    gate: TargetGate,
    message: String,
}

impl Pattern {
    /// Creates a pattern constraint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `pattern` is not a valid regex.
    pub fn new(pattern: &str) -> Result<Self, Error> {
        let mut constraint = Self::uninitialized();
        constraint.regex = Some(compile_anchored(pattern)?);
        Ok(constraint)
    }

    /// Creates a pattern constraint to be configured through
    /// [`Constraint::initialize`] with a `regex` argument.
    pub fn uninitialized() -> Self {
        Self {
            regex: None,
            gate: TargetGate::unrestricted(),
            message: format!("{} has an invalid format", PROPERTY_PLACEHOLDER),
        }
    }

    /// Replaces the message template.
    pub fn with_message(mut self, template: impl Into<String>) -> Self {
        self.message = template.into();
        self
    }

    /// Restricts the constraint to the listed handler methods.
    pub fn only_for(mut self, targets_csv: &str) -> Self {
        self.gate = TargetGate::configure(Some(targets_csv));
        self
    }

    fn matches(&self, s: &str) -> bool {
        self.regex.as_ref().map_or(true, |re| re.is_match(s))
    }
}

fn compile_anchored(pattern: &str) -> Result<Regex, Error> {
    Regex::new(&format!("^(?:{})$", pattern))
        .map_err(|e| Error::configuration(format!("invalid pattern '{}': {}", pattern, e)))
}

impl Constraint for Pattern {
    fn initialize(&mut self, params: &ConstraintParams) -> Result<(), Error> {
        apply_common(params, &mut self.gate, &mut self.message);
        match params.arg("regex") {
            Some(pattern) => self.regex = Some(compile_anchored(pattern)?),
            None if self.regex.is_none() => {
                return Err(Error::configuration(
                    "pattern constraint requires a 'regex' argument",
                ))
            }
            None => {}
        }
        Ok(())
    }

    fn gate(&self) -> &TargetGate {
        &self.gate
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn check(&self, value: &Value) -> bool {
        match value {
            Value::String(s) => self.matches(s),
            Value::Array(items) => items
                .iter()
                .all(|item| item.as_str().map_or(true, |s| self.matches(s))),
            _ => true,
        }
    }
}
