use std::any::type_name;

use super::fields::validate_fields;
use crate::action::{Action, Form};
use crate::context::MethodIdentity;
use crate::error::{Error, ValidationMessage};

/// Step name that runs the declarative single-field constraints.
pub const CONSTRAINTS_MARKER: &str = "@";

/// Returns the step list with [`CONSTRAINTS_MARKER`] prepended if it is
/// missing. A list that already contains the marker is returned unchanged.
///
/// # Examples
///
/// ```
/// use action_pipeline::effective_steps;
///
/// assert_eq!(effective_steps(&["a".into()]), vec!["@", "a"]);
/// assert_eq!(effective_steps(&["a".into(), "@".into()]), vec!["a", "@"]);
/// ```
pub fn effective_steps(steps: &[String]) -> Vec<String> {
    if steps.iter().any(|s| s == CONSTRAINTS_MARKER) {
        return steps.to_vec();
    }
    std::iter::once(CONSTRAINTS_MARKER.to_string())
        .chain(steps.iter().cloned())
        .collect()
}

/// Runs the ordered validation steps configured for a handler method.
#[derive(Debug, Clone)]
pub struct ValidationOrchestrator {
    steps: Vec<String>,
    stop_on_first_error: bool,
}

impl ValidationOrchestrator {
    /// Creates an orchestrator over `steps`.
    pub fn new(steps: &[String], stop_on_first_error: bool) -> Self {
        Self {
            steps: effective_steps(steps),
            stop_on_first_error,
        }
    }

    /// Returns the effective step names in execution order.
    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    /// Runs every step and returns the collected messages in step order.
    ///
    /// The constraint step checks `normalized`. Named steps resolve on the
    /// form first and run against `raw`, which they may mutate; otherwise
    /// they resolve on the action.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if a named step exists on neither the
    /// form nor the action, and [`Error::Access`] if a constrained property
    /// cannot be read.
    pub fn run<A: Action>(
        &self,
        action: &A,
        normalized: &A::Form,
        raw: &mut A::Form,
        method: &MethodIdentity,
    ) -> Result<Vec<ValidationMessage>, Error> {
        let mut messages = Vec::new();
        for step in &self.steps {
            if self.stop_on_first_error && !messages.is_empty() {
                break;
            }
            if step == CONSTRAINTS_MARKER {
                let violations = validate_fields(normalized, method)?;
                messages.extend(violations.into_iter().map(ValidationMessage::from));
            } else if let Some(check) = <A::Form as Form>::validation_method(step) {
                messages.extend(check(raw));
            } else if let Some(check) = A::validation_method(step) {
                messages.extend(check(action, raw));
            } else {
                return Err(Error::configuration(format!(
                    "validation method '{}' not found on form {} or action {}",
                    step,
                    type_name::<A::Form>(),
                    type_name::<A>()
                )));
            }
        }
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionCheck, FormCheck, Handler};
    use crate::binder::Bind;
    use crate::publish::{Publish, Schema};
    use crate::request::ParamMap;
    use crate::validation::{FieldConstraints, Required};

    #[derive(Debug, Clone, Default)]
    struct Probe {
        name: Option<String>,
        trail: Vec<&'static str>,
    }

    impl Bind for Probe {
        fn bind(&mut self, params: &ParamMap) -> Result<(), Error> {
            self.name = params.first("name").map(str::to_string);
            Ok(())
        }
    }

    impl Publish for Probe {
        fn schema() -> Schema<Self> {
            Schema::new()
        }
    }

    impl Form for Probe {
        fn constraints() -> FieldConstraints<Self> {
            FieldConstraints::new().rule(
                "name",
                |p: &Probe| p.name.clone(),
                Required::new().with_message("Mc"),
            )
        }

        fn validation_method(name: &str) -> Option<FormCheck<Self>> {
            match name {
                "a" => Some(|p: &mut Probe| {
                    p.trail.push("a");
                    vec![ValidationMessage::new("", "Ma")]
                }),
                "quiet" => Some(|p: &mut Probe| {
                    p.trail.push("quiet");
                    Vec::new()
                }),
                _ => None,
            }
        }
    }

    struct Owner;

    impl Publish for Owner {
        fn schema() -> Schema<Self> {
            Schema::new()
        }
    }

    impl Action for Owner {
        type Form = Probe;

        fn handler(_name: &str) -> Option<Handler<Self>> {
            None
        }

        fn validation_method(name: &str) -> Option<ActionCheck<Self>> {
            match name {
                "b" => Some(|_: &Owner, _: &Probe| vec![ValidationMessage::new("", "Mb")]),
                _ => None,
            }
        }
    }

    fn steps(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn run(names: &[&str], stop: bool, raw: &mut Probe) -> Result<Vec<String>, Error> {
        let normalized = Probe::default();
        let messages = ValidationOrchestrator::new(&steps(names), stop).run(
            &Owner,
            &normalized,
            raw,
            &MethodIdentity::new("save"),
        )?;
        Ok(messages.into_iter().map(|m| m.text).collect())
    }

    #[test]
    fn marker_is_prepended_once() {
        let orchestrator = ValidationOrchestrator::new(&steps(&["a", "b"]), true);
        assert_eq!(orchestrator.steps(), steps(&["@", "a", "b"]).as_slice());
    }

    #[test]
    fn marker_position_is_preserved() {
        let orchestrator = ValidationOrchestrator::new(&steps(&["a", "@", "b"]), true);
        assert_eq!(orchestrator.steps(), steps(&["a", "@", "b"]).as_slice());
    }

    #[test]
    fn stop_on_first_error_halts_after_failing_step() {
        let mut raw = Probe::default();

        let texts = run(&["a", "b", "@"], true, &mut raw).expect("run");

        assert_eq!(texts, vec!["Ma"]);
    }

    #[test]
    fn without_stop_every_step_contributes_in_order() {
        let mut raw = Probe::default();

        let texts = run(&["a", "b", "@"], false, &mut raw).expect("run");

        assert_eq!(texts, vec!["Ma", "Mb", "Mc"]);
    }

    #[test]
    fn form_methods_run_against_the_raw_form() {
        let mut raw = Probe::default();

        run(&["quiet", "a"], false, &mut raw).expect("run");

        assert_eq!(raw.trail, vec!["quiet", "a"]);
    }

    #[test]
    fn missing_method_is_a_configuration_error() {
        let mut raw = Probe::default();

        let err = run(&["nope"], false, &mut raw).unwrap_err();

        match err {
            Error::Configuration(message) => {
                assert!(message.contains("'nope'"));
                assert!(message.contains("Probe"));
                assert!(message.contains("Owner"));
            }
            other => panic!("expected configuration error, got {:?}", other),
        }
    }
}
