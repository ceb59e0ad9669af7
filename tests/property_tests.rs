//! Integration property tests for action-pipeline.
//!
//! These tests check step ordering, normalization and publication
//! invariants across arbitrary inputs.

use action_pipeline::{
    decapitalize, effective_steps, normalize, publish, Action, AccessError, Bind, Error,
    FormCheck, Form, Handler, MethodIdentity, ParamMap, Publish, Schema, Scope, TargetGate,
    ValidationMessage, ValidationOrchestrator, CONSTRAINTS_MARKER,
};
use proptest::prelude::*;
use serde_json::json;

// Strategy: step names drawn from a small alphabet, marker included
fn arb_steps() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop_oneof![
            Just("a".to_string()),
            Just("b".to_string()),
            Just("c".to_string()),
            Just(CONSTRAINTS_MARKER.to_string()),
        ],
        0..6,
    )
}

// Strategy: parameter maps with padded, blank and absent values
fn arb_params() -> impl Strategy<Value = ParamMap> {
    prop::collection::btree_map(
        "[a-z]{1,6}",
        prop::collection::vec(
            prop::option::of(prop::string::string_regex("[ \t\n\u{00A0}a-z0-9]{0,10}").unwrap()),
            0..4,
        ),
        0..6,
    )
    .prop_map(|map| map.into_iter().collect())
}

#[derive(Debug, Clone, Default)]
struct Recorded {
    log: Vec<String>,
}

impl Bind for Recorded {
    fn bind(&mut self, _params: &ParamMap) -> Result<(), Error> {
        Ok(())
    }
}

impl Publish for Recorded {
    fn schema() -> Schema<Self> {
        Schema::new()
    }
}

fn record(form: &mut Recorded, name: &str) -> Vec<ValidationMessage> {
    form.log.push(name.to_string());
    vec![ValidationMessage::new("", name)]
}

impl Form for Recorded {
    fn validation_method(name: &str) -> Option<FormCheck<Self>> {
        match name {
            "a" => Some(|f: &mut Recorded| record(f, "a")),
            "b" => Some(|f: &mut Recorded| record(f, "b")),
            "c" => Some(|f: &mut Recorded| record(f, "c")),
            _ => None,
        }
    }
}

struct Host;

impl Publish for Host {
    fn schema() -> Schema<Self> {
        Schema::new()
    }
}

impl Action for Host {
    type Form = Recorded;

    fn handler(_name: &str) -> Option<Handler<Self>> {
        None
    }
}

proptest! {
    /// Property: the marker appears exactly once in the effective steps
    #[test]
    fn proptest_marker_appears_once_when_absent(steps in arb_steps()) {
        let effective = effective_steps(&steps);
        let had_marker = steps.iter().any(|s| s == CONSTRAINTS_MARKER);

        if had_marker {
            prop_assert_eq!(&effective, &steps);
        } else {
            prop_assert_eq!(effective.len(), steps.len() + 1);
            prop_assert_eq!(effective[0].as_str(), CONSTRAINTS_MARKER);
            prop_assert_eq!(&effective[1..], &steps[..]);
        }
    }

    /// Property: without stop-on-first-error, named steps run in effective order
    #[test]
    fn proptest_steps_run_in_order(steps in arb_steps()) {
        let mut raw = Recorded::default();
        let messages = ValidationOrchestrator::new(&steps, false)
            .run(&Host, &Recorded::default(), &mut raw, &MethodIdentity::new("save"))
            .expect("all steps resolve");

        let expected: Vec<String> = effective_steps(&steps)
            .into_iter()
            .filter(|s| s != CONSTRAINTS_MARKER)
            .collect();
        prop_assert_eq!(&raw.log, &expected);

        let texts: Vec<String> = messages.into_iter().map(|m| m.text).collect();
        prop_assert_eq!(texts, expected);
    }

    /// Property: with stop-on-first-error, at most one failing step runs
    #[test]
    fn proptest_stop_keeps_first_failure_only(steps in arb_steps()) {
        let mut raw = Recorded::default();
        let messages = ValidationOrchestrator::new(&steps, true)
            .run(&Host, &Recorded::default(), &mut raw, &MethodIdentity::new("save"))
            .expect("all steps resolve");

        prop_assert!(messages.len() <= 1);
        prop_assert_eq!(raw.log.len(), messages.len());
    }

    /// Property: normalization is idempotent and keeps the key set
    #[test]
    fn proptest_normalize_idempotent_and_key_preserving(params in arb_params()) {
        let once = normalize(&params);
        let twice = normalize(&once);

        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(once.keys().collect::<Vec<_>>(), params.keys().collect::<Vec<_>>());
        for (name, values) in &params {
            prop_assert_eq!(once.get(name).map(<[_]>::len), Some(values.len()));
        }
    }

    /// Property: decapitalize only ever touches the first character
    #[test]
    fn proptest_decapitalize_preserves_tail(name in "[A-Za-z]{1,12}") {
        let result = decapitalize(&name);

        prop_assert_eq!(result.chars().count(), name.chars().count());
        prop_assert_eq!(&result[1..], &name[1..]);
        prop_assert_eq!(decapitalize(&result), result.clone());
    }

    /// Property: a failing read never leaves partial values in scope
    #[test]
    fn proptest_publication_is_all_or_nothing(fail_at in 0usize..4, values in prop::collection::vec(any::<i32>(), 4)) {
        let mut schema = Schema::<Vec<i32>>::new();
        for i in 0..4 {
            let name = format!("getP{}", i);
            schema = if i == fail_at {
                schema.getter(name, |_: &Vec<i32>| Err::<i32, _>(AccessError::new("unreadable")))
            } else {
                schema.getter(name, move |v: &Vec<i32>| Ok(v[i]))
            };
        }
        let mut scope = Scope::new();
        scope.set("existing", json!(1));

        let result = publish(&values, &schema, &mut scope);

        prop_assert!(
            matches!(result, Err(Error::Access { .. })),
            "expected an access error"
        );
        prop_assert_eq!(scope.len(), 1);
    }

    /// Property: a gate always opens for each of its configured targets
    #[test]
    fn proptest_gate_opens_for_listed_targets(targets in prop::collection::vec("[a-z]{1,8}", 1..5)) {
        let csv = targets.iter().map(|t| format!(" {} ", t)).collect::<Vec<_>>().join(",");
        let gate = TargetGate::configure(Some(csv.as_str()));

        for target in &targets {
            prop_assert!(gate.is_applicable(&MethodIdentity::new(target.as_str())));
        }
        prop_assert!(!gate.is_applicable(&MethodIdentity::new("NOT-A-TARGET")));
    }
}
