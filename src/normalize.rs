//! Parameter normalization applied before validation.
//!
//! Normalization trims every value and turns values that are blank after
//! trimming into absent values. It never adds or drops parameter names.

use crate::request::{ParamMap, ParamValues};

/// Normalizes a single parameter value.
///
/// Leading and trailing Unicode whitespace is removed; a value that is empty
/// after trimming becomes `None`.
///
/// # Examples
///
/// ```
/// use action_pipeline::normalize_value;
///
/// assert_eq!(normalize_value(Some(" 123 ")), Some("123".to_string()));
/// assert_eq!(normalize_value(Some("\u{3000}\t ")), None);
/// assert_eq!(normalize_value(None), None);
/// ```
pub fn normalize_value(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Returns a normalized copy of `params` with the same key set.
///
/// The input map is left untouched.
///
/// # Examples
///
/// ```
/// use action_pipeline::{normalize, ParamMap};
///
/// let mut params = ParamMap::new();
/// params.add("age", " 42 ");
/// params.add("nick", "   ");
///
/// let normalized = normalize(&params);
/// assert_eq!(normalized.first("age"), Some("42"));
/// assert_eq!(normalized.get("nick"), Some(&[None][..]));
/// assert_eq!(params.first("age"), Some(" 42 "));
/// ```
pub fn normalize(params: &ParamMap) -> ParamMap {
    params
        .iter()
        .map(|(name, values)| {
            let normalized: ParamValues = values
                .iter()
                .map(|v| normalize_value(v.as_deref()))
                .collect();
            (name.clone(), normalized)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(normalize_value(Some(" 123 ")), Some("123".to_string()));
        assert_eq!(
            normalize_value(Some("\t hello world \n")),
            Some("hello world".to_string())
        );
    }

    #[test]
    fn keeps_inner_whitespace() {
        assert_eq!(normalize_value(Some(" a  b ")), Some("a  b".to_string()));
    }

    #[test]
    fn blank_becomes_absent() {
        assert_eq!(normalize_value(Some("   ")), None);
        assert_eq!(normalize_value(Some("")), None);
    }

    #[test]
    fn trims_non_ascii_whitespace() {
        // ideographic space and no-break space
        assert_eq!(
            normalize_value(Some("\u{3000}東京\u{00A0}")),
            Some("東京".to_string())
        );
    }

    #[test]
    fn preserves_key_set_and_value_count() {
        let mut params = ParamMap::new();
        params.add("a", " x ");
        params.add("a", "  ");
        params.insert("b", vec![None]);
        params.insert("c", Vec::new());

        let normalized = normalize(&params);

        assert_eq!(
            normalized.keys().collect::<Vec<_>>(),
            params.keys().collect::<Vec<_>>()
        );
        assert_eq!(normalized.get("a"), Some(&[Some("x".to_string()), None][..]));
        assert_eq!(normalized.get("b"), Some(&[None][..]));
        assert_eq!(normalized.get("c"), Some(&[][..]));
    }

    #[test]
    fn does_not_mutate_input() {
        let mut params = ParamMap::new();
        params.add("name", "  Alice  ");
        let before = params.clone();

        let _ = normalize(&params);

        assert_eq!(params, before);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_params() -> impl Strategy<Value = ParamMap> {
            prop::collection::btree_map(
                "[a-z]{1,6}",
                prop::collection::vec(prop::option::of("[ \t\u{3000}a-z0-9]{0,8}"), 0..4),
                0..6,
            )
            .prop_map(|m| m.into_iter().collect())
        }

        proptest! {
            /// Property: normalizing twice equals normalizing once
            #[test]
            fn proptest_normalize_is_idempotent(params in arb_params()) {
                let once = normalize(&params);
                let twice = normalize(&once);
                prop_assert_eq!(once, twice);
            }

            /// Property: no value is left blank or padded
            #[test]
            fn proptest_normalized_values_are_trimmed(params in arb_params()) {
                let normalized = normalize(&params);
                for (_, values) in &normalized {
                    for value in values.iter().flatten() {
                        prop_assert!(!value.is_empty());
                        prop_assert_eq!(value.trim(), value.as_str());
                    }
                }
            }
        }
    }
}
