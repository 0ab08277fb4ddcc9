//! Deep merge of renderer configuration fragments
//!
//! Objects merge key by key and arrays index by index. Any other value in the later fragment,
//! `null` included, replaces what is there.

use serde_json::Value;

/// Merge `fragment` into `target`
pub fn deep_merge(target: &mut Value, fragment: Value) {
    match (target, fragment) {
        (Value::Object(target), Value::Object(fragment)) => {
            for (key, value) in fragment {
                match target.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(target), Value::Array(fragment)) => {
            for (index, value) in fragment.into_iter().enumerate() {
                match target.get_mut(index) {
                    Some(existing) => deep_merge(existing, value),
                    None => target.push(value),
                }
            }
        }
        (target, fragment) => *target = fragment,
    }
}

/// Merge fragments left to right into an empty object
pub fn merge_all(fragments: impl IntoIterator<Item = Value>) -> Value {
    fragments
        .into_iter()
        .fold(Value::Object(Default::default()), |mut acc, fragment| {
            deep_merge(&mut acc, fragment);
            acc
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn merged(a: Value, b: Value) -> Value {
        let mut out = a;
        deep_merge(&mut out, b);
        out
    }

    #[test]
    fn test_objects_merge_key_wise() {
        assert_eq!(
            merged(
                json!({"chart": {"type": "column"}, "legend": {"enabled": false}}),
                json!({"chart": {"height": 200}, "credits": {"enabled": false}})
            ),
            json!({
                "chart": {"type": "column", "height": 200},
                "legend": {"enabled": false},
                "credits": {"enabled": false}
            })
        );
    }

    #[test]
    fn test_arrays_merge_index_wise() {
        assert_eq!(
            merged(
                json!({"yAxis": [{"title": {"text": "A"}}]}),
                json!({"yAxis": [{"opposite": false}, {"opposite": true}]})
            ),
            json!({"yAxis": [{"title": {"text": "A"}, "opposite": false}, {"opposite": true}]})
        );
    }

    #[test]
    fn test_null_and_scalars_override() {
        assert_eq!(
            merged(json!({"series": [{"stack": 0}]}), json!({"series": [{"stack": null}]})),
            json!({"series": [{"stack": null}]})
        );
        assert_eq!(merged(json!({"a": {"b": 1}}), json!({"a": 2})), json!({"a": 2}));
        assert_eq!(merged(json!({"a": 1}), json!({"a": {"b": 2}})), json!({"a": {"b": 2}}));
    }

    #[test]
    fn test_merge_all_order() {
        let out = merge_all([
            json!({"plotOptions": {"series": {"stacking": "normal"}}}),
            json!({"plotOptions": {"series": {"stacking": "percent"}}}),
        ]);
        assert_eq!(out, json!({"plotOptions": {"series": {"stacking": "percent"}}}));
        assert_eq!(merge_all(Vec::new()), json!({}));
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            (-100i64..100).prop_map(Value::from),
            "[a-z]{0,4}".prop_map(Value::from),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-c]", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_empty_object_is_identity(value in arb_json()) {
            let object = json!({"root": value});
            prop_assert_eq!(merged(object.clone(), json!({})), object.clone());
            prop_assert_eq!(merged(json!({}), object.clone()), object);
        }

        #[test]
        fn prop_merge_is_idempotent(value in arb_json()) {
            prop_assert_eq!(merged(value.clone(), value.clone()), value);
        }

        #[test]
        fn prop_later_scalar_wins(value in arb_json(), scalar in -100i64..100) {
            let out = merged(json!({"k": value}), json!({"k": scalar}));
            prop_assert_eq!(out, json!({"k": scalar}));
        }
    }
}
