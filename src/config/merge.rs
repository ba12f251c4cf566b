//! Field-by-field merging of configuration tiers.
//!
//! Objects merge recursively; every other value in a later tier replaces
//! the earlier one. A null in the later tier means "not set here".

use serde_json::Value;

/// Merge `overlay` onto `base`, the overlay winning on conflicts.
///
/// ```
/// use serde_json::json;
/// use taskscope::config::deep_merge;
///
/// let defaults = json!({"query": {"per_page": 10, "date_format": "%Y-%m-%d"}});
/// let project = json!({"query": {"per_page": 25}});
/// assert_eq!(
///     deep_merge(defaults, project),
///     json!({"query": {"per_page": 25, "date_format": "%Y-%m-%d"}})
/// );
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut merged), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                let next = match merged.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                merged.insert(key, next);
            }
            Value::Object(merged)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Merge tiers lowest priority first.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    values.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_sections_merge_key_by_key() {
        let base = json!({
            "database": {"path": "tasks.db"},
            "query": {"per_page": 10, "date_format": "%Y-%m-%d"}
        });
        let overlay = json!({"query": {"date_format": "%d/%m/%Y"}});
        assert_eq!(
            deep_merge(base, overlay),
            json!({
                "database": {"path": "tasks.db"},
                "query": {"per_page": 10, "date_format": "%d/%m/%Y"}
            })
        );
    }

    #[test]
    fn null_leaves_lower_tier_alone() {
        let base = json!({"query": {"max_per_page": 100}});
        let overlay = json!({"query": {"max_per_page": null}});
        assert_eq!(deep_merge(base.clone(), overlay), base);
    }

    #[test]
    fn arrays_and_scalars_are_replaced() {
        let base = json!({"list": [1, 2], "value": {"nested": true}});
        let overlay = json!({"list": [3], "value": 7});
        assert_eq!(deep_merge(base, overlay), json!({"list": [3], "value": 7}));
    }

    #[test]
    fn merge_all_applies_tiers_in_order() {
        let tiers = vec![
            json!({"query": {"per_page": 10}}),
            json!({"query": {"per_page": 20}}),
            json!({"query": {"per_page": 30, "max_per_page": 50}}),
        ];
        assert_eq!(
            deep_merge_all(tiers),
            json!({"query": {"per_page": 30, "max_per_page": 50}})
        );
    }
}
