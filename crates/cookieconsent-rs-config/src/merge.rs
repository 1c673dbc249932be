//! Distinct-key merge of an override tree onto a default tree.
//!
//! Mapping-vs-mapping recurses. Every other combination (new key, scalar,
//! sequence, or a type mismatch) takes the override value verbatim.
//! Sequences are never merged element-wise.

use crate::value::{ConfigTree, ConfigValue};

/// Layer `overrides` on top of `defaults`, returning a new tree.
pub fn merge_distinct(defaults: &ConfigTree, overrides: &ConfigTree) -> ConfigTree {
    let mut merged = defaults.clone();
    merge_into(&mut merged, overrides);
    merged
}

/// Merge overlay values into the base in place.
fn merge_into(base: &mut ConfigTree, overlay: &ConfigTree) {
    for (key, value) in overlay {
        match (base.get_mut(key), value) {
            (Some(ConfigValue::Mapping(existing)), ConfigValue::Mapping(nested)) => {
                merge_into(existing, nested);
            }
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::tree_from_json;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    fn tree(value: Value) -> ConfigTree {
        tree_from_json(value).expect("tree")
    }

    #[test]
    fn nested_override_keeps_siblings() {
        let defaults = tree(json!({
            "mode": "opt-in",
            "guiOptions": {
                "consentModal": { "layout": "box", "position": "bottom right" },
                "preferencesModal": { "layout": "box" }
            }
        }));
        let overrides = tree(json!({ "guiOptions": { "consentModal": { "layout": "bar" } } }));
        let merged = merge_distinct(&defaults, &overrides);
        assert_eq!(
            merged,
            tree(json!({
                "mode": "opt-in",
                "guiOptions": {
                    "consentModal": { "layout": "bar", "position": "bottom right" },
                    "preferencesModal": { "layout": "box" }
                }
            }))
        );
    }

    #[test]
    fn empty_override_is_identity() {
        let defaults = tree(json!({ "a": { "b": [1, 2] }, "c": true }));
        assert_eq!(merge_distinct(&defaults, &ConfigTree::new()), defaults);
    }

    #[test]
    fn sequences_are_replaced_wholesale() {
        let defaults = tree(json!({ "sections": ["a", "b", "c"] }));
        let overrides = tree(json!({ "sections": ["x"] }));
        let merged = merge_distinct(&defaults, &overrides);
        assert_eq!(merged, tree(json!({ "sections": ["x"] })));
    }

    #[test]
    fn type_mismatch_takes_override() {
        let defaults = tree(json!({ "a": { "b": 1 }, "c": "text" }));
        let overrides = tree(json!({ "a": "flat", "c": { "d": 2 } }));
        let merged = merge_distinct(&defaults, &overrides);
        assert_eq!(merged, tree(json!({ "a": "flat", "c": { "d": 2 } })));
    }

    #[test]
    fn new_keys_are_added() {
        let defaults = tree(json!({ "a": 1 }));
        let overrides = tree(json!({ "b": { "c": 2 } }));
        let merged = merge_distinct(&defaults, &overrides);
        assert_eq!(merged, tree(json!({ "a": 1, "b": { "c": 2 } })));
    }

    #[test]
    fn merge_is_idempotent() {
        let defaults = tree(json!({
            "categories": { "analytics": { "enabled": false, "readOnly": false } },
            "mode": "opt-in"
        }));
        let overrides = tree(json!({
            "categories": { "analytics": { "enabled": true } },
            "extra": ["x"]
        }));
        let once = merge_distinct(&defaults, &overrides);
        let twice = merge_distinct(&once, &overrides);
        assert_eq!(once, twice);
    }

    #[test]
    fn defaults_are_not_mutated() {
        let defaults = tree(json!({ "a": { "b": 1 } }));
        let snapshot = defaults.clone();
        let _ = merge_distinct(&defaults, &tree(json!({ "a": { "b": 2 } })));
        assert_eq!(defaults, snapshot);
    }
}
