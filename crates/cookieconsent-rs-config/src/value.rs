//! Tagged configuration values and the nested tree they form.

use crate::ConfigError;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

/// Nested mapping of configuration keys to values.
///
/// Insertion order is kept so emitted JSON follows the layout of the
/// default tree; equality ignores order.
pub type ConfigTree = IndexMap<String, ConfigValue>;

/// Returned by path reads when the addressed key is absent.
pub static EMPTY: ConfigValue = ConfigValue::Text(String::new());

/// A single configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Number(Number),
    Text(String),
    /// Ordered list, always replaced wholesale by merges.
    Sequence(Vec<ConfigValue>),
    Mapping(ConfigTree),
}

impl ConfigValue {
    /// The empty-text sentinel.
    pub fn empty() -> Self {
        ConfigValue::Text(String::new())
    }

    /// True for the empty-text sentinel.
    pub fn is_empty_text(&self) -> bool {
        matches!(self, ConfigValue::Text(text) if text.is_empty())
    }

    pub fn as_mapping(&self) -> Option<&ConfigTree> {
        match self {
            ConfigValue::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    /// Convert into a `serde_json::Value` without loss.
    pub fn to_json(&self) -> Value {
        match self {
            ConfigValue::Bool(flag) => Value::Bool(*flag),
            ConfigValue::Number(number) => Value::Number(number.clone()),
            ConfigValue::Text(text) => Value::String(text.clone()),
            ConfigValue::Sequence(items) => {
                Value::Array(items.iter().map(ConfigValue::to_json).collect())
            }
            ConfigValue::Mapping(map) => Value::Object(tree_to_json_map(map)),
        }
    }
}

impl From<Value> for ConfigValue {
    /// JSON `null` maps to the empty sentinel so stored data always converts.
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ConfigValue::empty(),
            Value::Bool(flag) => ConfigValue::Bool(flag),
            Value::Number(number) => ConfigValue::Number(number),
            Value::String(text) => ConfigValue::Text(text),
            Value::Array(items) => {
                ConfigValue::Sequence(items.into_iter().map(ConfigValue::from).collect())
            }
            Value::Object(map) => ConfigValue::Mapping(
                map.into_iter()
                    .map(|(key, value)| (key, ConfigValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl<'de> Deserialize<'de> for ConfigValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(ConfigValue::from)
    }
}

impl From<&str> for ConfigValue {
    fn from(text: &str) -> Self {
        ConfigValue::Text(text.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(text: String) -> Self {
        ConfigValue::Text(text)
    }
}

impl From<bool> for ConfigValue {
    fn from(flag: bool) -> Self {
        ConfigValue::Bool(flag)
    }
}

impl From<i64> for ConfigValue {
    fn from(number: i64) -> Self {
        ConfigValue::Number(number.into())
    }
}

impl From<ConfigTree> for ConfigValue {
    fn from(map: ConfigTree) -> Self {
        ConfigValue::Mapping(map)
    }
}

impl From<Vec<ConfigValue>> for ConfigValue {
    fn from(items: Vec<ConfigValue>) -> Self {
        ConfigValue::Sequence(items)
    }
}

impl fmt::Display for ConfigValue {
    /// Text prints raw; everything else prints as compact JSON.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Text(text) => f.write_str(text),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

/// Build a tree from a JSON object. Anything else is rejected.
pub fn tree_from_json(value: Value) -> Result<ConfigTree, ConfigError> {
    match ConfigValue::from(value) {
        ConfigValue::Mapping(map) => Ok(map),
        other => Err(ConfigError::Invalid(format!(
            "expected an object at the root, found {}",
            kind_name(&other)
        ))),
    }
}

/// Convert a tree into a JSON object.
pub fn tree_to_json(tree: &ConfigTree) -> Value {
    Value::Object(tree_to_json_map(tree))
}

fn tree_to_json_map(tree: &ConfigTree) -> Map<String, Value> {
    tree.iter()
        .map(|(key, value)| (key.clone(), value.to_json()))
        .collect()
}

fn kind_name(value: &ConfigValue) -> &'static str {
    match value {
        ConfigValue::Bool(_) => "a boolean",
        ConfigValue::Number(_) => "a number",
        ConfigValue::Text(_) => "a string",
        ConfigValue::Sequence(_) => "an array",
        ConfigValue::Mapping(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn null_converts_to_empty_sentinel() {
        let tree = tree_from_json(json!({ "footer": null })).expect("tree");
        assert!(tree["footer"].is_empty_text());
    }

    #[test]
    fn rejects_non_object_root() {
        let err = tree_from_json(json!(["a"])).unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn json_conversion_keeps_shape() {
        let source = json!({
            "mode": "opt-in",
            "revision": 0,
            "guiOptions": { "consentModal": { "layout": "box" } },
            "sections": [{ "title": "a" }, { "title": "b" }]
        });
        let tree = tree_from_json(source.clone()).expect("tree");
        assert_eq!(
            tree["sections"],
            ConfigValue::Sequence(vec![
                ConfigValue::Mapping(ConfigTree::from([("title".to_string(), "a".into())])),
                ConfigValue::Mapping(ConfigTree::from([("title".to_string(), "b".into())])),
            ])
        );
        assert_eq!(tree_to_json(&tree), source);
    }

    #[test]
    fn deserializes_through_json5() {
        let tree: ConfigTree =
            json5::from_str("{ autoShow: true, mode: 'opt-out', }").expect("json5");
        assert_eq!(tree["autoShow"], ConfigValue::Bool(true));
        assert_eq!(tree["mode"], ConfigValue::from("opt-out"));
    }

    #[test]
    fn display_prints_text_raw() {
        assert_eq!(ConfigValue::from("bottom right").to_string(), "bottom right");
        assert_eq!(ConfigValue::from(false).to_string(), "false");
    }
}
