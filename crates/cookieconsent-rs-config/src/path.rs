//! Bracket-notation paths into a `ConfigTree`.
//!
//! Form field names such as `guiOptions[consentModal][layout]` address one
//! leaf of the nested configuration. Two parsers exist:
//!
//! - [`Path::parse`] is lenient: only well-formed `[...]` groups count as
//!   segments and anything else in the string is ignored. A string without
//!   groups is a single bare key. It never fails.
//! - [`Path::parse_field_name`] is strict: the leading key is the first
//!   segment and malformed brackets are rejected.
//!
//! Reads are total and resolve absent keys to the empty-text sentinel;
//! writes materialize intermediate mappings.

use crate::error::PathError;
use crate::value::{ConfigTree, ConfigValue, EMPTY};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Ordered, non-empty list of keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// Lenient parse: bracket groups only, or the whole string as one key.
    pub fn parse(input: &str) -> Self {
        static SEGMENT: LazyLock<Option<Regex>> =
            LazyLock::new(|| Regex::new(r"\[([^\]]+)\]").ok());

        let segments: Vec<String> = match SEGMENT.as_ref() {
            Some(regex) => regex
                .captures_iter(input)
                .filter_map(|captures| captures.get(1))
                .map(|group| group.as_str().to_string())
                .collect(),
            None => Vec::new(),
        };

        if segments.is_empty() {
            return Self {
                segments: vec![input.to_string()],
            };
        }
        Self { segments }
    }

    /// Strict parse of `head[seg][seg]...`.
    pub fn parse_field_name(input: &str) -> Result<Self, PathError> {
        let error = |offset: usize, reason: &'static str| PathError {
            input: input.to_string(),
            offset,
            reason,
        };

        let bytes = input.as_bytes();
        let head_end = input.find(['[', ']']).unwrap_or(input.len());
        if head_end == 0 {
            return Err(error(0, "expected a key before the first bracket"));
        }
        if bytes.get(head_end) == Some(&b']') {
            return Err(error(head_end, "unexpected closing bracket"));
        }

        let mut segments = vec![input[..head_end].to_string()];
        let mut pos = head_end;
        while pos < bytes.len() {
            if bytes[pos] != b'[' {
                return Err(error(pos, "expected '[' after a closing bracket"));
            }
            let start = pos + 1;
            let Some(found) = input[start..].find(['[', ']']) else {
                return Err(error(pos, "unclosed bracket"));
            };
            let close = start + found;
            if bytes[close] == b'[' {
                return Err(error(close, "nested brackets are not allowed"));
            }
            if close == start {
                return Err(error(pos, "empty brackets"));
            }
            segments.push(input[start..close].to_string());
            pos = close + 1;
        }

        Ok(Self { segments })
    }

    /// Build a path from explicit segments. Returns `None` when empty.
    pub fn from_segments<I, S>(segments: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return None;
        }
        Some(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// First segment (the top-level key).
    pub fn head(&self) -> &str {
        &self.segments[0]
    }

    /// The path without its first segment, if anything remains.
    pub fn tail(&self) -> Option<Self> {
        Self::from_segments(self.segments[1..].iter().cloned())
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::parse_field_name(input)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (head, rest) = self.split();
        f.write_str(head)?;
        for segment in rest {
            write!(f, "[{segment}]")?;
        }
        Ok(())
    }
}

impl Path {
    fn split(&self) -> (&String, &[String]) {
        let (head, rest) = self.segments.split_at(1);
        (&head[0], rest)
    }
}

/// Resolve `path` against `tree`.
///
/// The walk stops at the first absent key (or at a non-mapping value
/// with segments left) and yields the empty-text sentinel.
pub fn read<'a>(tree: &'a ConfigTree, path: &Path) -> &'a ConfigValue {
    let (head, rest) = path.split();
    let Some(mut current) = tree.get(head) else {
        return &EMPTY;
    };
    for segment in rest {
        let next = match current {
            ConfigValue::Mapping(map) => map.get(segment),
            _ => None,
        };
        let Some(next) = next else {
            return &EMPTY;
        };
        current = next;
    }
    current
}

/// Assign `value` at `path`, replacing absent or non-mapping intermediate
/// nodes with empty mappings.
pub fn write(tree: &mut ConfigTree, path: &Path, value: ConfigValue) {
    let Some((last, parents)) = path.segments.split_last() else {
        return;
    };
    let mut current = tree;
    for segment in parents {
        let slot = current
            .entry(segment.clone())
            .or_insert_with(|| ConfigValue::Mapping(ConfigTree::new()));
        current = ensure_mapping(slot);
    }
    current.insert(last.clone(), value);
}

/// Copy-on-write variant of [`write`]; `tree` is left untouched.
pub fn with_value(tree: &ConfigTree, path: &Path, value: ConfigValue) -> ConfigTree {
    let mut updated = tree.clone();
    write(&mut updated, path, value);
    updated
}

/// Remove the leaf or subtree at `path`, returning it when present.
pub fn remove(tree: &mut ConfigTree, path: &Path) -> Option<ConfigValue> {
    let (last, parents) = path.segments.split_last()?;
    let mut current = tree;
    for segment in parents {
        current = match current.get_mut(segment) {
            Some(ConfigValue::Mapping(map)) => map,
            _ => return None,
        };
    }
    current.shift_remove(last)
}

fn ensure_mapping(slot: &mut ConfigValue) -> &mut ConfigTree {
    if !matches!(slot, ConfigValue::Mapping(_)) {
        *slot = ConfigValue::Mapping(ConfigTree::new());
    }
    match slot {
        ConfigValue::Mapping(map) => map,
        _ => unreachable!("slot holds a mapping"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::tree_from_json;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn segments(path: &Path) -> Vec<&str> {
        path.segments().iter().map(String::as_str).collect()
    }

    #[test]
    fn lenient_parse_keeps_bracket_groups_only() {
        assert_eq!(segments(&Path::parse("a[b][c]")), vec!["b", "c"]);
        assert_eq!(
            segments(&Path::parse("guiOptions[consentModal][layout]")),
            vec!["consentModal", "layout"]
        );
    }

    #[test]
    fn lenient_parse_bare_key() {
        assert_eq!(segments(&Path::parse("mode")), vec!["mode"]);
    }

    #[test]
    fn lenient_parse_drops_malformed_groups() {
        assert_eq!(segments(&Path::parse("a[]")), vec!["a[]"]);
        assert_eq!(segments(&Path::parse("a[b][]")), vec!["b"]);
        assert_eq!(segments(&Path::parse("a[b")), vec!["a[b"]);
    }

    #[test]
    fn strict_parse_includes_head() {
        let path = Path::parse_field_name("a[b][c]").expect("path");
        assert_eq!(segments(&path), vec!["a", "b", "c"]);
        assert_eq!(path.to_string(), "a[b][c]");
        assert_eq!(segments(&path.tail().expect("tail")), vec!["b", "c"]);
    }

    #[test]
    fn strict_parse_rejects_malformed_names() {
        for (input, offset) in [("", 0), ("[a]", 0), ("a[", 1), ("a[]", 1), ("a[b]x", 4), ("a]", 1)] {
            let err = Path::parse_field_name(input).unwrap_err();
            assert_eq!(err.offset, offset, "input {input:?}");
        }
        let err = Path::parse_field_name("a[b[c]]").unwrap_err();
        assert_eq!(err.reason, "nested brackets are not allowed");
    }

    #[test]
    fn read_missing_key_is_empty_sentinel() {
        let tree = tree_from_json(json!({ "a": { "b": 1 } })).expect("tree");
        assert!(read(&tree, &Path::parse("x[y]")).is_empty_text());
        assert!(read(&tree, &Path::parse("missing")).is_empty_text());
        let deep = Path::from_segments(["a", "b", "c"]).expect("path");
        assert!(read(&tree, &deep).is_empty_text());
    }

    #[test]
    fn write_then_read_round_trips() {
        let mut tree = ConfigTree::new();
        let path = Path::parse("a[b][c]");
        write(&mut tree, &path, ConfigValue::from("v"));
        assert_eq!(read(&tree, &path), &ConfigValue::from("v"));
    }

    #[test]
    fn write_replaces_scalar_intermediate() {
        let mut tree = tree_from_json(json!({ "a": "scalar", "keep": true })).expect("tree");
        let path = Path::parse_field_name("a[b]").expect("path");
        write(&mut tree, &path, ConfigValue::from(false));
        assert_eq!(
            tree,
            tree_from_json(json!({ "a": { "b": false }, "keep": true })).expect("tree")
        );
    }

    #[test]
    fn with_value_leaves_source_untouched() {
        let source = tree_from_json(json!({ "a": { "b": 1 } })).expect("tree");
        let path = Path::parse_field_name("a[c]").expect("path");
        let updated = with_value(&source, &path, ConfigValue::from(2_i64));
        assert_eq!(source, tree_from_json(json!({ "a": { "b": 1 } })).expect("tree"));
        assert_eq!(
            updated,
            tree_from_json(json!({ "a": { "b": 1, "c": 2 } })).expect("tree")
        );
    }

    #[test]
    fn remove_returns_previous_value() {
        let mut tree = tree_from_json(json!({ "a": { "b": 1, "c": 2 } })).expect("tree");
        let path = Path::parse_field_name("a[b]").expect("path");
        assert_eq!(remove(&mut tree, &path), Some(ConfigValue::from(1_i64)));
        assert_eq!(remove(&mut tree, &path), None);
        assert_eq!(tree, tree_from_json(json!({ "a": { "c": 2 } })).expect("tree"));
    }
}
