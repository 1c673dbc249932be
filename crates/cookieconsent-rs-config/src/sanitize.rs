//! Leaf normalization for untrusted override trees.
//!
//! Submitted values arrive as text. Each leaf is classified as boolean
//! (`"1"`/`"0"`), numeric, or plain text, in that order; plain text goes
//! through a [`TextSanitizer`].

use crate::value::{ConfigTree, ConfigValue};
use log::debug;
use regex::Regex;
use serde_json::Number;
use std::sync::LazyLock;

/// Host-provided plain-text cleanup applied to non-numeric text leaves.
pub trait TextSanitizer: Send + Sync {
    fn sanitize_text(&self, input: &str) -> String;
}

/// Plain-text rules for single-line settings fields.
///
/// Strips markup (dropping `<script>`/`<style>` bodies), encodes stray
/// `<`, removes percent-encoded octets and collapses whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextSanitizer;

struct Patterns {
    script_style: Regex,
    tag: Regex,
    whitespace: Regex,
    octet: Regex,
}

static PATTERNS: LazyLock<Option<Patterns>> = LazyLock::new(|| {
    Some(Patterns {
        script_style: Regex::new(r"(?is)<(script|style)[^>]*?>.*?</(script|style)>").ok()?,
        tag: Regex::new(r"<[^<>]*>").ok()?,
        whitespace: Regex::new(r"[\r\n\t ]+").ok()?,
        octet: Regex::new(r"%[a-fA-F0-9]{2}").ok()?,
    })
});

impl TextSanitizer for PlainTextSanitizer {
    fn sanitize_text(&self, input: &str) -> String {
        let Some(patterns) = PATTERNS.as_ref() else {
            return input.trim().replace('<', "&lt;");
        };

        let mut text = input.to_string();
        if text.contains('<') {
            text = patterns.script_style.replace_all(&text, "").into_owned();
            text = patterns.tag.replace_all(&text, "").into_owned();
            text = text.replace('<', "&lt;");
        }
        text = collapse_whitespace(&patterns.whitespace, &text);

        let mut found_octets = false;
        while patterns.octet.is_match(&text) {
            text = patterns.octet.replace_all(&text, "").into_owned();
            found_octets = true;
        }
        if found_octets {
            text = collapse_whitespace(&patterns.whitespace, &text);
        }
        text
    }
}

fn collapse_whitespace(pattern: &Regex, text: &str) -> String {
    pattern.replace_all(text, " ").trim().to_string()
}

/// Normalize every leaf of `input` into a tree of the same shape.
pub fn sanitize_tree<S>(input: &ConfigTree, sanitizer: &S) -> ConfigTree
where
    S: TextSanitizer + ?Sized,
{
    input
        .iter()
        .map(|(key, value)| (key.clone(), sanitize_value(value, sanitizer)))
        .collect()
}

/// Normalize a single value; mappings and sequences recurse.
pub fn sanitize_value<S>(value: &ConfigValue, sanitizer: &S) -> ConfigValue
where
    S: TextSanitizer + ?Sized,
{
    match value {
        ConfigValue::Mapping(map) => ConfigValue::Mapping(sanitize_tree(map, sanitizer)),
        ConfigValue::Sequence(items) => ConfigValue::Sequence(
            items
                .iter()
                .map(|item| sanitize_value(item, sanitizer))
                .collect(),
        ),
        ConfigValue::Bool(flag) => ConfigValue::Bool(*flag),
        ConfigValue::Number(number) => ConfigValue::Number(number.clone()),
        ConfigValue::Text(text) => match text.as_str() {
            "1" => ConfigValue::Bool(true),
            "0" => ConfigValue::Bool(false),
            _ => match parse_numeric(text) {
                Some(number) => ConfigValue::Number(number),
                None => ConfigValue::Text(sanitizer.sanitize_text(text)),
            },
        },
    }
}

/// Parse numeric text (optional sign, decimal or exponent form, padding
/// whitespace) into a JSON number.
///
/// Only text the number formats back to exactly is converted, so leading
/// zeros, trailing fractional zeros and out-of-range integers stay text.
pub fn parse_numeric(text: &str) -> Option<Number> {
    static NUMERIC: LazyLock<Option<Regex>> = LazyLock::new(|| {
        Regex::new(r"^\s*[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?\s*$").ok()
    });

    let pattern = NUMERIC.as_ref()?;
    if !pattern.is_match(text) {
        return None;
    }
    let trimmed = text.trim();
    let number = if trimmed.contains(['.', 'e', 'E']) {
        trimmed.parse::<f64>().ok().and_then(Number::from_f64)
    } else {
        trimmed
            .parse::<i64>()
            .map(Number::from)
            .or_else(|_| trimmed.parse::<u64>().map(Number::from))
            .ok()
    };
    match number {
        Some(number) if number.to_string() == trimmed => Some(number),
        _ => {
            debug!("numeric text does not round-trip, keeping as text: {trimmed}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::tree_from_json;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn string_flags_become_booleans() {
        let input = tree_from_json(json!({ "categories": { "analytics": { "enabled": "1" } } }))
            .expect("tree");
        let sanitized = sanitize_tree(&input, &PlainTextSanitizer);
        assert_eq!(
            sanitized,
            tree_from_json(json!({ "categories": { "analytics": { "enabled": true } } }))
                .expect("tree")
        );
    }

    #[test]
    fn numbers_and_text_are_classified() {
        let input = tree_from_json(json!({
            "revision": "3",
            "ratio": " 2.5 ",
            "off": "0",
            "flag": false,
            "count": 7,
            "title": "  We use\n cookies  "
        }))
        .expect("tree");
        let sanitized = sanitize_tree(&input, &PlainTextSanitizer);
        assert_eq!(
            sanitized,
            tree_from_json(json!({
                "revision": 3,
                "ratio": 2.5,
                "off": false,
                "flag": false,
                "count": 7,
                "title": "We use cookies"
            }))
            .expect("tree")
        );
    }

    #[test]
    fn sequences_are_sanitized_in_order() {
        let input = tree_from_json(json!({ "list": ["<b>a</b>", "1", "x"] })).expect("tree");
        let sanitized = sanitize_tree(&input, &PlainTextSanitizer);
        assert_eq!(
            sanitized,
            tree_from_json(json!({ "list": ["a", true, "x"] })).expect("tree")
        );
    }

    #[test]
    fn plain_text_strips_markup() {
        let sanitizer = PlainTextSanitizer;
        assert_eq!(
            sanitizer.sanitize_text("<script>alert(1)</script>Hello <em>world</em>"),
            "Hello world"
        );
        assert_eq!(sanitizer.sanitize_text("a < b"), "a &lt; b");
        assert_eq!(sanitizer.sanitize_text("50%25 off%20now"), "50 offnow");
        assert_eq!(sanitizer.sanitize_text("Service|Services"), "Service|Services");
    }

    #[test]
    fn numeric_detection() {
        assert_eq!(parse_numeric("42"), Some(42.into()));
        assert_eq!(parse_numeric("-7"), Some((-7).into()));
        assert_eq!(parse_numeric(" 2.5 "), Number::from_f64(2.5));
        assert_eq!(parse_numeric("18446744073709551615"), Some(u64::MAX.into()));
        assert_eq!(parse_numeric("0x1A"), None);
        assert_eq!(parse_numeric("bottom right"), None);
        assert_eq!(parse_numeric(""), None);
    }

    #[test]
    fn lossy_numeric_text_stays_text() {
        for text in ["00123", "1.10", "+5", ".5", "1e3", "12345678901234567890123"] {
            assert_eq!(parse_numeric(text), None, "{text:?}");
        }
        let input = tree_from_json(json!({
            "code": "00123",
            "price": "1.10",
            "big": "12345678901234567890123"
        }))
        .expect("tree");
        assert_eq!(sanitize_tree(&input, &PlainTextSanitizer), input);
    }

    struct Upper;

    impl TextSanitizer for Upper {
        fn sanitize_text(&self, input: &str) -> String {
            input.to_uppercase()
        }
    }

    #[test]
    fn custom_sanitizer_is_used_for_text_only() {
        let input = tree_from_json(json!({ "a": "box", "b": "1" })).expect("tree");
        let sanitized = sanitize_tree(&input, &Upper);
        assert_eq!(
            sanitized,
            tree_from_json(json!({ "a": "BOX", "b": true })).expect("tree")
        );
    }
}
