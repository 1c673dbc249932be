//! Serialization of the effective configuration for the front-end library.

use crate::ConfigError;
use crate::value::ConfigTree;
use serde::Serialize;

/// Bundled cookieconsent library version.
pub const LIBRARY_VERSION: &str = "3.1.0";

/// Element id of the emitted script fragment.
pub const SCRIPT_ID: &str = "wp-cookieconsent-config";

/// Compact JSON with raw UTF-8 and unescaped `/`, keeping key order.
pub fn to_json(tree: &ConfigTree) -> Result<String, ConfigError> {
    Ok(serde_json::to_string(tree)?)
}

/// Pretty-printed variant of [`to_json`].
pub fn to_json_pretty(tree: &ConfigTree) -> Result<String, ConfigError> {
    Ok(serde_json::to_string_pretty(tree)?)
}

/// Page fragment that hands the configuration to `CookieConsent.run`
/// once the document has loaded.
pub fn inline_script(tree: &ConfigTree) -> Result<String, ConfigError> {
    let config_json = to_json(tree)?;
    Ok(format!(
        r#"<script id="{SCRIPT_ID}">
    document.addEventListener('DOMContentLoaded', function() {{
        if (typeof CookieConsent !== 'undefined' && CookieConsent.run) {{
            CookieConsent.run({config_json});
        }}
    }});
</script>
"#
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Style,
    /// Loaded deferred in the page footer.
    Script,
}

impl AssetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AssetKind::Style => "style",
            AssetKind::Script => "script",
        }
    }
}

/// A front-end file of the bundled library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Asset {
    pub handle: &'static str,
    pub kind: AssetKind,
    pub url: String,
    pub version: &'static str,
}

/// Library assets served from `base_url` (with or without trailing slash).
pub fn frontend_assets(base_url: &str) -> Vec<Asset> {
    let base = base_url.trim_end_matches('/');
    vec![
        Asset {
            handle: "cookieconsent",
            kind: AssetKind::Style,
            url: format!("{base}/assets/cookieconsent.css"),
            version: LIBRARY_VERSION,
        },
        Asset {
            handle: "cookieconsent",
            kind: AssetKind::Script,
            url: format!("{base}/assets/cookieconsent.umd.js"),
            version: LIBRARY_VERSION,
        },
    ]
}
