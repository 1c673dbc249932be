//! Built-in default configuration for the consent banner.

use crate::value::{ConfigTree, ConfigValue};
use log::debug;
use serde::{Deserialize, Serialize};

/// URL schemes accepted for links embedded in banner text.
const ALLOWED_SCHEMES: &[&str] = &["http", "https", "mailto", "ftp", "ftps", "tel"];

/// Per-site facts the default texts depend on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteContext {
    /// Privacy policy page, linked from the banner when set.
    #[serde(default)]
    pub privacy_policy_url: Option<String>,
}

impl SiteContext {
    pub fn with_privacy_policy_url(url: impl Into<String>) -> Self {
        Self {
            privacy_policy_url: Some(url.into()),
        }
    }
}

macro_rules! tree {
    ($($key:literal => $value:expr),* $(,)?) => {
        ConfigTree::from_iter([$(($key.to_string(), ConfigValue::from($value))),*])
    };
}

/// Build the default configuration tree for a site.
pub fn default_config(site: &SiteContext) -> ConfigTree {
    let privacy_url = site.privacy_policy_url.as_deref().and_then(esc_url);
    if site.privacy_policy_url.is_some() && privacy_url.is_none() {
        debug!("privacy policy url rejected; banner texts will not link it");
    }

    let footer = match &privacy_url {
        Some(url) => format!("<a href=\"{url}\">Privacy Policy</a>"),
        None => String::new(),
    };
    let more_information = match &privacy_url {
        Some(url) => format!(
            "For any queries in relation to our policy on cookies and your choices, please <a href=\"{url}\">contact us</a>."
        ),
        None => "For any queries in relation to our policy on cookies and your choices, please contact us.".to_string(),
    };

    tree! {
        "mode" => "opt-in",
        "autoShow" => true,
        "revision" => 0_i64,
        "manageScriptTags" => true,
        "autoClearCookies" => true,
        "hideFromBots" => true,
        "disablePageInteraction" => false,
        "guiOptions" => tree! {
            "consentModal" => tree! {
                "layout" => "box",
                "position" => "bottom right",
                "flipButtons" => false,
                "equalWeightButtons" => true,
            },
            "preferencesModal" => tree! {
                "layout" => "box",
                "position" => "right",
                "flipButtons" => false,
                "equalWeightButtons" => true,
            },
        },
        "categories" => tree! {
            "necessary" => tree! { "enabled" => true, "readOnly" => true },
            "analytics" => tree! { "enabled" => false, "readOnly" => false },
            "marketing" => tree! { "enabled" => false, "readOnly" => false },
        },
        "language" => tree! {
            "default" => "en",
            "translations" => tree! {
                "en" => tree! {
                    "consentModal" => tree! {
                        "title" => "We use cookies",
                        "description" => "This website uses cookies to ensure you get the best experience on our website.",
                        "acceptAllBtn" => "Accept all",
                        "acceptNecessaryBtn" => "Reject all",
                        "showPreferencesBtn" => "Manage preferences",
                        "footer" => footer,
                    },
                    "preferencesModal" => tree! {
                        "title" => "Cookie preferences",
                        "acceptAllBtn" => "Accept all",
                        "acceptNecessaryBtn" => "Reject all",
                        "savePreferencesBtn" => "Save preferences",
                        "closeIconLabel" => "Close",
                        "serviceCounterLabel" => "Service|Services",
                        "sections" => preference_sections(more_information),
                    },
                },
            },
        },
    }
}

fn preference_sections(more_information: String) -> Vec<ConfigValue> {
    vec![
        ConfigValue::from(tree! {
            "title" => "Cookie Usage",
            "description" => "We use cookies to enhance your browsing experience, serve personalized content, and analyze our traffic. By clicking \"Accept All\", you consent to our use of cookies.",
        }),
        ConfigValue::from(tree! {
            "title" => "Strictly Necessary Cookies",
            "description" => "These cookies are essential for the proper functioning of the website and cannot be disabled.",
            "linkedCategory" => "necessary",
        }),
        ConfigValue::from(tree! {
            "title" => "Analytics Cookies",
            "description" => "These cookies help us understand how visitors interact with our website by collecting and reporting information anonymously.",
            "linkedCategory" => "analytics",
        }),
        ConfigValue::from(tree! {
            "title" => "Marketing Cookies",
            "description" => "These cookies are used to track visitors across websites to display relevant advertisements.",
            "linkedCategory" => "marketing",
        }),
        ConfigValue::from(tree! {
            "title" => "More information",
            "description" => more_information,
        }),
    ]
}

/// Clean a URL for embedding in an HTML attribute.
///
/// Unsafe ASCII (including `"`, `<`, `>` and spaces) is stripped; `&` and
/// `'` are entity-encoded. Returns `None` for empty input and for schemes
/// outside the allowlist.
pub fn esc_url(url: &str) -> Option<String> {
    let cleaned: String = url
        .trim()
        .chars()
        .filter(|ch| !ch.is_ascii() || is_url_char(*ch))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    let cleaned = cleaned.replace(";//", "://");

    let cleaned = match scheme_of(&cleaned) {
        Some(scheme) => {
            let scheme = scheme.to_ascii_lowercase();
            if !ALLOWED_SCHEMES.contains(&scheme.as_str()) {
                return None;
            }
            cleaned
        }
        None if cleaned.starts_with(['/', '#', '?']) => cleaned,
        None => format!("http://{cleaned}"),
    };

    Some(cleaned.replace('&', "&#038;").replace('\'', "&#039;"))
}

fn is_url_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || "-~+_.?#=!&;,/:%@$|*'()[]".contains(ch)
}

fn scheme_of(url: &str) -> Option<&str> {
    let (scheme, _) = url.split_once(':')?;
    let valid = !scheme.is_empty()
        && scheme
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '+' | '-' | '.'));
    valid.then_some(scheme)
}
