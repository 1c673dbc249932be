//! Decoding of settings-form submissions into a raw override tree.

use crate::ConfigError;
use crate::fields::{FieldKind, SettingsField};
use crate::path::{self, Path};
use crate::store::OPTION_NAME;
use crate::value::{ConfigTree, ConfigValue};
use log::debug;

/// Submitted `(name, value)` pairs, already URL-decoded.
///
/// Names are rooted at the option name, e.g.
/// `wp_cookieconsent_options[guiOptions][consentModal][layout]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSubmission {
    entries: Vec<(Path, String)>,
}

impl FormSubmission {
    /// Parse submitted pairs. Pairs outside the option root are skipped
    /// unparsed; malformed names under the root are rejected.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut entries = Vec::new();
        for (name, value) in pairs {
            let name = name.as_ref();
            if !is_option_field(name) {
                debug!("ignoring form field outside {OPTION_NAME}: {name}");
                continue;
            }
            let path = Path::parse_field_name(name)?;
            let Some(field_path) = path.tail() else {
                return Err(ConfigError::InvalidField {
                    path: name.to_string(),
                    message: "expected at least one key inside the option".to_string(),
                });
            };
            entries.push((field_path, value.into()));
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build the raw (unsanitized) override tree.
    ///
    /// Checkboxes in `fields` that were not submitted are written as `"0"`
    /// so an unchecked box persists as `false`. Later pairs win over
    /// earlier ones with the same name.
    pub fn into_tree(self, fields: &[SettingsField]) -> ConfigTree {
        let mut tree = ConfigTree::new();
        for field in fields.iter().filter(|field| field.kind == FieldKind::Checkbox) {
            let path = field.path();
            if !self.entries.iter().any(|(submitted, _)| submitted == &path) {
                path::write(&mut tree, &path, ConfigValue::from("0"));
            }
        }
        for (path, value) in self.entries {
            path::write(&mut tree, &path, ConfigValue::Text(value));
        }
        tree
    }
}

fn is_option_field(name: &str) -> bool {
    match name.strip_prefix(OPTION_NAME) {
        Some(rest) => rest.is_empty() || rest.starts_with('['),
        None => false,
    }
}
