//! Host settings for the command-line front end.
//!
//! A small JSON5 file that tells the host where overrides live and which
//! privacy page the default texts should link:
//!
//! ```json5
//! {
//!   store_root: "/var/lib/cookieconsent",
//!   privacy_policy_url: "https://example.com/privacy",
//!   default_site: "1",
//! }
//! ```

use crate::ConfigError;
use crate::defaults::SiteContext;
use crate::store::SiteId;
use directories::UserDirs;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory under the user's home holding settings and the store.
pub const DEFAULT_SETTINGS_DIR: &str = ".cookieconsent";
/// Settings filename inside [`DEFAULT_SETTINGS_DIR`].
pub const DEFAULT_SETTINGS_FILE: &str = "settings.json5";
/// Store directory inside [`DEFAULT_SETTINGS_DIR`].
const DEFAULT_STORE_DIR: &str = "store";

const ALLOWED_KEYS: &[&str] = &["$schema", "store_root", "privacy_policy_url", "default_site"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSettings {
    /// Root of the file-backed settings store.
    #[serde(default)]
    pub store_root: Option<PathBuf>,
    #[serde(default)]
    pub privacy_policy_url: Option<String>,
    /// Site used when none is given on the command line.
    #[serde(default)]
    pub default_site: SiteId,
}

impl HostSettings {
    /// Load and validate a settings file.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        debug!("loading host settings (path={})", path.display());
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents, &path.display().to_string())
    }

    /// Load the settings file at the default location, falling back to
    /// defaults when it does not exist.
    pub fn load_default() -> Result<Self, ConfigError> {
        match default_settings_path() {
            Some(path) if path.exists() => Self::load_from_path(&path),
            Some(path) => {
                debug!("host settings missing (path={})", path.display());
                Ok(Self::default())
            }
            None => {
                debug!("no home directory; using default host settings");
                Ok(Self::default())
            }
        }
    }

    /// Parse settings from a JSON5 string.
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        Self::parse(contents, "inline")
    }

    fn parse(contents: &str, label: &str) -> Result<Self, ConfigError> {
        let value: Value = json5::from_str(contents)?;
        validate_schema(&value, label)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Store root from the file, or `~/.cookieconsent/store`.
    pub fn resolved_store_root(&self) -> Result<PathBuf, ConfigError> {
        if let Some(root) = &self.store_root {
            return Ok(root.clone());
        }
        default_store_root()
            .ok_or_else(|| ConfigError::Invalid("cannot resolve home directory".to_string()))
    }

    /// Site facts used to build the default tree.
    pub fn site_context(&self) -> SiteContext {
        SiteContext {
            privacy_policy_url: self.privacy_policy_url.clone(),
        }
    }
}

/// `~/.cookieconsent/settings.json5`, when a home directory is known.
pub fn default_settings_path() -> Option<PathBuf> {
    settings_dir().map(|dir| dir.join(DEFAULT_SETTINGS_FILE))
}

/// `~/.cookieconsent/store`, when a home directory is known.
pub fn default_store_root() -> Option<PathBuf> {
    settings_dir().map(|dir| dir.join(DEFAULT_STORE_DIR))
}

fn settings_dir() -> Option<PathBuf> {
    UserDirs::new().map(|dirs| dirs.home_dir().join(DEFAULT_SETTINGS_DIR))
}

fn validate_schema(value: &Value, label: &str) -> Result<(), ConfigError> {
    let Value::Object(map) = value else {
        return Err(invalid_field(label, "", "expected object"));
    };
    ensure_allowed_keys(map, label)?;
    for key in ["$schema", "store_root", "privacy_policy_url", "default_site"] {
        if let Some(value) = map.get(key) {
            expect_string(value, label, key)?;
        }
    }
    Ok(())
}

fn ensure_allowed_keys(map: &Map<String, Value>, label: &str) -> Result<(), ConfigError> {
    match map.keys().find(|key| !ALLOWED_KEYS.contains(&key.as_str())) {
        Some(key) => Err(invalid_field(label, key, "unknown key")),
        None => Ok(()),
    }
}

fn expect_string(value: &Value, label: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_string() {
        Ok(())
    } else {
        Err(invalid_field(label, path, "expected string"))
    }
}

fn invalid_field(label: &str, path: &str, message: &str) -> ConfigError {
    let path = if path.is_empty() { "root" } else { path };
    ConfigError::InvalidField {
        path: format!("{label}:{path}"),
        message: message.to_string(),
    }
}
