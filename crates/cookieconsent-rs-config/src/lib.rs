//! Cookie consent banner configuration.
//!
//! Holds the default banner configuration, merges per-site administrator
//! overrides onto it, normalizes submitted values and serializes the result
//! for the front-end library. Bracket-notation field names address single
//! leaves of the nested tree.

mod defaults;
mod error;
mod fields;
mod form;
mod merge;
mod sanitize;
mod service;
mod settings;
mod store;
mod value;

pub mod emit;
pub mod path;

/// Public error types returned by storage, binding and settings APIs.
pub use error::{ConfigError, PathError};
/// Configuration values and trees.
pub use value::{ConfigTree, ConfigValue, EMPTY, tree_from_json, tree_to_json};
/// Bracket-notation paths.
pub use path::Path;
/// Distinct deep merge.
pub use merge::merge_distinct;
/// Leaf normalization of submitted trees.
pub use sanitize::{PlainTextSanitizer, TextSanitizer, parse_numeric, sanitize_tree, sanitize_value};
/// Built-in defaults.
pub use defaults::{SiteContext, default_config, esc_url};
/// Admin field catalog.
pub use fields::{FieldKind, FieldSection, SettingsField, catalog, field_by_name, field_value};
pub use form::FormSubmission;
/// Settings persistence.
pub use store::{
    FileSettingsStore, MemorySettingsStore, OPTION_NAME, SettingsStore, SiteId, uninstall,
};
pub use service::ConsentService;
/// Host settings file.
pub use settings::{
    DEFAULT_SETTINGS_DIR, DEFAULT_SETTINGS_FILE, HostSettings, default_settings_path,
    default_store_root,
};
