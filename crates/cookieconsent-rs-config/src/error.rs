//! Error types for settings storage, field binding and host settings.

use thiserror::Error;

/// A bracket-notation field name that could not be parsed strictly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed field name {input:?} at byte {offset}: {reason}")]
pub struct PathError {
    /// The raw field name.
    pub input: String,
    /// Byte offset of the first offending character.
    pub offset: usize,
    /// Short description of what was expected.
    pub reason: &'static str,
}

/// Errors returned while loading, storing or binding configuration.
///
/// The merge, path and sanitize operations themselves never fail; these
/// errors come from the layers around them.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing a settings file failed.
    #[error("failed to read config: {0}")]
    ReadFailed(#[from] std::io::Error),
    /// Parsing a settings file failed.
    #[error("failed to parse config: {0}")]
    ParseFailed(#[from] json5::Error),
    /// Converting JSON values failed.
    #[error("failed to decode config: {0}")]
    DecodeFailed(#[from] serde_json::Error),
    /// A field name was not well-formed bracket notation.
    #[error(transparent)]
    InvalidPath(#[from] PathError),
    /// A specific field failed validation.
    #[error("invalid config at {path}: {message}")]
    InvalidField { path: String, message: String },
    /// Generic validation failure.
    #[error("invalid config: {0}")]
    Invalid(String),
}
