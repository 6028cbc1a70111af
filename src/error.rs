//! Error types for slirc-ignore.
//!
//! The decision and command surfaces never fail on misuse (blank input, bad
//! patterns); the only fallible public operations are loading and writing
//! the persisted configuration document.

use thiserror::Error;

/// Errors from loading or writing the ignore configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl ConfigError {
    /// Static error code for structured logging labels.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Parse(_) => "parse",
            Self::Serialize(_) => "serialize",
        }
    }
}
