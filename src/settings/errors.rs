use std::path::PathBuf;

use thiserror::Error;

/// Errors that may occur while loading, saving or validating render settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a settings file.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Failed to write a settings file.
    #[error("Failed to write {path}: {source}")]
    Write {
        /// Path that failed to write.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Failed to parse TOML settings.
    #[error("Invalid settings: {source}")]
    ParseToml {
        /// TOML parse error.
        #[from]
        source: toml::de::Error,
    },
    /// Failed to parse a TOML settings file.
    #[error("Invalid settings at {path}: {source}")]
    ParseTomlFile {
        /// TOML file path.
        path: PathBuf,
        /// TOML parse error.
        source: toml::de::Error,
    },
    /// Failed to serialize settings to TOML.
    #[error("Failed to serialize settings to TOML: {0}")]
    SerializeToml(#[from] toml::ser::Error),
    /// A setting holds a value the renderers cannot use.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Dotted name of the offending setting.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}
