// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 The confstore authors

//! Error types for confstore
//!
//! A single error kind, [`ConfigError`], covers every failure the crate can
//! surface: malformed settings files, file system failures, strict-mode
//! access to unregistered keys, and conflicting registrations. A missing
//! settings file is never an error.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for settings operations
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Settings file is not valid JSON
    #[error("error while parsing config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Settings file parsed, but the top level is not a JSON object
    #[error("invalid config file {} format: top level is not a JSON object", path.display())]
    InvalidFormat { path: PathBuf },

    /// File system failure while reading, writing, or deleting a settings file
    #[error("settings file I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// In-memory settings could not be encoded as JSON
    #[error("failed to encode settings for {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Strict-mode read of a setting that was never registered
    #[error("reading unregistered setting {0}")]
    UnregisteredRead(String),

    /// Strict-mode write (or reset) of a setting that was never registered
    #[error("writing unregistered setting {0}")]
    UnregisteredWrite(String),

    /// A setting was registered twice with different default values
    #[error("cannot register setting {0}: another default already registered under this name")]
    ConflictingDefault(String),

    /// The process-wide environment was configured more than once
    #[error("settings environment already configured")]
    AlreadyConfigured,
}

/// Result type alias for settings operations
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unregistered_errors_name_the_setting() {
        let err = ConfigError::UnregisteredRead("god_mode".to_string());
        assert!(err.to_string().contains("god_mode"));

        let err = ConfigError::UnregisteredWrite("god_mode".to_string());
        assert!(err.to_string().contains("god_mode"));
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ConfigError::Parse {
            path: PathBuf::from("/tmp/app.conf"),
            source,
        };
        assert!(err.to_string().contains("app.conf"));
    }

    #[test]
    fn test_conflicting_default_message() {
        let err = ConfigError::ConflictingDefault("theme".to_string());
        assert!(err.to_string().contains("cannot register setting theme"));
    }
}
