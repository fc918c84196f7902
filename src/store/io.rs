// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 The confstore authors

//! File operations for [`SettingsStore`]: path resolution, load, save with
//! the merge policy for foreign on-disk keys, and reset.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{ConfigError, Result};

use super::SettingsStore;

impl SettingsStore {
    /// The resolved backing path: an absolute filename is used as-is, a
    /// relative one resolves under the environment's settings directory.
    pub fn path(&self) -> PathBuf {
        if self.filename.is_absolute() {
            self.filename.clone()
        } else {
            self.env.settings_dir().join(&self.filename)
        }
    }

    /// Reload settings from the backing file, replacing all explicit values.
    ///
    /// A missing or zero-length file is not an error: the store ends up
    /// empty and every registered key reads as its default. Malformed JSON
    /// or a non-object top level aborts the load with the store left empty,
    /// never partially populated.
    ///
    /// Keys in the file that a strict store never registered are reported
    /// through the environment's warning hook but still admitted, so
    /// settings written by plugins or newer versions survive a load/save
    /// round-trip.
    pub fn load(&self) -> Result<()> {
        let path = self.path();
        let mut unregistered = Vec::new();

        {
            let mut state = self.state();
            state.stored = Map::new();

            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                // Deleted between resolution and read still means "all defaults".
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
                Err(source) => return Err(ConfigError::Io { path, source }),
            };
            if content.is_empty() {
                return Ok(());
            }

            let parsed: Value =
                serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                    path: path.clone(),
                    source,
                })?;
            let Value::Object(settings) = parsed else {
                return Err(ConfigError::InvalidFormat { path });
            };

            for (key, value) in settings {
                if self.strict && !state.registered.contains_key(&key) {
                    let message = format!(
                        "unregistered setting in config file {}: {key}",
                        path.display()
                    );
                    warn!("{message}");
                    unregistered.push(message);
                }
                state.stored.insert(key, value);
            }

            debug!(path = %path.display(), settings = state.stored.len(), "loaded settings");
        }

        // The hook runs with the store unlocked so it can call back into the
        // store (read the offending setting, reset it) without deadlocking.
        for message in &unregistered {
            self.env.warn(message);
        }
        Ok(())
    }

    /// Persist settings, preserving foreign on-disk keys. Equivalent to
    /// `save_with(true)`.
    pub fn save(&self) -> Result<()> {
        self.save_with(true)
    }

    /// Persist settings to the backing file, creating missing parent
    /// directories first.
    ///
    /// Before writing, keys already present on disk but absent from this
    /// store's explicit values are merged back in: a permissive store keeps
    /// all of them, a strict store with `keep_unregistered` keeps only the
    /// unregistered ones (plugin-owned or newer-version keys this instance
    /// never touched). A strict store with `keep_unregistered = false`
    /// overwrites the file with exactly its own values. A missing, empty,
    /// or malformed existing file means there is nothing to preserve.
    pub fn save_with(&self, keep_unregistered: bool) -> Result<()> {
        let path = self.path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let state = self.state();
        let mut settings = state.stored.clone();

        if !self.strict || keep_unregistered {
            if let Some(on_disk) = read_existing_object(&path) {
                for (key, value) in on_disk {
                    if settings.contains_key(&key) {
                        continue;
                    }
                    if self.strict && state.registered.contains_key(&key) {
                        continue;
                    }
                    settings.insert(key, value);
                }
            }
        }

        let content = serde_json::to_string_pretty(&Value::Object(settings)).map_err(
            |source| ConfigError::Encode {
                path: path.clone(),
                source,
            },
        )?;
        fs::write(&path, content).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;

        debug!(path = %path.display(), "saved settings");
        Ok(())
    }

    /// Delete the backing file and clear all explicit values. Registered
    /// defaults are untouched. Immediately durable: no `save` needed. A
    /// file that does not exist is nothing to do, not an error.
    pub fn reset(&self) -> Result<()> {
        let path = self.path();
        let mut state = self.state();

        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => return Err(ConfigError::Io { path, source }),
        }
        state.stored = Map::new();

        debug!(path = %path.display(), "reset settings");
        Ok(())
    }
}

/// Best-effort read of the current on-disk settings object for merging.
/// Anything unreadable or non-object counts as "no foreign data".
fn read_existing_object(path: &Path) -> Option<Map<String, Value>> {
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}
