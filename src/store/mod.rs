// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 The confstore authors

//! Settings store core
//!
//! A [`SettingsStore`] keeps two maps: `registered` (setting name to its
//! declared default) and `stored` (setting name to its explicit value). A
//! strict store only admits registered keys through the public API; a
//! permissive store accepts anything. Explicit values equal to a key's
//! registered default are never kept — they collapse back to absence, so
//! the persisted file stays minimal and later default changes take effect
//! for users who never overrode the key.
//!
//! File-facing operations (`load`, `save`, `reset`) live in [`io`](self).

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::{Map, Value};

use crate::env::Environment;
use crate::error::{ConfigError, Result};

mod io;

/// One settings store per backing file path.
///
/// Every public operation acquires the store's lock, so concurrent callers
/// observe a serialized view of a single store. Composite operations are
/// built on [`StoreState`] methods that run under an already-held lock,
/// which is how a thread avoids deadlocking against itself.
pub struct SettingsStore {
    env: Arc<Environment>,
    filename: PathBuf,
    strict: bool,
    state: Mutex<StoreState>,
}

/// The maps guarded by the store lock.
#[derive(Default)]
struct StoreState {
    registered: Map<String, Value>,
    stored: Map<String, Value>,
}

impl SettingsStore {
    /// Create a store over `filename`. Performs no I/O; both maps start
    /// empty. Relative filenames resolve under the environment's settings
    /// directory at access time.
    pub fn new(env: Arc<Environment>, filename: impl Into<PathBuf>, strict: bool) -> Self {
        Self {
            env,
            filename: filename.into(),
            strict,
            state: Mutex::new(StoreState::default()),
        }
    }

    /// Strict store: only registered keys may be read or written.
    pub fn strict(env: Arc<Environment>, filename: impl Into<PathBuf>) -> Self {
        Self::new(env, filename, true)
    }

    /// Permissive store: any key may be read or written.
    pub fn permissive(env: Arc<Environment>, filename: impl Into<PathBuf>) -> Self {
        Self::new(env, filename, false)
    }

    /// Whether this store gates access on registration.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Declare an allowed key with its default value. Idempotent: repeating
    /// a registration with an equal default is a no-op, while a different
    /// default fails with [`ConfigError::ConflictingDefault`].
    pub fn register(&self, name: &str, default: impl Into<Value>) -> Result<()> {
        self.state().register(name, default.into())
    }

    /// Current value of a setting: the explicit value if one was set, the
    /// registered default otherwise. A strict store fails for unregistered
    /// keys; a permissive store returns `Null` for unknown ones.
    pub fn get(&self, name: &str) -> Result<Value> {
        self.state().get(self.strict, name)
    }

    /// Set a setting. A strict store rejects unregistered keys. Setting a
    /// registered key to its default removes the explicit entry instead.
    /// Purely in-memory until [`save`](Self::save) is called.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.state().set(self.strict, name, value.into())
    }

    /// The registered default for a setting. A strict store fails for
    /// unregistered keys; a permissive store returns `Null`.
    pub fn default_value(&self, name: &str) -> Result<Value> {
        self.state().default_value(self.strict, name)
    }

    /// Drop the explicit value for one setting, so reads fall back to its
    /// registered default. A strict store fails for unregistered keys;
    /// resetting a key with no explicit value is a no-op.
    pub fn reset_setting(&self, name: &str) -> Result<()> {
        self.state().reset_setting(self.strict, name)
    }

    /// Acquire the store lock, recovering from poisoning. A panic in another
    /// thread mid-operation may leave a half-applied mutation behind, but
    /// the maps themselves are always structurally valid.
    fn state(&self) -> MutexGuard<'_, StoreState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("settings store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}

impl StoreState {
    fn register(&mut self, name: &str, default: Value) -> Result<()> {
        match self.registered.get(name) {
            None => {
                self.registered.insert(name.to_string(), default);
                Ok(())
            }
            Some(existing) if *existing == default => Ok(()),
            Some(_) => Err(ConfigError::ConflictingDefault(name.to_string())),
        }
    }

    fn get(&self, strict: bool, name: &str) -> Result<Value> {
        if let Some(value) = self.stored.get(name) {
            return Ok(value.clone());
        }
        if let Some(default) = self.registered.get(name) {
            return Ok(default.clone());
        }
        if strict {
            return Err(ConfigError::UnregisteredRead(name.to_string()));
        }
        Ok(Value::Null)
    }

    fn set(&mut self, strict: bool, name: &str, value: Value) -> Result<()> {
        if strict && !self.registered.contains_key(name) {
            return Err(ConfigError::UnregisteredWrite(name.to_string()));
        }

        match self.registered.get(name) {
            Some(default) if *default == value => {
                self.stored.remove(name);
            }
            _ => {
                self.stored.insert(name.to_string(), value);
            }
        }
        Ok(())
    }

    fn default_value(&self, strict: bool, name: &str) -> Result<Value> {
        if let Some(default) = self.registered.get(name) {
            return Ok(default.clone());
        }
        if strict {
            return Err(ConfigError::UnregisteredRead(name.to_string()));
        }
        Ok(Value::Null)
    }

    fn reset_setting(&mut self, strict: bool, name: &str) -> Result<()> {
        if strict && !self.registered.contains_key(name) {
            return Err(ConfigError::UnregisteredWrite(name.to_string()));
        }
        self.stored.remove(name);
        Ok(())
    }
}
