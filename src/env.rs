// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 The confstore authors

//! Process-wide bootstrap for confstore
//!
//! Applications configure the crate once at startup, either with
//! [`default_configure`] (derives conventional paths from an application
//! name) or with an explicitly built [`Environment`]. Two lazily constructed
//! global stores hang off that environment: a strict one for user-facing,
//! registered settings and a permissive one for free-form application state
//! such as recent files or window geometry.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use crate::error::{ConfigError, Result};
use crate::store::SettingsStore;

/// Sink for non-fatal warnings, such as an unregistered key found while
/// loading a strict store's file. Applications usually wire this to their
/// logger; the default is to discard.
pub type WarningHook = Arc<dyn Fn(&str) + Send + Sync>;

/// Process-wide settings defaults: the well-known filenames, the directory
/// that relative filenames resolve under, and the optional warning hook.
///
/// The path fields are fixed at construction. The warning hook lives behind
/// its own lock so it can be installed after [`configure`] has run.
pub struct Environment {
    settings_filename: String,
    quick_settings_filename: String,
    settings_dir: PathBuf,
    warning_hook: Mutex<Option<WarningHook>>,
}

impl Environment {
    /// Build an environment from explicit filenames and a settings directory.
    pub fn new(
        settings_filename: impl Into<String>,
        quick_settings_filename: impl Into<String>,
        settings_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            settings_filename: settings_filename.into(),
            quick_settings_filename: quick_settings_filename.into(),
            settings_dir: settings_dir.into(),
            warning_hook: Mutex::new(None),
        }
    }

    /// Derive conventional defaults from an application name:
    /// `<app>.conf`, `<app>.qconf`, and a platform-appropriate per-user
    /// directory (`~/Application Data/<app>` on Windows,
    /// `~/Library/Application Support/<app>` on macOS, `~/.<app>` elsewhere).
    pub fn for_app(app_name: &str) -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));

        let settings_dir = if cfg!(target_os = "windows") {
            home.join("Application Data").join(app_name)
        } else if cfg!(target_os = "macos") {
            home.join("Library").join("Application Support").join(app_name)
        } else {
            home.join(format!(".{app_name}"))
        };

        Self::new(
            format!("{app_name}.conf"),
            format!("{app_name}.qconf"),
            settings_dir,
        )
    }

    /// Default filename for the strict global settings store.
    pub fn settings_filename(&self) -> &str {
        &self.settings_filename
    }

    /// Default filename for the permissive global quick-settings store.
    pub fn quick_settings_filename(&self) -> &str {
        &self.quick_settings_filename
    }

    /// Directory that relative settings filenames resolve under.
    pub fn settings_dir(&self) -> &Path {
        &self.settings_dir
    }

    /// Install a warning sink. Replaces any previously installed hook.
    pub fn set_warning_hook(&self, hook: impl Fn(&str) + Send + Sync + 'static) {
        if let Ok(mut guard) = self.warning_hook.lock() {
            *guard = Some(Arc::new(hook));
        }
    }

    /// Remove the warning sink, returning to the default discard behavior.
    pub fn clear_warning_hook(&self) {
        if let Ok(mut guard) = self.warning_hook.lock() {
            *guard = None;
        }
    }

    /// Report a non-fatal condition through the hook, if one is installed.
    /// The hook slot's lock is released before the hook runs, so a hook may
    /// install or clear hooks itself.
    pub(crate) fn warn(&self, message: &str) {
        let hook = match self.warning_hook.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => None,
        };
        if let Some(hook) = hook {
            hook(message);
        }
    }
}

impl Default for Environment {
    /// Unconfigured environment: empty filenames, current directory.
    fn default() -> Self {
        Self::new("", "", ".")
    }
}

static ENVIRONMENT: OnceLock<Arc<Environment>> = OnceLock::new();
static GLOBAL_SETTINGS: OnceLock<SettingsStore> = OnceLock::new();
static GLOBAL_QUICK_SETTINGS: OnceLock<SettingsStore> = OnceLock::new();

/// Install the process-wide environment. Must run before the first call to
/// [`environment`], [`global_settings`], or [`global_quick_settings`]; a
/// second call fails with [`ConfigError::AlreadyConfigured`].
pub fn configure(env: Environment) -> Result<()> {
    ENVIRONMENT
        .set(Arc::new(env))
        .map_err(|_| ConfigError::AlreadyConfigured)
}

/// Configure the process from an application name using the conventional
/// filenames and directory of [`Environment::for_app`].
pub fn default_configure(app_name: &str) -> Result<()> {
    configure(Environment::for_app(app_name))
}

/// The process-wide environment. Falls back to an unconfigured default if
/// [`configure`] was never called.
pub fn environment() -> Arc<Environment> {
    ENVIRONMENT
        .get_or_init(|| Arc::new(Environment::default()))
        .clone()
}

/// Global store for user-customizable settings. Strict: every key must be
/// registered with a default before it can be read or written.
///
/// Constructed on first access from the environment installed at that moment;
/// reconfiguring afterwards has no effect on it.
pub fn global_settings() -> &'static SettingsStore {
    GLOBAL_SETTINGS.get_or_init(|| {
        let env = environment();
        let filename = env.settings_filename().to_string();
        SettingsStore::strict(env, filename)
    })
}

/// Global store for free-form application state (recent files, window
/// geometry, history). Permissive: no registration required.
pub fn global_quick_settings() -> &'static SettingsStore {
    GLOBAL_QUICK_SETTINGS.get_or_init(|| {
        let env = environment();
        let filename = env.quick_settings_filename().to_string();
        SettingsStore::permissive(env, filename)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_app_derives_filenames() {
        let env = Environment::for_app("myapp");
        assert_eq!(env.settings_filename(), "myapp.conf");
        assert_eq!(env.quick_settings_filename(), "myapp.qconf");

        let dir = env.settings_dir().to_string_lossy().to_string();
        assert!(dir.contains("myapp"));
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    #[test]
    fn test_for_app_uses_dotfile_directory_on_unix() {
        let env = Environment::for_app("myapp");
        let last = env.settings_dir().file_name().unwrap().to_string_lossy();
        assert_eq!(last, ".myapp");
    }

    #[test]
    fn test_warning_hook_replaces_and_clears() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let env = Environment::new("a.conf", "a.qconf", ".");
        // Default hook discards.
        env.warn("dropped");

        let hits = Arc::new(AtomicUsize::new(0));
        let hits_in_hook = hits.clone();
        env.set_warning_hook(move |_| {
            hits_in_hook.fetch_add(1, Ordering::SeqCst);
        });
        env.warn("counted");
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        env.clear_warning_hook();
        env.warn("dropped again");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_hook_may_clear_itself_while_running() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let env = Arc::new(Environment::new("a.conf", "a.qconf", "."));
        let hits = Arc::new(AtomicUsize::new(0));

        // A one-shot hook: mutating the hook slot from inside the hook must
        // not deadlock against the slot's own lock.
        let hits_in_hook = hits.clone();
        let env_in_hook = env.clone();
        env.set_warning_hook(move |_| {
            hits_in_hook.fetch_add(1, Ordering::SeqCst);
            env_in_hook.clear_warning_hook();
        });

        env.warn("fires once");
        env.warn("already cleared");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
