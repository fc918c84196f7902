// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 The confstore authors

//! confstore - process-local, file-backed application settings.
//!
//! Settings live in a single JSON object per file. A [`SettingsStore`] can
//! run in strict mode, where every key must be registered with a default
//! value before use, or permissive mode for free-form state. Explicit values
//! equal to a registered default are not persisted, so changing a default in
//! a later release takes effect for everyone who never overrode it.
//!
//! Typical application wiring:
//!
//! ```no_run
//! use confstore::{default_configure, environment, global_settings};
//!
//! // Once, during startup.
//! default_configure("myapp")?;
//! environment().set_warning_hook(|message| tracing::warn!("{message}"));
//!
//! // Declare the settings the application understands.
//! let settings = global_settings();
//! settings.register("god_mode", false)?;
//! settings.load()?;
//!
//! // Read, write, persist.
//! let god_mode = settings.get("god_mode")?.as_bool().unwrap_or(false);
//! settings.set("god_mode", !god_mode)?;
//! settings.save()?;
//! # Ok::<(), confstore::ConfigError>(())
//! ```
//!
//! Each store serializes its operations behind one lock, so sharing the
//! global stores across threads is safe. There is no cross-process
//! coordination: two processes writing the same file race, last writer wins.

pub mod env;
pub mod error;
pub mod store;

pub use env::{
    configure, default_configure, environment, global_quick_settings, global_settings,
    Environment, WarningHook,
};
pub use error::{ConfigError, Result};
pub use store::SettingsStore;
