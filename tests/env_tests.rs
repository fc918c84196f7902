// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 The confstore authors

//! Bootstrap and global-singleton tests. Globals are process-wide, so
//! everything touching them lives in one test function.

use confstore::{configure, default_configure, environment, global_quick_settings,
    global_settings, ConfigError, Environment};
use serde_json::json;

#[test]
fn test_configure_once_and_global_stores() {
    // First configuration wins.
    default_configure("confstore-test").unwrap();
    let err = configure(Environment::new("other.conf", "other.qconf", ".")).unwrap_err();
    assert!(matches!(err, ConfigError::AlreadyConfigured));

    let env = environment();
    assert_eq!(env.settings_filename(), "confstore-test.conf");
    assert_eq!(env.quick_settings_filename(), "confstore-test.qconf");

    // The strict global gates on registration; no I/O happens here.
    let settings = global_settings();
    assert!(settings.is_strict());
    assert!(matches!(
        settings.get("never_registered").unwrap_err(),
        ConfigError::UnregisteredRead(_)
    ));
    settings.register("god_mode", false).unwrap();
    assert_eq!(settings.get("god_mode").unwrap(), json!(false));

    // The quick-settings global accepts anything.
    let quick = global_quick_settings();
    assert!(!quick.is_strict());
    quick.set("recent_files", json!(["notes.txt"])).unwrap();
    assert_eq!(quick.get("recent_files").unwrap(), json!(["notes.txt"]));

    // Accessors hand back the same instances.
    assert!(std::ptr::eq(settings, global_settings()));
    assert!(std::ptr::eq(quick, global_quick_settings()));

    // Both resolve their files under the environment's directory.
    assert!(settings.path().ends_with("confstore-test.conf"));
    assert!(quick.path().ends_with("confstore-test.qconf"));
}
