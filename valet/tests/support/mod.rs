//! Shared helpers for live-database integration tests.

use std::ffi::OsString;

use ortho_config::OrthoConfig;
use valet::config::StoreSettings;

/// Load store settings from the environment, or `None` when the `DB_*`
/// variables are not provided and the suite should skip.
pub fn live_settings() -> Option<StoreSettings> {
    StoreSettings::load_from_iter([OsString::from("valet-tests")]).ok()
}

/// A table name unique to one test run, so suites can run concurrently
/// against a shared database.
pub fn unique_table_name() -> String {
    format!("valet_test_{}", uuid::Uuid::new_v4().simple())
}
