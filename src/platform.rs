//! Cross-platform path resolution.
//!
//! Locations follow the platform conventions exposed by `dirs`, falling
//! back to the current directory when none can be determined.

use std::path::PathBuf;

/// Directory name of the advisory database checkout.
const ADVISORY_DB_DIR: &str = "ruby-advisory-db";

/// Returns the default advisory database location.
///
/// Platform-specific locations:
/// - Linux: `~/.local/share/ruby-advisory-db/`
/// - macOS: `~/Library/Application Support/ruby-advisory-db/`
/// - Windows: `%APPDATA%\ruby-advisory-db\`
pub fn advisory_db_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(ADVISORY_DB_DIR)
}

/// Returns the directory holding `config.toml`.
///
/// Platform-specific locations:
/// - Linux: `~/.config/gemaudit/`
/// - macOS: `~/Library/Application Support/gemaudit/`
/// - Windows: `%APPDATA%\gemaudit\`
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gemaudit")
}
