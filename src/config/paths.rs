//! Where `settings.toml` lives when no `--config` is given.
//!
//!   Windows: %APPDATA%\vocab-cards\settings.toml
//!   macOS:   ~/Library/Application Support/vocab-cards/settings.toml
//!   Linux:   ~/.config/vocab-cards/settings.toml

use std::path::PathBuf;

const APP_DIR: &str = "vocab-cards";
const SETTINGS_FILE: &str = "settings.toml";

/// Default settings file, anchored at the working directory when the
/// platform reports no config directory.
pub fn settings_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(SETTINGS_FILE)
}
