//! System-wide constants and default paths.

use std::path::PathBuf;
use std::sync::OnceLock;

/// Application name used in log output and state files.
pub const APP_NAME: &str = "dctop";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "dctop";

/// Number of leading characters shown for a container ID.
pub const SHORT_ID_LENGTH: usize = 12;

/// Fallback data directory when no home directory is available.
pub const SYSTEM_DATA_DIR: &str = "/var/lib/dctop";

/// Returns the data directory, preferring `$HOME/.dctop` and falling
/// back to `/var/lib/dctop`.
fn resolve_data_dir() -> PathBuf {
    if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
        let user_dir = PathBuf::from(home).join(".dctop");
        if std::fs::create_dir_all(&user_dir).is_ok() {
            return user_dir;
        }
    }
    PathBuf::from(SYSTEM_DATA_DIR)
}

static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Returns the resolved data directory for this session.
pub fn data_dir() -> &'static PathBuf {
    DATA_DIR.get_or_init(resolve_data_dir)
}

/// Returns the default log file path.
///
/// The dashboard owns the terminal, so diagnostics never go to stdout.
pub fn default_log_file() -> PathBuf {
    data_dir().join("dctop.log")
}

/// Returns the default configuration file path.
pub fn default_config_file() -> PathBuf {
    data_dir().join("config.json")
}
