use dirs::home_dir;
use std::{
    env,
    path::{Path, PathBuf},
};

pub const HOME_ENV: &str = "POCKET_LEDGER_HOME";

const DEFAULT_DIR_NAME: &str = ".pocket_ledger";
const CONFIG_FILE: &str = "config.json";
const REPORTS_DIR: &str = "reports";

/// Returns the application data directory, defaulting to `~/.pocket_ledger`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

pub fn config_file_in(base: &Path) -> PathBuf {
    base.join(CONFIG_FILE)
}

/// Directory that exported report payloads are written into.
pub fn reports_dir_in(base: &Path) -> PathBuf {
    base.join(REPORTS_DIR)
}
