use std::{env, path::PathBuf};

use costbook_config::{Config, ConfigManager};

use crate::errors::Result;

pub const HOME_ENV: &str = "COSTBOOK_HOME";
const DEFAULT_DIR_NAME: &str = ".costbook";

/// Returns the application data directory, defaulting to `~/.costbook`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Loads the configuration stored under `base`, falling back to defaults.
pub fn load_config(base: PathBuf) -> Result<(ConfigManager, Config)> {
    let manager = ConfigManager::with_base_dir(base)?;
    let config = manager.load()?;
    Ok((manager, config))
}
