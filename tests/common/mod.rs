#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use costbook::PaymentDesk;
use costbook_config::{Config, ConfigManager};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates a unique home directory that outlives the calling test.
pub fn temp_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Opens a JSON-backed desk in an isolated home directory.
pub fn setup_test_env() -> (PaymentDesk, PathBuf) {
    let home = temp_home();
    let desk = PaymentDesk::open(home.clone()).expect("open payment desk");
    (desk, home)
}

/// Writes `config` into `home` before a desk is opened there.
pub fn write_config(home: &Path, config: &Config) {
    ConfigManager::with_base_dir(home.to_path_buf())
        .expect("create config manager")
        .save(config)
        .expect("save config");
}
