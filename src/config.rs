//! Compiled-in settings. The application takes no flags, environment
//! variables or configuration files; everything it needs is fixed here.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
pub const DATA_DIR_NAME: &str = ".contact-manager";
/// SQLite file stored inside the data directory.
pub const DB_FILE_NAME: &str = "contacts.sqlite";
/// Append-only log file next to the database.
pub const LOG_FILE_NAME: &str = "contact-manager.log";
/// `tracing_subscriber::EnvFilter` directive applied to the log file.
pub const LOG_FILTER: &str = "info";

/// Resolved on-disk locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub log_path: PathBuf,
}

impl AppPaths {
    /// Locate the data directory inside the user's home.
    pub fn resolve() -> Result<Self> {
        let base_dirs =
            BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
        Ok(Self::under(base_dirs.home_dir().to_path_buf()))
    }

    fn under(home: PathBuf) -> Self {
        let data_dir = home.join(DATA_DIR_NAME);
        Self {
            db_path: data_dir.join(DB_FILE_NAME),
            log_path: data_dir.join(LOG_FILE_NAME),
            data_dir,
        }
    }
}
