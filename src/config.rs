/// Runtime configuration
///
/// Resolves where the database lives and where macOS keeps its shared file
/// lists. Everything has a default under the home directory; environment
/// variables override it.

use crate::error::{RecentsError, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Every registry command this tool owns starts with this prefix
pub const COMMAND_PREFIX: &str = "recents-";

/// Code of the settings entry point
pub const SETTINGS_CODE: &str = "recents-setting";

/// Overrides the database directory (default `~/.recents`)
pub const DATA_DIR_ENV: &str = "RECENTS_DATA_DIR";

/// Overrides the shared file list directory
pub const SHARED_FILE_LIST_ENV: &str = "RECENTS_SHARED_FILE_LIST_DIR";

const DB_FILE_NAME: &str = "recents.db";
const APP_RECENTS_SUBDIR: &str = "com.apple.LSSharedFileList.ApplicationRecentDocuments";

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub shared_file_list_dir: PathBuf,
}

impl Config {
    /// Build the configuration from the home directory and environment
    pub fn from_env() -> Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| {
            RecentsError::Config("Could not determine home directory".to_string())
        })?;

        let data_dir = env::var_os(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(".recents"));

        let shared_file_list_dir = env::var_os(SHARED_FILE_LIST_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                home.join("Library")
                    .join("Application Support")
                    .join("com.apple.sharedfilelist")
            });

        Ok(Self {
            data_dir,
            shared_file_list_dir,
        })
    }

    /// Config rooted somewhere else entirely, mostly for tests
    pub fn with_dirs<P: AsRef<Path>, Q: AsRef<Path>>(data_dir: P, shared_file_list_dir: Q) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            shared_file_list_dir: shared_file_list_dir.as_ref().to_path_buf(),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    /// Directory holding one recent-documents list per application
    pub fn app_recents_dir(&self) -> PathBuf {
        self.shared_file_list_dir.join(APP_RECENTS_SUBDIR)
    }
}
