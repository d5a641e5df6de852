use std::ffi::OsString;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::environment::default_library_file_name;
use super::extract::DEFAULT_COPY_BUFFER_SIZE;
use crate::util::{Result, Status};

/// Directory to extract the library into instead of the system temp dir
pub const SHAREDLIB_DIR_ENV: &str = "RUCKSDB_SHAREDLIB_DIR";
/// Copy buffer size in bytes
pub const BUFFER_SIZE_ENV: &str = "RUCKSDB_LOADER_BUFFER_SIZE";

/// Settings for [`NativeLibraryLoader`](super::NativeLibraryLoader)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderOptions {
    /// Resource name of the packaged library
    pub library_file_name: String,
    /// Chunk size used while copying the resource to disk
    pub copy_buffer_size: usize,
    /// Used by `load_library` when the caller passes no directory
    pub target_dir: Option<PathBuf>,
    /// Try the platform's own library search path before extracting
    pub try_system_library_first: bool,
    /// Unlink the extracted file right after a successful load where the
    /// platform allows it (Unix). Otherwise it lives until the library drops.
    pub remove_extracted_after_load: bool,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        LoaderOptions {
            library_file_name: default_library_file_name(),
            copy_buffer_size: DEFAULT_COPY_BUFFER_SIZE,
            target_dir: None,
            try_system_library_first: true,
            remove_extracted_after_load: true,
        }
    }
}

impl LoaderOptions {
    /// Defaults overridden by `RUCKSDB_SHAREDLIB_DIR` and
    /// `RUCKSDB_LOADER_BUFFER_SIZE`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let mut options = LoaderOptions::default();

        if let Some(dir) = lookup(SHAREDLIB_DIR_ENV)
            && !dir.is_empty()
        {
            options.target_dir = Some(PathBuf::from(dir));
        }

        if let Some(raw) = lookup(BUFFER_SIZE_ENV) {
            let size = raw
                .to_str()
                .and_then(|s| s.trim().parse::<usize>().ok())
                .filter(|&n| n > 0)
                .ok_or_else(|| {
                    Status::invalid_argument(format!(
                        "{BUFFER_SIZE_ENV} must be a positive integer, got {raw:?}"
                    ))
                })?;
            options.copy_buffer_size = size;
        }

        Ok(options)
    }
}
