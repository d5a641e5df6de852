//! Lookup of packaged binary resources by name.

use std::collections::HashMap;
use std::env;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

use tracing::debug;

/// Environment variable holding extra resource directories, in the
/// platform's path list syntax
pub const RESOURCE_PATH_ENV: &str = "RUCKSDB_RESOURCE_PATH";

pub type ResourceStream = Box<dyn Read + Send>;

/// Finds a named binary blob in the packaged artifact.
pub trait ResourceProvider: Send + Sync {
    /// Opens the resource, or returns `Ok(None)` if it does not exist.
    fn open(&self, name: &str) -> io::Result<Option<ResourceStream>>;

    /// Human readable description used in error messages
    fn describe(&self) -> String;
}

/// Resources compiled into the binary, typically with `include_bytes!`.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedResources {
    entries: HashMap<String, &'static [u8]>,
}

impl EmbeddedResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, bytes: &'static [u8]) -> Self {
        self.entries.insert(name.into(), bytes);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, bytes: &'static [u8]) {
        self.entries.insert(name.into(), bytes);
    }
}

impl ResourceProvider for EmbeddedResources {
    fn open(&self, name: &str) -> io::Result<Option<ResourceStream>> {
        Ok(self
            .entries
            .get(name)
            .map(|bytes| Box::new(Cursor::new(*bytes)) as ResourceStream))
    }

    fn describe(&self) -> String {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        format!("embedded resources [{}]", names.join(", "))
    }
}

/// Ordered list of directories searched for a resource file, first hit wins.
#[derive(Debug, Clone, Default)]
pub struct ResourceSearchPath {
    dirs: Vec<PathBuf>,
}

impl ResourceSearchPath {
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        ResourceSearchPath {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// Directories from [`RESOURCE_PATH_ENV`], then the directory holding
    /// the running executable.
    pub fn from_env() -> Self {
        let mut dirs: Vec<PathBuf> = env::var_os(RESOURCE_PATH_ENV)
            .map(|paths| env::split_paths(&paths).collect())
            .unwrap_or_default();
        if let Ok(exe) = env::current_exe()
            && let Some(dir) = exe.parent()
        {
            dirs.push(dir.to_path_buf());
        }
        ResourceSearchPath { dirs }
    }

    pub fn push(&mut self, dir: impl Into<PathBuf>) {
        self.dirs.push(dir.into());
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// First existing regular file named `name`
    pub fn find(&self, name: &str) -> Option<PathBuf> {
        // Resource names are plain file names; reject anything that could
        // walk out of the search directories.
        if Path::new(name).components().count() != 1 {
            return None;
        }
        self.dirs.iter().map(|dir| dir.join(name)).find(|p| p.is_file())
    }
}

impl ResourceProvider for ResourceSearchPath {
    fn open(&self, name: &str) -> io::Result<Option<ResourceStream>> {
        match self.find(name) {
            Some(path) => {
                debug!(path = %path.display(), "found resource on search path");
                Ok(Some(Box::new(File::open(path)?)))
            }
            None => Ok(None),
        }
    }

    fn describe(&self) -> String {
        let dirs: Vec<String> = self.dirs.iter().map(|d| d.display().to_string()).collect();
        format!("search path [{}]", dirs.join(", "))
    }
}
