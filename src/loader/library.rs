use std::fmt;
use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};
use tempfile::TempPath;

use crate::util::{Result, Status};

/// Where a loaded library came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibrarySource {
    /// Found by the platform loader on its own search path
    System,
    /// Extracted from a packaged resource
    Extracted { size: u64, crc32: u32 },
}

/// A native library mapped into this process.
///
/// Dropping it unloads the library and then removes the extracted file if it
/// is still on disk. The global loader never drops its instance, so for the
/// process-wide library both happen at exit at the earliest.
pub struct LoadedLibrary {
    // Field order matters: unload before the backing file goes away.
    library: Library,
    path: PathBuf,
    source: LibrarySource,
    extracted: Option<TempPath>,
}

impl LoadedLibrary {
    pub(crate) fn new(
        library: Library,
        path: PathBuf,
        source: LibrarySource,
        extracted: Option<TempPath>,
    ) -> Self {
        LoadedLibrary {
            library,
            path,
            source,
            extracted,
        }
    }

    /// Path the library was loaded from. For extracted libraries on Unix the
    /// file may already be unlinked.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> &LibrarySource {
        &self.source
    }

    /// Whether the extracted file is still kept on disk by this library
    pub fn retains_extracted_file(&self) -> bool {
        self.extracted.is_some()
    }

    pub fn has_symbol(&self, name: &str) -> bool {
        // A pointer-sized probe is sound for any exported symbol as long as
        // it is never dereferenced.
        unsafe { self.library.get::<*const std::ffi::c_void>(name.as_bytes()) }.is_ok()
    }

    /// Looks up an exported symbol.
    ///
    /// # Safety
    ///
    /// `T` must match the actual type of the exported symbol.
    pub unsafe fn get<T>(&self, name: &str) -> Result<Symbol<'_, T>> {
        unsafe { self.library.get::<T>(name.as_bytes()) }
            .map_err(|e| Status::not_found(format!("symbol {name} in {}: {e}", self.path.display())))
    }
}

impl fmt::Debug for LoadedLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedLibrary")
            .field("path", &self.path)
            .field("source", &self.source)
            .field("retains_extracted_file", &self.extracted.is_some())
            .finish()
    }
}
