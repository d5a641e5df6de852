//! One-shot bootstrap of the engine's native library.
//!
//! The loader finds the packaged library, writes it to a uniquely named file,
//! loads it into the process and removes the file again. Loading is process
//! state that cannot be undone, so each loader runs that sequence at most
//! once: the first outcome, success or failure, is remembered and returned
//! to every later caller.
//!
//! ```text
//! resource lookup ─► unique file ─► copy (100 KiB chunks) ─► dlopen ─► unlink
//!        │                │               │                    │
//!        ▼                ▼               ▼                    ▼
//!    NotFound          IOError      IOError (file removed)   LoadError (file removed)
//! ```
pub mod environment;
mod extract;
pub mod library;
pub mod options;
pub mod resource;

use std::env;
use std::ffi::OsString;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use libloading::Library;
use tracing::{debug, info, warn};

pub use extract::DEFAULT_COPY_BUFFER_SIZE;
pub use library::{LibrarySource, LoadedLibrary};
pub use options::LoaderOptions;
pub use resource::{EmbeddedResources, ResourceProvider, ResourceSearchPath};

use crate::util::{Result, Status};

static GLOBAL_LOADER: OnceLock<NativeLibraryLoader> = OnceLock::new();

pub struct NativeLibraryLoader {
    options: LoaderOptions,
    resources: Arc<dyn ResourceProvider>,
    loaded: OnceLock<Result<Arc<LoadedLibrary>>>,
}

impl NativeLibraryLoader {
    pub fn new(options: LoaderOptions, resources: Arc<dyn ResourceProvider>) -> Self {
        NativeLibraryLoader {
            options,
            resources,
            loaded: OnceLock::new(),
        }
    }

    /// Builds a loader from environment variables read through `lookup`.
    ///
    /// An invalid environment does not fail here: the error becomes the
    /// loader's recorded outcome and every load call returns it.
    pub fn from_lookup<F>(lookup: F, resources: Arc<dyn ResourceProvider>) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        match LoaderOptions::from_lookup(lookup) {
            Ok(options) => NativeLibraryLoader::new(options, resources),
            Err(e) => {
                warn!(error = %e, "invalid loader environment");
                NativeLibraryLoader {
                    options: LoaderOptions::default(),
                    resources,
                    loaded: OnceLock::from(Err(e)),
                }
            }
        }
    }

    /// The process-wide loader, built from the environment on first use
    /// unless one was installed with [`install_global`].
    ///
    /// [`install_global`]: NativeLibraryLoader::install_global
    pub fn global() -> &'static NativeLibraryLoader {
        GLOBAL_LOADER.get_or_init(|| {
            NativeLibraryLoader::from_lookup(
                |key| env::var_os(key),
                Arc::new(ResourceSearchPath::from_env()),
            )
        })
    }

    /// Installs `loader` as the process-wide loader. Fails once
    /// [`global`](NativeLibraryLoader::global) has been initialized.
    pub fn install_global(loader: NativeLibraryLoader) -> Result<()> {
        GLOBAL_LOADER
            .set(loader)
            .map_err(|_| Status::invalid_argument("global native library loader already initialized"))
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    /// Outcome of the first load attempt, if one has run
    pub fn loaded(&self) -> Option<&Result<Arc<LoadedLibrary>>> {
        self.loaded.get()
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.loaded.get(), Some(Ok(_)))
    }

    /// Loads the library from the system search path if configured to and
    /// possible, falling back to extracting the packaged copy.
    ///
    /// `target_dir` overrides [`LoaderOptions::target_dir`].
    pub fn load_library(&self, target_dir: Option<&Path>) -> Result<Arc<LoadedLibrary>> {
        self.loaded
            .get_or_init(|| {
                if self.options.try_system_library_first
                    && let Some(library) = self.load_system_library()
                {
                    return Ok(Arc::new(library));
                }
                let dir = target_dir.or(self.options.target_dir.as_deref());
                self.extract_and_load(dir).map(Arc::new)
            })
            .clone()
    }

    /// Extracts the packaged library into `target_dir` (or the system temp
    /// dir) and loads it. Runs at most once per loader.
    pub fn load_library_from_archive(&self, target_dir: Option<&Path>) -> Result<Arc<LoadedLibrary>> {
        self.loaded
            .get_or_init(|| self.extract_and_load(target_dir).map(Arc::new))
            .clone()
    }

    fn load_system_library(&self) -> Option<LoadedLibrary> {
        let name = environment::Platform::current().shared_library_name(environment::LIBRARY_BASE_NAME);
        // SAFETY: running the engine library's initializers is the point of
        // loading it.
        match unsafe { Library::new(&name) } {
            Ok(library) => {
                info!(library = %name, "loaded native library from system path");
                Some(LoadedLibrary::new(library, name.into(), LibrarySource::System, None))
            }
            Err(e) => {
                debug!(library = %name, error = %e, "system library unavailable, extracting packaged copy");
                None
            }
        }
    }

    fn extract_and_load(&self, target_dir: Option<&Path>) -> Result<LoadedLibrary> {
        let name = self.options.library_file_name.as_str();
        extract::check_file_name(name)?;

        // Look the resource up before touching the filesystem so a missing
        // resource never leaves a file behind.
        let mut resource = self
            .resources
            .open(name)
            .map_err(|e| Status::io_error(format!("opening resource {name}: {e}")))?
            .ok_or_else(|| {
                Status::not_found(format!("{name} was not found in {}", self.resources.describe()))
            })?;

        let extracted = extract::extract_to_file(
            &mut resource,
            name,
            target_dir,
            self.options.copy_buffer_size,
        )?;
        drop(resource);

        let path = extracted.path.to_path_buf();
        // SAFETY: as above; the file was written from the packaged resource.
        let library = unsafe { Library::new(&path) }.map_err(Status::from)?;

        info!(
            path = %path.display(),
            size = extracted.size,
            crc32 = %format!("{:08x}", extracted.crc32),
            "loaded native library"
        );

        let source = LibrarySource::Extracted {
            size: extracted.size,
            crc32: extracted.crc32,
        };
        let retained = if self.options.remove_extracted_after_load && cfg!(unix) {
            // The mapping outlives the directory entry on Unix.
            if let Err(e) = extracted.path.close() {
                warn!(path = %path.display(), error = %e, "failed to remove extracted library");
            }
            None
        } else {
            Some(extracted.path)
        };

        Ok(LoadedLibrary::new(library, path, source, retained))
    }
}
