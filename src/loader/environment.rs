//! Platform naming rules for the engine's shared library.

use std::env::consts;

/// Base name of the engine library, without prefix, suffix or platform tag
pub const LIBRARY_BASE_NAME: &str = "rucksdbjni";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform<'a> {
    pub os: &'a str,
    pub pointer_width: u32,
}

impl Platform<'static> {
    pub fn current() -> Self {
        Platform {
            os: consts::OS,
            pointer_width: usize::BITS,
        }
    }
}

impl Platform<'_> {
    pub fn is_windows(&self) -> bool {
        self.os == "windows"
    }

    pub fn is_mac(&self) -> bool {
        self.os == "macos"
    }

    pub fn is_unix(&self) -> bool {
        matches!(
            self.os,
            "linux" | "android" | "freebsd" | "openbsd" | "netbsd" | "dragonfly" | "solaris" | "illumos"
        )
    }

    fn prefix(&self) -> &'static str {
        if self.is_windows() { "" } else { "lib" }
    }

    fn extension(&self) -> &'static str {
        if self.is_windows() {
            "dll"
        } else if self.is_mac() {
            "dylib"
        } else {
            "so"
        }
    }

    /// Name used when the library is installed system wide,
    /// e.g. `librucksdbjni.so`
    pub fn shared_library_name(&self, name: &str) -> String {
        format!("{}{name}.{}", self.prefix(), self.extension())
    }

    /// Platform tagged name, e.g. `rucksdbjni-linux64`.
    ///
    /// Returns `None` for platforms no packaged library is built for.
    pub fn jni_library_name(&self, name: &str) -> Option<String> {
        let bits = self.pointer_width;
        if self.is_unix() {
            Some(format!("{name}-{}{bits}", self.os))
        } else if self.is_mac() {
            Some(format!("{name}-osx"))
        } else if self.is_windows() {
            Some(format!("{name}-win{bits}"))
        } else {
            None
        }
    }

    /// File name of the packaged library, e.g. `librucksdbjni-linux64.so`
    pub fn jni_library_file_name(&self, name: &str) -> Option<String> {
        self.jni_library_name(name)
            .map(|tagged| format!("{}{tagged}.{}", self.prefix(), self.extension()))
    }
}

/// Packaged library file name for the running platform, falling back to the
/// untagged shared library name on platforms without a tagged build.
pub fn default_library_file_name() -> String {
    let platform = Platform::current();
    platform
        .jni_library_file_name(LIBRARY_BASE_NAME)
        .unwrap_or_else(|| platform.shared_library_name(LIBRARY_BASE_NAME))
}
