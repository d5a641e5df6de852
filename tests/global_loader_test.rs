//! Kept in its own test binary: the global loader is process state.

use std::sync::Arc;

use rucksdb_native::{EmbeddedResources, LoaderOptions, NativeLibraryLoader};

#[test]
fn test_install_global_only_once() {
    let options = LoaderOptions {
        library_file_name: "librucksdbjni-global.so".to_string(),
        try_system_library_first: false,
        ..LoaderOptions::default()
    };
    NativeLibraryLoader::install_global(NativeLibraryLoader::new(
        options,
        Arc::new(EmbeddedResources::new()),
    ))
    .unwrap();

    let global = NativeLibraryLoader::global();
    assert_eq!(global.options().library_file_name, "librucksdbjni-global.so");
    assert!(std::ptr::eq(global, NativeLibraryLoader::global()));

    let err = NativeLibraryLoader::install_global(NativeLibraryLoader::new(
        LoaderOptions::default(),
        Arc::new(EmbeddedResources::new()),
    ))
    .unwrap_err();
    assert!(err.is_invalid_argument());

    // Nothing to extract; the failure is remembered
    let dir = tempfile::TempDir::new().unwrap();
    let first = global.load_library(Some(dir.path())).unwrap_err();
    assert!(first.is_not_found());
    assert_eq!(global.load_library(None).unwrap_err(), first);
}
