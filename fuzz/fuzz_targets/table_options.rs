#![no_main]

use std::sync::Arc;

use libfuzzer_sys::fuzz_target;
use rucksdb_native::{InProcessEngine, NativeTableApi, TableFormatConfig, TableFormatOptions};

// Options files come from disk; parsing and handing them to the engine must
// fail cleanly on anything malformed.
fuzz_target!(|data: &[u8]| {
    let Ok(options) = serde_json::from_slice::<TableFormatOptions>(data) else {
        return;
    };

    let engine = Arc::new(InProcessEngine::new());
    let api: Arc<dyn NativeTableApi> = engine.clone();
    match options.new_table_factory_handle(&api) {
        Ok(handle) => {
            assert!(engine.is_live(handle.raw()));
            drop(handle);
            assert_eq!(engine.stats().live, 0);
        }
        Err(_) => assert_eq!(engine.stats().live, 0),
    }

    // Whatever parsed must survive a write and re-read unchanged
    let json = serde_json::to_string(&options).unwrap();
    let reparsed: TableFormatOptions = serde_json::from_str(&json).unwrap();
    assert_eq!(reparsed, options);
});
