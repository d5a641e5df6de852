#![no_main]

use std::collections::HashSet;
use std::sync::Arc;

use libfuzzer_sys::fuzz_target;
use rucksdb_native::{
    BlockBasedTableConfig, InProcessEngine, NativeTableApi, Options, TableFactoryHandle,
    TableFormatConfig,
};

// Random interleavings of create, replace and drop. Every live handle is
// distinct and the engine ends with nothing allocated.
fuzz_target!(|data: &[u8]| {
    let engine = Arc::new(InProcessEngine::new());
    let api: Arc<dyn NativeTableApi> = engine.clone();
    let mut handles: Vec<TableFactoryHandle> = Vec::new();
    let mut options = Options::new(api.clone());

    for chunk in data.chunks(2) {
        let op = chunk[0] % 4;
        let arg = chunk.get(1).copied().unwrap_or(0);
        let config = BlockBasedTableConfig::builder()
            .set_no_block_cache(arg & 1 == 0)
            .set_block_cache_num_shard_bits((arg >> 4) as i32 - 1)
            .set_bits_per_key((arg >> 1) as i32 % 12)
            .build();

        match op {
            0 => {
                if let Ok(handle) = config.new_table_factory_handle(&api) {
                    handles.push(handle);
                }
            }
            1 => {
                if !handles.is_empty() {
                    handles.swap_remove(arg as usize % handles.len());
                }
            }
            2 => {
                let _ = options.set_table_format_config(&config);
            }
            _ => {
                let raws: HashSet<u64> = handles.iter().map(|h| h.raw().as_u64()).collect();
                assert_eq!(raws.len(), handles.len());
            }
        }
    }

    let pending = handles.len() + usize::from(options.table_factory().is_some());
    assert_eq!(engine.stats().live, pending);
    drop(handles);
    drop(options);
    assert_eq!(engine.stats().live, 0);
});
