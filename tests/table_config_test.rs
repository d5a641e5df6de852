use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use rucksdb_native::engine::{BLOCK_BASED_TABLE_NAME, InProcessEngine};
use rucksdb_native::table::UNSET_NUM_SHARD_BITS;
use rucksdb_native::{
    BlockBasedTableConfig, NativeTableApi, Options, RawHandle, Result, Status, TableFormatConfig,
};

/// Arguments of one `new_block_based_table_factory` call, in call order
#[derive(Debug, Clone, PartialEq)]
struct BlockBasedCall {
    no_block_cache: bool,
    block_cache_size: i64,
    block_cache_num_shard_bits: i32,
    block_size: i64,
    block_size_deviation: i32,
    block_restart_interval: i32,
    whole_key_filtering: bool,
    bits_per_key: i32,
    cache_index_and_filter_blocks: bool,
    hash_index_allow_collision: bool,
    block_cache_compressed_size: i64,
    block_cache_compressed_num_shard_bits: i32,
}

/// Records every call and hands out sequential handles
#[derive(Default)]
struct RecordingApi {
    calls: Mutex<Vec<BlockBasedCall>>,
    disposed: Mutex<Vec<RawHandle>>,
    next: AtomicU64,
    fail_with: Mutex<Option<Status>>,
}

impl NativeTableApi for RecordingApi {
    fn new_block_based_table_factory(
        &self,
        no_block_cache: bool,
        block_cache_size: i64,
        block_cache_num_shard_bits: i32,
        block_size: i64,
        block_size_deviation: i32,
        block_restart_interval: i32,
        whole_key_filtering: bool,
        bits_per_key: i32,
        cache_index_and_filter_blocks: bool,
        hash_index_allow_collision: bool,
        block_cache_compressed_size: i64,
        block_cache_compressed_num_shard_bits: i32,
    ) -> Result<RawHandle> {
        self.calls.lock().push(BlockBasedCall {
            no_block_cache,
            block_cache_size,
            block_cache_num_shard_bits,
            block_size,
            block_size_deviation,
            block_restart_interval,
            whole_key_filtering,
            bits_per_key,
            cache_index_and_filter_blocks,
            hash_index_allow_collision,
            block_cache_compressed_size,
            block_cache_compressed_num_shard_bits,
        });
        if let Some(status) = self.fail_with.lock().clone() {
            return Err(status);
        }
        Ok(RawHandle::from_u64(self.next.fetch_add(1, Ordering::SeqCst) + 1))
    }

    fn new_plain_table_factory(&self, _: i32, _: i32, _: f64, _: i32) -> Result<RawHandle> {
        Err(Status::invalid_argument("plain table not recorded"))
    }

    fn table_factory_name(&self, _handle: RawHandle) -> Result<String> {
        Ok("Recorded".to_string())
    }

    fn dispose_table_factory(&self, handle: RawHandle) {
        self.disposed.lock().push(handle);
    }
}

#[test]
fn test_default_config_matches_documented_defaults() {
    let config = BlockBasedTableConfig::default();

    assert!(!config.no_block_cache());
    assert_eq!(config.block_cache_size(), 8 * 1024 * 1024);
    assert_eq!(config.block_cache_num_shard_bits(), UNSET_NUM_SHARD_BITS);
    assert!(config.block_cache_num_shard_bits() < 0);
    assert_eq!(config.block_size(), 4 * 1024);
    assert_eq!(config.block_size_deviation(), 10);
    assert_eq!(config.block_restart_interval(), 16);
    assert!(config.whole_key_filtering());
    assert_eq!(config.bits_per_key(), 10);
    assert!(!config.cache_index_and_filter_blocks());
    assert!(config.hash_index_allow_collision());
    assert_eq!(config.block_cache_compressed_size(), 0);
    assert_eq!(config.block_cache_compressed_num_shard_bits(), UNSET_NUM_SHARD_BITS);

    assert_eq!(BlockBasedTableConfig::builder().build(), config);
}

#[test]
fn test_setters_round_trip() {
    let mut b = BlockBasedTableConfig::builder();

    assert!(b.set_no_block_cache(true).no_block_cache());
    assert_eq!(b.set_block_cache_size(-1).block_cache_size(), -1);
    assert_eq!(b.set_block_cache_num_shard_bits(-5).block_cache_num_shard_bits(), -5);
    assert_eq!(b.set_block_size(64 * 1024).block_size(), 64 * 1024);
    assert_eq!(b.set_block_size_deviation(0).block_size_deviation(), 0);
    assert_eq!(b.set_block_restart_interval(4).block_restart_interval(), 4);
    assert!(!b.set_whole_key_filtering(false).whole_key_filtering());
    assert_eq!(b.set_bits_per_key(0).bits_per_key(), 0);
    assert!(b.set_cache_index_and_filter_blocks(true).cache_index_and_filter_blocks());
    assert!(!b.set_hash_index_allow_collision(false).hash_index_allow_collision());
    assert_eq!(b.set_block_cache_compressed_size(0).block_cache_compressed_size(), 0);
    assert_eq!(
        b.set_block_cache_compressed_num_shard_bits(-1)
            .block_cache_compressed_num_shard_bits(),
        -1
    );

    let config = b.build();
    assert!(config.no_block_cache());
    assert_eq!(config.block_cache_size(), -1);
    assert_eq!(config.block_cache_num_shard_bits(), -5);
    assert_eq!(config.block_size(), 64 * 1024);
    assert_eq!(config.block_size_deviation(), 0);
    assert_eq!(config.block_restart_interval(), 4);
    assert!(!config.whole_key_filtering());
    assert_eq!(config.bits_per_key(), 0);
    assert!(config.cache_index_and_filter_blocks());
    assert!(!config.hash_index_allow_collision());
    assert_eq!(config.block_cache_compressed_size(), 0);
    assert_eq!(config.block_cache_compressed_num_shard_bits(), -1);
}

#[test]
fn test_setters_return_same_builder() {
    let mut builder = BlockBasedTableConfig::builder();
    let addr = &builder as *const _;

    let chained = builder
        .set_block_size(8192)
        .set_bits_per_key(12)
        .set_no_block_cache(true);
    assert!(std::ptr::eq(chained, addr));

    // All three setters landed on the one builder
    let config = builder.build();
    assert_eq!(config.block_size(), 8192);
    assert_eq!(config.bits_per_key(), 12);
    assert!(config.no_block_cache());
}

#[test]
fn test_built_config_is_detached_from_builder() {
    let mut builder = BlockBasedTableConfig::builder();
    let config = builder.set_block_size(1024).build();

    builder.set_block_size(2048);

    assert_eq!(config.block_size(), 1024);
    assert_eq!(builder.build().block_size(), 2048);
}

#[test]
fn test_fields_cross_boundary_in_declared_order() {
    let recorder = Arc::new(RecordingApi::default());
    let api: Arc<dyn NativeTableApi> = recorder.clone();

    let config = BlockBasedTableConfig::builder()
        .set_no_block_cache(true)
        .set_block_cache_size(1)
        .set_block_cache_num_shard_bits(-2)
        .set_block_size(3)
        .set_block_size_deviation(4)
        .set_block_restart_interval(5)
        .set_whole_key_filtering(false)
        .set_bits_per_key(6)
        .set_cache_index_and_filter_blocks(true)
        .set_hash_index_allow_collision(false)
        .set_block_cache_compressed_size(7)
        .set_block_cache_compressed_num_shard_bits(-8)
        .build();

    let handle = config.new_table_factory_handle(&api).unwrap();
    assert_eq!(handle.raw(), RawHandle::from_u64(1));

    let calls = recorder.calls.lock().clone();
    assert_eq!(
        calls,
        vec![BlockBasedCall {
            no_block_cache: true,
            block_cache_size: 1,
            block_cache_num_shard_bits: -2,
            block_size: 3,
            block_size_deviation: 4,
            block_restart_interval: 5,
            whole_key_filtering: false,
            bits_per_key: 6,
            cache_index_and_filter_blocks: true,
            hash_index_allow_collision: false,
            block_cache_compressed_size: 7,
            block_cache_compressed_num_shard_bits: -8,
        }]
    );
}

#[test]
fn test_handle_released_once() {
    let recorder = Arc::new(RecordingApi::default());
    let api: Arc<dyn NativeTableApi> = recorder.clone();

    let handle = BlockBasedTableConfig::default()
        .new_table_factory_handle(&api)
        .unwrap();
    let raw = handle.raw();
    drop(handle);

    assert_eq!(*recorder.disposed.lock(), vec![raw]);
}

#[test]
fn test_into_raw_transfers_ownership() {
    let recorder = Arc::new(RecordingApi::default());
    let api: Arc<dyn NativeTableApi> = recorder.clone();

    let handle = BlockBasedTableConfig::default()
        .new_table_factory_handle(&api)
        .unwrap();
    let raw = handle.into_raw();

    assert!(!raw.is_null());
    assert!(recorder.disposed.lock().is_empty());
}

#[test]
fn test_engine_error_surfaces_to_caller() {
    let recorder = Arc::new(RecordingApi::default());
    *recorder.fail_with.lock() = Some(Status::invalid_argument("bad filter"));
    let api: Arc<dyn NativeTableApi> = recorder.clone();

    let err = BlockBasedTableConfig::default()
        .new_table_factory_handle(&api)
        .unwrap_err();

    assert!(err.is_invalid_argument());
    assert_eq!(err.message(), "bad filter");
    assert!(recorder.disposed.lock().is_empty());
}

#[test]
fn test_two_handles_from_one_config_do_not_alias() {
    let engine = Arc::new(InProcessEngine::new());
    let api: Arc<dyn NativeTableApi> = engine.clone();
    let config = BlockBasedTableConfig::builder()
        .set_block_cache_size(1024 * 1024)
        .build();

    let mut first = Options::new(api.clone());
    let mut second = Options::new(api.clone());
    first.set_table_format_config(&config).unwrap();
    second.set_table_format_config(&config).unwrap();

    let a = first.table_factory().unwrap().raw();
    let b = second.table_factory().unwrap().raw();
    assert_ne!(a, b);

    // Each factory owns its own cache
    let cache_a = engine.factory(a).unwrap().as_block_based().unwrap().block_cache().cloned().unwrap();
    let cache_b = engine.factory(b).unwrap().as_block_based().unwrap().block_cache().cloned().unwrap();
    assert!(!Arc::ptr_eq(&cache_a, &cache_b));

    // Dropping one consumer leaves the other's factory intact
    drop(first);
    assert!(!engine.is_live(a));
    assert!(engine.is_live(b));
    assert_eq!(second.table_factory_name().unwrap(), BLOCK_BASED_TABLE_NAME);
}

#[test]
fn test_engine_interprets_sentinels() {
    let engine = Arc::new(InProcessEngine::new());
    let api: Arc<dyn NativeTableApi> = engine.clone();

    let no_cache = BlockBasedTableConfig::builder()
        .set_block_cache_size(0)
        .set_bits_per_key(0)
        .build()
        .new_table_factory_handle(&api)
        .unwrap();
    let factory = engine.factory(no_cache.raw()).unwrap();
    let factory = factory.as_block_based().unwrap();
    assert!(factory.block_cache().is_none());
    assert!(factory.filter_policy().is_none());
    assert!(factory.block_cache_compressed().is_none());

    let compressed = BlockBasedTableConfig::builder()
        .set_block_cache_compressed_size(4 * 1024 * 1024)
        .set_block_cache_compressed_num_shard_bits(1)
        .build()
        .new_table_factory_handle(&api)
        .unwrap();
    let factory = engine.factory(compressed.raw()).unwrap();
    let cache = factory.as_block_based().unwrap().block_cache_compressed().unwrap();
    assert_eq!(cache.num_shards(), 2);
    assert_eq!(cache.capacity(), 4 * 1024 * 1024);
}

#[test]
fn test_engine_rejects_invalid_filter() {
    let engine = Arc::new(InProcessEngine::new());
    let api: Arc<dyn NativeTableApi> = engine.clone();

    let err = BlockBasedTableConfig::builder()
        .set_bits_per_key(-1)
        .build()
        .new_table_factory_handle(&api)
        .unwrap_err();

    assert!(err.is_invalid_argument());
    assert_eq!(engine.stats().live, 0);
    assert_eq!(engine.stats().failed, 1);
}
