use std::sync::Arc;

use proptest::prelude::*;
use rucksdb_native::{
    BlockBasedTableConfig, InProcessEngine, NativeTableApi, TableFormatConfig, TableFormatOptions,
};

/// Property: every value written through a setter is read back unchanged,
/// sentinels included
#[test]
fn property_setters_round_trip() {
    proptest!(|(
        no_block_cache in any::<bool>(),
        cache_size in any::<i64>(),
        shard_bits in any::<i32>(),
        block_size in any::<i64>(),
        deviation in any::<i32>(),
        restart in any::<i32>(),
        whole_key in any::<bool>(),
        bits_per_key in any::<i32>(),
        cache_index in any::<bool>(),
        collision in any::<bool>(),
        compressed_size in any::<i64>(),
        compressed_bits in any::<i32>(),
    )| {
        let config = BlockBasedTableConfig::builder()
            .set_no_block_cache(no_block_cache)
            .set_block_cache_size(cache_size)
            .set_block_cache_num_shard_bits(shard_bits)
            .set_block_size(block_size)
            .set_block_size_deviation(deviation)
            .set_block_restart_interval(restart)
            .set_whole_key_filtering(whole_key)
            .set_bits_per_key(bits_per_key)
            .set_cache_index_and_filter_blocks(cache_index)
            .set_hash_index_allow_collision(collision)
            .set_block_cache_compressed_size(compressed_size)
            .set_block_cache_compressed_num_shard_bits(compressed_bits)
            .build();

        prop_assert_eq!(config.no_block_cache(), no_block_cache);
        prop_assert_eq!(config.block_cache_size(), cache_size);
        prop_assert_eq!(config.block_cache_num_shard_bits(), shard_bits);
        prop_assert_eq!(config.block_size(), block_size);
        prop_assert_eq!(config.block_size_deviation(), deviation);
        prop_assert_eq!(config.block_restart_interval(), restart);
        prop_assert_eq!(config.whole_key_filtering(), whole_key);
        prop_assert_eq!(config.bits_per_key(), bits_per_key);
        prop_assert_eq!(config.cache_index_and_filter_blocks(), cache_index);
        prop_assert_eq!(config.hash_index_allow_collision(), collision);
        prop_assert_eq!(config.block_cache_compressed_size(), compressed_size);
        prop_assert_eq!(config.block_cache_compressed_num_shard_bits(), compressed_bits);

        // The options file keeps sentinels verbatim as well
        let parsed = BlockBasedTableConfig::from_json(&config.to_json().unwrap()).unwrap();
        prop_assert_eq!(parsed, config);
    });
}

/// Property: a handle either comes back live or the engine leaves nothing
/// behind; repeated creation never aliases
#[test]
fn property_handle_creation_never_leaks() {
    proptest!(|(
        cache_size in -1024i64..(1 << 24),
        shard_bits in -4i32..12,
        block_size in -16i64..(1 << 16),
        bits_per_key in -4i32..32,
        restart in -2i32..64,
    )| {
        let engine = Arc::new(InProcessEngine::new());
        let api: Arc<dyn NativeTableApi> = engine.clone();
        let options = TableFormatOptions::BlockBased(
            BlockBasedTableConfig::builder()
                .set_block_cache_size(cache_size)
                .set_block_cache_num_shard_bits(shard_bits)
                .set_block_size(block_size)
                .set_bits_per_key(bits_per_key)
                .set_block_restart_interval(restart)
                .build(),
        );

        match (options.new_table_factory_handle(&api), options.new_table_factory_handle(&api)) {
            (Ok(a), Ok(b)) => {
                prop_assert_ne!(a.raw(), b.raw());
                prop_assert_eq!(engine.stats().live, 2);
            }
            (Err(a), Err(b)) => {
                prop_assert_eq!(a, b);
                prop_assert_eq!(engine.stats().live, 0);
            }
            _ => prop_assert!(false, "same configuration produced different outcomes"),
        }
    });
}
