use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::table_format_config::TableFormatConfig;
use crate::native::{NativeTableApi, TableFactoryHandle};
use crate::util::Result;

/// Shard bit value meaning "let the engine choose"
pub const UNSET_NUM_SHARD_BITS: i32 = -1;

pub const DEFAULT_BLOCK_CACHE_SIZE: i64 = 8 * 1024 * 1024;
pub const DEFAULT_BLOCK_SIZE: i64 = 4 * 1024;
pub const DEFAULT_BLOCK_SIZE_DEVIATION: i32 = 10;
pub const DEFAULT_BLOCK_RESTART_INTERVAL: i32 = 16;
pub const DEFAULT_BITS_PER_KEY: i32 = 10;

/// Options for the block-based table format.
///
/// An immutable value produced by [`BlockBasedTableConfigBuilder::build`].
/// No cross-field validation happens here: sentinels such as negative shard
/// bits or a non-positive cache size travel to the engine verbatim and are
/// interpreted there.
///
/// # Example
///
/// ```ignore
/// use rucksdb_native::{BlockBasedTableConfig, InProcessEngine, Options};
///
/// let config = BlockBasedTableConfig::builder()
///     .set_block_size(16 * 1024)
///     .set_block_cache_size(64 * 1024 * 1024)
///     .set_bits_per_key(10)
///     .build();
///
/// let mut options = Options::new(InProcessEngine::shared());
/// options.set_table_format_config(&config)?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockBasedTableConfig {
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

impl Default for BlockBasedTableConfig {
    fn default() -> Self {
        BlockBasedTableConfig {
            no_block_cache: false,
            block_cache_size: DEFAULT_BLOCK_CACHE_SIZE,
            block_cache_num_shard_bits: UNSET_NUM_SHARD_BITS,
            block_size: DEFAULT_BLOCK_SIZE,
            block_size_deviation: DEFAULT_BLOCK_SIZE_DEVIATION,
            block_restart_interval: DEFAULT_BLOCK_RESTART_INTERVAL,
            whole_key_filtering: true,
            bits_per_key: DEFAULT_BITS_PER_KEY,
            cache_index_and_filter_blocks: false,
            hash_index_allow_collision: true,
            block_cache_compressed_size: 0,
            block_cache_compressed_num_shard_bits: UNSET_NUM_SHARD_BITS,
        }
    }
}

impl BlockBasedTableConfig {
    pub fn builder() -> BlockBasedTableConfigBuilder {
        BlockBasedTableConfigBuilder::default()
    }

    /// Starts a builder from this configuration's values
    pub fn to_builder(&self) -> BlockBasedTableConfigBuilder {
        BlockBasedTableConfigBuilder {
            config: self.clone(),
        }
    }

    /// Disable the block cache. Other cache options are ignored when set.
    pub fn no_block_cache(&self) -> bool {
        self.no_block_cache
    }

    /// Block cache capacity in bytes. Non-positive disables the cache.
    pub fn block_cache_size(&self) -> i64 {
        self.block_cache_size
    }

    /// log2 of the block cache shard count; negative selects the engine default
    pub fn block_cache_num_shard_bits(&self) -> i32 {
        self.block_cache_num_shard_bits
    }

    /// Approximate size of user data packed per block (uncompressed)
    pub fn block_size(&self) -> i64 {
        self.block_size
    }

    /// Percentage of free space below which a block is closed early
    pub fn block_size_deviation(&self) -> i32 {
        self.block_size_deviation
    }

    /// Number of keys between restart points for key delta encoding
    pub fn block_restart_interval(&self) -> i32 {
        self.block_restart_interval
    }

    pub fn whole_key_filtering(&self) -> bool {
        self.whole_key_filtering
    }

    /// Bloom filter bits per key; 0 builds no filter
    pub fn bits_per_key(&self) -> i32 {
        self.bits_per_key
    }

    pub fn cache_index_and_filter_blocks(&self) -> bool {
        self.cache_index_and_filter_blocks
    }

    pub fn hash_index_allow_collision(&self) -> bool {
        self.hash_index_allow_collision
    }

    /// Compressed block cache capacity in bytes; 0 disables it
    pub fn block_cache_compressed_size(&self) -> i64 {
        self.block_cache_compressed_size
    }

    pub fn block_cache_compressed_num_shard_bits(&self) -> i32 {
        self.block_cache_compressed_num_shard_bits
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Missing fields fall back to their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl TableFormatConfig for BlockBasedTableConfig {
    fn new_table_factory_handle(
        &self,
        api: &Arc<dyn NativeTableApi>,
    ) -> Result<TableFactoryHandle> {
        let raw = api.new_block_based_table_factory(
            self.no_block_cache,
            self.block_cache_size,
            self.block_cache_num_shard_bits,
            self.block_size,
            self.block_size_deviation,
            self.block_restart_interval,
            self.whole_key_filtering,
            self.bits_per_key,
            self.cache_index_and_filter_blocks,
            self.hash_index_allow_collision,
            self.block_cache_compressed_size,
            self.block_cache_compressed_num_shard_bits,
        )?;
        debug!(handle = %raw, block_size = self.block_size, "created block-based table factory");

        // SAFETY: `raw` was allocated by `api` just now and nothing else owns it.
        Ok(unsafe { TableFactoryHandle::from_raw(raw, Arc::clone(api)) })
    }
}

/// Accumulates block-based table options.
///
/// Setters return the same builder so calls chain. The builder itself
/// cannot produce a handle; only the value returned by [`build`] can.
///
/// [`build`]: BlockBasedTableConfigBuilder::build
#[derive(Debug, Clone, Default)]
pub struct BlockBasedTableConfigBuilder {
    config: BlockBasedTableConfig,
}

macro_rules! builder_getters {
    ($($field:ident: $ty:ty),* $(,)?) => {
        impl BlockBasedTableConfigBuilder {
            $(
                pub fn $field(&self) -> $ty {
                    self.config.$field
                }
            )*
        }
    };
}

builder_getters! {
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

impl BlockBasedTableConfigBuilder {
    pub fn set_no_block_cache(&mut self, no_block_cache: bool) -> &mut Self {
        self.config.no_block_cache = no_block_cache;
        self
    }

    pub fn set_block_cache_size(&mut self, block_cache_size: i64) -> &mut Self {
        self.config.block_cache_size = block_cache_size;
        self
    }

    /// Pass [`UNSET_NUM_SHARD_BITS`] (or any negative value) for the engine
    /// default. Only meaningful with a positive cache size.
    pub fn set_block_cache_num_shard_bits(&mut self, bits: i32) -> &mut Self {
        self.config.block_cache_num_shard_bits = bits;
        self
    }

    pub fn set_block_size(&mut self, block_size: i64) -> &mut Self {
        self.config.block_size = block_size;
        self
    }

    pub fn set_block_size_deviation(&mut self, percent: i32) -> &mut Self {
        self.config.block_size_deviation = percent;
        self
    }

    pub fn set_block_restart_interval(&mut self, interval: i32) -> &mut Self {
        self.config.block_restart_interval = interval;
        self
    }

    /// When false only key prefixes are added to filters
    pub fn set_whole_key_filtering(&mut self, whole_key_filtering: bool) -> &mut Self {
        self.config.whole_key_filtering = whole_key_filtering;
        self
    }

    pub fn set_bits_per_key(&mut self, bits_per_key: i32) -> &mut Self {
        self.config.bits_per_key = bits_per_key;
        self
    }

    /// Keep index and filter blocks in the block cache instead of preloading
    /// them with the table
    pub fn set_cache_index_and_filter_blocks(&mut self, cache: bool) -> &mut Self {
        self.config.cache_index_and_filter_blocks = cache;
        self
    }

    /// Only consulted by the hash-search index type
    pub fn set_hash_index_allow_collision(&mut self, allow: bool) -> &mut Self {
        self.config.hash_index_allow_collision = allow;
        self
    }

    pub fn set_block_cache_compressed_size(&mut self, size: i64) -> &mut Self {
        self.config.block_cache_compressed_size = size;
        self
    }

    pub fn set_block_cache_compressed_num_shard_bits(&mut self, bits: i32) -> &mut Self {
        self.config.block_cache_compressed_num_shard_bits = bits;
        self
    }

    pub fn build(&self) -> BlockBasedTableConfig {
        self.config.clone()
    }
}
