use std::sync::Arc;

use crate::cache::{DEFAULT_NUM_SHARD_BITS, MAX_NUM_SHARD_BITS, ShardedLRUCache};
use crate::filter::{BloomFilterPolicy, FilterPolicy};
use crate::util::{Result, Status};

/// Block cache key: (file number, block offset)
pub type BlockCache = ShardedLRUCache<(u64, u64), Arc<Vec<u8>>>;

pub const BLOCK_BASED_TABLE_NAME: &str = "BlockBasedTable";
pub const PLAIN_TABLE_NAME: &str = "PlainTable";

/// Engine-side table factory produced from a configuration handle
pub enum TableFactory {
    BlockBased(BlockBasedTableFactory),
    Plain(PlainTableFactory),
}

impl TableFactory {
    pub fn name(&self) -> &'static str {
        match self {
            TableFactory::BlockBased(_) => BLOCK_BASED_TABLE_NAME,
            TableFactory::Plain(_) => PLAIN_TABLE_NAME,
        }
    }

    pub fn as_block_based(&self) -> Option<&BlockBasedTableFactory> {
        match self {
            TableFactory::BlockBased(f) => Some(f),
            TableFactory::Plain(_) => None,
        }
    }

    pub fn as_plain(&self) -> Option<&PlainTableFactory> {
        match self {
            TableFactory::Plain(f) => Some(f),
            TableFactory::BlockBased(_) => None,
        }
    }
}

/// Raw values as they arrive over the binding, before interpretation
#[derive(Debug, Clone, Copy)]
pub(crate) struct BlockBasedTableArgs {
    pub no_block_cache: bool,
    pub block_cache_size: i64,
    pub block_cache_num_shard_bits: i32,
    pub block_size: i64,
    pub block_size_deviation: i32,
    pub block_restart_interval: i32,
    pub whole_key_filtering: bool,
    pub bits_per_key: i32,
    pub cache_index_and_filter_blocks: bool,
    pub hash_index_allow_collision: bool,
    pub block_cache_compressed_size: i64,
    pub block_cache_compressed_num_shard_bits: i32,
}

/// Block-based table factory with every sentinel resolved
pub struct BlockBasedTableFactory {
    block_cache: Option<Arc<BlockCache>>,
    block_cache_compressed: Option<Arc<BlockCache>>,
    filter_policy: Option<Arc<BloomFilterPolicy>>,
    block_size: usize,
    block_size_deviation: u32,
    block_restart_interval: usize,
    whole_key_filtering: bool,
    cache_index_and_filter_blocks: bool,
    hash_index_allow_collision: bool,
}

/// Negative shard bits select the default; out-of-range values are an error.
fn resolve_shard_bits(bits: i32, what: &str) -> Result<u32> {
    if bits < 0 {
        return Ok(DEFAULT_NUM_SHARD_BITS);
    }
    let bits = bits as u32;
    if bits >= MAX_NUM_SHARD_BITS {
        return Err(Status::invalid_argument(format!(
            "{what} num_shard_bits must be below {MAX_NUM_SHARD_BITS}, got {bits}"
        )));
    }
    Ok(bits)
}

fn new_cache(capacity: i64, shard_bits: i32, what: &str) -> Result<Option<Arc<BlockCache>>> {
    if capacity <= 0 {
        return Ok(None);
    }
    let bits = resolve_shard_bits(shard_bits, what)?;
    Ok(Some(Arc::new(ShardedLRUCache::new(capacity as usize, bits))))
}

impl BlockBasedTableFactory {
    pub(crate) fn new(args: BlockBasedTableArgs) -> Result<Self> {
        if args.block_size <= 0 {
            return Err(Status::invalid_argument(format!(
                "block_size must be positive, got {}",
                args.block_size
            )));
        }
        if args.block_restart_interval < 1 {
            return Err(Status::invalid_argument(format!(
                "block_restart_interval must be at least 1, got {}",
                args.block_restart_interval
            )));
        }

        let block_cache = if args.no_block_cache {
            None
        } else {
            new_cache(args.block_cache_size, args.block_cache_num_shard_bits, "block cache")?
        };
        let block_cache_compressed = new_cache(
            args.block_cache_compressed_size,
            args.block_cache_compressed_num_shard_bits,
            "compressed block cache",
        )?;
        let filter_policy = BloomFilterPolicy::from_bits_per_key(args.bits_per_key)?.map(Arc::new);

        // Out of range deviations disable early closing.
        let block_size_deviation = match args.block_size_deviation {
            d @ 0..=100 => d as u32,
            _ => 0,
        };

        Ok(BlockBasedTableFactory {
            block_cache,
            block_cache_compressed,
            filter_policy,
            block_size: args.block_size as usize,
            block_size_deviation,
            block_restart_interval: args.block_restart_interval as usize,
            whole_key_filtering: args.whole_key_filtering,
            cache_index_and_filter_blocks: args.cache_index_and_filter_blocks,
            hash_index_allow_collision: args.hash_index_allow_collision,
        })
    }

    pub fn block_cache(&self) -> Option<&Arc<BlockCache>> {
        self.block_cache.as_ref()
    }

    pub fn block_cache_compressed(&self) -> Option<&Arc<BlockCache>> {
        self.block_cache_compressed.as_ref()
    }

    pub fn filter_policy(&self) -> Option<&Arc<BloomFilterPolicy>> {
        self.filter_policy.as_ref()
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn block_size_deviation(&self) -> u32 {
        self.block_size_deviation
    }

    pub fn block_restart_interval(&self) -> usize {
        self.block_restart_interval
    }

    pub fn whole_key_filtering(&self) -> bool {
        self.whole_key_filtering
    }

    pub fn cache_index_and_filter_blocks(&self) -> bool {
        self.cache_index_and_filter_blocks
    }

    pub fn hash_index_allow_collision(&self) -> bool {
        self.hash_index_allow_collision
    }

    /// Flush policy for data blocks.
    ///
    /// A block is closed once it reaches `block_size`. It is closed early
    /// when adding `next_entry_size` would overflow it and it is already
    /// within `block_size_deviation` percent of the limit.
    pub fn should_flush_block(&self, current_size: usize, next_entry_size: usize) -> bool {
        if current_size >= self.block_size {
            return true;
        }
        if self.block_size_deviation == 0 {
            return false;
        }
        let keep = u128::from(100 - self.block_size_deviation);
        let threshold = (self.block_size as u128 * keep).div_ceil(100);
        current_size as u128 >= threshold
            && current_size.saturating_add(next_entry_size) > self.block_size
    }

    /// Builds the filter block for `keys`, or `None` when no filter is
    /// configured. With whole key filtering off only prefixes are added.
    pub fn build_filter(&self, keys: &[&[u8]], prefix_len: usize) -> Option<Vec<u8>> {
        let policy = self.filter_policy.as_ref()?;
        if self.whole_key_filtering {
            return Some(policy.create_filter(keys));
        }
        let prefixes: Vec<&[u8]> = keys.iter().map(|k| &k[..prefix_len.min(k.len())]).collect();
        Some(policy.create_filter(&prefixes))
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct PlainTableArgs {
    pub key_size: i32,
    pub bloom_bits_per_key: i32,
    pub hash_table_ratio: f64,
    pub index_sparseness: i32,
}

/// Plain table factory with every sentinel resolved
pub struct PlainTableFactory {
    /// `None` means variable-length keys
    key_size: Option<usize>,
    filter_policy: Option<Arc<BloomFilterPolicy>>,
    hash_table_ratio: f64,
    index_sparseness: usize,
}

impl PlainTableFactory {
    pub(crate) fn new(args: PlainTableArgs) -> Result<Self> {
        if args.key_size < 0 {
            return Err(Status::invalid_argument(format!(
                "plain table key_size must not be negative, got {}",
                args.key_size
            )));
        }
        if !(args.hash_table_ratio > 0.0 && args.hash_table_ratio <= 1.0) {
            return Err(Status::invalid_argument(format!(
                "plain table hash_table_ratio must be in (0, 1], got {}",
                args.hash_table_ratio
            )));
        }
        let filter_policy =
            BloomFilterPolicy::from_bits_per_key(args.bloom_bits_per_key)?.map(Arc::new);

        Ok(PlainTableFactory {
            key_size: (args.key_size > 0).then_some(args.key_size as usize),
            filter_policy,
            hash_table_ratio: args.hash_table_ratio,
            index_sparseness: args.index_sparseness.max(1) as usize,
        })
    }

    pub fn key_size(&self) -> Option<usize> {
        self.key_size
    }

    pub fn filter_policy(&self) -> Option<&Arc<BloomFilterPolicy>> {
        self.filter_policy.as_ref()
    }

    pub fn hash_table_ratio(&self) -> f64 {
        self.hash_table_ratio
    }

    pub fn index_sparseness(&self) -> usize {
        self.index_sparseness
    }
}
