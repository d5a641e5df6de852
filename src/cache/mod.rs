pub mod lru;

pub use lru::{CacheStats, DEFAULT_NUM_SHARD_BITS, MAX_NUM_SHARD_BITS, ShardedLRUCache};
