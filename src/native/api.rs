use std::fmt;

use crate::util::Result;

/// Opaque identifier of engine-side state.
///
/// Zero is never a valid handle; engines use it to signal "no object".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawHandle(u64);

impl RawHandle {
    pub const NULL: RawHandle = RawHandle(0);

    pub const fn from_u64(raw: u64) -> Self {
        RawHandle(raw)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for RawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Native entry points for table factory construction.
///
/// Parameter order is part of the contract: it mirrors the engine's exported
/// C functions one to one and must be re-derived from the engine's option
/// structs whenever the engine version changes.
pub trait NativeTableApi: Send + Sync {
    #[allow(clippy::too_many_arguments)]
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
    ) -> Result<RawHandle>;

    fn new_plain_table_factory(
        &self,
        key_size: i32,
        bloom_bits_per_key: i32,
        hash_table_ratio: f64,
        index_sparseness: i32,
    ) -> Result<RawHandle>;

    /// Name the engine reports for the factory behind `handle`
    fn table_factory_name(&self, handle: RawHandle) -> Result<String>;

    /// Releases the factory. Called at most once per handle.
    fn dispose_table_factory(&self, handle: RawHandle);
}
