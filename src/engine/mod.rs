//! Pure Rust implementation of the engine's table factory entry points.
//!
//! Handles are registry ids handed out from a monotonically increasing
//! counter, so two allocations never alias and a disposed id is never
//! reissued.
pub mod table_factory;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::debug;

pub use table_factory::{
    BLOCK_BASED_TABLE_NAME, BlockBasedTableFactory, BlockCache, PLAIN_TABLE_NAME,
    PlainTableFactory, TableFactory,
};
use table_factory::{BlockBasedTableArgs, PlainTableArgs};

use crate::native::{NativeTableApi, RawHandle};
use crate::util::{Result, Status};

#[derive(Debug, Default)]
struct EngineCounters {
    created: AtomicU64,
    disposed: AtomicU64,
    failed: AtomicU64,
}

/// Snapshot of the engine's handle bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineStats {
    pub live: usize,
    pub created: u64,
    pub disposed: u64,
    pub failed: u64,
}

pub struct InProcessEngine {
    factories: Mutex<HashMap<u64, Arc<TableFactory>>>,
    next_id: AtomicU64,
    counters: EngineCounters,
}

impl Default for InProcessEngine {
    fn default() -> Self {
        InProcessEngine {
            factories: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            counters: EngineCounters::default(),
        }
    }
}

impl InProcessEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience for call sites that want the trait object directly
    pub fn shared() -> Arc<dyn NativeTableApi> {
        Arc::new(Self::new())
    }

    fn register(&self, factory: Result<TableFactory>) -> Result<RawHandle> {
        let factory = factory.inspect_err(|_| {
            self.counters.failed.fetch_add(1, Ordering::Relaxed);
        })?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let name = factory.name();
        self.factories.lock().insert(id, Arc::new(factory));
        self.counters.created.fetch_add(1, Ordering::Relaxed);

        let handle = RawHandle::from_u64(id);
        debug!(%handle, name, "allocated table factory");
        Ok(handle)
    }

    /// Looks up the factory behind a live handle
    pub fn factory(&self, handle: RawHandle) -> Option<Arc<TableFactory>> {
        self.factories.lock().get(&handle.as_u64()).cloned()
    }

    pub fn is_live(&self, handle: RawHandle) -> bool {
        self.factories.lock().contains_key(&handle.as_u64())
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            live: self.factories.lock().len(),
            created: self.counters.created.load(Ordering::Relaxed),
            disposed: self.counters.disposed.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }
}

impl NativeTableApi for InProcessEngine {
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
        let args = BlockBasedTableArgs {
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
        };
        self.register(BlockBasedTableFactory::new(args).map(TableFactory::BlockBased))
    }

    fn new_plain_table_factory(
        &self,
        key_size: i32,
        bloom_bits_per_key: i32,
        hash_table_ratio: f64,
        index_sparseness: i32,
    ) -> Result<RawHandle> {
        let args = PlainTableArgs {
            key_size,
            bloom_bits_per_key,
            hash_table_ratio,
            index_sparseness,
        };
        self.register(PlainTableFactory::new(args).map(TableFactory::Plain))
    }

    fn table_factory_name(&self, handle: RawHandle) -> Result<String> {
        self.factory(handle)
            .map(|f| f.name().to_string())
            .ok_or_else(|| Status::not_found(format!("no table factory for handle {handle}")))
    }

    fn dispose_table_factory(&self, handle: RawHandle) {
        if self.factories.lock().remove(&handle.as_u64()).is_some() {
            self.counters.disposed.fetch_add(1, Ordering::Relaxed);
            debug!(%handle, "released table factory");
        }
    }
}
