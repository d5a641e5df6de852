use std::collections::HashMap;
use std::hash::{BuildHasher, Hash, RandomState};

use parking_lot::Mutex;

/// Shard bits used when the caller leaves them unset
pub const DEFAULT_NUM_SHARD_BITS: u32 = 4;

/// Upper bound (exclusive) accepted for shard bits
pub const MAX_NUM_SHARD_BITS: u32 = 20;

/// Byte-capacity LRU cache split into `2^num_shard_bits` independent shards.
///
/// Every entry carries a charge (usually the decoded block length). A shard
/// evicts its least recently used entries until its usage fits within its
/// share of the capacity. Shards are locked independently, so readers of
/// different blocks rarely contend.
pub struct ShardedLRUCache<K: Clone + Eq + Hash, V: Clone> {
    capacity: usize,
    num_shard_bits: u32,
    shards: Vec<Mutex<LRUShard<K, V>>>,
    hasher: RandomState,
}

struct LRUShard<K, V> {
    capacity: usize,
    usage: usize,
    map: HashMap<K, Entry<V>>,
    access_order: u64,
    hits: u64,
    misses: u64,
}

struct Entry<V> {
    value: V,
    charge: usize,
    order: u64,
}

impl<K: Clone + Eq + Hash, V: Clone> LRUShard<K, V> {
    fn new(capacity: usize) -> Self {
        LRUShard {
            capacity,
            usage: 0,
            map: HashMap::new(),
            access_order: 0,
            hits: 0,
            misses: 0,
        }
    }

    fn get(&mut self, key: &K) -> Option<V> {
        self.access_order += 1;
        let order = self.access_order;
        match self.map.get_mut(key) {
            Some(entry) => {
                entry.order = order;
                self.hits += 1;
                Some(entry.value.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    fn insert(&mut self, key: K, value: V, charge: usize) {
        self.access_order += 1;
        let order = self.access_order;

        if let Some(old) = self.map.insert(key, Entry { value, charge, order }) {
            self.usage -= old.charge;
        }
        self.usage += charge;

        while self.usage > self.capacity {
            let Some(lru_key) = self
                .map
                .iter()
                .min_by_key(|(_, e)| e.order)
                .map(|(k, _)| k.clone())
            else {
                break;
            };
            if let Some(evicted) = self.map.remove(&lru_key) {
                self.usage -= evicted.charge;
            }
        }
    }

    fn clear(&mut self) {
        self.map.clear();
        self.usage = 0;
        self.access_order = 0;
    }
}

impl<K: Clone + Eq + Hash, V: Clone> ShardedLRUCache<K, V> {
    /// `num_shard_bits` must already be resolved; the engine maps the unset
    /// sentinel to [`DEFAULT_NUM_SHARD_BITS`] before calling this.
    pub fn new(capacity: usize, num_shard_bits: u32) -> Self {
        debug_assert!(num_shard_bits < MAX_NUM_SHARD_BITS);
        let num_shards = 1usize << num_shard_bits;
        let per_shard = capacity.div_ceil(num_shards);
        let shards = (0..num_shards)
            .map(|_| Mutex::new(LRUShard::new(per_shard)))
            .collect();

        ShardedLRUCache {
            capacity,
            num_shard_bits,
            shards,
            hasher: RandomState::new(),
        }
    }

    fn shard(&self, key: &K) -> &Mutex<LRUShard<K, V>> {
        if self.num_shard_bits == 0 {
            return &self.shards[0];
        }
        let hash = self.hasher.hash_one(key);
        let idx = (hash >> (64 - self.num_shard_bits)) as usize;
        &self.shards[idx]
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.shard(key).lock().get(key)
    }

    pub fn insert(&self, key: K, value: V, charge: usize) {
        self.shard(&key).lock().insert(key, value, charge);
    }

    pub fn clear(&self) {
        for shard in &self.shards {
            shard.lock().clear();
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn num_shard_bits(&self) -> u32 {
        self.num_shard_bits
    }

    pub fn num_shards(&self) -> usize {
        self.shards.len()
    }

    /// Total charge currently held
    pub fn usage(&self) -> usize {
        self.shards.iter().map(|s| s.lock().usage).sum()
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats {
            hits: 0,
            misses: 0,
            entries: 0,
            usage: 0,
            capacity: self.capacity,
        };
        for shard in &self.shards {
            let shard = shard.lock();
            stats.hits += shard.hits;
            stats.misses += shard.misses;
            stats.entries += shard.map.len();
            stats.usage += shard.usage;
        }
        stats
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub usage: usize,
    pub capacity: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
