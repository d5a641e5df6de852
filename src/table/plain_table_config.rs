use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::table_format_config::TableFormatConfig;
use crate::native::{NativeTableApi, TableFactoryHandle};
use crate::util::Result;

/// Key size value meaning keys have variable length
pub const VARIABLE_LENGTH: i32 = 0;

/// Options for the plain table format, an in-memory friendly layout meant
/// for mmap-ed files and prefix-hash lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlainTableConfig {
    key_size: i32,
    bloom_bits_per_key: i32,
    hash_table_ratio: f64,
    index_sparseness: i32,
}

impl Default for PlainTableConfig {
    fn default() -> Self {
        PlainTableConfig {
            key_size: VARIABLE_LENGTH,
            bloom_bits_per_key: 10,
            hash_table_ratio: 0.75,
            index_sparseness: 16,
        }
    }
}

impl PlainTableConfig {
    pub fn builder() -> PlainTableConfigBuilder {
        PlainTableConfigBuilder::default()
    }

    /// Fixed user key length, or [`VARIABLE_LENGTH`]
    pub fn key_size(&self) -> i32 {
        self.key_size
    }

    pub fn bloom_bits_per_key(&self) -> i32 {
        self.bloom_bits_per_key
    }

    /// Desired utilization of the prefix hash table
    pub fn hash_table_ratio(&self) -> f64 {
        self.hash_table_ratio
    }

    /// Keys per index record inside a hash bucket
    pub fn index_sparseness(&self) -> i32 {
        self.index_sparseness
    }
}

impl TableFormatConfig for PlainTableConfig {
    fn new_table_factory_handle(
        &self,
        api: &Arc<dyn NativeTableApi>,
    ) -> Result<TableFactoryHandle> {
        let raw = api.new_plain_table_factory(
            self.key_size,
            self.bloom_bits_per_key,
            self.hash_table_ratio,
            self.index_sparseness,
        )?;
        debug!(handle = %raw, key_size = self.key_size, "created plain table factory");

        // SAFETY: `raw` was allocated by `api` just now and nothing else owns it.
        Ok(unsafe { TableFactoryHandle::from_raw(raw, Arc::clone(api)) })
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlainTableConfigBuilder {
    config: PlainTableConfig,
}

impl PlainTableConfigBuilder {
    pub fn key_size(&self) -> i32 {
        self.config.key_size
    }

    pub fn bloom_bits_per_key(&self) -> i32 {
        self.config.bloom_bits_per_key
    }

    pub fn hash_table_ratio(&self) -> f64 {
        self.config.hash_table_ratio
    }

    pub fn index_sparseness(&self) -> i32 {
        self.config.index_sparseness
    }

    pub fn set_key_size(&mut self, key_size: i32) -> &mut Self {
        self.config.key_size = key_size;
        self
    }

    pub fn set_bloom_bits_per_key(&mut self, bits: i32) -> &mut Self {
        self.config.bloom_bits_per_key = bits;
        self
    }

    pub fn set_hash_table_ratio(&mut self, ratio: f64) -> &mut Self {
        self.config.hash_table_ratio = ratio;
        self
    }

    pub fn set_index_sparseness(&mut self, sparseness: i32) -> &mut Self {
        self.config.index_sparseness = sparseness;
        self
    }

    pub fn build(&self) -> PlainTableConfig {
        self.config.clone()
    }
}
