pub mod block_based_table_config;
pub mod plain_table_config;
pub mod table_format_config;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use block_based_table_config::{
    BlockBasedTableConfig, BlockBasedTableConfigBuilder, UNSET_NUM_SHARD_BITS,
};
pub use plain_table_config::{PlainTableConfig, PlainTableConfigBuilder, VARIABLE_LENGTH};
pub use table_format_config::TableFormatConfig;

use crate::native::{NativeTableApi, TableFactoryHandle};
use crate::util::{Result, Status};

/// Table format selection as stored in an options file.
///
/// ```json
/// { "format": "block_based", "block_size": 16384 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum TableFormatOptions {
    BlockBased(BlockBasedTableConfig),
    Plain(PlainTableConfig),
}

impl Default for TableFormatOptions {
    fn default() -> Self {
        TableFormatOptions::BlockBased(BlockBasedTableConfig::default())
    }
}

impl TableFormatOptions {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Status::io_error_at(path, e))?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| Status::io_error_at(path, e))
    }
}

impl TableFormatConfig for TableFormatOptions {
    fn new_table_factory_handle(
        &self,
        api: &Arc<dyn NativeTableApi>,
    ) -> Result<TableFactoryHandle> {
        match self {
            TableFormatOptions::BlockBased(config) => config.new_table_factory_handle(api),
            TableFormatOptions::Plain(config) => config.new_table_factory_handle(api),
        }
    }
}
