use std::sync::Arc;

use crate::engine::BLOCK_BASED_TABLE_NAME;
use crate::native::{NativeTableApi, TableFactoryHandle};
use crate::table::TableFormatConfig;
use crate::util::Result;

/// Engine-wide options that own the table factory.
///
/// Setting a table format allocates a fresh engine factory and takes
/// ownership of it; a previously installed factory is released at that
/// point. Without an explicit format the engine uses its block-based
/// default.
///
/// # Example
///
/// ```ignore
/// use rucksdb_native::{BlockBasedTableConfig, InProcessEngine, Options};
///
/// let mut options = Options::new(InProcessEngine::shared());
/// options.set_table_format_config(
///     &BlockBasedTableConfig::builder().set_no_block_cache(true).build(),
/// )?;
/// assert_eq!(options.table_factory_name()?, "BlockBasedTable");
/// ```
pub struct Options {
    api: Arc<dyn NativeTableApi>,
    table_factory: Option<TableFactoryHandle>,
}

impl Options {
    pub fn new(api: Arc<dyn NativeTableApi>) -> Self {
        Options {
            api,
            table_factory: None,
        }
    }

    pub fn set_table_format_config(&mut self, config: &dyn TableFormatConfig) -> Result<&mut Self> {
        let handle = config.new_table_factory_handle(&self.api)?;
        self.table_factory = Some(handle);
        Ok(self)
    }

    pub fn table_factory(&self) -> Option<&TableFactoryHandle> {
        self.table_factory.as_ref()
    }

    pub fn table_factory_name(&self) -> Result<String> {
        match &self.table_factory {
            Some(handle) => handle.name(),
            None => Ok(BLOCK_BASED_TABLE_NAME.to_string()),
        }
    }
}
