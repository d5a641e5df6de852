use std::sync::Arc;

use crate::native::{NativeTableApi, TableFactoryHandle};
use crate::util::Result;

/// A table format that can be turned into an engine-side table factory.
///
/// Each call allocates a fresh engine object; the returned handle is owned
/// by the caller and shares nothing with earlier handles built from the
/// same configuration.
pub trait TableFormatConfig {
    fn new_table_factory_handle(&self, api: &Arc<dyn NativeTableApi>)
    -> Result<TableFactoryHandle>;
}
