use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::api::{NativeTableApi, RawHandle};
use crate::util::Result;

/// Owning handle to an engine-side table factory.
///
/// Move-only: there is no `Clone`, and the factory is released exactly once,
/// either on drop or by whoever takes it over through [`into_raw`].
///
/// [`into_raw`]: TableFactoryHandle::into_raw
pub struct TableFactoryHandle {
    raw: RawHandle,
    api: Arc<dyn NativeTableApi>,
    owned: bool,
}

impl TableFactoryHandle {
    /// Wraps a freshly allocated handle.
    ///
    /// # Safety
    ///
    /// `raw` must have been returned by `api` and must not be owned by any
    /// other `TableFactoryHandle` or native consumer.
    pub unsafe fn from_raw(raw: RawHandle, api: Arc<dyn NativeTableApi>) -> Self {
        debug_assert!(!raw.is_null());
        TableFactoryHandle {
            raw,
            api,
            owned: true,
        }
    }

    pub fn raw(&self) -> RawHandle {
        self.raw
    }

    pub fn api(&self) -> &Arc<dyn NativeTableApi> {
        &self.api
    }

    pub fn name(&self) -> Result<String> {
        self.api.table_factory_name(self.raw)
    }

    /// Surrenders ownership to a native consumer; the factory is no longer
    /// released by this side.
    pub fn into_raw(mut self) -> RawHandle {
        self.owned = false;
        self.raw
    }
}

impl Drop for TableFactoryHandle {
    fn drop(&mut self) {
        if !self.owned {
            return;
        }
        debug!(handle = %self.raw, "disposing table factory");
        self.api.dispose_table_factory(self.raw);
    }
}

impl fmt::Debug for TableFactoryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableFactoryHandle")
            .field("raw", &self.raw)
            .finish()
    }
}
