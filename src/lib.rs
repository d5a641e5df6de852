pub mod cache;
pub mod engine;
pub mod filter;
pub mod loader;
pub mod native;
pub mod options;
pub mod table;
pub mod util;

pub use engine::InProcessEngine;
pub use filter::{BloomFilterPolicy, FilterPolicy};
pub use loader::{
    EmbeddedResources, LoadedLibrary, LoaderOptions, NativeLibraryLoader, ResourceProvider,
    ResourceSearchPath,
};
pub use native::{DylibTableApi, NativeTableApi, RawHandle, TableFactoryHandle};
pub use options::Options;
pub use table::{
    BlockBasedTableConfig, BlockBasedTableConfigBuilder, PlainTableConfig, TableFormatConfig,
    TableFormatOptions,
};
pub use util::{Result, Status};
