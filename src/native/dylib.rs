use std::ffi::{CStr, c_char, c_void};
use std::ptr;
use std::sync::Arc;

use super::api::{NativeTableApi, RawHandle};
use crate::loader::LoadedLibrary;
use crate::util::{Result, Status};

pub const SYM_NEW_BLOCK_BASED_TABLE_FACTORY: &str = "rucksdb_block_based_table_factory_new";
pub const SYM_NEW_PLAIN_TABLE_FACTORY: &str = "rucksdb_plain_table_factory_new";
pub const SYM_TABLE_FACTORY_NAME: &str = "rucksdb_table_factory_name";
pub const SYM_TABLE_FACTORY_DESTROY: &str = "rucksdb_table_factory_destroy";
pub const SYM_FREE: &str = "rucksdb_free";

// Booleans cross the boundary as unsigned chars; failures come back as a
// null object plus a malloc'd message in the trailing out parameter.
type NewBlockBasedFn = unsafe extern "C" fn(
    u8,
    i64,
    i32,
    i64,
    i32,
    i32,
    u8,
    i32,
    u8,
    u8,
    i64,
    i32,
    *mut *mut c_char,
) -> *mut c_void;
type NewPlainFn = unsafe extern "C" fn(i32, i32, f64, i32, *mut *mut c_char) -> *mut c_void;
type NameFn = unsafe extern "C" fn(*mut c_void) -> *const c_char;
type DestroyFn = unsafe extern "C" fn(*mut c_void);
type FreeFn = unsafe extern "C" fn(*mut c_void);

/// [`NativeTableApi`] backed by the engine's exported C functions.
pub struct DylibTableApi {
    new_block_based: NewBlockBasedFn,
    new_plain: NewPlainFn,
    name: NameFn,
    destroy: DestroyFn,
    free: FreeFn,
    // Keeps the function pointers above valid.
    _library: Arc<LoadedLibrary>,
}

impl DylibTableApi {
    /// Resolves every entry point up front; a library missing any of them
    /// is rejected with `NotFound`.
    pub fn new(library: Arc<LoadedLibrary>) -> Result<Self> {
        unsafe {
            Ok(DylibTableApi {
                new_block_based: resolve(&library, SYM_NEW_BLOCK_BASED_TABLE_FACTORY)?,
                new_plain: resolve(&library, SYM_NEW_PLAIN_TABLE_FACTORY)?,
                name: resolve(&library, SYM_TABLE_FACTORY_NAME)?,
                destroy: resolve(&library, SYM_TABLE_FACTORY_DESTROY)?,
                free: resolve(&library, SYM_FREE)?,
                _library: library,
            })
        }
    }

    fn take_result(&self, object: *mut c_void, errptr: *mut c_char) -> Result<RawHandle> {
        if !errptr.is_null() {
            let msg = unsafe { CStr::from_ptr(errptr) }.to_string_lossy().into_owned();
            unsafe { (self.free)(errptr.cast()) };
            if !object.is_null() {
                unsafe { (self.destroy)(object) };
            }
            return Err(Status::invalid_argument(msg));
        }
        if object.is_null() {
            return Err(Status::invalid_argument("engine returned no table factory"));
        }
        Ok(RawHandle::from_u64(object as usize as u64))
    }
}

/// # Safety
///
/// `T` must be the exact function pointer type of the exported symbol.
unsafe fn resolve<T: Copy>(library: &LoadedLibrary, name: &str) -> Result<T> {
    let symbol = unsafe { library.get::<T>(name) }?;
    Ok(*symbol)
}

fn as_ptr(handle: RawHandle) -> *mut c_void {
    handle.as_u64() as usize as *mut c_void
}

impl NativeTableApi for DylibTableApi {
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
        let mut errptr: *mut c_char = ptr::null_mut();
        let object = unsafe {
            (self.new_block_based)(
                no_block_cache as u8,
                block_cache_size,
                block_cache_num_shard_bits,
                block_size,
                block_size_deviation,
                block_restart_interval,
                whole_key_filtering as u8,
                bits_per_key,
                cache_index_and_filter_blocks as u8,
                hash_index_allow_collision as u8,
                block_cache_compressed_size,
                block_cache_compressed_num_shard_bits,
                &mut errptr,
            )
        };
        self.take_result(object, errptr)
    }

    fn new_plain_table_factory(
        &self,
        key_size: i32,
        bloom_bits_per_key: i32,
        hash_table_ratio: f64,
        index_sparseness: i32,
    ) -> Result<RawHandle> {
        let mut errptr: *mut c_char = ptr::null_mut();
        let object = unsafe {
            (self.new_plain)(
                key_size,
                bloom_bits_per_key,
                hash_table_ratio,
                index_sparseness,
                &mut errptr,
            )
        };
        self.take_result(object, errptr)
    }

    fn table_factory_name(&self, handle: RawHandle) -> Result<String> {
        if handle.is_null() {
            return Err(Status::invalid_argument("null table factory handle"));
        }
        let name = unsafe { (self.name)(as_ptr(handle)) };
        if name.is_null() {
            return Err(Status::not_found(format!("table factory {handle} has no name")));
        }
        Ok(unsafe { CStr::from_ptr(name) }.to_string_lossy().into_owned())
    }

    fn dispose_table_factory(&self, handle: RawHandle) {
        if !handle.is_null() {
            unsafe { (self.destroy)(as_ptr(handle)) };
        }
    }
}
