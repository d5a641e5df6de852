//! Boundary between the Rust configuration types and the engine.
//!
//! A configuration never talks to the engine directly: it calls one of the
//! positional entry points on [`NativeTableApi`] and wraps the returned
//! [`RawHandle`] in an owning [`TableFactoryHandle`]. Two implementations
//! exist: [`DylibTableApi`] resolves the entry points from a loaded engine
//! library, and [`crate::engine::InProcessEngine`] implements them in Rust.
pub mod api;
pub mod dylib;
pub mod handle;

pub use api::{NativeTableApi, RawHandle};
pub use dylib::DylibTableApi;
pub use handle::TableFactoryHandle;
