//! Storage implementations for different backends

#[cfg(feature = "file-store")]
pub mod file;
pub mod in_memory;

#[cfg(feature = "file-store")]
pub use file::JsonFileStore;
pub use in_memory::InMemoryStore;
