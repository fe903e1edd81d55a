//! Repository Implementations
//!
//! Domain層のRepositoryトレイトの実装

pub mod json_document_store;
pub mod local_object_storage;
pub mod memory_page_cache;

pub use json_document_store::JsonDocumentStore;
pub use local_object_storage::LocalObjectStorage;
pub use memory_page_cache::MemoryPageCache;
