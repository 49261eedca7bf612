//! qvis-cache
//!
//! Document-set caches keyed by canonical query keys. `FileDocumentCache`
//! persists entries across restarts; `MemoryDocumentCache` keeps them for the
//! lifetime of the process. Neither ever evicts.
pub mod file;
pub mod memory;

pub use file::FileDocumentCache;
pub use memory::MemoryDocumentCache;
