use dashmap::DashMap;

use qvis_core::error::Result;
use qvis_core::traits::DocumentSetCache;
use qvis_core::types::DocumentSet;
use qvis_core::CacheKey;

/// Process-local cache. Same contract as the file cache, without persistence.
#[derive(Default)]
pub struct MemoryDocumentCache {
    entries: DashMap<CacheKey, DocumentSet>,
}

impl MemoryDocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DocumentSetCache for MemoryDocumentCache {
    fn get(&self, key: &CacheKey) -> Result<Option<DocumentSet>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn set(&self, key: &CacheKey, documents: &DocumentSet) -> Result<()> {
        self.entries.insert(*key, documents.clone());
        Ok(())
    }
}
