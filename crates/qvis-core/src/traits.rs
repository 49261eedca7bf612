use std::sync::Arc;

use crate::error::Result;
use crate::key::CacheKey;
use crate::types::{DocumentSet, Proximity, Term};

/// Narrow interface to a (possibly slow) retrieval backend.
///
/// Implementations must tolerate concurrent calls from independent
/// evaluations. Ranking and pagination are not part of the contract: every
/// matching document is returned.
pub trait RetrievalAdapter: Send + Sync {
    fn retrieve_term(&self, term: &Term) -> anyhow::Result<DocumentSet>;
    fn retrieve_proximity(&self, proximity: &Proximity) -> anyhow::Result<DocumentSet>;
}

/// Store of document sets keyed by canonical query keys. Entries are never
/// evicted.
///
/// `set` is idempotent for equal content. A `set` with different content
/// replaces the stored set (last write wins). Concurrent `set`s on different
/// keys must not interfere, and `get` must never observe a partially written
/// entry.
pub trait DocumentSetCache: Send + Sync {
    fn get(&self, key: &CacheKey) -> Result<Option<DocumentSet>>;
    fn set(&self, key: &CacheKey, documents: &DocumentSet) -> Result<()>;
}

impl<T: RetrievalAdapter + ?Sized> RetrievalAdapter for Arc<T> {
    fn retrieve_term(&self, term: &Term) -> anyhow::Result<DocumentSet> {
        (**self).retrieve_term(term)
    }

    fn retrieve_proximity(&self, proximity: &Proximity) -> anyhow::Result<DocumentSet> {
        (**self).retrieve_proximity(proximity)
    }
}

impl<T: DocumentSetCache + ?Sized> DocumentSetCache for Arc<T> {
    fn get(&self, key: &CacheKey) -> Result<Option<DocumentSet>> {
        (**self).get(key)
    }

    fn set(&self, key: &CacheKey, documents: &DocumentSet) -> Result<()> {
        (**self).set(key, documents)
    }
}
