#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use qvis_core::{CacheKey, DocumentId, DocumentSet, DocumentSetCache, Error, Proximity, RetrievalAdapter, Term};

pub fn docs(ids: &[&str]) -> DocumentSet {
    ids.iter().map(|s| s.to_string()).collect()
}

pub fn relevant(ids: &[&str]) -> HashSet<DocumentId> {
    ids.iter().map(|s| s.to_string()).collect()
}

/// Backend answering from a fixed map and counting every call.
#[derive(Default)]
pub struct MapRetriever {
    results: HashMap<String, DocumentSet>,
    failing: HashSet<String>,
    delay: Option<Duration>,
    term_calls: AtomicUsize,
    proximity_calls: AtomicUsize,
}

impl MapRetriever {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, query: &str, ids: &[&str]) -> Self {
        self.results.insert(query.to_string(), docs(ids));
        self
    }

    pub fn with_set(mut self, query: &str, set: DocumentSet) -> Self {
        self.results.insert(query.to_string(), set);
        self
    }

    pub fn failing_on(mut self, query: &str) -> Self {
        self.failing.insert(query.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.term_calls.load(Ordering::SeqCst) + self.proximity_calls.load(Ordering::SeqCst)
    }

    pub fn proximity_calls(&self) -> usize {
        self.proximity_calls.load(Ordering::SeqCst)
    }

    fn answer(&self, query: &str) -> anyhow::Result<DocumentSet> {
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        if self.failing.contains(query) {
            anyhow::bail!("backend timed out for '{}'", query);
        }
        Ok(self.results.get(query).cloned().unwrap_or_default())
    }
}

impl RetrievalAdapter for MapRetriever {
    fn retrieve_term(&self, term: &Term) -> anyhow::Result<DocumentSet> {
        self.term_calls.fetch_add(1, Ordering::SeqCst);
        self.answer(&term.query_string)
    }

    fn retrieve_proximity(&self, proximity: &Proximity) -> anyhow::Result<DocumentSet> {
        self.proximity_calls.fetch_add(1, Ordering::SeqCst);
        self.answer(&proximity.query_string)
    }
}

/// Cache that never remembers anything.
pub struct NullCache;

impl DocumentSetCache for NullCache {
    fn get(&self, _key: &CacheKey) -> qvis_core::Result<Option<DocumentSet>> {
        Ok(None)
    }

    fn set(&self, _key: &CacheKey, _documents: &DocumentSet) -> qvis_core::Result<()> {
        Ok(())
    }
}

/// Cache whose storage is unavailable.
pub struct BrokenCache;

impl DocumentSetCache for BrokenCache {
    fn get(&self, _key: &CacheKey) -> qvis_core::Result<Option<DocumentSet>> {
        Err(Error::Cache("storage unavailable".into()))
    }

    fn set(&self, _key: &CacheKey, _documents: &DocumentSet) -> qvis_core::Result<()> {
        Err(Error::Cache("storage unavailable".into()))
    }
}
