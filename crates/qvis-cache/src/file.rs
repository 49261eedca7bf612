use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use qvis_core::error::{Error, Result};
use qvis_core::traits::DocumentSetCache;
use qvis_core::types::{DocumentId, DocumentSet};
use qvis_core::CacheKey;

/// On-disk form of one entry. Documents are written in ascending order.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    key: String,
    documents: Vec<DocumentId>,
}

/// Directory-backed cache: one JSON file per key under
/// `<root>/<first two hex chars>/<hex>.json`.
///
/// Entries are written to a temporary file in the target directory and
/// renamed into place, so readers only ever see complete entries and writers
/// of different keys never touch the same file.
pub struct FileDocumentCache {
    root: PathBuf,
}

impl FileDocumentCache {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| cache_err("create", &root, e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> Result<usize> {
        let mut count = 0;
        for entry in walkdir::WalkDir::new(&self.root) {
            let entry = entry.map_err(|e| cache_err("scan", &self.root, e))?;
            if entry.file_type().is_file() && entry.path().extension().is_some_and(|ext| ext == "json") {
                count += 1;
            }
        }
        Ok(count)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn entry_path(&self, key: &CacheKey) -> PathBuf {
        let hex = key.to_hex();
        self.root.join(&hex[..2]).join(format!("{}.json", hex))
    }

    fn write_entry(&self, path: &Path, entry: &CacheEntry) -> Result<()> {
        let dir = path.parent().unwrap_or(&self.root);
        fs::create_dir_all(dir).map_err(|e| cache_err("create", dir, e))?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| cache_err("create temp file in", dir, e))?;
        let bytes = serde_json::to_vec(entry).map_err(|e| cache_err("encode", path, e))?;
        tmp.write_all(&bytes).map_err(|e| cache_err("write", tmp.path(), e))?;
        tmp.as_file().sync_all().map_err(|e| cache_err("sync", tmp.path(), e))?;
        tmp.persist(path).map_err(|e| cache_err("persist", path, e.error))?;
        Ok(())
    }
}

impl DocumentSetCache for FileDocumentCache {
    fn get(&self, key: &CacheKey) -> Result<Option<DocumentSet>> {
        let path = self.entry_path(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(%key, "cache miss");
                return Ok(None);
            }
            Err(e) => return Err(cache_err("read", &path, e)),
        };
        let entry: CacheEntry = serde_json::from_slice(&bytes).map_err(|e| cache_err("decode", &path, e))?;
        if entry.key != key.to_hex() {
            return Err(cache_err("verify", &path, format!("entry records key {}", entry.key)));
        }
        debug!(%key, documents = entry.documents.len(), "cache hit");
        Ok(Some(entry.documents.into_iter().collect()))
    }

    fn set(&self, key: &CacheKey, documents: &DocumentSet) -> Result<()> {
        let path = self.entry_path(key);
        match self.get(key)? {
            Some(existing) if &existing == documents => return Ok(()),
            Some(existing) => warn!(%key, old = existing.len(), new = documents.len(), "replacing cache entry with different content"),
            None => {}
        }
        let entry = CacheEntry { key: key.to_hex(), documents: documents.iter().cloned().collect() };
        self.write_entry(&path, &entry)?;
        debug!(%key, documents = documents.len(), "cache write");
        Ok(())
    }
}

fn cache_err(action: &str, path: &Path, e: impl Display) -> Error {
    Error::Cache(format!("failed to {} {}: {}", action, path.display(), e))
}
