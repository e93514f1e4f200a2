//! Write-through query cache persisted to a single JSON file.
//!
//! Every resolved `(source, query, limit)` request is stored in memory and the
//! whole store is written back to disk immediately after each insert.
//!
//! # File Format
//!
//! ```text
//! {
//!   "entries": [
//!     { "key": { "source": "arxiv", "query": "black hole", "limit": 3 },
//!       "records": [ { "title": ..., "authors": [...], "year": ..., "url": ..., "source": "arxiv" } ] }
//!   ]
//! }
//! ```
//!
//! Writes go to a temporary file in the same directory which is then renamed
//! over the cache file, so a crash mid-write leaves the previous file intact.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::models::{ArticleRecord, CacheKey};

/// Errors raised while persisting the cache
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CacheError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// One persisted entry
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    key: CacheKey,
    records: Vec<ArticleRecord>,
}

/// On-disk document
#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheFile {
    #[serde(default)]
    entries: Vec<CacheEntry>,
}

/// Query cache mapping [`CacheKey`] to the records it resolved to
#[derive(Debug, Clone, Default)]
pub struct QueryCache {
    /// Backing file; `None` keeps the cache in memory only
    path: Option<PathBuf>,

    entries: BTreeMap<CacheKey, Vec<ArticleRecord>>,
}

impl QueryCache {
    /// Load the cache stored at `path`
    ///
    /// A missing file yields an empty cache. An unreadable or corrupt file is
    /// logged and also yields an empty cache; it is overwritten on the next
    /// insert.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match Self::read_file(&path) {
            Ok(Some(file)) => {
                let entries: BTreeMap<_, _> = file
                    .entries
                    .into_iter()
                    .map(|entry| (entry.key, entry.records))
                    .collect();
                tracing::info!(
                    "Loaded {} cached queries from {}",
                    entries.len(),
                    path.display()
                );
                entries
            }
            Ok(None) => {
                tracing::debug!("No cache file at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Err(e) => {
                tracing::warn!(
                    "Discarding unreadable cache file {}: {}",
                    path.display(),
                    e
                );
                BTreeMap::new()
            }
        };

        Self {
            path: Some(path),
            entries,
        }
    }

    /// Create a cache that is never written to disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    fn read_file(path: &Path) -> Result<Option<CacheFile>, CacheError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::io(path, e)),
        };

        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Look up the records stored for `key`
    pub fn get(&self, key: &CacheKey) -> Option<&[ArticleRecord]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Check if `key` is cached
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or overwrite `key`, then persist the whole store
    ///
    /// The in-memory entry is kept even when persisting fails.
    pub fn put(&mut self, key: CacheKey, records: Vec<ArticleRecord>) -> Result<(), CacheError> {
        tracing::debug!("Caching {} records for {}", records.len(), key);
        self.entries.insert(key, records);
        self.save()
    }

    /// Remove every entry and persist the empty store
    pub fn clear(&mut self) -> Result<(), CacheError> {
        self.entries.clear();
        self.save()?;
        tracing::info!("Cache cleared");
        Ok(())
    }

    /// Write the store to its backing file
    pub fn save(&self) -> Result<(), CacheError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let file = CacheFile {
            entries: self
                .entries
                .iter()
                .map(|(key, records)| CacheEntry {
                    key: key.clone(),
                    records: records.clone(),
                })
                .collect(),
        };
        let content = serde_json::to_vec_pretty(&file)?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| CacheError::io(dir, e))?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| CacheError::io(dir, e))?;
        tmp.write_all(&content)
            .map_err(|e| CacheError::io(tmp.path(), e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| CacheError::io(tmp.path(), e))?;
        tmp.persist(path).map_err(|e| CacheError::io(path, e.error))?;

        Ok(())
    }

    /// Backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of cached queries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let file_size_bytes = self
            .path
            .as_ref()
            .and_then(|p| fs::metadata(p).ok())
            .map(|m| m.len());

        CacheStats {
            path: self.path.clone(),
            entry_count: self.entries.len(),
            record_count: self.entries.values().map(Vec::len).sum(),
            empty_entry_count: self.entries.values().filter(|r| r.is_empty()).count(),
            file_size_bytes,
        }
    }
}

/// Statistics about the cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Backing file path (`None` for an in-memory cache)
    pub path: Option<PathBuf>,

    /// Number of cached queries
    pub entry_count: usize,

    /// Total records across all queries
    pub record_count: usize,

    /// Queries cached with no results
    pub empty_entry_count: usize,

    /// Size of the cache file, when it exists
    pub file_size_bytes: Option<u64>,
}
