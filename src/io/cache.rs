//! Load-once cache of normalized sheets.
//!
//! Entries are keyed by source identity (canonical path, modification time,
//! length) plus the normalization parameters, so an edited file is reloaded on
//! the next request while unchanged files are reused across filter changes.
//! `invalidate` and `clear` force a reload explicitly.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tracing::{debug, trace};

use crate::domain::{MetricName, MetricSeries};
use crate::error::SourceFormatError;
use crate::io::sheet::{SheetSource, load_sheet_csv};
use crate::reshape::normalize;

/// What makes two loads of the same path interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceIdentity {
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
    pub len: u64,
}

impl SourceIdentity {
    pub fn probe(source: &SheetSource) -> Result<Self, SourceFormatError> {
        let unreadable = |e: std::io::Error| SourceFormatError::Unreadable {
            sheet: source.label.clone(),
            path: source.path.clone(),
            message: e.to_string(),
        };
        let meta = fs::metadata(&source.path).map_err(unreadable)?;
        let path = fs::canonicalize(&source.path).map_err(unreadable)?;
        Ok(Self {
            path,
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    identity: SourceIdentity,
    skip_rows: Vec<usize>,
    id_column: String,
    metric: MetricName,
}

#[derive(Debug, Default)]
pub struct SourceCache {
    entries: HashMap<CacheKey, Arc<MetricSeries>>,
    hits: usize,
    misses: usize,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the normalized series for `source`, loading it on a miss.
    pub fn load(
        &mut self,
        source: &SheetSource,
        id_column: &str,
        metric: MetricName,
    ) -> Result<Arc<MetricSeries>, SourceFormatError> {
        let key = CacheKey {
            identity: SourceIdentity::probe(source)?,
            skip_rows: source.skip_rows.clone(),
            id_column: id_column.to_string(),
            metric,
        };

        if let Some(series) = self.entries.get(&key) {
            self.hits += 1;
            trace!(sheet = %source.label, "source cache hit");
            return Ok(Arc::clone(series));
        }

        self.misses += 1;
        // Older versions of this exact load can never be hit again.
        let stale = self.evict_stale(&key);
        debug!(sheet = %source.label, path = %source.path.display(), stale, "loading sheet");

        let sheet = load_sheet_csv(source)?;
        let series = Arc::new(normalize(&sheet, id_column, metric)?);
        self.entries.insert(key, Arc::clone(&series));
        Ok(series)
    }

    /// Drop every cached entry for `path`. Returns how many were removed.
    pub fn invalidate(&mut self, path: &Path) -> usize {
        let path = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        self.evict_path(&path)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (hits, misses) since creation.
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }

    /// Drop entries for the same path and load parameters but a different file identity.
    fn evict_stale(&mut self, key: &CacheKey) -> usize {
        let before = self.entries.len();
        self.entries.retain(|k, _| {
            !(k.identity.path == key.identity.path
                && k.identity != key.identity
                && k.skip_rows == key.skip_rows
                && k.id_column == key.id_column
                && k.metric == key.metric)
        });
        before - self.entries.len()
    }

    fn evict_path(&mut self, path: &Path) -> usize {
        let before = self.entries.len();
        self.entries.retain(|k, _| k.identity.path != path);
        before - self.entries.len()
    }
}
