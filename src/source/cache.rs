use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::{SourceError, TableSource};
use crate::table::RawTable;

struct Entry {
    table: Arc<RawTable>,
    fetched_at: Instant,
}

/// Memoizes tables per sub-table name for a fixed time-to-live.
///
/// Failed fetches are never cached, so the next `load` after an error goes
/// back to the source.
pub struct CachedSource<S> {
    inner: S,
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry>>,
}

impl<S: TableSource> CachedSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns the cached table while it is fresh, otherwise fetches anew.
    pub async fn load(&self, sheet: &str) -> Result<Arc<RawTable>, SourceError> {
        if let Some(entry) = self.entries().get(sheet) {
            let age = entry.fetched_at.elapsed();
            if age < self.ttl {
                debug!(sheet, age_secs = age.as_secs(), "Serving cached table");
                return Ok(Arc::clone(&entry.table));
            }
        }

        let table = Arc::new(self.inner.fetch(sheet).await?);
        info!(sheet, rows = table.len(), "Table fetched");

        self.entries().insert(
            sheet.to_string(),
            Entry {
                table: Arc::clone(&table),
                fetched_at: Instant::now(),
            },
        );
        Ok(table)
    }

    /// Drops every cached table; the next `load` fetches from the source.
    pub fn invalidate(&self) {
        let mut entries = self.entries();
        let dropped = entries.len();
        entries.clear();
        info!(dropped, "Source cache cleared");
    }
}
