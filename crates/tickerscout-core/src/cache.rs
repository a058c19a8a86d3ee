//! In-memory caching for resolved ticker segments.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::domain::{Segment, TickerRecord};
use crate::error::FetchError;

/// Thread-safe per-segment ticker cache with no expiry.
///
/// Entries live for the process lifetime; a run re-resolving the same
/// segment twice must not hit the network twice. The lock guards only
/// the map itself, never a fetch: two tasks missing on the same segment
/// concurrently will both fetch and the last write wins. That duplicate
/// work is accepted, the entries are identical.
///
/// Cloning the cache yields a handle to the same underlying map, so a
/// single cache can be shared across fetchers.
#[derive(Debug, Clone, Default)]
pub struct TickerCache {
    inner: Arc<Mutex<HashMap<Segment, Vec<TickerRecord>>>>,
}

impl TickerCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached records for a segment, if any.
    pub fn get(&self, segment: Segment) -> Option<Vec<TickerRecord>> {
        self.inner
            .lock()
            .expect("ticker cache lock should not be poisoned")
            .get(&segment)
            .cloned()
    }

    /// Store records for a segment, replacing any previous entry.
    ///
    /// An empty list is a valid entry: a source that legitimately
    /// yielded nothing is not re-asked on the next call.
    pub fn insert(&self, segment: Segment, records: Vec<TickerRecord>) {
        self.inner
            .lock()
            .expect("ticker cache lock should not be poisoned")
            .insert(segment, records);
    }

    /// Return the cached entry for `segment` or run `fetch` and cache
    /// its result. Errors are returned without touching the cache.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        segment: Segment,
        fetch: F,
    ) -> Result<Vec<TickerRecord>, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<TickerRecord>, FetchError>>,
    {
        if let Some(records) = self.get(segment) {
            debug!(segment = %segment, count = records.len(), "ticker cache hit");
            return Ok(records);
        }
        let records = fetch().await?;
        self.insert(segment, records.clone());
        Ok(records)
    }

    pub fn clear(&self) {
        self.inner
            .lock()
            .expect("ticker cache lock should not be poisoned")
            .clear();
    }

    /// Number of cached segments.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .expect("ticker cache lock should not be poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
