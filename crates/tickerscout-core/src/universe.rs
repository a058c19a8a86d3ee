//! Universe orchestration: fan out across sources, fuse, dedup.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::TickerCache;
use crate::config::AcquireConfig;
use crate::error::FetchError;
use crate::curated::{registry, CuratedSource};
use crate::domain::{Segment, TickerRecord};
use crate::rate_limit::RateLimiter;
use crate::retry::{Outcome, RetryPolicy};
use crate::segments::{default_sources, SegmentFetcher, SegmentSource};
use crate::transport::HttpTransport;

/// One source that degraded during a universe build.
#[derive(Debug, Clone)]
pub struct SourceFailure {
    pub source: String,
    pub message: String,
}

/// Outcome of a full universe build: the fused records plus the
/// sources that failed permanently along the way.
#[derive(Debug, Clone)]
pub struct UniverseBuild {
    pub records: Vec<TickerRecord>,
    pub failures: Vec<SourceFailure>,
}

/// Builds the ticker universe from scraped segments and the curated
/// catalog.
///
/// Segments resolve through the injected cache, with each fetch
/// wrapped in the retry policy. A segment that fails permanently is
/// logged and skipped; the build always completes with whatever the
/// remaining sources yielded.
pub struct TickerFetcher {
    fetcher: SegmentFetcher,
    cache: TickerCache,
    retry: RetryPolicy,
    sources: Vec<SegmentSource>,
    curated: Vec<CuratedSource>,
}

impl TickerFetcher {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        cache: TickerCache,
        config: &AcquireConfig,
    ) -> Self {
        let rate = RateLimiter::new(config.min_delay);
        Self {
            fetcher: SegmentFetcher::new(transport, rate, config),
            cache,
            retry: RetryPolicy::new(config.retry.clone()),
            sources: default_sources(&config.listing_base_url),
            curated: registry(),
        }
    }

    /// Replace the scraped-source catalog.
    pub fn with_sources(mut self, sources: Vec<SegmentSource>) -> Self {
        self.sources = sources;
        self
    }

    /// Replace the curated registry.
    pub fn with_curated(mut self, curated: Vec<CuratedSource>) -> Self {
        self.curated = curated;
        self
    }

    /// Resolve every configured source and fuse the results.
    ///
    /// Iteration order is the scraped catalog followed by the curated
    /// registry; on ticker overlap the record from the source iterated
    /// first is kept.
    pub async fn fetch_all(&self) -> UniverseBuild {
        self.build(self.sources.iter(), self.curated.iter()).await
    }

    /// Resolve one segment through the same isolation and fusion path
    /// as a full build.
    ///
    /// Errors only when neither catalog covers the segment; a covered
    /// segment that fails to resolve degrades inside the returned
    /// build like any other source.
    pub async fn fetch_segment(&self, segment: Segment) -> Result<UniverseBuild, FetchError> {
        let sources: Vec<&SegmentSource> = self
            .sources
            .iter()
            .filter(|source| source.segment == segment)
            .collect();
        let curated: Vec<&CuratedSource> = self
            .curated
            .iter()
            .filter(|source| source.segment == segment)
            .collect();
        if sources.is_empty() && curated.is_empty() {
            return Err(FetchError::unknown_segment(segment.as_str()));
        }
        Ok(self.build(sources, curated).await)
    }

    async fn build<'a>(
        &self,
        sources: impl IntoIterator<Item = &'a SegmentSource>,
        curated: impl IntoIterator<Item = &'a CuratedSource>,
    ) -> UniverseBuild {
        let mut fused: Vec<TickerRecord> = Vec::new();
        let mut failures: Vec<SourceFailure> = Vec::new();

        for source in sources {
            let segment = source.segment;
            let operation = format!("segment:{segment}");
            let resolved = self
                .cache
                .get_or_fetch(segment, || {
                    self.retry.run(&operation, Vec::new(), || async {
                        Outcome::from_result(self.fetcher.fetch(source).await, Vec::is_empty)
                    })
                })
                .await;

            match resolved {
                Ok(records) => {
                    info!(segment = %segment, count = records.len(), "segment resolved");
                    fused.extend(records);
                }
                Err(error) => {
                    warn!(
                        segment = %segment,
                        code = error.code(),
                        message = error.message(),
                        "segment failed, continuing with the rest"
                    );
                    failures.push(SourceFailure {
                        source: segment.to_string(),
                        message: error.message().to_string(),
                    });
                }
            }
        }

        for source in curated {
            let records = (source.getter)();
            debug!(source = source.name, count = records.len(), "curated source resolved");
            fused.extend(records);
        }

        UniverseBuild {
            records: dedup_first_wins(fused),
            failures,
        }
    }

    /// Classify an explicit ticker list without touching the network.
    ///
    /// Pure and cache-free. Inputs that fail validation are skipped
    /// with a log line, mirroring how listing rows are handled.
    pub fn fetch_specific<I, S>(inputs: I) -> Vec<TickerRecord>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut records = Vec::new();
        for raw in inputs {
            match TickerRecord::ad_hoc(raw.as_ref()) {
                Ok(record) => records.push(record),
                Err(error) => {
                    debug!(input = raw.as_ref(), %error, "skipping unusable ad-hoc ticker");
                }
            }
        }
        records
    }
}

/// Keep the first record seen for each ticker, preserving input order.
fn dedup_first_wins(records: Vec<TickerRecord>) -> Vec<TickerRecord> {
    let mut seen: HashSet<String> = HashSet::with_capacity(records.len());
    let mut unique = Vec::with_capacity(records.len());
    for record in records {
        if seen.insert(record.ticker.clone()) {
            unique.push(record);
        }
    }
    unique
}
