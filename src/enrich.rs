//! Bounded-concurrency enrichment of a batch of meteorites.
//!
//! Each meteorite gets exactly one fetch task. At most `effective_concurrency` tasks are in
//! flight; as one finishes the next queued task starts. Tasks write only to their own
//! meteorite, so no locking is involved. The batch returns once every task has finished.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::error::EnrichError;
use crate::fetch::{fetch_and_extract, PageSource};
use crate::meteorite::Meteorite;
use crate::{MAX_CONCURRENCY, TARGET_ENRICHMENT};

/// A validated worker count in `1..=MAX_CONCURRENCY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcurrencyLimit(usize);

impl ConcurrencyLimit {
    /// Zero is rejected; anything above the ceiling is reduced to it.
    pub fn new(requested: usize) -> Result<Self, EnrichError> {
        if requested == 0 {
            return Err(EnrichError::InvalidConcurrency(requested.to_string()));
        }
        if requested > MAX_CONCURRENCY {
            warn!(
                target: TARGET_ENRICHMENT,
                "Concurrency of {} > {}, reducing it to {} for fair use of the catalog",
                requested,
                MAX_CONCURRENCY,
                MAX_CONCURRENCY
            );
            return Ok(Self(MAX_CONCURRENCY));
        }
        Ok(Self(requested))
    }

    /// Parse user input; anything that is not a positive integer is rejected.
    pub fn parse(text: &str) -> Result<Self, EnrichError> {
        let requested = text
            .trim()
            .parse::<u64>()
            .map_err(|_| EnrichError::InvalidConcurrency(text.to_string()))?;
        Self::new(usize::try_from(requested).unwrap_or(usize::MAX))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for ConcurrencyLimit {
    fn default() -> Self {
        Self(MAX_CONCURRENCY)
    }
}

/// Emitted once per finished task, in completion order.
#[derive(Debug, Clone, Copy)]
pub struct BatchProgress<'a> {
    pub completed: usize,
    pub total: usize,
    pub name: &'a str,
    pub succeeded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichmentFailure {
    pub name: String,
    pub url: String,
    pub reason: String,
}

/// Outcome of one `enrich_batch` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub total: usize,
    pub succeeded: usize,
    pub effective_concurrency: usize,
    pub failures: Vec<EnrichmentFailure>,
}

impl BatchReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Fetch and extract the detail page of every meteorite in `meteorites`.
///
/// An invalid `max_concurrency` fails before any request is made. Individual fetch
/// failures never abort the batch; they are collected in the returned report.
pub async fn enrich_batch<S, F>(
    source: &S,
    meteorites: &mut [Meteorite],
    max_concurrency: usize,
    mut on_progress: F,
) -> Result<BatchReport, EnrichError>
where
    S: PageSource + ?Sized,
    F: FnMut(BatchProgress<'_>),
{
    let limit = ConcurrencyLimit::new(max_concurrency)?;
    let total = meteorites.len();
    let effective_concurrency = limit.get().min(total).max(1);

    info!(
        target: TARGET_ENRICHMENT,
        "Requesting {} detail pages with {} workers", total, effective_concurrency
    );

    let mut tasks = stream::iter(meteorites.iter_mut())
        .map(move |meteorite| async move {
            let result = fetch_and_extract(source, &mut *meteorite).await;
            (meteorite, result)
        })
        .buffer_unordered(effective_concurrency);

    let mut report = BatchReport {
        total,
        effective_concurrency,
        ..Default::default()
    };
    let mut completed = 0;

    while let Some((meteorite, result)) = tasks.next().await {
        completed += 1;
        let succeeded = result.is_ok();
        match result {
            Ok(()) => {
                report.succeeded += 1;
                debug!(target: TARGET_ENRICHMENT, "Enriched {} ({}/{})", meteorite.name, completed, total);
            }
            Err(err) => report.failures.push(EnrichmentFailure {
                name: meteorite.name.clone(),
                url: meteorite.detail_url.clone(),
                reason: err.to_string(),
            }),
        }
        on_progress(BatchProgress {
            completed,
            total,
            name: &meteorite.name,
            succeeded,
        });
    }

    for failure in &report.failures {
        error!(
            target: TARGET_ENRICHMENT,
            "Failed to enrich {} ({}): {}", failure.name, failure.url, failure.reason
        );
    }
    info!(
        target: TARGET_ENRICHMENT,
        "Enrichment finished: {} of {} succeeded", report.succeeded, total
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DatasetRow;
    use crate::error::FetchError;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::{sleep, Duration};

    const PAGE: &str = include_str!("../tests/fixtures/detail_page.html");

    /// Serves the fixture page for every URL except those listed as failing,
    /// recording how many requests overlap.
    #[derive(Default)]
    struct CountingSource {
        failing: HashSet<String>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        requests: AtomicUsize,
    }

    #[async_trait]
    impl PageSource for CountingSource {
        async fn get(&self, url: &str) -> Result<String, FetchError> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.failing.contains(url) {
                Err(FetchError::Status {
                    url: url.to_string(),
                    status: 500,
                })
            } else {
                Ok(PAGE.to_string())
            }
        }
    }

    fn meteorites(count: u64) -> Vec<Meteorite> {
        (1..=count)
            .map(|id| {
                Meteorite::from_row(&DatasetRow {
                    name: format!("Meteorite{id}"),
                    numeric_id: id,
                    year: None,
                    country: None,
                    kind: None,
                    mass: None,
                    detail_url: format!("https://example.org/metbull.php?code={id}"),
                })
            })
            .collect()
    }

    #[tokio::test]
    async fn test_concurrency_clamped_to_batch_size() {
        let source = CountingSource::default();
        let mut batch = meteorites(5);

        let report = enrich_batch(&source, &mut batch, 100, |_| {}).await.unwrap();
        assert_eq!(report.effective_concurrency, 5);
        assert!(source.max_in_flight.load(Ordering::SeqCst) <= 5);
        assert_eq!(report.succeeded, 5);
    }

    #[tokio::test]
    async fn test_in_flight_requests_bounded() {
        let source = CountingSource::default();
        let mut batch = meteorites(6);

        let report = enrich_batch(&source, &mut batch, 2, |_| {}).await.unwrap();
        assert_eq!(report.effective_concurrency, 2);
        assert_eq!(source.max_in_flight.load(Ordering::SeqCst), 2);
        assert_eq!(source.requests.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_zero_concurrency_rejected_before_dispatch() {
        let source = CountingSource::default();
        let mut batch = meteorites(3);

        let err = enrich_batch(&source, &mut batch, 0, |_| {}).await.unwrap_err();
        assert_eq!(err, EnrichError::InvalidConcurrency("0".to_string()));
        assert_eq!(source.requests.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_parse_concurrency_limit() {
        assert_eq!(ConcurrencyLimit::parse("8").unwrap().get(), 8);
        assert_eq!(ConcurrencyLimit::parse("100").unwrap().get(), MAX_CONCURRENCY);
        for bad in ["0", "-1", "abc", "2.5", ""] {
            assert!(ConcurrencyLimit::parse(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[tokio::test]
    async fn test_one_failure_is_isolated() {
        let mut batch = meteorites(4);
        let source = CountingSource {
            failing: HashSet::from([batch[2].detail_url.clone()]),
            ..Default::default()
        };

        let report = enrich_batch(&source, &mut batch, 4, |_| {}).await.unwrap();
        assert_eq!(report.succeeded, 3);
        assert_eq!(
            report.failures,
            vec![EnrichmentFailure {
                name: "Meteorite3".to_string(),
                url: "https://example.org/metbull.php?code=3".to_string(),
                reason: "non-success status 500 from https://example.org/metbull.php?code=3"
                    .to_string(),
            }]
        );

        for (index, meteorite) in batch.iter().enumerate() {
            if index == 2 {
                assert!(meteorite.details().is_unset());
            } else {
                assert!(meteorite.is_enriched());
                assert!(meteorite.details().coordinates.is_some());
            }
        }
    }

    #[tokio::test]
    async fn test_re_enrichment_is_idempotent() {
        let source = CountingSource::default();
        let mut batch = meteorites(3);

        enrich_batch(&source, &mut batch, 3, |_| {}).await.unwrap();
        let first: Vec<_> = batch.iter().map(|m| m.details().clone()).collect();

        enrich_batch(&source, &mut batch, 3, |_| {}).await.unwrap();
        let second: Vec<_> = batch.iter().map(|m| m.details().clone()).collect();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_progress_counts_every_completion() {
        let mut batch = meteorites(4);
        let source = CountingSource {
            failing: HashSet::from([batch[0].detail_url.clone()]),
            ..Default::default()
        };

        let mut seen = Vec::new();
        enrich_batch(&source, &mut batch, 2, |progress| {
            seen.push((progress.completed, progress.total, progress.name.to_string()));
        })
        .await
        .unwrap();

        let counts: Vec<_> = seen.iter().map(|(completed, _, _)| *completed).collect();
        assert_eq!(counts, vec![1, 2, 3, 4]);
        assert!(seen.iter().all(|(_, total, _)| *total == 4));

        let mut names: Vec<_> = seen.into_iter().map(|(_, _, name)| name).collect();
        names.sort();
        assert_eq!(names, vec!["Meteorite1", "Meteorite2", "Meteorite3", "Meteorite4"]);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let source = CountingSource::default();
        let report = enrich_batch(&source, &mut [], 5, |_| {}).await.unwrap();
        assert_eq!(report.total, 0);
        assert_eq!(source.requests.load(Ordering::SeqCst), 0);
    }
}
