//! Video Discovery - candidate generation from platform search
//!
//! ## Algorithm
//! 1. Start at the query's resume cursor (or the first page)
//! 2. Fetch one page, retrying transient failures with backoff
//! 3. Hand out its candidates and remember the next cursor
//! 4. Stop when the platform has no further page or `max_results` is reached
//!
//! The last page is requested with only the remaining capacity and a fetched
//! page is never cut short, so the checkpoint always points at the first
//! candidate that was not handed out.
//!
//! Rate-limit errors are returned immediately. A transient failure that
//! survives every retry aborts the run: a partial candidate set would make
//! the filter's duplicate check and the reconciler's diff wrong.

use crate::query::QuerySpec;
use catalog::{SearchQuery, VideoCandidate};
use platform_client::{retry_transient, PlatformError, RetryPolicy, VideoPlatform};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Everything discovery produced for one query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryBatch {
    /// Candidates in platform result order
    pub candidates: Vec<VideoCandidate>,
    pub pages_fetched: usize,
    /// Cursor of the first candidate not consumed; store it to resume later
    pub checkpoint: Option<String>,
    /// Stopped because `max_results` was reached while more results remained
    pub truncated: bool,
}

/// Discovers candidate videos through a `VideoPlatform`.
pub struct VideoDiscovery {
    platform: Arc<dyn VideoPlatform>,
    retry: RetryPolicy,
}

impl VideoDiscovery {
    pub fn new(platform: Arc<dyn VideoPlatform>) -> Self {
        Self {
            platform,
            retry: RetryPolicy::default(),
        }
    }

    /// Configure retry behaviour for search calls
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Lazy page-by-page view over the results of `spec`.
    pub fn pager(&self, spec: &QuerySpec) -> SearchPager<'_> {
        SearchPager {
            platform: self.platform.as_ref(),
            retry: &self.retry,
            query: spec.query().clone(),
            cursor: spec.start_cursor().map(str::to_string),
            exhausted: false,
            pages_fetched: 0,
        }
    }

    /// Collect the complete candidate batch for `spec`.
    #[instrument(skip(self, spec), fields(q = %spec.query().query_string(), max_results = spec.max_results()))]
    pub async fn discover_all(&self, spec: &QuerySpec) -> Result<DiscoveryBatch, PlatformError> {
        let max_results = spec.max_results();
        let mut pager = self.pager(spec);
        let mut candidates = Vec::new();

        while candidates.len() < max_results {
            match pager.next_page_up_to(max_results - candidates.len()).await? {
                Some(page) => candidates.extend(page),
                None => break,
            }
        }

        let truncated = !pager.is_exhausted();

        info!(
            candidates = candidates.len(),
            pages = pager.pages_fetched(),
            truncated,
            "Discovery complete"
        );

        Ok(DiscoveryBatch {
            candidates,
            pages_fetched: pager.pages_fetched(),
            checkpoint: pager.checkpoint().map(str::to_string),
            truncated,
        })
    }
}

/// Finite, forward-only sequence of search result pages.
///
/// Not restartable across processes except through `checkpoint()`.
pub struct SearchPager<'a> {
    platform: &'a dyn VideoPlatform,
    retry: &'a RetryPolicy,
    query: SearchQuery,
    cursor: Option<String>,
    exhausted: bool,
    pages_fetched: usize,
}

impl SearchPager<'_> {
    /// Fetch the next page, or `None` once results are exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<VideoCandidate>>, PlatformError> {
        self.fetch(None).await
    }

    /// Like `next_page`, but asks the platform for at most `limit` candidates.
    ///
    /// The following page starts right after the last candidate returned.
    pub async fn next_page_up_to(
        &mut self,
        limit: usize,
    ) -> Result<Option<Vec<VideoCandidate>>, PlatformError> {
        self.fetch(Some(limit)).await
    }

    async fn fetch(&mut self, limit: Option<usize>) -> Result<Option<Vec<VideoCandidate>>, PlatformError> {
        if self.exhausted {
            return Ok(None);
        }

        let mut query = self.query.clone();
        if let Some(limit) = limit {
            let limit = u32::try_from(limit.max(1)).unwrap_or(u32::MAX);
            query.page_size = query.page_size.min(limit);
        }

        let platform = self.platform;
        let query = &query;
        let cursor = self.cursor.clone();
        let label = format!("search page {}", self.pages_fetched + 1);

        let page = retry_transient(&label, self.retry, || {
            platform.search(query, cursor.as_deref())
        })
        .await
        .inspect_err(|err| {
            if err.is_rate_limit() {
                warn!(error = %err, "Search quota exhausted");
            }
        })?;

        self.pages_fetched += 1;
        debug!(
            page = self.pages_fetched,
            candidates = page.candidates.len(),
            has_next = page.next_cursor.is_some(),
            "Fetched search page"
        );

        match page.next_cursor {
            // A repeated cursor would loop forever
            Some(next) if Some(&next) != self.cursor.as_ref() => self.cursor = Some(next),
            _ => {
                self.cursor = None;
                self.exhausted = true;
            }
        }

        Ok(Some(page.candidates))
    }

    /// Cursor of the next page to fetch; `None` when exhausted or at the start.
    pub fn checkpoint(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::SearchOrder;
    use chrono::{TimeZone, Utc};
    use platform_client::{InMemoryPlatform, Operation, PlatformCall};

    fn video(id: &str) -> VideoCandidate {
        VideoCandidate {
            id: id.to_string(),
            title: format!("BABYMETAL reaction {id}"),
            channel_id: "c1".to_string(),
            channel_name: "Channel One".to_string(),
            published_at: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            duration_seconds: 600,
        }
    }

    fn spec(page_size: u32, max_results: usize) -> QuerySpec {
        QuerySpec::new(
            SearchQuery {
                terms: vec!["babymetal".into(), "reaction".into()],
                order: SearchOrder::ViewCount,
                published_after: None,
                published_before: None,
                channel_id: None,
                page_size,
            },
            max_results,
        )
    }

    fn platform_with(n: usize) -> InMemoryPlatform {
        InMemoryPlatform::new().with_videos((0..n).map(|i| video(&format!("v{i}"))))
    }

    #[tokio::test]
    async fn test_discover_all_walks_every_page() {
        let discovery = VideoDiscovery::new(Arc::new(platform_with(5)));
        let batch = discovery.discover_all(&spec(2, 100)).await.unwrap();

        assert_eq!(batch.candidates.len(), 5);
        assert_eq!(batch.pages_fetched, 3);
        assert!(!batch.truncated);
        assert!(batch.checkpoint.is_none());
    }

    fn ids(batch: &DiscoveryBatch) -> Vec<String> {
        batch.candidates.iter().map(|c| c.id.clone()).collect()
    }

    #[tokio::test]
    async fn test_resume_from_capped_batch_loses_nothing() {
        let discovery = VideoDiscovery::new(Arc::new(platform_with(10)));

        let first = discovery.discover_all(&spec(3, 4)).await.unwrap();
        assert_eq!(ids(&first), vec!["v0", "v1", "v2", "v3"]);
        assert_eq!(first.pages_fetched, 2);
        assert!(first.truncated);
        assert_eq!(first.checkpoint.as_deref(), Some("4"));

        let resumed = discovery
            .discover_all(&spec(3, 100).with_start_cursor("4"))
            .await
            .unwrap();
        assert_eq!(ids(&resumed), vec!["v4", "v5", "v6", "v7", "v8", "v9"]);
        assert!(!resumed.truncated);
        assert!(resumed.checkpoint.is_none());
    }

    #[tokio::test]
    async fn test_cap_on_last_page_is_not_truncated() {
        let discovery = VideoDiscovery::new(Arc::new(platform_with(5)));
        let batch = discovery.discover_all(&spec(3, 5)).await.unwrap();

        assert_eq!(batch.candidates.len(), 5);
        assert!(!batch.truncated);
        assert!(batch.checkpoint.is_none());
    }

    #[tokio::test]
    async fn test_final_request_asks_only_for_remaining_capacity() {
        let discovery = VideoDiscovery::new(Arc::new(platform_with(10)));
        let mut pager = discovery.pager(&spec(3, 100));

        assert_eq!(pager.next_page_up_to(2).await.unwrap().unwrap().len(), 2);
        assert_eq!(pager.checkpoint(), Some("2"));
        assert_eq!(pager.next_page().await.unwrap().unwrap()[0].id, "v2");
    }

    #[tokio::test]
    async fn test_pager_resumes_from_checkpoint() {
        let discovery = VideoDiscovery::new(Arc::new(platform_with(5)));
        let mut pager = discovery.pager(&spec(2, 100).with_start_cursor("4"));

        let page = pager.next_page().await.unwrap().unwrap();
        assert_eq!(page[0].id, "v4");
        assert!(pager.next_page().await.unwrap().is_none());
        assert!(pager.is_exhausted());
    }

    #[tokio::test]
    async fn test_transient_search_failure_is_retried() {
        let platform = Arc::new(platform_with(2).fail_search(PlatformError::Transient("reset".into()), 2));
        let discovery = VideoDiscovery::new(platform.clone()).with_retry_policy(RetryPolicy::immediate(3));

        let batch = discovery.discover_all(&spec(50, 100)).await.unwrap();

        assert_eq!(batch.candidates.len(), 2);
        let searches = platform
            .calls()
            .iter()
            .filter(|c| c.operation() == Operation::Search)
            .count();
        assert_eq!(searches, 3);
    }

    #[tokio::test]
    async fn test_exhausted_retries_abort_discovery() {
        let platform = Arc::new(platform_with(2).fail_search(PlatformError::Transient("reset".into()), 10));
        let discovery = VideoDiscovery::new(platform).with_retry_policy(RetryPolicy::immediate(2));

        let err = discovery.discover_all(&spec(50, 100)).await.unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_rate_limit_propagates_without_retry() {
        let platform = Arc::new(platform_with(2).fail_search(
            PlatformError::RateLimited {
                reason: "quotaExceeded".into(),
            },
            1,
        ));
        let discovery = VideoDiscovery::new(platform.clone()).with_retry_policy(RetryPolicy::immediate(3));

        let err = discovery.discover_all(&spec(50, 100)).await.unwrap_err();

        assert!(err.is_rate_limit());
        assert_eq!(platform.calls(), vec![PlatformCall::Search { cursor: None }]);
    }
}
