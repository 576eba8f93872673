//! Building the search request for one discovery run.

use catalog::{ChannelId, QuerySettings, SearchQuery};
use chrono::{DateTime, Duration, Utc};

/// A search query plus the run-level bounds discovery needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    query: SearchQuery,
    /// Stop collecting once this many candidates have been seen
    max_results: usize,
    /// Resume from an externally stored cursor instead of the first page
    start_cursor: Option<String>,
}

impl QuerySpec {
    pub fn new(query: SearchQuery, max_results: usize) -> Self {
        Self {
            query,
            max_results,
            start_cursor: None,
        }
    }

    /// Resolve configured query settings at `now`.
    ///
    /// `additional_terms` are appended to the configured keywords, and
    /// `published_within_days` becomes an absolute `published_after`.
    pub fn from_settings(
        settings: &QuerySettings,
        additional_terms: &[String],
        now: DateTime<Utc>,
    ) -> Self {
        let terms = settings
            .keywords
            .iter()
            .chain(additional_terms)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        let published_after = settings
            .published_within_days
            .map(|days| now - Duration::days(i64::from(days)));

        Self::new(
            SearchQuery {
                terms,
                order: settings.order,
                published_after,
                published_before: None,
                channel_id: settings.channel_id.clone(),
                page_size: settings.page_size,
            },
            settings.max_results,
        )
    }

    pub fn with_start_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.start_cursor = Some(cursor.into());
        self
    }

    pub fn with_published_before(mut self, before: DateTime<Utc>) -> Self {
        self.query.published_before = Some(before);
        self
    }

    pub fn with_channel(mut self, channel_id: impl Into<ChannelId>) -> Self {
        self.query.channel_id = Some(channel_id.into());
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    pub fn start_cursor(&self) -> Option<&str> {
        self.start_cursor.as_deref()
    }
}
