//! Core domain types shared by every stage of the pipeline.
//!
//! Platform identifiers are opaque strings, so they are modelled as type
//! aliases the same way the rest of the workspace names its ids.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// =============================================================================
// Type Aliases
// =============================================================================

/// Platform-unique video identifier (e.g. `dQw4w9WgXcQ`)
pub type VideoId = String;

/// Channel identifier (e.g. `UC0v-tlzsn0QZwJnkiaUSJVQ`)
pub type ChannelId = String;

/// Playlist identifier (e.g. `PLx0sYbCqOb8TBPRdmBHs5Iftvv9TPboYG`)
pub type PlaylistId = String;

// =============================================================================
// Candidates
// =============================================================================

/// A video returned by platform search, not yet evaluated against any rule.
///
/// Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoCandidate {
    pub id: VideoId,
    pub title: String,
    pub channel_id: ChannelId,
    pub channel_name: String,
    pub published_at: DateTime<Utc>,
    pub duration_seconds: u64,
}

// =============================================================================
// Search
// =============================================================================

/// Result ordering requested from platform search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchOrder {
    Relevance,
    Date,
    #[default]
    ViewCount,
    Rating,
}

impl SearchOrder {
    /// Value of the `order` query parameter.
    pub fn as_api_param(&self) -> &'static str {
        match self {
            SearchOrder::Relevance => "relevance",
            SearchOrder::Date => "date",
            SearchOrder::ViewCount => "viewCount",
            SearchOrder::Rating => "rating",
        }
    }
}

/// A fully resolved search request, minus the pagination cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub terms: Vec<String>,
    pub order: SearchOrder,
    pub published_after: Option<DateTime<Utc>>,
    pub published_before: Option<DateTime<Utc>>,
    pub channel_id: Option<ChannelId>,
    pub page_size: u32,
}

impl SearchQuery {
    /// Space-joined query text sent as `q`.
    pub fn query_string(&self) -> String {
        self.terms
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    pub candidates: Vec<VideoCandidate>,
    /// Cursor of the following page; `None` on the last page.
    pub next_cursor: Option<String>,
}

// =============================================================================
// Playlists
// =============================================================================

/// Snapshot of a playlist as read from the platform.
///
/// Stale the moment it is read; treat it as a lower bound on consistency.
/// The same video may appear more than once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistState {
    pub playlist_id: PlaylistId,
    pub current_item_ids: Vec<VideoId>,
}

impl PlaylistState {
    pub fn new(playlist_id: impl Into<PlaylistId>, current_item_ids: Vec<VideoId>) -> Self {
        Self {
            playlist_id: playlist_id.into(),
            current_item_ids,
        }
    }

    /// Distinct video ids currently in the playlist.
    pub fn distinct_ids(&self) -> HashSet<&str> {
        self.current_item_ids.iter().map(String::as_str).collect()
    }

    pub fn contains(&self, video_id: &str) -> bool {
        self.current_item_ids.iter().any(|id| id == video_id)
    }
}

/// Ordered, duplicate-free sequence of accepted video ids.
///
/// Ordered by `published_at` descending with ties broken by id, so the same
/// accepted candidates always produce the same playlist order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AcceptedVideoSet {
    ids: Vec<VideoId>,
    #[serde(skip)]
    index: HashSet<VideoId>,
}

impl AcceptedVideoSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the set from accepted candidates; later duplicates of an id are ignored.
    pub fn from_candidates<'a, I>(candidates: I) -> Self
    where
        I: IntoIterator<Item = &'a VideoCandidate>,
    {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut ranked: Vec<&VideoCandidate> = candidates
            .into_iter()
            .filter(|c| seen.insert(c.id.as_str()))
            .collect();

        ranked.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        let ids: Vec<VideoId> = ranked.into_iter().map(|c| c.id.clone()).collect();
        let index = ids.iter().cloned().collect();
        Self { ids, index }
    }

    pub fn ids(&self) -> &[VideoId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, video_id: &str) -> bool {
        self.index.contains(video_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VideoId> {
        self.ids.iter()
    }

    /// Keep only the `limit` most relevant ids.
    pub fn truncate(&mut self, limit: usize) {
        if self.ids.len() > limit {
            for dropped in self.ids.drain(limit..) {
                self.index.remove(&dropped);
            }
        }
    }
}
