//! The capability set the pipeline needs from a video platform.

use crate::error::PlatformError;
use async_trait::async_trait;
use catalog::{PlaylistState, SearchPage, SearchQuery};

/// Search, read playlist contents, add an item, remove an item.
///
/// This is the only dependency the pipeline has on the outside world.
/// `YouTubeClient` implements it over HTTP; `InMemoryPlatform` implements it
/// for tests.
#[async_trait]
pub trait VideoPlatform: Send + Sync {
    /// Fetch one page of search results starting at `cursor`.
    async fn search(
        &self,
        query: &SearchQuery,
        cursor: Option<&str>,
    ) -> Result<SearchPage, PlatformError>;

    /// Read the full, ordered contents of a playlist.
    async fn get_playlist_items(&self, playlist_id: &str) -> Result<PlaylistState, PlatformError>;

    /// Append a video to a playlist.
    async fn add_playlist_item(&self, playlist_id: &str, video_id: &str)
        -> Result<(), PlatformError>;

    /// Remove every occurrence of a video from a playlist.
    ///
    /// Removing a video that is not in the playlist succeeds.
    async fn remove_playlist_item(
        &self,
        playlist_id: &str,
        video_id: &str,
    ) -> Result<(), PlatformError>;
}
