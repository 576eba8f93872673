//! HTTP client for the YouTube Data API v3.

use crate::credentials::Credentials;
use crate::error::PlatformError;
use crate::platform::VideoPlatform;
use crate::wire::{
    InsertPlaylistItem, PlaylistItemListResponse, SearchListResponse, VideoListResponse,
};
use async_trait::async_trait;
use catalog::{format_timestamp, PlatformSettings, PlaylistState, SearchPage, SearchQuery};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

/// Maximum page size accepted by `playlistItems.list`.
const PLAYLIST_PAGE_SIZE: &str = "50";

const USER_AGENT: &str = concat!("reaction-curator/", env!("CARGO_PKG_VERSION"));

/// Client for the search, video and playlist-item endpoints.
///
/// Read calls authenticate with the OAuth token when present, otherwise with
/// the API key. Playlist mutations require the token.
#[derive(Clone)]
pub struct YouTubeClient {
    http: Client,
    base_url: String,
    credentials: Credentials,
}

impl YouTubeClient {
    pub fn new(settings: &PlatformSettings, credentials: Credentials) -> Result<Self, PlatformError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| PlatformError::Setup(e.to_string()))?;

        Ok(Self {
            http,
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/{}", self.base_url, resource)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match (self.credentials.access_token(), self.credentials.api_key()) {
            (Some(token), _) => request.bearer_auth(token),
            (None, Some(key)) => request.query(&[("key", key)]),
            (None, None) => request,
        }
    }

    fn require_token(&self, operation: &str) -> Result<(), PlatformError> {
        if self.credentials.can_mutate() {
            Ok(())
        } else {
            Err(PlatformError::Unauthorized(format!(
                "{operation} requires an OAuth access token"
            )))
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, PlatformError> {
        let response = self.authorize(request).send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(PlatformError::from_response(status.as_u16(), &body));
        }
        serde_json::from_str(&body).map_err(|e| PlatformError::Decode(e.to_string()))
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<StatusCode, PlatformError> {
        let response = self.authorize(request).send().await.map_err(transport_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(status);
        }
        let body = response.text().await.unwrap_or_default();
        Err(PlatformError::from_response(status.as_u16(), &body))
    }

    /// Fetch snippet and duration for `ids`, preserving their order.
    ///
    /// Ids the platform no longer knows about (deleted, private) are dropped.
    async fn fetch_videos(&self, ids: &[String]) -> Result<Vec<catalog::VideoCandidate>, PlatformError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let request = self.http.get(self.url("videos")).query(&video_params(ids));
        let response: VideoListResponse = self.send_json(request).await?;

        let mut by_id = HashMap::with_capacity(response.items.len());
        for resource in response.items {
            let candidate = resource.into_candidate()?;
            by_id.insert(candidate.id.clone(), candidate);
        }

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    /// Playlist item resources, optionally restricted to one video.
    async fn list_items(
        &self,
        playlist_id: &str,
        video_id: Option<&str>,
    ) -> Result<PlaylistItemListResponse, PlatformError> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params = vec![
                ("part", "id,contentDetails".to_string()),
                ("playlistId", playlist_id.to_string()),
                ("maxResults", PLAYLIST_PAGE_SIZE.to_string()),
            ];
            if let Some(video_id) = video_id {
                params.push(("videoId", video_id.to_string()));
            }
            if let Some(token) = &page_token {
                params.push(("pageToken", token.clone()));
            }

            let request = self.http.get(self.url("playlistItems")).query(&params);
            let page: PlaylistItemListResponse = self.send_json(request).await?;
            items.extend(page.items);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(PlaylistItemListResponse {
            items,
            next_page_token: None,
        })
    }
}

/// Query parameters for `search.list`.
pub(crate) fn search_params(query: &SearchQuery, cursor: Option<&str>) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("part", "id".to_string()),
        ("type", "video".to_string()),
        ("q", query.query_string()),
        ("order", query.order.as_api_param().to_string()),
        ("maxResults", query.page_size.to_string()),
    ];
    if let Some(after) = &query.published_after {
        params.push(("publishedAfter", format_timestamp(after)));
    }
    if let Some(before) = &query.published_before {
        params.push(("publishedBefore", format_timestamp(before)));
    }
    if let Some(channel_id) = &query.channel_id {
        params.push(("channelId", channel_id.clone()));
    }
    if let Some(cursor) = cursor {
        params.push(("pageToken", cursor.to_string()));
    }
    params
}

/// `videos.list` rejects `maxResults` alongside `id`; the id list is bounded by the search page.
pub(crate) fn video_params(ids: &[String]) -> [(&'static str, String); 2] {
    [("part", "snippet,contentDetails".to_string()), ("id", ids.join(","))]
}

fn transport_error(err: reqwest::Error) -> PlatformError {
    if err.is_builder() {
        PlatformError::Setup(err.to_string())
    } else if err.is_decode() {
        PlatformError::Decode(err.to_string())
    } else {
        PlatformError::Transient(err.to_string())
    }
}

#[async_trait]
impl VideoPlatform for YouTubeClient {
    #[instrument(skip(self, query), fields(q = %query.query_string()))]
    async fn search(
        &self,
        query: &SearchQuery,
        cursor: Option<&str>,
    ) -> Result<SearchPage, PlatformError> {
        let request = self
            .http
            .get(self.url("search"))
            .query(&search_params(query, cursor));
        let response: SearchListResponse = self.send_json(request).await?;

        let ids = response.video_ids();
        let candidates = self.fetch_videos(&ids).await?;
        debug!(
            hits = ids.len(),
            candidates = candidates.len(),
            "Fetched search page"
        );

        Ok(SearchPage {
            candidates,
            next_cursor: response.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    #[instrument(skip(self))]
    async fn get_playlist_items(&self, playlist_id: &str) -> Result<PlaylistState, PlatformError> {
        let listing = self.list_items(playlist_id, None).await?;
        let ids: Vec<String> = listing
            .items
            .iter()
            .filter_map(|item| item.video_id().map(str::to_string))
            .collect();

        debug!(items = ids.len(), "Read playlist contents");
        Ok(PlaylistState::new(playlist_id, ids))
    }

    #[instrument(skip(self))]
    async fn add_playlist_item(&self, playlist_id: &str, video_id: &str) -> Result<(), PlatformError> {
        self.require_token("playlistItems.insert")?;

        let request = self
            .http
            .post(self.url("playlistItems"))
            .query(&[("part", "snippet")])
            .json(&InsertPlaylistItem::new(playlist_id, video_id));
        self.send_empty(request).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_playlist_item(
        &self,
        playlist_id: &str,
        video_id: &str,
    ) -> Result<(), PlatformError> {
        self.require_token("playlistItems.delete")?;

        let listing = self.list_items(playlist_id, Some(video_id)).await?;
        let item_ids: Vec<&str> = listing
            .items
            .iter()
            .filter(|item| item.video_id() == Some(video_id))
            .map(|item| item.id.as_str())
            .collect();

        if item_ids.is_empty() {
            debug!("Video already absent from playlist");
            return Ok(());
        }

        for item_id in item_ids {
            let request = self
                .http
                .delete(self.url("playlistItems"))
                .query(&[("id", item_id)]);
            match self.send_empty(request).await {
                Ok(_) => {}
                // Deleted concurrently by someone else
                Err(PlatformError::Api { status: 404, .. }) => {
                    debug!(item_id, "Playlist item already deleted");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}
