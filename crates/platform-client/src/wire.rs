//! JSON shapes of the YouTube Data API v3 responses we consume.
//!
//! Only the fields the curator reads are modelled; everything else in the
//! payload is ignored.

use crate::error::PlatformError;
use catalog::{parse_iso8601_duration, parse_timestamp, VideoCandidate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchResult>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResult {
    pub id: SearchResultId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchResultId {
    pub video_id: Option<String>,
}

impl SearchListResponse {
    /// Video ids in result order; channel and playlist hits are skipped.
    pub fn video_ids(&self) -> Vec<String> {
        self.items
            .iter()
            .filter_map(|item| item.id.video_id.clone())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<VideoResource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VideoResource {
    pub id: String,
    pub snippet: VideoSnippet,
    pub content_details: Option<ContentDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VideoSnippet {
    pub title: String,
    pub channel_id: String,
    #[serde(default)]
    pub channel_title: String,
    pub published_at: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContentDetails {
    pub duration: Option<String>,
}

impl VideoResource {
    /// Convert to a candidate. Live and upcoming videos report no duration
    /// (or `P0D`), which becomes zero seconds.
    pub fn into_candidate(self) -> Result<VideoCandidate, PlatformError> {
        let published_at = parse_timestamp(&self.snippet.published_at)
            .map_err(|e| PlatformError::Decode(format!("video {}: {e}", self.id)))?;

        let duration_seconds = match self.content_details.and_then(|d| d.duration) {
            Some(raw) => parse_iso8601_duration(&raw)
                .map_err(|e| PlatformError::Decode(format!("video {}: {e}", self.id)))?,
            None => 0,
        };

        Ok(VideoCandidate {
            id: self.id,
            title: self.snippet.title,
            channel_id: self.snippet.channel_id,
            channel_name: self.snippet.channel_title,
            published_at,
            duration_seconds,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlaylistItemListResponse {
    #[serde(default)]
    pub items: Vec<PlaylistItemResource>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlaylistItemResource {
    /// Playlist item id, distinct from the video id; needed for deletes.
    pub id: String,
    pub content_details: Option<PlaylistItemDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlaylistItemDetails {
    pub video_id: String,
}

impl PlaylistItemResource {
    pub fn video_id(&self) -> Option<&str> {
        self.content_details.as_ref().map(|d| d.video_id.as_str())
    }
}

/// Body of `playlistItems.insert`.
#[derive(Debug, Serialize)]
pub(crate) struct InsertPlaylistItem<'a> {
    pub snippet: InsertSnippet<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InsertSnippet<'a> {
    pub playlist_id: &'a str,
    pub resource_id: ResourceId<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResourceId<'a> {
    pub kind: &'static str,
    pub video_id: &'a str,
}

impl<'a> InsertPlaylistItem<'a> {
    pub fn new(playlist_id: &'a str, video_id: &'a str) -> Self {
        Self {
            snippet: InsertSnippet {
                playlist_id,
                resource_id: ResourceId {
                    kind: "youtube#video",
                    video_id,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_response_skips_non_video_hits() {
        let body = r#"{
            "kind": "youtube#searchListResponse",
            "nextPageToken": "CDIQAA",
            "items": [
                {"id": {"kind": "youtube#video", "videoId": "v1"}},
                {"id": {"kind": "youtube#channel", "channelId": "UC1"}},
                {"id": {"kind": "youtube#video", "videoId": "v2"}}
            ]
        }"#;
        let response: SearchListResponse = serde_json::from_str(body).unwrap();

        assert_eq!(response.video_ids(), vec!["v1", "v2"]);
        assert_eq!(response.next_page_token.as_deref(), Some("CDIQAA"));
    }

    #[test]
    fn test_video_resource_into_candidate() {
        let body = r#"{
            "items": [{
                "id": "v1",
                "snippet": {
                    "title": "BABYMETAL reaction!!",
                    "channelId": "c1",
                    "channelTitle": "Channel One",
                    "publishedAt": "2024-03-01T12:00:00Z"
                },
                "contentDetails": {"duration": "PT10M"}
            }]
        }"#;
        let mut response: VideoListResponse = serde_json::from_str(body).unwrap();
        let candidate = response.items.remove(0).into_candidate().unwrap();

        assert_eq!(candidate.id, "v1");
        assert_eq!(candidate.channel_name, "Channel One");
        assert_eq!(candidate.duration_seconds, 600);
    }

    #[test]
    fn test_missing_duration_is_zero() {
        let body = r#"{
            "id": "live1",
            "snippet": {"title": "t", "channelId": "c", "publishedAt": "2024-03-01T00:00:00Z"}
        }"#;
        let resource: VideoResource = serde_json::from_str(body).unwrap();
        assert_eq!(resource.into_candidate().unwrap().duration_seconds, 0);
    }

    #[test]
    fn test_bad_timestamp_is_decode_error() {
        let body = r#"{
            "id": "v9",
            "snippet": {"title": "t", "channelId": "c", "publishedAt": "yesterday"}
        }"#;
        let resource: VideoResource = serde_json::from_str(body).unwrap();
        assert!(matches!(
            resource.into_candidate(),
            Err(PlatformError::Decode(_))
        ));
    }

    #[test]
    fn test_insert_body_shape() {
        let body = serde_json::to_value(InsertPlaylistItem::new("PL1", "v1")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "snippet": {
                    "playlistId": "PL1",
                    "resourceId": {"kind": "youtube#video", "videoId": "v1"}
                }
            })
        );
    }
}
