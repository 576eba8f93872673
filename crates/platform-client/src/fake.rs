//! In-memory `VideoPlatform` for tests and dry experiments.
//!
//! Search ignores the query text and returns every stored video that fits
//! the time window and channel scope, in insertion order. Failures can be
//! scripted per operation (and optionally per video) for a fixed number of
//! calls. Every call is recorded so tests can assert on ordering.

use crate::error::PlatformError;
use crate::platform::VideoPlatform;
use async_trait::async_trait;
use catalog::{PlaylistId, PlaylistState, SearchPage, SearchQuery, VideoCandidate, VideoId};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Which capability a call used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Search,
    GetItems,
    Add,
    Remove,
}

/// A recorded platform call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    Search { cursor: Option<String> },
    GetItems { playlist_id: PlaylistId },
    Add { playlist_id: PlaylistId, video_id: VideoId },
    Remove { playlist_id: PlaylistId, video_id: VideoId },
}

impl PlatformCall {
    pub fn operation(&self) -> Operation {
        match self {
            PlatformCall::Search { .. } => Operation::Search,
            PlatformCall::GetItems { .. } => Operation::GetItems,
            PlatformCall::Add { .. } => Operation::Add,
            PlatformCall::Remove { .. } => Operation::Remove,
        }
    }
}

#[derive(Debug)]
struct ScriptedFailure {
    operation: Operation,
    video_id: Option<VideoId>,
    error: PlatformError,
    remaining: u32,
}

#[derive(Debug, Default)]
struct State {
    videos: Vec<VideoCandidate>,
    playlists: HashMap<PlaylistId, Vec<VideoId>>,
    failures: Vec<ScriptedFailure>,
    calls: Vec<PlatformCall>,
}

impl State {
    /// Consume one scripted failure matching the call, if any is left.
    fn take_failure(&mut self, operation: Operation, video_id: Option<&str>) -> Option<PlatformError> {
        let failure = self.failures.iter_mut().find(|f| {
            f.operation == operation
                && f.remaining > 0
                && (f.video_id.is_none() || f.video_id.as_deref() == video_id)
        })?;
        failure.remaining -= 1;
        Some(failure.error.clone())
    }

    fn playlist_mut(&mut self, playlist_id: &str) -> Result<&mut Vec<VideoId>, PlatformError> {
        self.playlists
            .get_mut(playlist_id)
            .ok_or_else(|| playlist_not_found(playlist_id))
    }
}

fn playlist_not_found(playlist_id: &str) -> PlatformError {
    PlatformError::Api {
        status: 404,
        reason: Some("playlistNotFound".to_string()),
        message: format!("playlist {playlist_id} not found"),
    }
}

#[derive(Debug, Default)]
pub struct InMemoryPlatform {
    state: Mutex<State>,
}

impl InMemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_videos(self, videos: impl IntoIterator<Item = VideoCandidate>) -> Self {
        self.lock().videos.extend(videos);
        self
    }

    pub fn with_playlist(self, playlist_id: &str, video_ids: &[&str]) -> Self {
        self.lock().playlists.insert(
            playlist_id.to_string(),
            video_ids.iter().map(|id| id.to_string()).collect(),
        );
        self
    }

    /// Fail the next `times` calls of `operation` (for `video_id` only, if given).
    pub fn with_failure(
        self,
        operation: Operation,
        video_id: Option<&str>,
        error: PlatformError,
        times: u32,
    ) -> Self {
        self.lock().failures.push(ScriptedFailure {
            operation,
            video_id: video_id.map(str::to_string),
            error,
            remaining: times,
        });
        self
    }

    pub fn fail_search(self, error: PlatformError, times: u32) -> Self {
        self.with_failure(Operation::Search, None, error, times)
    }

    pub fn fail_add(self, video_id: &str, error: PlatformError, times: u32) -> Self {
        self.with_failure(Operation::Add, Some(video_id), error, times)
    }

    pub fn fail_remove(self, video_id: &str, error: PlatformError, times: u32) -> Self {
        self.with_failure(Operation::Remove, Some(video_id), error, times)
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<PlatformCall> {
        self.lock().calls.clone()
    }

    /// Calls that mutated (or tried to mutate) a playlist, in order.
    pub fn mutations(&self) -> Vec<PlatformCall> {
        self.lock()
            .calls
            .iter()
            .filter(|c| matches!(c.operation(), Operation::Add | Operation::Remove))
            .cloned()
            .collect()
    }

    /// Current contents of a playlist.
    pub fn playlist(&self, playlist_id: &str) -> Option<Vec<VideoId>> {
        self.lock().playlists.get(playlist_id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl VideoPlatform for InMemoryPlatform {
    async fn search(
        &self,
        query: &SearchQuery,
        cursor: Option<&str>,
    ) -> Result<SearchPage, PlatformError> {
        let mut state = self.lock();
        state.calls.push(PlatformCall::Search {
            cursor: cursor.map(str::to_string),
        });
        if let Some(err) = state.take_failure(Operation::Search, None) {
            return Err(err);
        }

        let offset = match cursor {
            None => 0,
            Some(raw) => raw.parse::<usize>().map_err(|_| PlatformError::Api {
                status: 400,
                reason: Some("invalidPageToken".to_string()),
                message: format!("bad page token {raw}"),
            })?,
        };

        let matching: Vec<&VideoCandidate> = state
            .videos
            .iter()
            .filter(|v| query.published_after.is_none_or(|after| v.published_at >= after))
            .filter(|v| query.published_before.is_none_or(|before| v.published_at < before))
            .filter(|v| {
                query
                    .channel_id
                    .as_deref()
                    .is_none_or(|channel| v.channel_id == channel)
            })
            .collect();

        let page_size = query.page_size.max(1) as usize;
        let end = (offset + page_size).min(matching.len());
        let candidates = matching
            .get(offset..end)
            .unwrap_or_default()
            .iter()
            .map(|v| (*v).clone())
            .collect();
        let next_cursor = (end < matching.len()).then(|| end.to_string());

        Ok(SearchPage {
            candidates,
            next_cursor,
        })
    }

    async fn get_playlist_items(&self, playlist_id: &str) -> Result<PlaylistState, PlatformError> {
        let mut state = self.lock();
        state.calls.push(PlatformCall::GetItems {
            playlist_id: playlist_id.to_string(),
        });
        if let Some(err) = state.take_failure(Operation::GetItems, None) {
            return Err(err);
        }

        let items = state.playlist_mut(playlist_id)?.clone();
        Ok(PlaylistState::new(playlist_id, items))
    }

    async fn add_playlist_item(&self, playlist_id: &str, video_id: &str) -> Result<(), PlatformError> {
        let mut state = self.lock();
        state.calls.push(PlatformCall::Add {
            playlist_id: playlist_id.to_string(),
            video_id: video_id.to_string(),
        });
        if let Some(err) = state.take_failure(Operation::Add, Some(video_id)) {
            return Err(err);
        }

        state.playlist_mut(playlist_id)?.push(video_id.to_string());
        Ok(())
    }

    async fn remove_playlist_item(
        &self,
        playlist_id: &str,
        video_id: &str,
    ) -> Result<(), PlatformError> {
        let mut state = self.lock();
        state.calls.push(PlatformCall::Remove {
            playlist_id: playlist_id.to_string(),
            video_id: video_id.to_string(),
        });
        if let Some(err) = state.take_failure(Operation::Remove, Some(video_id)) {
            return Err(err);
        }

        state.playlist_mut(playlist_id)?.retain(|id| id != video_id);
        Ok(())
    }
}
