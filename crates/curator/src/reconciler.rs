//! # Playlist Reconciler
//!
//! Converges one playlist onto an accepted set:
//! 1. Diff the accepted ids against a fresh playlist snapshot
//! 2. Issue every removal, then collapse duplicated accepted videos, then
//!    issue every addition
//! 3. Retry each call on transient errors; a call that still fails is
//!    recorded and the remaining items carry on
//! 4. Stop on quota exhaustion or an authorization failure, listing every
//!    item that was not attempted
//!
//! Each add/remove is atomic on the platform, so an interrupted run leaves
//! the playlist partially reconciled but never half-written. An add that
//! timed out may still have landed, so a retried add first checks the
//! playlist.

use catalog::{AcceptedVideoSet, PlaylistId, PlaylistState, VideoId};
use platform_client::{retry_transient, PlatformError, RetryPolicy, VideoPlatform};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// The minimal set of calls that makes a playlist match an accepted set.
///
/// Additions and removals are disjoint and each id appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationPlan {
    pub playlist_id: PlaylistId,
    /// In accepted-set order
    pub additions: Vec<VideoId>,
    /// In playlist order, first occurrence
    pub removals: Vec<VideoId>,
    /// Accepted videos present more than once; each is cut back to one copy
    pub duplicates: Vec<VideoId>,
}

impl ReconciliationPlan {
    pub fn compute(accepted: &AcceptedVideoSet, state: &PlaylistState) -> Self {
        let mut copies: HashMap<&str, usize> = HashMap::new();
        for id in &state.current_item_ids {
            *copies.entry(id.as_str()).or_default() += 1;
        }

        let additions = accepted
            .iter()
            .filter(|id| !copies.contains_key(id.as_str()))
            .cloned()
            .collect();

        let mut seen = HashSet::new();
        let mut removals = Vec::new();
        let mut duplicates = Vec::new();
        for id in &state.current_item_ids {
            if !seen.insert(id.as_str()) {
                continue;
            }
            if !accepted.contains(id) {
                removals.push(id.clone());
            } else if copies[id.as_str()] > 1 {
                duplicates.push(id.clone());
            }
        }

        Self {
            playlist_id: state.playlist_id.clone(),
            additions,
            removals,
            duplicates,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty() && self.duplicates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.additions.len() + self.removals.len() + self.duplicates.len()
    }

    /// Every step in the order it is applied.
    fn steps(&self) -> impl Iterator<Item = (ItemAction, &VideoId)> {
        self.removals
            .iter()
            .map(|id| (ItemAction::Remove, id))
            .chain(self.duplicates.iter().map(|id| (ItemAction::Collapse, id)))
            .chain(self.additions.iter().map(|id| (ItemAction::Add, id)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemAction {
    Add,
    Remove,
    /// Remove every copy of an accepted video, then add it back once
    Collapse,
}

/// A plan item that failed permanently or was never attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub video_id: VideoId,
    pub action: ItemAction,
    pub error: String,
}

/// What applying a plan actually did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub playlist_id: PlaylistId,
    pub added: Vec<VideoId>,
    pub removed: Vec<VideoId>,
    pub collapsed: Vec<VideoId>,
    pub failures: Vec<ItemFailure>,
    /// Fatal error that stopped the plan; later items are listed in `failures`
    #[serde(skip)]
    pub halted: Option<PlatformError>,
}

impl ReconcileReport {
    pub fn failed_ids(&self) -> Vec<VideoId> {
        self.failures.iter().map(|f| f.video_id.clone()).collect()
    }
}

/// Applies reconciliation plans through a `VideoPlatform`.
pub struct Reconciler {
    platform: Arc<dyn VideoPlatform>,
    retry: RetryPolicy,
    /// Pause between consecutive mutations
    pause: Duration,
}

impl Reconciler {
    pub fn new(platform: Arc<dyn VideoPlatform>) -> Self {
        Self {
            platform,
            retry: RetryPolicy::default(),
            pause: Duration::ZERO,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Apply `plan`: removals, then duplicate collapses, then additions.
    ///
    /// Per-item failures are listed in the report. A fatal platform error
    /// stops the plan and is returned in `halted`; the failing item and every
    /// item after it are listed as failures.
    #[instrument(skip(self, plan), fields(playlist_id = %plan.playlist_id, additions = plan.additions.len(), removals = plan.removals.len()))]
    pub async fn apply(&self, plan: &ReconciliationPlan) -> ReconcileReport {
        let mut report = ReconcileReport {
            playlist_id: plan.playlist_id.clone(),
            ..ReconcileReport::default()
        };

        let mut steps = plan.steps().enumerate();
        for (index, (action, video_id)) in steps.by_ref() {
            if index > 0 && !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }

            match self.apply_item(&plan.playlist_id, action, video_id).await {
                Ok(()) => {
                    debug!(%video_id, ?action, "Applied playlist change");
                    match action {
                        ItemAction::Add => report.added.push(video_id.clone()),
                        ItemAction::Remove => report.removed.push(video_id.clone()),
                        ItemAction::Collapse => report.collapsed.push(video_id.clone()),
                    }
                }
                Err(err) if err.is_fatal() => {
                    error!(
                        %video_id,
                        ?action,
                        error = %err,
                        added = report.added.len(),
                        removed = report.removed.len(),
                        "Stopping reconciliation"
                    );
                    report.failures.push(ItemFailure {
                        video_id: video_id.clone(),
                        action,
                        error: err.to_string(),
                    });
                    report.halted = Some(err);
                    break;
                }
                Err(err) => {
                    error!(%video_id, ?action, error = %err, "Playlist change failed permanently");
                    report.failures.push(ItemFailure {
                        video_id: video_id.clone(),
                        action,
                        error: err.to_string(),
                    });
                }
            }
        }

        if let Some(cause) = &report.halted {
            let reason = format!("not attempted: {cause}");
            for (_, (action, video_id)) in steps {
                report.failures.push(ItemFailure {
                    video_id: video_id.clone(),
                    action,
                    error: reason.clone(),
                });
            }
        }

        info!(
            added = report.added.len(),
            removed = report.removed.len(),
            collapsed = report.collapsed.len(),
            failed = report.failures.len(),
            halted = report.halted.is_some(),
            "Reconciliation applied"
        );
        report
    }

    async fn apply_item(
        &self,
        playlist_id: &str,
        action: ItemAction,
        video_id: &str,
    ) -> Result<(), PlatformError> {
        match action {
            ItemAction::Add => self.add(playlist_id, video_id).await,
            ItemAction::Remove => self.remove(playlist_id, video_id).await,
            ItemAction::Collapse => {
                self.remove(playlist_id, video_id).await?;
                self.add(playlist_id, video_id).await
            }
        }
    }

    async fn add(&self, playlist_id: &str, video_id: &str) -> Result<(), PlatformError> {
        let platform = self.platform.as_ref();
        let label = format!("add {video_id} to {playlist_id}");
        let mut attempted = false;

        retry_transient(&label, &self.retry, || {
            let retrying = std::mem::replace(&mut attempted, true);
            async move {
                if retrying && platform.get_playlist_items(playlist_id).await?.contains(video_id) {
                    warn!(%video_id, "Earlier add attempt landed, not adding again");
                    return Ok(());
                }
                platform.add_playlist_item(playlist_id, video_id).await
            }
        })
        .await
    }

    async fn remove(&self, playlist_id: &str, video_id: &str) -> Result<(), PlatformError> {
        let platform = self.platform.as_ref();
        let label = format!("remove {video_id} from {playlist_id}");
        retry_transient(&label, &self.retry, || {
            platform.remove_playlist_item(playlist_id, video_id)
        })
        .await
    }
}
