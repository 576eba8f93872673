//! Run summary: counts of discovered, accepted, added, removed and failed items.

use crate::error::{CuratorError, EXIT_FATAL, EXIT_OK, EXIT_PARTIAL};
use crate::reconciler::{ItemFailure, ReconciliationPlan};
use catalog::{PlaylistId, VideoId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// A fatal error that stopped the run at some target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Halt {
    pub error: String,
    pub rate_limited: bool,
}

impl Halt {
    pub fn from_error(err: &CuratorError) -> Self {
        Self {
            error: err.to_string(),
            rate_limited: err.is_rate_limit(),
        }
    }
}

/// Outcome for one target playlist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TargetReport {
    pub playlist_id: PlaylistId,
    pub discovered: usize,
    pub accepted: usize,
    /// Rejections keyed by reason code
    pub rejected: BTreeMap<String, usize>,
    pub plan: ReconciliationPlan,
    pub added: usize,
    pub removed: usize,
    /// Accepted videos cut back to a single copy
    pub collapsed: usize,
    pub failures: Vec<ItemFailure>,
    pub dry_run: bool,
    /// Set when this target stopped the run
    pub halted: Option<Halt>,
}

impl TargetReport {
    pub fn failed_ids(&self) -> Vec<VideoId> {
        self.failures.iter().map(|f| f.video_id.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub dry_run: bool,
    pub targets: Vec<TargetReport>,
    /// Targets never started because an earlier one halted the run
    pub skipped_targets: Vec<PlaylistId>,
}

impl RunSummary {
    pub fn new(started_at: DateTime<Utc>, dry_run: bool) -> Self {
        Self {
            started_at,
            finished_at: started_at,
            dry_run,
            targets: Vec::new(),
            skipped_targets: Vec::new(),
        }
    }

    /// The target that stopped the run, with the reason.
    pub fn halt(&self) -> Option<(&PlaylistId, &Halt)> {
        self.targets
            .iter()
            .find_map(|t| t.halted.as_ref().map(|halt| (&t.playlist_id, halt)))
    }

    pub fn is_rate_limited(&self) -> bool {
        self.halt().is_some_and(|(_, halt)| halt.rate_limited)
    }

    pub fn discovered(&self) -> usize {
        self.targets.iter().map(|t| t.discovered).sum()
    }

    pub fn accepted(&self) -> usize {
        self.targets.iter().map(|t| t.accepted).sum()
    }

    pub fn added(&self) -> usize {
        self.targets.iter().map(|t| t.added).sum()
    }

    pub fn removed(&self) -> usize {
        self.targets.iter().map(|t| t.removed).sum()
    }

    pub fn failed(&self) -> usize {
        self.targets.iter().map(|t| t.failures.len()).sum()
    }

    /// Every failed id across targets, in the order they failed.
    pub fn failed_ids(&self) -> Vec<VideoId> {
        self.targets.iter().flat_map(|t| t.failed_ids()).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.halt().is_none() && self.failed() == 0
    }

    pub fn exit_code(&self) -> u8 {
        if self.halt().is_some() {
            EXIT_FATAL
        } else if self.failed() > 0 {
            EXIT_PARTIAL
        } else {
            EXIT_OK
        }
    }

    /// `Err(Halted)` when the run stopped early, `Err(PartialReconciliation)`
    /// when any item failed.
    pub fn check(&self) -> Result<(), CuratorError> {
        if let Some((playlist_id, halt)) = self.halt() {
            return Err(CuratorError::Halted {
                playlist_id: playlist_id.clone(),
                reason: halt.error.clone(),
            });
        }
        if self.failed() > 0 {
            return Err(CuratorError::PartialReconciliation {
                failed_ids: self.failed_ids(),
            });
        }
        Ok(())
    }
}
