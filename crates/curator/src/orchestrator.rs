//! # Curation Orchestrator
//!
//! This module coordinates the whole batch pass for each target playlist:
//! 1. Discover the complete candidate batch for the target's query
//! 2. Filter it into an accepted set
//! 3. Cap the accepted set at the playlist capacity
//! 4. Read the playlist and compute the reconciliation plan
//! 5. Apply the plan (unless this is a dry run)
//!
//! Targets run one after another; each phase finishes before the next one
//! starts. Targets sharing the same extra query terms reuse one discovery.
//! A fatal error stops the run at the current target, but the summary of
//! everything already applied is still returned.

use crate::error::{CuratorError, Result};
use crate::reconciler::{ReconciliationPlan, Reconciler};
use crate::summary::{Halt, RunSummary, TargetReport};
use catalog::{FilterRules, PlaylistTarget, QuerySettings, ReconcileSettings, Settings, VideoId};
use chrono::{DateTime, Utc};
use discovery::{DiscoveryBatch, QuerySpec, VideoDiscovery};
use pipeline::{FilterOutcome, FilterPipeline};
use platform_client::{retry_transient, RetryPolicy, VideoPlatform};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, instrument, warn};

/// Discovery and filter result for one query.
#[derive(Debug, Clone)]
pub struct Curation {
    pub batch: DiscoveryBatch,
    pub outcome: FilterOutcome,
}

/// Runs discovery, filtering and reconciliation for configured targets.
pub struct Curator {
    platform: Arc<dyn VideoPlatform>,
    query: QuerySettings,
    pipeline: FilterPipeline,
    reconcile: ReconcileSettings,
    retry: RetryPolicy,
    dry_run: bool,
}

impl Curator {
    pub fn new(platform: Arc<dyn VideoPlatform>, settings: &Settings) -> Self {
        Self {
            platform,
            query: settings.query.clone(),
            pipeline: FilterPipeline::from_rules(&settings.filter),
            reconcile: settings.reconcile.clone(),
            retry: RetryPolicy::from(&settings.retry),
            dry_run: false,
        }
    }

    /// Compute plans without mutating any playlist
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replace the rule chain built from configuration.
    pub fn with_filter_rules(mut self, rules: &FilterRules) -> Self {
        self.pipeline = FilterPipeline::from_rules(rules);
        self
    }

    /// Discover and filter candidates for the configured query plus `additional_terms`.
    ///
    /// Any discovery failure aborts: the filter and the diff both need the
    /// complete batch.
    #[instrument(skip(self, now))]
    pub async fn curate(
        &self,
        additional_terms: &[String],
        max_results: Option<usize>,
        now: DateTime<Utc>,
    ) -> Result<Curation> {
        let mut spec = QuerySpec::from_settings(&self.query, additional_terms, now);
        if let Some(max_results) = max_results {
            spec = spec.with_max_results(max_results);
        }

        let discovery = VideoDiscovery::new(self.platform.clone()).with_retry_policy(self.retry.clone());
        let batch = discovery
            .discover_all(&spec)
            .await
            .map_err(|e| CuratorError::platform("discovery", e))?;

        // Per-run: desired state is recomputed from discovery every time
        let previously_accepted: HashSet<VideoId> = HashSet::new();
        let outcome = self.pipeline.apply(batch.candidates.clone(), &previously_accepted);

        info!(
            discovered = batch.candidates.len(),
            accepted = outcome.accepted_set.len(),
            rejected = outcome.rejected.len(),
            "Filtered candidates"
        );
        Ok(Curation { batch, outcome })
    }

    /// Run every target in order.
    ///
    /// The first fatal error stops the run: the target that hit it carries
    /// `halted`, and the targets after it are listed in `skipped_targets`.
    pub async fn run(&self, targets: &[PlaylistTarget]) -> RunSummary {
        let start_time = Instant::now();
        let mut summary = RunSummary::new(Utc::now(), self.dry_run);
        let mut curations: HashMap<Vec<String>, Curation> = HashMap::new();

        info!(targets = targets.len(), dry_run = self.dry_run, "Starting curation run");

        for (index, target) in targets.iter().enumerate() {
            let curation = match curations.get(&target.additional_query) {
                Some(cached) => Ok(cached.clone()),
                None => self
                    .curate(&target.additional_query, None, summary.started_at)
                    .await
                    .inspect(|fresh| {
                        curations.insert(target.additional_query.clone(), fresh.clone());
                    }),
            };

            let report = match curation {
                Ok(curation) => self.reconcile_target(target, &curation).await,
                Err(err) => TargetReport {
                    playlist_id: target.playlist_id.clone(),
                    dry_run: self.dry_run,
                    halted: Some(Halt::from_error(&err)),
                    ..TargetReport::default()
                },
            };

            let halted = report.halted.clone();
            summary.targets.push(report);
            if let Some(halt) = halted {
                summary.skipped_targets = targets[index + 1..]
                    .iter()
                    .map(|t| t.playlist_id.clone())
                    .collect();
                error!(
                    playlist_id = %target.playlist_id,
                    error = %halt.error,
                    skipped = summary.skipped_targets.len(),
                    "Curation run halted"
                );
                break;
            }
        }

        summary.finished_at = Utc::now();
        info!(
            discovered = summary.discovered(),
            accepted = summary.accepted(),
            added = summary.added(),
            removed = summary.removed(),
            failed = summary.failed(),
            elapsed = ?start_time.elapsed(),
            "Curation run finished"
        );
        summary
    }

    /// Converge one playlist onto a curation result.
    ///
    /// A fatal error while reading or changing the playlist is recorded in
    /// the report's `halted` field.
    #[instrument(skip(self, curation), fields(playlist_id = %target.playlist_id))]
    pub async fn reconcile_target(&self, target: &PlaylistTarget, curation: &Curation) -> TargetReport {
        let mut accepted = curation.outcome.accepted_set.clone();
        if accepted.len() > self.reconcile.max_playlist_items {
            warn!(
                accepted = accepted.len(),
                capacity = self.reconcile.max_playlist_items,
                "Accepted set exceeds playlist capacity, keeping the newest"
            );
            accepted.truncate(self.reconcile.max_playlist_items);
        }

        let mut report = TargetReport {
            playlist_id: target.playlist_id.clone(),
            discovered: curation.batch.candidates.len(),
            accepted: accepted.len(),
            rejected: curation
                .outcome
                .rejection_counts
                .iter()
                .map(|(reason, count)| (reason.code().to_string(), *count))
                .collect(),
            dry_run: self.dry_run,
            ..TargetReport::default()
        };

        let platform = self.platform.as_ref();
        let playlist_id = target.playlist_id.as_str();
        let state = match retry_transient(&format!("read playlist {playlist_id}"), &self.retry, || {
            platform.get_playlist_items(playlist_id)
        })
        .await
        {
            Ok(state) => state,
            Err(err) => {
                let err = CuratorError::platform(format!("reading playlist {playlist_id}"), err);
                report.halted = Some(Halt::from_error(&err));
                return report;
            }
        };

        let plan = ReconciliationPlan::compute(&accepted, &state);
        info!(
            current = state.current_item_ids.len(),
            additions = plan.additions.len(),
            removals = plan.removals.len(),
            duplicates = plan.duplicates.len(),
            "Computed reconciliation plan"
        );
        report.plan = plan.clone();

        if self.dry_run || plan.is_empty() {
            return report;
        }

        let applied = Reconciler::new(self.platform.clone())
            .with_retry_policy(self.retry.clone())
            .with_pause(Duration::from_millis(self.reconcile.pause_between_calls_ms))
            .apply(&plan)
            .await;

        report.added = applied.added.len();
        report.removed = applied.removed.len();
        report.collapsed = applied.collapsed.len();
        report.failures = applied.failures;
        report.halted = applied.halted.map(|err| {
            Halt::from_error(&CuratorError::platform(format!("reconciling playlist {playlist_id}"), err))
        });
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::VideoCandidate;
    use chrono::TimeZone;
    use platform_client::{InMemoryPlatform, Operation};

    fn video(id: &str, day: u32) -> VideoCandidate {
        VideoCandidate {
            id: id.to_string(),
            title: format!("BABYMETAL reaction {id}"),
            channel_id: "c1".to_string(),
            channel_name: "Channel One".to_string(),
            published_at: Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0).unwrap(),
            duration_seconds: 600,
        }
    }

    fn settings() -> Settings {
        let mut settings = Settings::default();
        settings.reconcile.pause_between_calls_ms = 0;
        settings
    }

    fn target(id: &str) -> PlaylistTarget {
        PlaylistTarget {
            playlist_id: id.to_string(),
            additional_query: vec![],
        }
    }

    #[tokio::test]
    async fn test_capacity_keeps_newest() {
        let platform = Arc::new(
            InMemoryPlatform::new()
                .with_videos(vec![video("a", 1), video("b", 3), video("c", 2)])
                .with_playlist("PL1", &[]),
        );
        let mut settings = settings();
        settings.reconcile.max_playlist_items = 2;
        let curator = Curator::new(platform.clone(), &settings).with_retry_policy(RetryPolicy::immediate(1));

        let summary = curator.run(&[target("PL1")]).await;

        assert_eq!(summary.targets[0].accepted, 2);
        assert_eq!(platform.playlist("PL1").unwrap(), vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_dry_run_does_not_mutate() {
        let platform = Arc::new(
            InMemoryPlatform::new()
                .with_videos(vec![video("a", 1)])
                .with_playlist("PL1", &["stale"]),
        );
        let curator = Curator::new(platform.clone(), &settings()).with_dry_run(true);

        let summary = curator.run(&[target("PL1")]).await;

        let report = &summary.targets[0];
        assert!(report.dry_run);
        assert_eq!(report.plan.additions, vec!["a"]);
        assert_eq!(report.plan.removals, vec!["stale"]);
        assert_eq!(report.added, 0);
        assert!(platform.mutations().is_empty());
        assert_eq!(platform.playlist("PL1").unwrap(), vec!["stale"]);
    }

    #[tokio::test]
    async fn test_targets_with_same_query_share_discovery() {
        let platform = Arc::new(
            InMemoryPlatform::new()
                .with_videos(vec![video("a", 1)])
                .with_playlist("PL1", &[])
                .with_playlist("PL2", &[]),
        );
        let curator = Curator::new(platform.clone(), &settings());

        curator.run(&[target("PL1"), target("PL2")]).await;

        let searches = platform
            .calls()
            .iter()
            .filter(|c| c.operation() == Operation::Search)
            .count();
        assert_eq!(searches, 1);
        assert_eq!(platform.playlist("PL2").unwrap(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_missing_playlist_is_fatal() {
        let platform = Arc::new(InMemoryPlatform::new().with_videos(vec![video("a", 1)]));
        let curator = Curator::new(platform, &settings());

        let summary = curator.run(&[target("nope"), target("PL2")]).await;

        let (playlist_id, halt) = summary.halt().unwrap();
        assert_eq!(playlist_id, "nope");
        assert!(halt.error.contains("reading playlist nope"));
        assert_eq!(summary.skipped_targets, vec!["PL2"]);
        assert_eq!(summary.exit_code(), crate::error::EXIT_FATAL);
    }
}
