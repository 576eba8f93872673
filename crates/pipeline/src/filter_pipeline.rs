//! The FilterPipeline orchestrates multiple filters.
//!
//! This module provides the main FilterPipeline struct that chains
//! rules together using the builder pattern, and the outcome of running a
//! candidate batch through it.

use crate::filters::{
    ChannelAllowFilter, ChannelDenyFilter, DuplicateFilter, DurationFilter, ExcludedKeywordFilter,
    RequiredKeywordFilter,
};
use crate::reason::{Decision, RejectReason, Rejection};
use crate::traits::{Filter, FilterContext};
use catalog::{AcceptedVideoSet, FilterRules, VideoCandidate, VideoId};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, instrument};

/// Chains filters; the first failing rule decides the rejection reason.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(DuplicateFilter)
///     .add_filter(ChannelDenyFilter::new(["UC0v-tlzsn0QZwJnkiaUSJVQ"]))
///     .add_filter(ExcludedKeywordFilter::new(["cover"]));
///
/// let outcome = pipeline.apply(candidates, &HashSet::new());
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Build the standard rule chain from configuration.
    ///
    /// Order: duplicate, channel deny-list, channel allow-list, duration,
    /// excluded keywords, required keywords. Rules with nothing configured
    /// are left out.
    pub fn from_rules(rules: &FilterRules) -> Self {
        let mut pipeline = Self::new().add_filter(DuplicateFilter);

        if !rules.channel_denylist.is_empty() {
            pipeline = pipeline.add_filter(ChannelDenyFilter::new(rules.channel_denylist.iter().cloned()));
        }
        if !rules.channel_allowlist.is_empty() {
            pipeline = pipeline.add_filter(ChannelAllowFilter::new(rules.channel_allowlist.iter().cloned()));
        }
        if rules.min_duration_seconds.is_some() || rules.max_duration_seconds.is_some() {
            pipeline = pipeline.add_filter(DurationFilter::new(
                rules.min_duration_seconds,
                rules.max_duration_seconds,
            ));
        }
        if !rules.excluded_keywords.is_empty() {
            pipeline = pipeline.add_filter(ExcludedKeywordFilter::new(&rules.excluded_keywords));
        }
        if !rules.required_keywords.is_empty() {
            pipeline = pipeline.add_filter(RequiredKeywordFilter::new(&rules.required_keywords));
        }
        pipeline
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Names of the active filters, in evaluation order.
    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Evaluate one candidate. Pure: no side effects, deterministic.
    pub fn decide(&self, candidate: &VideoCandidate, context: &FilterContext<'_>) -> Decision {
        self.filters
            .iter()
            .find_map(|filter| filter.check(candidate, context))
            .map_or(Decision::Accept, Decision::Reject)
    }

    /// Run a complete candidate batch through the pipeline.
    ///
    /// ## Algorithm
    /// 1. Seed the seen-id set with `previously_accepted`
    /// 2. For each candidate in order, decide against the current seen set
    /// 3. Accepted ids join the seen set, so a repeat later in the batch is
    ///    rejected as a duplicate
    /// 4. Order the accepted ids newest first
    #[instrument(skip_all, fields(candidates = candidates.len(), filters = self.filters.len()))]
    pub fn apply(
        &self,
        candidates: Vec<VideoCandidate>,
        previously_accepted: &HashSet<VideoId>,
    ) -> FilterOutcome {
        let mut seen = previously_accepted.clone();
        let mut accepted = Vec::new();
        let mut rejected = Vec::new();
        let mut rejection_counts: BTreeMap<RejectReason, usize> = BTreeMap::new();
        let evaluated = candidates.len();

        for candidate in candidates {
            match self.decide(&candidate, &FilterContext::new(&seen)) {
                Decision::Accept => {
                    seen.insert(candidate.id.clone());
                    accepted.push(candidate);
                }
                Decision::Reject(rejection) => {
                    debug!(
                        video_id = %candidate.id,
                        reason = rejection.reason.code(),
                        detail = %rejection.detail,
                        "Rejected candidate"
                    );
                    *rejection_counts.entry(rejection.reason).or_insert(0) += 1;
                    rejected.push(RejectedCandidate {
                        video_id: candidate.id,
                        title: candidate.title,
                        rejection,
                    });
                }
            }
        }

        let accepted_set = AcceptedVideoSet::from_candidates(&accepted);
        debug!(
            accepted = accepted_set.len(),
            rejected = rejected.len(),
            "Filter pipeline applied"
        );

        FilterOutcome {
            evaluated,
            accepted_set,
            accepted,
            rejected,
            rejection_counts,
        }
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedCandidate {
    pub video_id: VideoId,
    pub title: String,
    pub rejection: Rejection,
}

/// Result of filtering one candidate batch.
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    pub evaluated: usize,
    /// Accepted ids, newest first
    pub accepted_set: AcceptedVideoSet,
    /// Accepted candidates in discovery order
    pub accepted: Vec<VideoCandidate>,
    pub rejected: Vec<RejectedCandidate>,
    pub rejection_counts: BTreeMap<RejectReason, usize>,
}

impl FilterOutcome {
    pub fn count(&self, reason: RejectReason) -> usize {
        self.rejection_counts.get(&reason).copied().unwrap_or(0)
    }
}
