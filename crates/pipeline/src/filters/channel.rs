//! Channel deny-list and allow-list filters.

use crate::reason::{RejectReason, Rejection};
use crate::traits::{Filter, FilterContext};
use catalog::{ChannelId, VideoCandidate};
use std::collections::HashSet;

/// Rejects candidates from any listed channel.
pub struct ChannelDenyFilter {
    denied: HashSet<ChannelId>,
}

impl ChannelDenyFilter {
    pub fn new<I, S>(channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ChannelId>,
    {
        Self {
            denied: channels.into_iter().map(Into::into).collect(),
        }
    }
}

impl Filter for ChannelDenyFilter {
    fn name(&self) -> &str {
        "ChannelDenyFilter"
    }

    fn check(&self, candidate: &VideoCandidate, _context: &FilterContext<'_>) -> Option<Rejection> {
        self.denied.contains(&candidate.channel_id).then(|| {
            Rejection::new(
                RejectReason::ChannelDenied,
                format!("{} ({})", candidate.channel_id, candidate.channel_name),
            )
        })
    }
}

/// Accepts only candidates from a listed channel.
///
/// An empty allow-list would reject everything, so the pipeline only adds
/// this filter when the list is non-empty.
pub struct ChannelAllowFilter {
    allowed: HashSet<ChannelId>,
}

impl ChannelAllowFilter {
    pub fn new<I, S>(channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ChannelId>,
    {
        Self {
            allowed: channels.into_iter().map(Into::into).collect(),
        }
    }
}

impl Filter for ChannelAllowFilter {
    fn name(&self) -> &str {
        "ChannelAllowFilter"
    }

    fn check(&self, candidate: &VideoCandidate, _context: &FilterContext<'_>) -> Option<Rejection> {
        (!self.allowed.contains(&candidate.channel_id)).then(|| {
            Rejection::new(
                RejectReason::ChannelNotAllowed,
                format!("{} ({})", candidate.channel_id, candidate.channel_name),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::test_support::{candidate_from, empty};

    #[test]
    fn test_deny_list() {
        let seen = empty();
        let context = FilterContext::new(&seen);
        let filter = ChannelDenyFilter::new(["UC0v-tlzsn0QZwJnkiaUSJVQ"]);

        let denied = filter
            .check(&candidate_from("v1", "UC0v-tlzsn0QZwJnkiaUSJVQ"), &context)
            .unwrap();
        assert_eq!(denied.reason, RejectReason::ChannelDenied);
        assert!(filter.check(&candidate_from("v2", "c1"), &context).is_none());
    }

    #[test]
    fn test_allow_list() {
        let seen = empty();
        let context = FilterContext::new(&seen);
        let filter = ChannelAllowFilter::new(vec!["c1".to_string(), "c2".to_string()]);

        assert!(filter.check(&candidate_from("v1", "c2"), &context).is_none());
        let rejected = filter.check(&candidate_from("v2", "c9"), &context).unwrap();
        assert_eq!(rejected.reason, RejectReason::ChannelNotAllowed);
    }
}
