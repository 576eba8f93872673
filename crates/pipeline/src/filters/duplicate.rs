//! Filter rejecting videos that were already accepted.
//!
//! Always the first rule, so a duplicate is reported as such even if it
//! would also fail a later rule.

use crate::reason::{RejectReason, Rejection};
use crate::traits::{Filter, FilterContext};
use catalog::VideoCandidate;

/// Rejects candidates whose id is in `FilterContext::previously_accepted`.
pub struct DuplicateFilter;

impl Filter for DuplicateFilter {
    fn name(&self) -> &str {
        "DuplicateFilter"
    }

    fn check(&self, candidate: &VideoCandidate, context: &FilterContext<'_>) -> Option<Rejection> {
        context
            .previously_accepted
            .contains(&candidate.id)
            .then(|| Rejection::new(RejectReason::Duplicate, format!("{} already accepted", candidate.id)))
    }
}
