//! Filter enforcing minimum/maximum video length.

use crate::reason::{RejectReason, Rejection};
use crate::traits::{Filter, FilterContext};
use catalog::VideoCandidate;

/// Rejects candidates outside `[min, max]` seconds; either bound is optional.
///
/// Live streams and premieres report a duration of zero and therefore fail
/// any minimum bound.
pub struct DurationFilter {
    min_seconds: Option<u64>,
    max_seconds: Option<u64>,
}

impl DurationFilter {
    pub fn new(min_seconds: Option<u64>, max_seconds: Option<u64>) -> Self {
        Self {
            min_seconds,
            max_seconds,
        }
    }
}

impl Filter for DurationFilter {
    fn name(&self) -> &str {
        "DurationFilter"
    }

    fn check(&self, candidate: &VideoCandidate, _context: &FilterContext<'_>) -> Option<Rejection> {
        let duration = candidate.duration_seconds;
        if let Some(min) = self.min_seconds.filter(|min| duration < *min) {
            return Some(Rejection::new(
                RejectReason::DurationTooShort,
                format!("{duration}s < {min}s"),
            ));
        }
        if let Some(max) = self.max_seconds.filter(|max| duration > *max) {
            return Some(Rejection::new(
                RejectReason::DurationTooLong,
                format!("{duration}s > {max}s"),
            ));
        }
        None
    }
}
