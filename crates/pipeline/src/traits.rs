//! Core traits for the filtering pipeline.
//!
//! This module defines the Filter trait that allows composable,
//! independently testable rules to be applied to video candidates.

use crate::reason::Rejection;
use catalog::{VideoCandidate, VideoId};
use std::collections::HashSet;

/// Read-only state a filter may consult besides the candidate itself.
#[derive(Debug, Clone, Copy)]
pub struct FilterContext<'a> {
    /// Ids already accepted, by an earlier run or earlier in this batch
    pub previously_accepted: &'a HashSet<VideoId>,
}

impl<'a> FilterContext<'a> {
    pub fn new(previously_accepted: &'a HashSet<VideoId>) -> Self {
        Self {
            previously_accepted,
        }
    }
}

/// A single accept/reject rule.
///
/// ## Design Note
/// - `Send + Sync` allows a pipeline to be shared across tasks
/// - `check` must be pure: no I/O, no interior mutability, same answer for
///   the same inputs
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Evaluate one candidate.
    ///
    /// # Returns
    /// * `None` - The candidate passes this rule
    /// * `Some(Rejection)` - The candidate fails, with reason code and detail
    fn check(&self, candidate: &VideoCandidate, context: &FilterContext<'_>) -> Option<Rejection>;
}
