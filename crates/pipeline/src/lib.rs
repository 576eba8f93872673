//! Candidate filter for the reaction curator.
//!
//! This crate provides:
//! - Filter trait and implementations for candidate filtering
//! - FilterPipeline for composing filters in a fixed evaluation order
//! - Reason codes explaining every rejection
//!
//! ## Architecture
//! Each candidate runs through the rules in order and the first failing rule
//! decides:
//! 1. Duplicate check against previously accepted ids
//! 2. Channel deny-list
//! 3. Channel allow-list (when non-empty)
//! 4. Duration bounds
//! 5. Excluded title keywords
//! 6. Required title keywords (match any)
//!
//! Evaluation is pure. The accepted ids form an `AcceptedVideoSet`, newest
//! first, which the reconciler diffs against each playlist.
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::FilterPipeline;
//! use std::collections::HashSet;
//!
//! let pipeline = FilterPipeline::from_rules(&settings.filter);
//! let outcome = pipeline.apply(batch.candidates, &HashSet::new());
//! println!("accepted {} of {}", outcome.accepted_set.len(), outcome.evaluated);
//! ```

pub mod filter_pipeline;
pub mod filters;
pub mod reason;
pub mod traits;

// Re-export main types
pub use filter_pipeline::{FilterOutcome, FilterPipeline, RejectedCandidate};
pub use reason::{Decision, RejectReason, Rejection};
pub use traits::{Filter, FilterContext};
