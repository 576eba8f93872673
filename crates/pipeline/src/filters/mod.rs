//! Filter implementations for the candidate pipeline.
//!
//! This module contains all the concrete rules that can be composed into a
//! FilterPipeline.

pub mod channel;
pub mod duplicate;
pub mod duration;
pub mod keywords;

// Re-export for convenience
pub use channel::{ChannelAllowFilter, ChannelDenyFilter};
pub use duplicate::DuplicateFilter;
pub use duration::DurationFilter;
pub use keywords::{ExcludedKeywordFilter, RequiredKeywordFilter};
