//! # Catalog Crate
//!
//! Shared vocabulary for the reaction curator.
//!
//! ## Main Components
//!
//! - **types**: Domain types (VideoCandidate, PlaylistState, AcceptedVideoSet, SearchQuery)
//! - **parser**: ISO 8601 durations and RFC 3339 timestamps as the platform returns them
//! - **config**: TOML configuration, defaults and startup validation
//! - **error**: Error types for configuration and parsing
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::Settings;
//! use std::path::Path;
//!
//! let settings = Settings::load(Path::new("reaction-curator.toml"))?;
//! for target in settings.require_targets()? {
//!     println!("{} (+{:?})", target.playlist_id, target.additional_query);
//! }
//! ```

// Public modules
pub mod config;
pub mod error;
pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use config::{
    FilterRules, PlatformSettings, PlaylistTarget, QuerySettings, ReconcileSettings,
    RetrySettings, Settings, TargetSettings,
};
pub use error::{CatalogError, Result, ValidationError};
pub use parser::{format_timestamp, parse_iso8601_duration, parse_timestamp};
pub use types::{
    // Type aliases
    ChannelId,
    PlaylistId,
    VideoId,
    // Core types
    AcceptedVideoSet,
    PlaylistState,
    SearchOrder,
    SearchPage,
    SearchQuery,
    VideoCandidate,
};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn candidate(id: &str, day: u32) -> VideoCandidate {
        VideoCandidate {
            id: id.to_string(),
            title: format!("BABYMETAL reaction {id}"),
            channel_id: "c1".to_string(),
            channel_name: "Channel One".to_string(),
            published_at: Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0).unwrap(),
            duration_seconds: 600,
        }
    }

    #[test]
    fn test_accepted_set_orders_newest_first() {
        let candidates = vec![candidate("a", 1), candidate("b", 3), candidate("c", 2)];
        let accepted = AcceptedVideoSet::from_candidates(&candidates);

        assert_eq!(accepted.ids(), &["b", "c", "a"]);
    }

    #[test]
    fn test_accepted_set_ties_break_by_id() {
        let candidates = vec![candidate("z", 1), candidate("m", 1), candidate("a", 1)];
        let accepted = AcceptedVideoSet::from_candidates(&candidates);

        assert_eq!(accepted.ids(), &["a", "m", "z"]);
    }

    #[test]
    fn test_accepted_set_drops_duplicate_ids() {
        let candidates = vec![candidate("a", 1), candidate("a", 5), candidate("b", 2)];
        let accepted = AcceptedVideoSet::from_candidates(&candidates);

        assert_eq!(accepted.len(), 2);
        assert!(accepted.contains("a"));
        assert!(accepted.contains("b"));
    }

    #[test]
    fn test_accepted_set_truncate_updates_index() {
        let candidates = vec![candidate("a", 1), candidate("b", 2), candidate("c", 3)];
        let mut accepted = AcceptedVideoSet::from_candidates(&candidates);
        accepted.truncate(2);

        assert_eq!(accepted.ids(), &["c", "b"]);
        assert!(!accepted.contains("a"));
    }

    #[test]
    fn test_playlist_state_distinct_ids() {
        let state = PlaylistState::new(
            "PL1",
            vec!["v1".to_string(), "v3".to_string(), "v1".to_string()],
        );
        assert_eq!(state.distinct_ids().len(), 2);
        assert!(state.contains("v3"));
        assert!(!state.contains("v2"));
    }

    #[test]
    fn test_query_string_skips_blank_terms() {
        let query = SearchQuery {
            terms: vec!["babymetal".into(), " ".into(), "reaction".into()],
            order: SearchOrder::ViewCount,
            published_after: None,
            published_before: None,
            channel_id: None,
            page_size: 50,
        };
        assert_eq!(query.query_string(), "babymetal reaction");
        assert_eq!(query.order.as_api_param(), "viewCount");
    }
}
