//! Error types for the catalog crate.
//!
//! Configuration problems are split in two layers:
//! - `ValidationError` describes a well-formed file whose values make no sense
//! - `CatalogError` wraps everything that can go wrong while loading or parsing

use thiserror::Error;

/// A configuration value that is syntactically valid but semantically wrong.
///
/// These are fatal at startup and never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("query.keywords must contain at least one non-blank term")]
    EmptyQuery,

    #[error("{field} contains a blank entry")]
    BlankEntry { field: &'static str },

    #[error("min_duration_seconds ({min}) exceeds max_duration_seconds ({max})")]
    DurationBounds { min: u64, max: u64 },

    #[error("channel {0} is listed in both channel_allowlist and channel_denylist")]
    ChannelListConflict(String),

    #[error("query.page_size must be between 1 and 50, got {0}")]
    PageSize(u32),

    #[error("query.max_results must be greater than zero")]
    MaxResults,

    #[error("invalid retry settings: {0}")]
    Retry(String),

    #[error("target playlist id must not be blank")]
    BlankPlaylistId,

    #[error("target playlist {0} is configured more than once")]
    DuplicateTarget(String),

    #[error("reconcile.max_playlist_items must be greater than zero")]
    MaxPlaylistItems,

    #[error("no target playlists configured")]
    NoTargets,
}

/// Errors raised while loading configuration or parsing platform values.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML or has unknown/mistyped keys
    #[error("Failed to parse config file {path}: {reason}")]
    ConfigParse { path: String, reason: String },

    /// Config parsed but failed validation
    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid ISO 8601 duration: {0:?}")]
    InvalidDuration(String),

    #[error("Invalid timestamp {value:?}: {reason}")]
    InvalidTimestamp { value: String, reason: String },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CatalogError>;
