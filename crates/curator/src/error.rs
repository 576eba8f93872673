//! Errors that end a curation run.

use catalog::{PlaylistId, ValidationError, VideoId};
use platform_client::PlatformError;
use thiserror::Error;

/// Exit code for a fully successful run.
pub const EXIT_OK: u8 = 0;
/// Exit code for a fatal error (bad config, quota exhausted, discovery failure).
pub const EXIT_FATAL: u8 = 1;
/// Exit code when some playlist items failed after retries.
pub const EXIT_PARTIAL: u8 = 2;

#[derive(Error, Debug)]
pub enum CuratorError {
    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("{stage} failed: {source}")]
    Platform {
        stage: String,
        #[source]
        source: PlatformError,
    },

    #[error("Run stopped at playlist {playlist_id}: {reason}")]
    Halted { playlist_id: PlaylistId, reason: String },

    #[error("{} playlist item(s) failed to reconcile: {}", failed_ids.len(), failed_ids.join(", "))]
    PartialReconciliation { failed_ids: Vec<VideoId> },
}

impl CuratorError {
    pub fn platform(stage: impl Into<String>, source: PlatformError) -> Self {
        CuratorError::Platform {
            stage: stage.into(),
            source,
        }
    }

    pub fn is_rate_limit(&self) -> bool {
        matches!(self, CuratorError::Platform { source, .. } if source.is_rate_limit())
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            CuratorError::PartialReconciliation { .. } => EXIT_PARTIAL,
            _ => EXIT_FATAL,
        }
    }
}

pub type Result<T> = std::result::Result<T, CuratorError>;
