//! Errors returned by video platform calls.

use serde::Deserialize;
use thiserror::Error;

/// Error reasons the platform uses when a quota or rate limit is hit.
const RATE_LIMIT_REASONS: [&str; 6] = [
    "quotaExceeded",
    "rateLimitExceeded",
    "userRateLimitExceeded",
    "dailyLimitExceeded",
    "RATE_LIMIT_EXCEEDED",
    "RESOURCE_EXHAUSTED",
];

/// Errors that can occur when interacting with the video platform.
///
/// Only `Transient` is ever retried. `RateLimited` is fatal for the run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("Platform quota exhausted: {reason}")]
    RateLimited { reason: String },

    #[error("Transient network error: {0}")]
    Transient(String),

    #[error("Platform API error {status} ({}): {message}", .reason.as_deref().unwrap_or("unknown"))]
    Api {
        status: u16,
        reason: Option<String>,
        message: String,
    },

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Invalid response from platform: {0}")]
    Decode(String),

    #[error("HTTP client setup failed: {0}")]
    Setup(String),
}

impl PlatformError {
    /// Eligible for bounded retry with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(self, PlatformError::Transient(_))
    }

    pub fn is_rate_limit(&self) -> bool {
        matches!(self, PlatformError::RateLimited { .. })
    }

    /// Errors that would fail every later call too, so the run stops.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PlatformError::RateLimited { .. }
                | PlatformError::Unauthorized(_)
                | PlatformError::Setup(_)
        )
    }

    /// Classify a non-success HTTP response.
    ///
    /// The body is the platform's JSON error envelope when available; any
    /// other body is kept verbatim as the message.
    pub fn from_response(status: u16, body: &str) -> Self {
        let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();
        let reason = envelope.as_ref().and_then(|e| e.error.reason());
        let message = envelope
            .as_ref()
            .and_then(|e| e.error.message.clone())
            .unwrap_or_else(|| body.trim().to_string());

        let rate_limited = status == 429
            || reason
                .as_deref()
                .is_some_and(|r| RATE_LIMIT_REASONS.contains(&r));

        if rate_limited {
            return PlatformError::RateLimited {
                reason: reason.unwrap_or_else(|| format!("HTTP {status}")),
            };
        }

        match status {
            401 => PlatformError::Unauthorized(message),
            408 | 500..=599 => PlatformError::Transient(format!("HTTP {status}: {message}")),
            _ => PlatformError::Api {
                status,
                reason,
                message,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    reason: Option<String>,
}

impl ErrorBody {
    fn reason(&self) -> Option<String> {
        self.errors
            .iter()
            .find_map(|d| d.reason.clone())
            .or_else(|| self.status.clone())
    }
}
