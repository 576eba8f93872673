//! Why a candidate was rejected.

use serde::Serialize;
use std::fmt;

/// Rejection reason codes, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    Duplicate,
    ChannelDenied,
    ChannelNotAllowed,
    DurationTooShort,
    DurationTooLong,
    ExcludedKeyword,
    MissingRequiredKeyword,
}

impl RejectReason {
    /// Stable machine-readable code used in logs and reports.
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::Duplicate => "duplicate",
            RejectReason::ChannelDenied => "channel_denied",
            RejectReason::ChannelNotAllowed => "channel_not_allowed",
            RejectReason::DurationTooShort => "duration_too_short",
            RejectReason::DurationTooLong => "duration_too_long",
            RejectReason::ExcludedKeyword => "excluded_keyword",
            RejectReason::MissingRequiredKeyword => "missing_required_keyword",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A reason code plus a human-readable detail (the matched keyword, the
/// offending duration, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub reason: RejectReason,
    pub detail: String,
}

impl Rejection {
    pub fn new(reason: RejectReason, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.reason, self.detail)
    }
}

/// Outcome of evaluating one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject(Rejection),
}

impl Decision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Decision::Accept)
    }

    pub fn reason(&self) -> Option<RejectReason> {
        match self {
            Decision::Accept => None,
            Decision::Reject(rejection) => Some(rejection.reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_code() {
        assert_eq!(
            RejectReason::MissingRequiredKeyword.to_string(),
            "missing_required_keyword"
        );
        assert_eq!(RejectReason::ChannelDenied.to_string(), "channel_denied");
    }

    #[test]
    fn test_decision_accessors() {
        let reject = Decision::Reject(Rejection::new(RejectReason::ExcludedKeyword, "cover"));
        assert!(!reject.is_accepted());
        assert_eq!(reject.reason(), Some(RejectReason::ExcludedKeyword));
        assert!(Decision::Accept.is_accepted());
        assert_eq!(Decision::Accept.reason(), None);
    }

    #[test]
    fn test_rejection_display() {
        let rejection = Rejection::new(RejectReason::DurationTooShort, "45s < 90s");
        assert_eq!(rejection.to_string(), "duration_too_short (45s < 90s)");
    }
}
