//! Title keyword filters.
//!
//! Matching is a case-insensitive substring test on the title. Keywords are
//! lowercased once at construction.

use crate::reason::{RejectReason, Rejection};
use crate::traits::{Filter, FilterContext};
use catalog::VideoCandidate;

fn normalize<I, S>(keywords: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keywords
        .into_iter()
        .map(|k| k.as_ref().trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

/// Rejects candidates whose title contains any excluded keyword.
pub struct ExcludedKeywordFilter {
    keywords: Vec<String>,
}

impl ExcludedKeywordFilter {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: normalize(keywords),
        }
    }
}

impl Filter for ExcludedKeywordFilter {
    fn name(&self) -> &str {
        "ExcludedKeywordFilter"
    }

    fn check(&self, candidate: &VideoCandidate, _context: &FilterContext<'_>) -> Option<Rejection> {
        let title = candidate.title.to_lowercase();
        self.keywords
            .iter()
            .find(|k| title.contains(k.as_str()))
            .map(|k| Rejection::new(RejectReason::ExcludedKeyword, format!("title contains {k:?}")))
    }
}

/// Rejects candidates whose title contains none of the required keywords.
pub struct RequiredKeywordFilter {
    keywords: Vec<String>,
}

impl RequiredKeywordFilter {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: normalize(keywords),
        }
    }
}

impl Filter for RequiredKeywordFilter {
    fn name(&self) -> &str {
        "RequiredKeywordFilter"
    }

    fn check(&self, candidate: &VideoCandidate, _context: &FilterContext<'_>) -> Option<Rejection> {
        if self.keywords.is_empty() {
            return None;
        }
        let title = candidate.title.to_lowercase();
        if self.keywords.iter().any(|k| title.contains(k.as_str())) {
            None
        } else {
            Some(Rejection::new(
                RejectReason::MissingRequiredKeyword,
                format!("none of {:?}", self.keywords),
            ))
        }
    }
}
