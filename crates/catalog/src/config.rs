//! Static configuration, read once at process start.
//!
//! The file is TOML. Every section is optional and falls back to defaults
//! that reproduce the BABYMETAL reaction setup, except targets,
//! which must be configured before a sync run.

use crate::error::{CatalogError, Result, ValidationError};
use crate::types::{ChannelId, PlaylistId, SearchOrder};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Largest page the platform search endpoint serves.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Playlists filled with the base query.
    pub target_playlist_ids: Vec<PlaylistId>,

    /// Playlists with their own query extension.
    pub targets: Vec<TargetSettings>,

    pub query: QuerySettings,
    pub filter: FilterRules,
    pub retry: RetrySettings,
    pub reconcile: ReconcileSettings,
    pub platform: PlatformSettings,
}

/// Inclusion/exclusion rules for candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterRules {
    /// At least one must appear in the title (when non-empty)
    pub required_keywords: Vec<String>,
    /// None may appear in the title
    pub excluded_keywords: Vec<String>,
    /// When non-empty, only these channels are accepted
    pub channel_allowlist: Vec<ChannelId>,
    pub channel_denylist: Vec<ChannelId>,
    pub min_duration_seconds: Option<u64>,
    pub max_duration_seconds: Option<u64>,
}

/// Base search query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuerySettings {
    pub keywords: Vec<String>,
    pub order: SearchOrder,
    /// Only consider videos published within this many days
    pub published_within_days: Option<u32>,
    /// Restrict search to one channel
    pub channel_id: Option<ChannelId>,
    /// Discovery stops after this many candidates
    pub max_results: usize,
    pub page_size: u32,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            keywords: vec!["babymetal".to_string(), "reaction".to_string()],
            order: SearchOrder::ViewCount,
            published_within_days: None,
            channel_id: None,
            max_results: 200,
            page_size: MAX_PAGE_SIZE,
        }
    }
}

/// Bounded exponential backoff for transient platform failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetrySettings {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 500,
            max_delay_ms: 30_000,
            backoff_multiplier: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconcileSettings {
    /// Pause after every playlist mutation to stay clear of rate limits
    pub pause_between_calls_ms: u64,
    /// Accepted sets larger than this keep only their most relevant ids
    pub max_playlist_items: usize,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            pause_between_calls_ms: 500,
            max_playlist_items: 5000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlatformSettings {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            api_base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// A `[[targets]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetSettings {
    pub playlist_id: PlaylistId,
    #[serde(default)]
    pub additional_query: Vec<String>,
}

/// A resolved playlist target: where to write, and what to add to the base query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistTarget {
    pub playlist_id: PlaylistId,
    pub additional_query: Vec<String>,
}

impl Settings {
    /// Read, parse and validate a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let origin = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::ConfigRead {
            path: origin.clone(),
            source,
        })?;
        let settings = Self::from_toml_str(&text, &origin)?;
        debug!(path = %origin, targets = settings.targets().len(), "Loaded configuration");
        Ok(settings)
    }

    /// Parse and validate configuration text. `origin` names the source in errors.
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(text).map_err(|e| CatalogError::ConfigParse {
            path: origin.to_string(),
            reason: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check every value that would otherwise fail mid-run.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.query.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(ValidationError::EmptyQuery);
        }
        if self.query.page_size == 0 || self.query.page_size > MAX_PAGE_SIZE {
            return Err(ValidationError::PageSize(self.query.page_size));
        }
        if self.query.max_results == 0 {
            return Err(ValidationError::MaxResults);
        }

        self.filter.validate()?;
        self.retry.validate()?;

        if self.reconcile.max_playlist_items == 0 {
            return Err(ValidationError::MaxPlaylistItems);
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let ids = self
            .target_playlist_ids
            .iter()
            .chain(self.targets.iter().map(|t| &t.playlist_id));
        for id in ids {
            if id.trim().is_empty() {
                return Err(ValidationError::BlankPlaylistId);
            }
            if !seen.insert(id.as_str()) {
                return Err(ValidationError::DuplicateTarget(id.clone()));
            }
        }
        Ok(())
    }

    /// All configured targets: plain ids first, then `[[targets]]` entries.
    pub fn targets(&self) -> Vec<PlaylistTarget> {
        self.target_playlist_ids
            .iter()
            .map(|id| PlaylistTarget {
                playlist_id: id.clone(),
                additional_query: Vec::new(),
            })
            .chain(self.targets.iter().map(|t| PlaylistTarget {
                playlist_id: t.playlist_id.clone(),
                additional_query: t.additional_query.clone(),
            }))
            .collect()
    }

    /// Targets for a sync run; at least one is required.
    pub fn require_targets(&self) -> std::result::Result<Vec<PlaylistTarget>, ValidationError> {
        let targets = self.targets();
        if targets.is_empty() {
            return Err(ValidationError::NoTargets);
        }
        Ok(targets)
    }
}

impl FilterRules {
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        let lists: [(&'static str, &Vec<String>); 4] = [
            ("filter.required_keywords", &self.required_keywords),
            ("filter.excluded_keywords", &self.excluded_keywords),
            ("filter.channel_allowlist", &self.channel_allowlist),
            ("filter.channel_denylist", &self.channel_denylist),
        ];
        for (field, values) in lists {
            if values.iter().any(|v| v.trim().is_empty()) {
                return Err(ValidationError::BlankEntry { field });
            }
        }

        if let (Some(min), Some(max)) = (self.min_duration_seconds, self.max_duration_seconds) {
            if min > max {
                return Err(ValidationError::DurationBounds { min, max });
            }
        }

        if let Some(conflict) = self
            .channel_allowlist
            .iter()
            .find(|c| self.channel_denylist.contains(c))
        {
            return Err(ValidationError::ChannelListConflict(conflict.clone()));
        }
        Ok(())
    }
}

impl RetrySettings {
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if !(self.backoff_multiplier >= 1.0) {
            return Err(ValidationError::Retry(format!(
                "backoff_multiplier must be >= 1.0, got {}",
                self.backoff_multiplier
            )));
        }
        if self.initial_delay_ms > self.max_delay_ms {
            return Err(ValidationError::Retry(format!(
                "initial_delay_ms ({}) exceeds max_delay_ms ({})",
                self.initial_delay_ms, self.max_delay_ms
            )));
        }
        Ok(())
    }
}
