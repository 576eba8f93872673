//! # Discovery Crate
//!
//! Candidate generation: turns a configured query into the complete batch of
//! `VideoCandidate`s the filter stage evaluates.
//!
//! ## Components
//!
//! ### QuerySpec
//! Resolves configured keywords, per-target extra terms and the relative
//! time window into an absolute `SearchQuery`, plus the run's result cap and
//! optional resume cursor.
//!
//! ### VideoDiscovery / SearchPager
//! Lazy, forward-only paging over platform search. Transient failures are
//! retried with backoff; quota exhaustion is returned immediately.
//!
//! ### Channel listing
//! `distinct_channels` summarises which channels a candidate set came from.
//!
//! ## Example Usage
//!
//! ```ignore
//! use discovery::{QuerySpec, VideoDiscovery};
//!
//! let spec = QuerySpec::from_settings(&settings.query, &target.additional_query, Utc::now());
//! let discovery = VideoDiscovery::new(platform.clone());
//! let batch = discovery.discover_all(&spec).await?;
//! println!("{} candidates over {} pages", batch.candidates.len(), batch.pages_fetched);
//! ```

pub mod channels;
pub mod discovery;
pub mod query;

pub use channels::{distinct_channels, ChannelSummary};
pub use discovery::{DiscoveryBatch, SearchPager, VideoDiscovery};
pub use query::QuerySpec;
