//! # Curator Crate
//!
//! Ties discovery, filtering and playlist reconciliation into one batch run.
//!
//! ## Main Components
//!
//! - **orchestrator**: `Curator`, which runs every target playlist in sequence
//! - **reconciler**: `ReconciliationPlan` (set difference) and `Reconciler` (removals first, per-item retry)
//! - **summary**: `RunSummary` / `TargetReport` counts, the `Halt` that stopped a run, exit codes
//! - **error**: `CuratorError`
//!
//! ## Example Usage
//!
//! ```ignore
//! use curator::Curator;
//! use std::sync::Arc;
//!
//! let curator = Curator::new(Arc::new(client), &settings).with_dry_run(false);
//! let summary = curator.run(&settings.require_targets()?).await;
//! println!("added {} removed {} failed {}", summary.added(), summary.removed(), summary.failed());
//! std::process::exit(summary.exit_code().into());
//! ```

pub mod error;
pub mod orchestrator;
pub mod reconciler;
pub mod summary;

pub use error::{CuratorError, Result, EXIT_FATAL, EXIT_OK, EXIT_PARTIAL};
pub use orchestrator::{Curation, Curator};
pub use reconciler::{ItemAction, ItemFailure, ReconcileReport, ReconciliationPlan, Reconciler};
pub use summary::{Halt, RunSummary, TargetReport};
