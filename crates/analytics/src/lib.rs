//! # Acrylic Dash Metrics Engine
//!
//! Loads the monthly marker sales table, derives the per-row metrics every
//! dashboard panel relies on, and provides the aggregation primitives the
//! views are assembled from.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** A pure logic crate. It reads one file and knows nothing
//!   about HTTP or terminals. It depends only on `core-types` (Layer 0).
//! - **Load once, read many:** A `Dataset` is built in one pass and never
//!   mutated. Stability scores are fixed at load, before any filtering.
//! - **One aggregation path:** Every grouped figure goes through `group_by`;
//!   matrices go through `PivotTable`.
//!
//! ## Public API
//!
//! - `MetricsEngine` / `load`: CSV file to enriched `Dataset`.
//! - `group_by`, `GroupSpec`, `MeasureAgg`: the generic aggregation.
//! - `PivotTable`, `RatioTable`: matrices, shares and period-over-period change.
//! - `DatasetCache`: the shared, refreshable handle on the current dataset.

pub mod aggregate;
pub mod cache;
pub mod classify;
pub mod dataset;
pub mod engine;
pub mod enrich;
pub mod error;
pub mod loader;
pub mod pivot;
pub mod report;

pub use aggregate::{GroupRow, GroupSpec, MeasureAgg, group_by};
pub use cache::DatasetCache;
pub use classify::{ColorClassifier, DEFAULT_INDEPENDENT_MARKERS};
pub use dataset::{Dataset, saturating_sum};
pub use engine::MetricsEngine;
pub use enrich::safe_div;
pub use error::{AnalyticsError, LoadError};
pub use pivot::{PivotTable, RatioTable};
pub use report::DatasetReport;

/// Loads `path` with default settings.
pub fn load(path: &std::path::Path) -> Result<Dataset, LoadError> {
    MetricsEngine::default().load(path)
}
