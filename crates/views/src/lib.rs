//! # Acrylic Dash View Assembler
//!
//! Turns the enriched dataset into the exact slices each dashboard widget
//! draws: a brand filter, ad-hoc group-by queries, ASIN rankings, value
//! distributions and the four thematic panels.
//!
//! Like `analytics`, this is a pure logic crate: no I/O, no async. Callers own
//! the `Dataset` (usually through `analytics::DatasetCache`) and pass it in.

pub mod color;
pub mod distribution;
pub mod error;
pub mod filter;
pub mod panels;
pub mod query;
pub mod ranking;

pub use color::{ColorClassifier, classifier};
pub use distribution::{Distribution, FiveNumberSummary, distributions};
pub use error::ViewError;
pub use filter::BrandFilter;
pub use panels::{
    BrandShareView, DashboardSnapshot, FeatureView, HierarchyNode, MarketOverview, OVERVIEW_METRICS,
    PanelOptions, PriceTierView, SeriesPoint, brand_share, features, market_overview, price_tiers,
    snapshot,
};
pub use query::{ViewResult, ViewSpec, assemble};
pub use ranking::{AsinProfile, asin_profiles, at_risk, top_stable};
