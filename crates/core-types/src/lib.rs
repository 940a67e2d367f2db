//! Plain data types shared by every crate in the workspace: the sales record,
//! its enriched form, calendar periods and the names of grouping keys,
//! measures and aggregations.

pub mod enums;
pub mod error;
pub mod period;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{AggFn, ColorType, Dimension, Measure};
pub use error::CoreError;
pub use period::{MonthPeriod, QuarterPeriod};
pub use structs::{DimValue, EnrichedRecord, SalesRecord};
