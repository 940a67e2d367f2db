use core_types::MonthPeriod;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// A headline summary of a loaded dataset.
///
/// This is what the dashboard shows above its tabs (period coverage, size of
/// the market) and what the load step logs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetReport {
    pub rows: usize,
    pub total_months: usize,
    pub first_month: Option<MonthPeriod>,
    pub last_month: Option<MonthPeriod>,
    pub brands: usize,
    pub asins: usize,
    pub total_amount: Decimal,
    pub total_sales: Decimal,
    /// Numeric cells per column that were coerced to zero.
    pub coerced_cells: BTreeMap<String, usize>,
}

impl DatasetReport {
    pub fn coerced_total(&self) -> usize {
        self.coerced_cells.values().sum()
    }
}
