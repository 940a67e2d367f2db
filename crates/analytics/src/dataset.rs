use crate::report::DatasetReport;
use core_types::{EnrichedRecord, MonthPeriod};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

/// The enriched sales table. Built once per load and never mutated; share it
/// behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<EnrichedRecord>,
    months: Vec<MonthPeriod>,
    brands: Vec<String>,
    coerced_cells: BTreeMap<String, usize>,
}

impl Dataset {
    pub(crate) fn new(
        records: Vec<EnrichedRecord>,
        months: Vec<MonthPeriod>,
        coerced_cells: BTreeMap<String, usize>,
    ) -> Self {
        let brands: BTreeSet<&str> = records.iter().map(|r| r.record.brand.as_str()).collect();
        let brands = brands.into_iter().map(String::from).collect();
        Self {
            records,
            months,
            brands,
            coerced_cells,
        }
    }

    pub fn records(&self) -> &[EnrichedRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct months observed anywhere in the dataset.
    pub fn total_months(&self) -> usize {
        self.months.len()
    }

    /// Observed months, ascending.
    pub fn months(&self) -> &[MonthPeriod] {
        &self.months
    }

    /// Distinct brands, sorted.
    pub fn brands(&self) -> &[String] {
        &self.brands
    }

    pub fn coerced_cells(&self) -> &BTreeMap<String, usize> {
        &self.coerced_cells
    }

    pub fn report(&self) -> DatasetReport {
        let asins: BTreeSet<&str> = self.records.iter().map(|r| r.record.asin.as_str()).collect();
        DatasetReport {
            rows: self.records.len(),
            total_months: self.total_months(),
            first_month: self.months.first().copied(),
            last_month: self.months.last().copied(),
            brands: self.brands.len(),
            asins: asins.len(),
            total_amount: saturating_sum(self.records.iter().map(|r| r.record.amount)),
            total_sales: saturating_sum(self.records.iter().map(|r| r.record.sales)),
            coerced_cells: self.coerced_cells.clone(),
        }
    }
}

/// Sums without overflowing; clamps at `Decimal::MAX` / `Decimal::MIN`.
pub fn saturating_sum<I: IntoIterator<Item = Decimal>>(values: I) -> Decimal {
    values.into_iter().fold(Decimal::ZERO, Decimal::saturating_add)
}
