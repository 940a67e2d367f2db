//! Index x column matrices and the ratio tables derived from them.

use crate::aggregate::{GroupSpec, group_by};
use crate::dataset::saturating_sum;
use crate::enrich::safe_div;
use crate::error::AnalyticsError;
use core_types::{DimValue, Dimension, EnrichedRecord, Measure};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeSet;

/// Summed values of one measure, laid out `index` x `columns`.
///
/// Combinations with no rows are filled with zero. Both axes are sorted the way
/// `group_by` sorts keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotTable {
    pub index_dimension: Dimension,
    pub column_dimension: Dimension,
    pub measure: Measure,
    pub index: Vec<DimValue>,
    pub columns: Vec<DimValue>,
    pub cells: Vec<Vec<Decimal>>,
}

/// A table of ratios. `None` marks a gap: there is no meaningful value, which
/// a chart should draw as a break rather than as zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatioTable {
    pub index: Vec<DimValue>,
    pub columns: Vec<DimValue>,
    pub cells: Vec<Vec<Option<Decimal>>>,
}

impl PivotTable {
    pub fn from_records<'a, I>(records: I, index: Dimension, columns: Dimension, measure: Measure) -> Self
    where
        I: IntoIterator<Item = &'a EnrichedRecord>,
    {
        let rows = group_by(records, &GroupSpec::sum(vec![index, columns], measure));

        let index_keys: Vec<DimValue> = rows
            .iter()
            .map(|r| r.keys[0].clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let column_keys: Vec<DimValue> = rows
            .iter()
            .map(|r| r.keys[1].clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut cells = vec![vec![Decimal::ZERO; column_keys.len()]; index_keys.len()];
        for row in &rows {
            // Both searches succeed: every key came from `rows`.
            if let (Ok(i), Ok(j)) = (
                index_keys.binary_search(&row.keys[0]),
                column_keys.binary_search(&row.keys[1]),
            ) {
                cells[i][j] = row.value();
            }
        }

        Self {
            index_dimension: index,
            column_dimension: columns,
            measure,
            index: index_keys,
            columns: column_keys,
            cells,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn value(&self, index: &DimValue, column: &DimValue) -> Option<Decimal> {
        let i = self.index.iter().position(|k| k == index)?;
        let j = self.columns.iter().position(|k| k == column)?;
        Some(self.cells[i][j])
    }

    pub fn row_totals(&self) -> Vec<Decimal> {
        self.cells.iter().map(|row| saturating_sum(row.iter().copied())).collect()
    }

    pub fn column_totals(&self) -> Vec<Decimal> {
        (0..self.columns.len())
            .map(|j| saturating_sum(self.cells.iter().map(|row| row[j])))
            .collect()
    }

    /// Each cell over its row total. A zero-total row is all gaps.
    pub fn share_of_row_total(&self) -> RatioTable {
        let cells = self
            .cells
            .iter()
            .zip(self.row_totals())
            .map(|(row, total)| {
                row.iter()
                    .map(|v| if total.is_zero() { None } else { Some(safe_div(*v, total)) })
                    .collect()
            })
            .collect();

        RatioTable {
            index: self.index.clone(),
            columns: self.columns.clone(),
            cells,
        }
    }

    /// `value[t] / value[t - lag] - 1` down the index axis.
    ///
    /// The shift is by rows, i.e. by observed periods. The first `lag` rows and
    /// any cell whose earlier value is zero are gaps.
    pub fn pct_change(&self, lag: usize) -> Result<RatioTable, AnalyticsError> {
        if lag == 0 {
            return Err(AnalyticsError::InvalidLag(lag));
        }

        let cells = (0..self.index.len())
            .map(|i| {
                (0..self.columns.len())
                    .map(|j| {
                        let earlier = self.cells.get(i.checked_sub(lag)?)?[j];
                        if earlier.is_zero() {
                            return None;
                        }
                        Some(safe_div(self.cells[i][j], earlier).saturating_sub(Decimal::ONE))
                    })
                    .collect()
            })
            .collect();

        Ok(RatioTable {
            index: self.index.clone(),
            columns: self.columns.clone(),
            cells,
        })
    }

    /// Swaps the axes.
    pub fn transpose(&self) -> PivotTable {
        let cells = (0..self.columns.len())
            .map(|j| self.cells.iter().map(|row| row[j]).collect())
            .collect();

        PivotTable {
            index_dimension: self.column_dimension,
            column_dimension: self.index_dimension,
            measure: self.measure,
            index: self.columns.clone(),
            columns: self.index.clone(),
            cells,
        }
    }
}

impl RatioTable {
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn value(&self, index: &DimValue, column: &DimValue) -> Option<Decimal> {
        let i = self.index.iter().position(|k| k == index)?;
        let j = self.columns.iter().position(|k| k == column)?;
        self.cells[i][j]
    }
}
