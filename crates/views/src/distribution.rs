//! Per-category value distributions for box and violin charts.

use analytics::{GroupSpec, MeasureAgg, group_by};
use core_types::{AggFn, DimValue, Dimension, EnrichedRecord, Measure};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FiveNumberSummary {
    pub min: Decimal,
    pub q1: Decimal,
    pub median: Decimal,
    pub q3: Decimal,
    pub max: Decimal,
}

impl FiveNumberSummary {
    /// `None` for no values. Quartiles interpolate linearly between the
    /// closest ranks.
    pub fn from_values(values: &[Decimal]) -> Option<Self> {
        let mut sorted = values.to_vec();
        sorted.sort();
        Some(Self {
            min: *sorted.first()?,
            q1: quantile(&sorted, Decimal::new(25, 2)),
            median: quantile(&sorted, Decimal::new(5, 1)),
            q3: quantile(&sorted, Decimal::new(75, 2)),
            max: *sorted.last()?,
        })
    }

    pub fn iqr(&self) -> Decimal {
        self.q3.saturating_sub(self.q1)
    }
}

/// The `q` quantile of ascending `sorted`, `q` in `[0, 1]`. Saturates rather
/// than overflowing when the values span more than `Decimal::MAX`.
fn quantile(sorted: &[Decimal], q: Decimal) -> Decimal {
    let Some(last) = sorted.len().checked_sub(1) else {
        return Decimal::ZERO;
    };
    let position = q * Decimal::from(last);
    let lower = position.floor();
    let fraction = position - lower;
    let i = lower.to_usize().unwrap_or(0).min(last);
    let j = (i + 1).min(last);
    let step = sorted[j].saturating_sub(sorted[i]).saturating_mul(fraction);
    sorted[i].saturating_add(step)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub category: DimValue,
    /// Raw values in row order, for the "all points" overlay.
    pub values: Vec<Decimal>,
    pub summary: FiveNumberSummary,
    pub mean: Decimal,
}

/// One distribution of `measure` per value of `category`, sorted by category.
pub fn distributions<'a, I>(records: I, category: Dimension, measure: Measure) -> Vec<Distribution>
where
    I: IntoIterator<Item = &'a EnrichedRecord>,
    I::IntoIter: Clone,
{
    let records = records.into_iter();

    let means: BTreeMap<DimValue, Decimal> = group_by(
        records.clone(),
        &GroupSpec::new(vec![category], vec![MeasureAgg::new(measure, AggFn::Mean)]),
    )
    .into_iter()
    .filter_map(|mut row| Some((row.keys.pop()?, row.value())))
    .collect();

    let mut values: BTreeMap<DimValue, Vec<Decimal>> = BTreeMap::new();
    for r in records {
        values.entry(r.dimension(category)).or_default().push(r.measure(measure));
    }

    values
        .into_iter()
        .filter_map(|(category, values)| {
            let summary = FiveNumberSummary::from_values(&values)?;
            let mean = means.get(&category).copied().unwrap_or(Decimal::ZERO);
            Some(Distribution {
                category,
                values,
                summary,
                mean,
            })
        })
        .collect()
}
