//! The one group-by primitive every view is built from.
//!
//! Rows are bucketed by the values of `dimensions`; each bucket folds each
//! requested measure with its aggregation. Keys keep their literal values
//! (blank attributes included), so totals over groups always equal totals over
//! rows.

use core_types::{AggFn, DimValue, Dimension, EnrichedRecord, Measure};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureAgg {
    pub measure: Measure,
    pub agg: AggFn,
}

impl MeasureAgg {
    pub fn new(measure: Measure, agg: AggFn) -> Self {
        Self { measure, agg }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSpec {
    pub dimensions: Vec<Dimension>,
    pub measures: Vec<MeasureAgg>,
}

impl GroupSpec {
    pub fn new(dimensions: Vec<Dimension>, measures: Vec<MeasureAgg>) -> Self {
        Self {
            dimensions,
            measures,
        }
    }

    /// One measure, one aggregation.
    pub fn single(dimensions: Vec<Dimension>, measure: Measure, agg: AggFn) -> Self {
        Self::new(dimensions, vec![MeasureAgg::new(measure, agg)])
    }

    pub fn sum(dimensions: Vec<Dimension>, measure: Measure) -> Self {
        Self::single(dimensions, measure, AggFn::Sum)
    }
}

/// One output bucket. `keys` follows `GroupSpec::dimensions`, `values`
/// follows `GroupSpec::measures`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRow {
    pub keys: Vec<DimValue>,
    pub values: Vec<Decimal>,
}

impl GroupRow {
    /// The first aggregated value; convenient for single-measure specs.
    pub fn value(&self) -> Decimal {
        self.values.first().copied().unwrap_or(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, Copy)]
struct Accumulator {
    sum: Decimal,
    count: u64,
    min: Option<Decimal>,
    max: Option<Decimal>,
}

impl Accumulator {
    const EMPTY: Accumulator = Accumulator {
        sum: Decimal::ZERO,
        count: 0,
        min: None,
        max: None,
    };

    /// Sums saturate at `Decimal::MAX` / `Decimal::MIN`.
    fn push(&mut self, value: Decimal) {
        self.sum = self.sum.saturating_add(value);
        self.count += 1;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    fn finish(&self, agg: AggFn) -> Decimal {
        match agg {
            AggFn::Sum => self.sum,
            AggFn::Mean if self.count == 0 => Decimal::ZERO,
            AggFn::Mean => self.sum / Decimal::from(self.count),
            AggFn::Max => self.max.unwrap_or(Decimal::ZERO),
            AggFn::Min => self.min.unwrap_or(Decimal::ZERO),
            AggFn::Count => Decimal::from(self.count),
        }
    }
}

/// Groups `records` by `spec.dimensions` and aggregates `spec.measures`.
///
/// Output is sorted by key: months and quarters chronologically, years and
/// pack sizes numerically, text lexically. With no dimensions the result is a
/// single grand-total row (or nothing, for no input rows).
pub fn group_by<'a, I>(records: I, spec: &GroupSpec) -> Vec<GroupRow>
where
    I: IntoIterator<Item = &'a EnrichedRecord>,
{
    let mut buckets: BTreeMap<Vec<DimValue>, Vec<Accumulator>> = BTreeMap::new();

    for record in records {
        let key: Vec<DimValue> = spec.dimensions.iter().map(|d| record.dimension(*d)).collect();
        let accs = buckets
            .entry(key)
            .or_insert_with(|| vec![Accumulator::EMPTY; spec.measures.len()]);
        for (acc, m) in accs.iter_mut().zip(&spec.measures) {
            acc.push(record.measure(m.measure));
        }
    }

    buckets
        .into_iter()
        .map(|(keys, accs)| GroupRow {
            keys,
            values: accs
                .iter()
                .zip(&spec.measures)
                .map(|(acc, m)| acc.finish(m.agg))
                .collect(),
        })
        .collect()
}
