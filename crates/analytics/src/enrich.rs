//! Derived columns: time groupings, ratios and the ASIN stability score.

use crate::classify::ColorClassifier;
use crate::dataset::Dataset;
use crate::loader::LoadedRows;
use core_types::{EnrichedRecord, MonthPeriod};
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashMap};

/// `numerator / denominator`, or zero when the denominator is zero.
///
/// Charts downstream treat zero as "no value", so a zero divisor must never
/// halt processing or poison a sum.
pub fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    numerator.checked_div(denominator).unwrap_or(Decimal::ZERO)
}

/// Builds the immutable dataset from parsed rows.
///
/// `total_months` and every ASIN's `months_listed` are counted over all rows
/// here, before any view can filter, so the stability score of a product is a
/// property of the dataset rather than of a selection.
pub fn enrich(rows: LoadedRows, classifier: &ColorClassifier) -> Dataset {
    let LoadedRows {
        records,
        coerced_cells,
    } = rows;

    let months: BTreeSet<MonthPeriod> = records.iter().map(|r| r.date).collect();
    let total_months = Decimal::from(months.len());

    let mut listed: HashMap<&str, BTreeSet<MonthPeriod>> = HashMap::new();
    for r in &records {
        listed.entry(r.asin.as_str()).or_default().insert(r.date);
    }
    let months_listed: HashMap<String, u32> = listed
        .into_iter()
        .map(|(asin, periods)| (asin.to_string(), periods.len() as u32))
        .collect();

    let mut zero_divisors = 0usize;
    let enriched: Vec<EnrichedRecord> = records
        .into_iter()
        .map(|record| {
            if record.sales.is_zero() || record.unit_count.is_zero() {
                zero_divisors += 1;
            }
            let listed = months_listed.get(&record.asin).copied().unwrap_or(0);
            let quarter = record.date.quarter();
            EnrichedRecord {
                period_key: record.date.label(),
                quarter_key: quarter.label(),
                year: record.date.year(),
                asp: safe_div(record.amount, record.sales),
                unit_price: safe_div(record.price, record.unit_count),
                months_listed: listed,
                stability_score: safe_div(Decimal::from(listed), total_months),
                color_type: classifier.classify(&record.ink_color),
                record,
            }
        })
        .collect();

    if zero_divisors > 0 {
        tracing::debug!(rows = zero_divisors, "Zero sales or pack size; ratio fields set to zero.");
    }

    Dataset::new(enriched, months.into_iter().collect(), coerced_cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{ColorType, SalesRecord};
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn month(m: u32) -> MonthPeriod {
        MonthPeriod::new(2024, m).unwrap()
    }

    fn rows(records: Vec<SalesRecord>) -> LoadedRows {
        LoadedRows {
            records,
            coerced_cells: BTreeMap::new(),
        }
    }

    #[test]
    fn stability_for_asin_missing_a_month() {
        let records = vec![
            SalesRecord::new("A1", "Ohuhu", month(1)),
            SalesRecord::new("B2", "Arteza", month(2)),
            SalesRecord::new("A1", "Ohuhu", month(3)),
        ];
        let ds = enrich(rows(records), &ColorClassifier::default());

        assert_eq!(ds.total_months(), 3);
        let a1: Vec<_> = ds.records().iter().filter(|r| r.record.asin == "A1").collect();
        assert_eq!(a1.len(), 2);
        for r in a1 {
            assert_eq!(r.months_listed, 2);
            assert_eq!(r.stability_score.round_dp(3), dec!(0.667));
        }
    }

    #[test]
    fn duplicate_rows_in_a_month_count_once() {
        let records = vec![
            SalesRecord::new("A1", "Ohuhu", month(1)),
            SalesRecord::new("A1", "Ohuhu", month(1)),
            SalesRecord::new("B2", "Arteza", month(2)),
        ];
        let ds = enrich(rows(records), &ColorClassifier::default());
        for r in ds.records() {
            assert!(r.months_listed as usize <= ds.total_months());
            assert!(r.stability_score >= Decimal::ZERO && r.stability_score <= Decimal::ONE);
        }
        assert_eq!(ds.records()[0].months_listed, 1);
        assert_eq!(ds.records()[0].stability_score, dec!(0.5));
    }

    #[test]
    fn zero_sales_gives_zero_asp() {
        let record = SalesRecord {
            amount: dec!(50),
            sales: Decimal::ZERO,
            price: dec!(30),
            unit_count: dec!(12),
            ink_color: "Gold".to_string(),
            ..SalesRecord::new("A1", "Ohuhu", month(1))
        };
        let ds = enrich(rows(vec![record]), &ColorClassifier::default());
        let r = &ds.records()[0];

        assert_eq!(r.asp, Decimal::ZERO);
        assert_eq!(r.unit_price, dec!(2.5));
        assert_eq!(r.color_type, ColorType::Independent);
        assert_eq!(r.period_key, "2024-01");
        assert_eq!(r.quarter_key, "2024Q1");
        assert_eq!(r.year, 2024);
    }

    #[test]
    fn zero_pack_size_gives_zero_unit_price() {
        let record = SalesRecord {
            amount: dec!(100),
            sales: dec!(4),
            price: dec!(25),
            ..SalesRecord::new("A1", "Ohuhu", month(1))
        };
        let ds = enrich(rows(vec![record]), &ColorClassifier::default());
        assert_eq!(ds.records()[0].asp, dec!(25));
        assert_eq!(ds.records()[0].unit_price, Decimal::ZERO);
    }

    #[test]
    fn safe_div_cases() {
        assert_eq!(safe_div(dec!(10), dec!(4)), dec!(2.5));
        assert_eq!(safe_div(dec!(10), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(safe_div(Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
    }
}
