use analytics::{GroupSpec, MeasureAgg, group_by};
use core_types::{AggFn, DimValue, Dimension, EnrichedRecord, Measure};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::cmp::Ordering;

/// One product with the physical attributes the stability chart is coloured by.
///
/// Also the point type of the stability scatter: `months_listed` on x,
/// `amount` on y, `price` as marker size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AsinProfile {
    pub asin: String,
    pub brand: String,
    pub dual_tip: String,
    pub ink_delivery: String,
    pub unit_count: Decimal,
    pub nib_type: String,
    pub months_listed: u32,
    pub stability_score: Decimal,
    /// Total revenue.
    pub amount: Decimal,
    /// Mean listed price.
    pub price: Decimal,
    /// Mean rate.
    pub rate: Decimal,
}

const PROFILE_DIMENSIONS: [Dimension; 6] = [
    Dimension::Asin,
    Dimension::Brand,
    Dimension::DualTip,
    Dimension::InkDelivery,
    Dimension::UnitCount,
    Dimension::NibType,
];

/// Groups rows into ASIN profiles.
///
/// An ASIN whose attributes changed between months yields one profile per
/// attribute combination; each carries the ASIN's global `months_listed`.
pub fn asin_profiles<'a, I>(records: I) -> Vec<AsinProfile>
where
    I: IntoIterator<Item = &'a EnrichedRecord>,
{
    let spec = GroupSpec::new(
        PROFILE_DIMENSIONS.to_vec(),
        vec![
            MeasureAgg::new(Measure::MonthsListed, AggFn::Max),
            MeasureAgg::new(Measure::StabilityScore, AggFn::Max),
            MeasureAgg::new(Measure::Amount, AggFn::Sum),
            MeasureAgg::new(Measure::Price, AggFn::Mean),
            MeasureAgg::new(Measure::Rate, AggFn::Mean),
        ],
    );

    group_by(records, &spec)
        .into_iter()
        .map(|row| {
            let text = |i: usize| row.keys[i].to_string();
            let unit_count = match &row.keys[4] {
                DimValue::Number(n) => *n,
                DimValue::Text(_) => Decimal::ZERO,
            };
            AsinProfile {
                asin: text(0),
                brand: text(1),
                dual_tip: text(2),
                ink_delivery: text(3),
                unit_count,
                nib_type: text(5),
                months_listed: row.values[0].to_u32().unwrap_or(0),
                stability_score: row.values[1],
                amount: row.values[2],
                price: row.values[3],
                rate: row.values[4],
            }
        })
        .collect()
}

/// The longest-listed products first; ties by revenue, then ASIN.
pub fn top_stable(profiles: &[AsinProfile], n: usize) -> Vec<AsinProfile> {
    ranked(profiles, n, |a, b| {
        b.months_listed
            .cmp(&a.months_listed)
            .then_with(|| b.amount.cmp(&a.amount))
            .then_with(|| a.asin.cmp(&b.asin))
    })
}

/// The shortest-listed products first; ties by ASIN.
pub fn at_risk(profiles: &[AsinProfile], n: usize) -> Vec<AsinProfile> {
    ranked(profiles, n, |a, b| {
        a.months_listed
            .cmp(&b.months_listed)
            .then_with(|| a.asin.cmp(&b.asin))
    })
}

fn ranked<F>(profiles: &[AsinProfile], n: usize, order: F) -> Vec<AsinProfile>
where
    F: Fn(&AsinProfile, &AsinProfile) -> Ordering,
{
    let mut sorted = profiles.to_vec();
    // Stable sort: profiles sharing an ASIN keep their grouping order.
    sorted.sort_by(order);
    sorted.truncate(n);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn profile(asin: &str, months: u32, amount: Decimal) -> AsinProfile {
        AsinProfile {
            asin: asin.to_string(),
            brand: "Ohuhu".to_string(),
            dual_tip: String::new(),
            ink_delivery: String::new(),
            unit_count: dec!(12),
            nib_type: String::new(),
            months_listed: months,
            stability_score: Decimal::ZERO,
            amount,
            price: Decimal::ZERO,
            rate: Decimal::ZERO,
        }
    }

    fn asins(profiles: &[AsinProfile]) -> Vec<&str> {
        profiles.iter().map(|p| p.asin.as_str()).collect()
    }

    #[test]
    fn top_stable_breaks_ties_by_amount_then_asin() {
        let profiles = vec![
            profile("C", 5, dec!(10)),
            profile("B", 5, dec!(10)),
            profile("A", 5, dec!(30)),
            profile("D", 6, dec!(1)),
            profile("E", 1, dec!(999)),
        ];
        assert_eq!(asins(&top_stable(&profiles, 4)), vec!["D", "A", "B", "C"]);
    }

    #[test]
    fn at_risk_breaks_ties_by_asin() {
        let profiles = vec![
            profile("Z", 1, dec!(10)),
            profile("M", 2, dec!(10)),
            profile("A", 1, dec!(0)),
            profile("K", 1, dec!(50)),
        ];
        assert_eq!(asins(&at_risk(&profiles, 3)), vec!["A", "K", "Z"]);
    }

    #[test]
    fn rankings_ignore_input_order() {
        let mut profiles = vec![
            profile("B", 2, dec!(5)),
            profile("A", 2, dec!(5)),
            profile("C", 3, dec!(5)),
        ];
        let first = (top_stable(&profiles, 10), at_risk(&profiles, 10));
        profiles.reverse();
        let second = (top_stable(&profiles, 10), at_risk(&profiles, 10));
        assert_eq!(first, second);
    }

    #[test]
    fn n_larger_than_input_returns_everything() {
        let profiles = vec![profile("A", 1, dec!(1))];
        assert_eq!(top_stable(&profiles, 20).len(), 1);
        assert!(at_risk(&profiles, 0).is_empty());
    }
}
